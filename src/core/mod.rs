//! Core application logic
//!
//! This module contains:
//! - Run options and per-file reports
//! - Building the property snapshot for a file
//! - Applying a configuration to one file, and to a whole batch
//! - Listing the tags already present in files

mod context;
mod listing;
mod properties;
mod runner;
mod state;

pub use context::Context;
pub use listing::list_tags;
pub use properties::DEFAULT_RENUMBER_RE;
pub use runner::run_batch;
pub use state::RunOptions;
