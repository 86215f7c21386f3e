//! Rule engine: templates, conditional keys, image rules and coercions.
//!
//! Everything here is built once when configuration is loaded and then
//! evaluated against a fresh `PropertyBag` for every file.

mod cond_key;
mod dates;
mod error;
mod format_spec;
mod images;
mod literal;
mod rule_set;
mod template;
mod value;

pub use cond_key::{compile_anchored, CondKey};
pub use dates::TagDate;
pub use error::{Error, Result};
pub use images::{evaluate_images, ImageAction, ImageChange, ImageRule, ImageSource};
pub use rule_set::{FieldChange, FieldRule, RuleSet};
pub use template::Template;
pub use value::{PropertyBag, Value};
