// Audio module - file discovery and tag store access

pub mod detection;
pub mod lofty_store;
pub mod store;

pub use detection::expand_inputs;
pub use lofty_store::{FIELDS, IMAGE_SLOTS, LoftyStore};
pub use store::{StoreError, TagStore};
