//! The tag store seam between the rule engine and a concrete tag library.

use thiserror::Error;

use crate::rules::Value;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Io(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Unknown image slot: {0}")]
    UnknownImageSlot(String),

    #[error("Field {0} is not supported by this tag format")]
    Unsupported(String),

    #[error("Field {field} cannot hold {kind} value {value}")]
    TypeMismatch {
        field: String,
        kind: &'static str,
        value: String,
    },
}

/// Named, typed access to one file's tag.
///
/// Field names are the ones listed by `fields()`; image slots are matched
/// case-insensitively by the implementation.
pub trait TagStore {
    /// Supported field names, in listing order
    fn fields(&self) -> &'static [&'static str];

    /// Current value of a field, `None` if unset or unknown
    fn get(&self, name: &str) -> Option<Value>;

    /// Set a field; `Value::Null` removes it
    fn set(&mut self, name: &str, value: &Value) -> Result<(), StoreError>;

    fn set_image(&mut self, slot: &str, mime: &str, data: &[u8]) -> Result<(), StoreError>;

    fn remove_image(&mut self, slot: &str) -> Result<(), StoreError>;

    /// Persist all changes made through this store
    fn save(&mut self) -> Result<(), StoreError>;

    /// Remove legacy tags (ID3v1) from the saved file. Returns whether any were removed.
    fn strip_legacy_tags(&mut self) -> Result<bool, StoreError> {
        Ok(false)
    }
}
