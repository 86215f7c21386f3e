use std::path::PathBuf;

use thiserror::Error;

use crate::audio::StoreError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unable to find property {name}")]
    MissingProperty { name: String },

    #[error("Cannot evaluate condition for '{key}': {source}")]
    ConditionEval {
        key: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Failed to read image file {}: {source}", path.display())]
    ImageSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed image descriptor '{descriptor}': {reason}")]
    MalformedPayload { descriptor: String, reason: String },

    #[error("Invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid format spec '{spec}': {reason}")]
    InvalidFormatSpec { spec: String, reason: String },

    #[error("Cannot format property {name} ({kind}) with '{spec}'")]
    Format {
        name: String,
        kind: &'static str,
        spec: String,
    },

    #[error("Invalid date '{value}'")]
    InvalidDate { value: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    /// Errors that only invalidate a single image rule rather than the whole file
    pub fn is_image_source(&self) -> bool {
        matches!(self, Error::ImageSource { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
