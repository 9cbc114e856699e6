//! Error Types
//!
//! Query errors surfaced to callers, and load errors raised while reading
//! the backing tables at startup.

use std::path::PathBuf;
use thiserror::Error;

/// Crate result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the query layer
#[derive(Error, Debug)]
pub enum Error {
    /// Unknown location or item
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed radius or missing required field
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Backing tables could not be loaded
    #[error("data unavailable: {0}")]
    DataUnavailable(#[from] LoadError),

    /// Response body could not be encoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound(what.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }
}

/// Errors raised while loading the data directory
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Dimensions disagree between a table and the item index
    #[error("shape mismatch in {name}: expected {expected}, got {actual}")]
    Shape {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("duplicate {kind} label: {label}")]
    DuplicateLabel { kind: &'static str, label: String },

    #[error("negative distance {value} between {row} and {column}")]
    NegativeDistance {
        row: String,
        column: String,
        value: f64,
    },
}

impl LoadError {
    pub(crate) fn shape(
        name: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        LoadError::Shape {
            name: name.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}
