//! SPE format error types.

use thiserror::Error;

/// Result type for SPE decoding operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SPE format error types.
#[derive(Error, Debug)]
pub enum Error {
    /// Fewer than 4100 bytes available for the header.
    #[error("truncated header: {available} of 4100 bytes available")]
    TruncatedHeader { available: usize },

    /// Strict-mode sentinel mismatch.
    #[error("header validation failed: {field} is {actual}, expected {expected}")]
    HeaderValidation {
        field: &'static str,
        expected: i64,
        actual: i64,
    },

    /// Footer bytes are missing or not well-formed XML.
    #[error("footer parse error at offset {offset}: {message}")]
    FooterParse { offset: u64, message: String },

    /// A required footer element is absent.
    #[error("footer element missing: {0}")]
    MissingElement(String),

    /// A footer attribute is absent or cannot be parsed.
    #[error("invalid footer attribute {element}@{attribute}: {message}")]
    InvalidAttribute {
        element: String,
        attribute: String,
        message: String,
    },

    /// Header version is neither legacy nor XML-footer based.
    #[error("unsupported SPE format version: {0}")]
    UnsupportedFormat(f32),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Core library error.
    #[error("core error: {0}")]
    CoreError(#[from] spexread_core::Error),
}
