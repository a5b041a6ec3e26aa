//! Error types for spexread-core.

use thiserror::Error;

/// Result type alias for spexread operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the SPE metadata model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A declared value disagrees with the value computed from the rest of the schema.
    #[error("inconsistent schema: {what} (expected {expected}, found {actual})")]
    SchemaConsistency {
        what: String,
        expected: u64,
        actual: u64,
    },

    /// Pixel format name or legacy code that has no known sample type.
    #[error("unsupported pixel format: {0}")]
    UnsupportedPixelFormat(String),

    /// Tracked value type name that has no known binary representation.
    #[error("unsupported tracked value type: {0}")]
    UnsupportedValueType(String),

    /// ROI index past the end of the frame's ROI list.
    #[error("ROI index {index} out of range ({count} ROIs)")]
    RoiIndexOutOfRange { index: usize, count: usize },
}

impl Error {
    /// Shorthand for a [`Error::SchemaConsistency`] over byte or element counts.
    pub fn inconsistent(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        Error::SchemaConsistency {
            what: what.into(),
            expected: expected as u64,
            actual: actual as u64,
        }
    }

    /// Shorthand for a [`Error::SchemaConsistency`] where `count` items of
    /// `size` bytes do not fit in `usize`; `expected` is the largest count that does.
    pub fn overflow(what: impl Into<String>, count: usize, size: usize) -> Self {
        Self::inconsistent(what, usize::MAX / size.max(1), count)
    }
}
