//! I/O error types.

use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file ends before a block the metadata promises.
    #[error("short read at offset {offset}: expected {expected} bytes, {available} available")]
    ShortRead {
        offset: usize,
        expected: usize,
        available: usize,
    },

    /// Header or footer decoding error.
    #[error("SPE format error: {0}")]
    SpeError(#[from] spexread_spe::Error),

    /// Core library error.
    #[error("core error: {0}")]
    CoreError(#[from] spexread_core::Error),

    /// Reader configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}
