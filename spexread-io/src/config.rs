//! Reader configuration.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Options controlling how an SPE file is opened.
///
/// Every field has a default, so a partial JSON object such as
/// `{"strict": false}` is a valid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Reject files whose legacy header sentinels do not match.
    pub strict: bool,
    /// Decode the per-frame tracking block when the file declares one.
    pub read_tracking: bool,
    /// Express the wavelength calibration in the current sensor orientation.
    pub remap_calibration: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            strict: true,
            read_tracking: true,
            remap_calibration: true,
        }
    }
}

impl ReaderConfig {
    /// Lenient configuration: sentinel mismatches only log a warning.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            strict: false,
            ..Self::default()
        }
    }

    /// Loads configuration from a JSON string.
    ///
    /// # Errors
    /// Returns [`crate::Error::Config`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads configuration from a JSON file.
    ///
    /// # Errors
    /// Returns an I/O error if the file cannot be opened, or
    /// [`crate::Error::Config`] if its contents are malformed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
