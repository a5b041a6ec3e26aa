//! spexread-io: Memory-mapped SPE file reading.
//!
//! This crate maps an SPE file read-only, decodes its metadata once through
//! `spexread-spe`, and reconstructs ROI pixel arrays and per-frame tracked
//! values on request.
//!
//! ```no_run
//! use spexread_io::SpeFile;
//!
//! let file = SpeFile::open("spectrum.spe")?;
//! let roi = file.read_roi(0)?;
//! println!("{:?}", roi.shape());
//! # Ok::<(), spexread_io::Error>(())
//! ```

mod config;
mod data_block;
mod error;
mod reader;
mod writer;

pub use config::ReaderConfig;
pub use data_block::{extract_roi, extract_tracked, PixelBuffer, RoiData, TrackedMetadata};
pub use error::{Error, Result};
pub use reader::{MappedFileReader, SpeFile};
pub use writer::DataFileWriter;
