//! Memory-mapped SPE file reading.

use crate::config::ReaderConfig;
use crate::data_block::{extract_roi, extract_tracked, RoiData, TrackedMetadata};
use crate::Result;
use memmap2::Mmap;
use spexread_core::{
    map_calibration_to_current, Axis, CalibrationMapping, RoiAxes, SpeMetadata,
};
use spexread_spe::RawHeader;
use std::fs::File;
use std::path::{Path, PathBuf};

/// A memory-mapped file reader.
///
/// Uses memmap2 to access file contents without loading the entire file
/// into memory.
pub struct MappedFileReader {
    mmap: Mmap,
    path: PathBuf,
}

impl MappedFileReader {
    /// Opens a file for memory-mapped reading.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        // SAFETY: The file is opened read-only and we assume it is not modified concurrently.
        // This is the standard safety contract for memory mapping.
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self {
            mmap,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Returns the file contents as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap[..]
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Returns true if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// An opened SPE file: decoded header and metadata over a read-only mapping.
///
/// Metadata is decoded once at open time. Pixel and tracking data are
/// decoded on request straight from the mapping.
pub struct SpeFile {
    reader: MappedFileReader,
    config: ReaderConfig,
    header: RawHeader,
    metadata: SpeMetadata,
}

impl SpeFile {
    /// Opens an SPE file with the default (strict) configuration.
    ///
    /// # Errors
    /// Returns an error if the file cannot be mapped or its metadata is
    /// invalid.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, ReaderConfig::default())
    }

    /// Opens an SPE file with an explicit configuration.
    ///
    /// # Errors
    /// Returns an error if the file cannot be mapped or its metadata is
    /// invalid.
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: ReaderConfig) -> Result<Self> {
        let reader = MappedFileReader::open(path)?;
        let (header, metadata) = spexread_spe::decode_metadata(reader.as_bytes(), config.strict)?;

        log::debug!(
            "opened {} (v{}, {} bytes)",
            reader.path().display(),
            metadata.version.number(),
            reader.len()
        );
        let expected = metadata.expected_data_end();
        if expected > reader.len() {
            log::warn!(
                "{}: data block ends at {expected} but the file has {} bytes",
                reader.path().display(),
                reader.len()
            );
        }

        Ok(Self {
            reader,
            config,
            header,
            metadata,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.reader.path()
    }

    #[must_use]
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn file_size(&self) -> usize {
        self.reader.len()
    }

    /// The decoded 4100-byte header.
    #[must_use]
    pub fn header(&self) -> &RawHeader {
        &self.header
    }

    #[must_use]
    pub fn metadata(&self) -> &SpeMetadata {
        &self.metadata
    }

    #[must_use]
    pub fn roi_count(&self) -> usize {
        self.metadata.frame_info.rois.len()
    }

    /// Reads ROI `index` of every frame.
    ///
    /// # Errors
    /// Returns an error for an out-of-range index or a truncated file.
    pub fn read_roi(&self, index: usize) -> Result<RoiData> {
        extract_roi(self.reader.as_bytes(), &self.metadata.frame_info, index)
    }

    /// Reads every ROI, in acquisition order.
    ///
    /// # Errors
    /// Returns an error if the file is truncated.
    pub fn read_rois(&self) -> Result<Vec<RoiData>> {
        (0..self.roi_count()).map(|i| self.read_roi(i)).collect()
    }

    /// Reads the per-frame tracked values.
    ///
    /// Empty when the file tracks nothing or tracking is disabled in the
    /// configuration.
    ///
    /// # Errors
    /// Returns an error if the file is truncated.
    pub fn read_tracked_metadata(&self) -> Result<TrackedMetadata> {
        if !self.config.read_tracking {
            return Ok(TrackedMetadata::default());
        }
        extract_tracked(self.reader.as_bytes(), &self.metadata)
    }

    /// Wavelength calibration for the stored data.
    ///
    /// With `remap_calibration` enabled the values follow the current sensor
    /// orientation; otherwise they are returned as recorded, along `x`.
    #[must_use]
    pub fn wavelength_mapping(&self) -> Option<CalibrationMapping> {
        if self.config.remap_calibration {
            return map_calibration_to_current(&self.metadata);
        }
        let wl = self.metadata.calibrations.wl();
        (!wl.is_empty()).then(|| CalibrationMapping {
            axis: Axis::X,
            current_position: 0,
            values: wl.to_vec(),
        })
    }

    /// Dimension labels and sensor coordinates for ROI `index`.
    ///
    /// # Errors
    /// Returns an error for an out-of-range index.
    pub fn roi_axes(&self, index: usize) -> Result<RoiAxes> {
        Ok(self.metadata.roi_axes(index)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_mapped_file_reader() {
        let mut file = NamedTempFile::new().unwrap();
        let data: Vec<u8> = (0..64).collect();
        file.write_all(&data).unwrap();
        file.flush().unwrap();

        let reader = MappedFileReader::open(file.path()).unwrap();
        assert_eq!(reader.len(), 64);
        assert!(!reader.is_empty());
        assert_eq!(reader.as_bytes(), &data[..]);
        assert_eq!(reader.path(), file.path());
    }

    #[test]
    fn test_truncated_header() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 100]).unwrap();
        file.flush().unwrap();

        assert!(matches!(
            SpeFile::open(file.path()),
            Err(crate::Error::SpeError(spexread_spe::Error::TruncatedHeader { available: 100 }))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SpeFile::open("/nonexistent/file.spe"),
            Err(crate::Error::Io(_))
        ));
    }
}
