//! Export writers for ROI pixels and tracked values.

use crate::data_block::{RoiData, TrackedMetadata};
use crate::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writer for decoded SPE data.
pub struct DataFileWriter<W: Write = BufWriter<File>> {
    writer: W,
}

impl DataFileWriter {
    /// Creates a new file writer.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl<W: Write> DataFileWriter<W> {
    /// Wraps an arbitrary sink.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes ROI pixels as CSV, one `frame,y,x,value` row per sample.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_roi_csv(&mut self, roi: &RoiData) -> Result<()> {
        writeln!(self.writer, "frame,y,x,value")?;
        for k in 0..roi.frames {
            for y in 0..roi.height {
                for x in 0..roi.width {
                    if let Some(value) = roi.pixel(k, y, x) {
                        writeln!(self.writer, "{k},{y},{x},{value}")?;
                    }
                }
            }
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Writes ROI pixels as raw little-endian `f64`, frame-major then row-major.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_roi_binary(&mut self, roi: &RoiData) -> Result<()> {
        for value in roi.pixels.to_f64() {
            self.writer.write_all(&value.to_le_bytes())?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Writes tracked values as CSV: a `frame` column followed by one column per field.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_tracking_csv(&mut self, tracked: &TrackedMetadata) -> Result<()> {
        let mut header = String::from("frame");
        for kind in tracked.kinds() {
            header.push(',');
            header.push_str(kind.name());
        }
        writeln!(self.writer, "{header}")?;

        for k in 0..tracked.frames() {
            write!(self.writer, "{k}")?;
            for (_, values) in tracked.iter() {
                match values.get(k) {
                    Some(v) => write!(self.writer, ",{v}")?,
                    None => write!(self.writer, ",")?,
                }
            }
            writeln!(self.writer)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Returns the underlying sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_block::PixelBuffer;
    use tempfile::NamedTempFile;

    fn roi() -> RoiData {
        RoiData {
            frames: 2,
            height: 1,
            width: 2,
            pixels: PixelBuffer::U16(vec![1, 2, 3, 4]),
        }
    }

    #[test]
    fn test_write_roi_csv() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = DataFileWriter::create(file.path()).unwrap();
        writer.write_roi_csv(&roi()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "frame,y,x,value");
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[4], "1,0,1,4");
    }

    #[test]
    fn test_write_roi_binary() {
        let mut writer = DataFileWriter::new(Vec::new());
        writer.write_roi_binary(&roi()).unwrap();
        let data = writer.into_inner();
        assert_eq!(data.len(), 4 * 8);
        assert_eq!(&data[8..16], &2.0f64.to_le_bytes());
    }

    #[test]
    fn test_write_empty_tracking() {
        let mut writer = DataFileWriter::new(Vec::new());
        writer.write_tracking_csv(&TrackedMetadata::default()).unwrap();
        assert_eq!(writer.into_inner(), b"frame\n");
    }
}
