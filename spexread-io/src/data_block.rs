//! Data block reconstruction: ROI pixels and per-frame tracked values.
//!
//! Frames are laid out back to back after the 4100-byte header. Inside a
//! frame, each ROI occupies `stride` bytes (pixels first, then padding) and
//! the tracking block, if any, follows the last ROI.

use crate::{Error, Result};
use spexread_core::{FrameInfo, PixelFormat, SpeMetadata, TrackedFieldKind};

/// Decoded pixel samples, typed by the file's pixel format.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelBuffer {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl PixelBuffer {
    /// Creates an empty buffer for `format` with room for `capacity` samples.
    #[must_use]
    pub fn with_capacity(format: PixelFormat, capacity: usize) -> Self {
        match format {
            PixelFormat::MonochromeUnsigned8 => PixelBuffer::U8(Vec::with_capacity(capacity)),
            PixelFormat::MonochromeUnsigned16 => PixelBuffer::U16(Vec::with_capacity(capacity)),
            PixelFormat::MonochromeUnsigned32 => PixelBuffer::U32(Vec::with_capacity(capacity)),
            PixelFormat::MonochromeSigned16 => PixelBuffer::I16(Vec::with_capacity(capacity)),
            PixelFormat::MonochromeSigned32 => PixelBuffer::I32(Vec::with_capacity(capacity)),
            PixelFormat::MonochromeFloating32 => PixelBuffer::F32(Vec::with_capacity(capacity)),
            PixelFormat::MonochromeFloating64 => PixelBuffer::F64(Vec::with_capacity(capacity)),
        }
    }

    /// Appends little-endian samples; a trailing partial sample is ignored.
    pub fn extend_from_le(&mut self, bytes: &[u8]) {
        match self {
            PixelBuffer::U8(v) => v.extend_from_slice(bytes),
            PixelBuffer::U16(v) => extend(v, bytes, u16::from_le_bytes),
            PixelBuffer::U32(v) => extend(v, bytes, u32::from_le_bytes),
            PixelBuffer::I16(v) => extend(v, bytes, i16::from_le_bytes),
            PixelBuffer::I32(v) => extend(v, bytes, i32::from_le_bytes),
            PixelBuffer::F32(v) => extend(v, bytes, f32::from_le_bytes),
            PixelBuffer::F64(v) => extend(v, bytes, f64::from_le_bytes),
        }
    }

    #[must_use]
    pub fn pixel_format(&self) -> PixelFormat {
        match self {
            PixelBuffer::U8(_) => PixelFormat::MonochromeUnsigned8,
            PixelBuffer::U16(_) => PixelFormat::MonochromeUnsigned16,
            PixelBuffer::U32(_) => PixelFormat::MonochromeUnsigned32,
            PixelBuffer::I16(_) => PixelFormat::MonochromeSigned16,
            PixelBuffer::I32(_) => PixelFormat::MonochromeSigned32,
            PixelBuffer::F32(_) => PixelFormat::MonochromeFloating32,
            PixelBuffer::F64(_) => PixelFormat::MonochromeFloating64,
        }
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            PixelBuffer::U8(v) => v.len(),
            PixelBuffer::U16(v) => v.len(),
            PixelBuffer::U32(v) => v.len(),
            PixelBuffer::I16(v) => v.len(),
            PixelBuffer::I32(v) => v.len(),
            PixelBuffer::F32(v) => v.len(),
            PixelBuffer::F64(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample `index` widened to `f64`.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<f64> {
        match self {
            PixelBuffer::U8(v) => v.get(index).map(|&x| f64::from(x)),
            PixelBuffer::U16(v) => v.get(index).map(|&x| f64::from(x)),
            PixelBuffer::U32(v) => v.get(index).map(|&x| f64::from(x)),
            PixelBuffer::I16(v) => v.get(index).map(|&x| f64::from(x)),
            PixelBuffer::I32(v) => v.get(index).map(|&x| f64::from(x)),
            PixelBuffer::F32(v) => v.get(index).map(|&x| f64::from(x)),
            PixelBuffer::F64(v) => v.get(index).copied(),
        }
    }

    /// All samples widened to `f64`.
    #[must_use]
    pub fn to_f64(&self) -> Vec<f64> {
        (0..self.len()).filter_map(|i| self.value(i)).collect()
    }
}

fn extend<T, const N: usize>(out: &mut Vec<T>, bytes: &[u8], decode: fn([u8; N]) -> T) {
    out.extend(bytes.chunks_exact(N).map(|chunk| {
        let mut raw = [0u8; N];
        raw.copy_from_slice(chunk);
        decode(raw)
    }));
}

/// Pixels of one ROI across all frames, stored frame-major then row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct RoiData {
    pub frames: usize,
    pub height: usize,
    pub width: usize,
    pub pixels: PixelBuffer,
}

impl RoiData {
    /// `(frames, height, width)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.frames, self.height, self.width)
    }

    /// Sample at `frame`, `row`, `column`, widened to `f64`.
    #[must_use]
    pub fn pixel(&self, frame: usize, row: usize, column: usize) -> Option<f64> {
        if frame >= self.frames || row >= self.height || column >= self.width {
            return None;
        }
        self.pixels
            .value((frame * self.height + row) * self.width + column)
    }

    /// Copies the pixels into a `(frames, height, width)` array.
    #[cfg(feature = "ndarray")]
    #[must_use]
    pub fn to_array3(&self) -> ndarray::Array3<f64> {
        ndarray::Array3::from_shape_fn(self.shape(), |(k, y, x)| {
            self.pixel(k, y, x).unwrap_or(f64::NAN)
        })
    }
}

/// Reads ROI `index` of every frame from the whole file image `data`.
///
/// # Errors
/// Returns [`spexread_core::Error::RoiIndexOutOfRange`] for a bad index,
/// [`spexread_core::Error::SchemaConsistency`] when frame offsets overflow and
/// [`Error::ShortRead`] when the file ends before the last frame.
pub fn extract_roi(data: &[u8], frame: &FrameInfo, index: usize) -> Result<RoiData> {
    let roi = *frame.roi(index)?;
    if frame.count > 0 {
        let last = frame.roi_file_offset(frame.count - 1, index)?;
        slice(data, last, roi.size)?;
    }

    let mut pixels = PixelBuffer::with_capacity(
        frame.pixel_format,
        frame.count.saturating_mul(roi.pixel_count()).min(data.len()),
    );
    for k in 0..frame.count {
        let offset = frame.roi_file_offset(k, index)?;
        pixels.extend_from_le(slice(data, offset, roi.size)?);
    }
    log::trace!(
        "ROI {index}: {} frame(s) of {}x{} {}",
        frame.count,
        roi.height,
        roi.width,
        frame.pixel_format
    );

    Ok(RoiData {
        frames: frame.count,
        height: roi.height,
        width: roi.width,
        pixels,
    })
}

/// Per-frame tracked values, one column per field in packing order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackedMetadata {
    columns: Vec<(TrackedFieldKind, Vec<f64>)>,
}

impl TrackedMetadata {
    /// Values of `kind`, one per frame.
    #[must_use]
    pub fn get(&self, kind: TrackedFieldKind) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, v)| v.as_slice())
    }

    /// Field kinds in packing order.
    pub fn kinds(&self) -> impl Iterator<Item = TrackedFieldKind> + '_ {
        self.columns.iter().map(|(k, _)| *k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TrackedFieldKind, &[f64])> {
        self.columns.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of frames covered.
    #[must_use]
    pub fn frames(&self) -> usize {
        self.columns.first().map_or(0, |(_, v)| v.len())
    }
}

/// Reads the tracking block of every frame.
///
/// Returns an empty table when the file declares no active tracking layout.
///
/// # Errors
/// Returns [`Error::ShortRead`] when the file ends before the last frame's
/// tracking block and [`spexread_core::Error::SchemaConsistency`] when its
/// offset overflows.
pub fn extract_tracked(data: &[u8], metadata: &SpeMetadata) -> Result<TrackedMetadata> {
    let Some(block) = metadata.active_meta_block() else {
        return Ok(TrackedMetadata::default());
    };
    let frame = &metadata.frame_info;
    let offset_of = |k: usize| -> Result<usize> {
        frame
            .frame_offset(k)
            .and_then(|offset| offset.checked_add(frame.tracking_block_offset()))
            .ok_or_else(|| {
                spexread_core::Error::overflow(format!("frame {k} tracking block"), k, frame.stride)
                    .into()
            })
    };
    if frame.count > 0 {
        slice(data, offset_of(frame.count - 1)?, block.block_size())?;
    }

    let columns = block
        .layout()
        .into_iter()
        .map(|(field_offset, field)| -> Result<(TrackedFieldKind, Vec<f64>)> {
            let divisor = field.divisor();
            let values = (0..frame.count)
                .map(|k| -> Result<f64> {
                    let offset = offset_of(k)? + field_offset;
                    let bytes = slice(data, offset, field.value_type.size())?;
                    let raw = field.value_type.decode_le(bytes).ok_or(Error::ShortRead {
                        offset,
                        expected: field.value_type.size(),
                        available: bytes.len(),
                    })?;
                    Ok(raw / divisor)
                })
                .collect::<Result<Vec<f64>>>()?;
            log::trace!(
                "tracked {} ({:?}) at block offset {field_offset}",
                field.kind,
                field.value_type
            );
            Ok((field.kind, values))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TrackedMetadata { columns })
}

/// The `len` bytes at `offset`, or a short read when the file ends first.
fn slice(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or(Error::ShortRead {
            offset,
            expected: len,
            available: data.len().saturating_sub(offset),
        })
}
