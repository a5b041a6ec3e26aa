//! Normalized SPE metadata model.
//!
//! Both the legacy header and the XML footer are reduced to [`SpeMetadata`].
//! Everything the data reader needs (frame count, ROI sizes and strides,
//! tracked field layout) lives in [`FrameInfo`] and [`MetaBlock`].

use crate::orientation::{Axis, Orientation};
use crate::pixel::{PixelFormat, ValueType};
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Size of the fixed leading header; the data block starts right after it.
pub const HEADER_SIZE: usize = 4100;

/// Which construction path produced the metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FormatVersion {
    /// WinView/WinSpec header-only layout (v1.x and v2.x).
    Legacy(f32),
    /// LightField layout with an XML footer (v3.x).
    Xml(f32),
}

impl FormatVersion {
    /// The numeric version stored in the header.
    #[must_use]
    pub fn number(self) -> f32 {
        match self {
            FormatVersion::Legacy(v) | FormatVersion::Xml(v) => v,
        }
    }

    /// Returns true for files carrying an XML footer.
    #[must_use]
    pub fn has_footer(self) -> bool {
        matches!(self, FormatVersion::Xml(_))
    }
}

/// One region of interest as stored in each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoiInfo {
    /// Pixels per row after binning.
    pub width: usize,
    /// Rows after binning.
    pub height: usize,
    /// Bytes of pixel data per frame.
    pub size: usize,
    /// Bytes spanned by the ROI block in each frame (size plus padding).
    pub stride: usize,
}

impl RoiInfo {
    /// Creates an unpadded ROI of `width × height` samples.
    ///
    /// The size saturates at `usize::MAX`; [`SpeMetadata::new`] rejects such ROIs.
    #[must_use]
    pub fn new(width: usize, height: usize, pixel_format: PixelFormat) -> Self {
        let size = width
            .saturating_mul(height)
            .saturating_mul(pixel_format.bytes_per_pixel());
        Self {
            width,
            height,
            size,
            stride: size,
        }
    }

    /// Number of samples per frame.
    #[inline]
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.width.saturating_mul(self.height)
    }

    /// `width × height × bytes_per_pixel`, or `None` when it overflows.
    #[must_use]
    pub fn checked_size(&self, pixel_format: PixelFormat) -> Option<usize> {
        self.width
            .checked_mul(self.height)?
            .checked_mul(pixel_format.bytes_per_pixel())
    }
}

/// Frame geometry: how ROIs and the tracking block tile each frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameInfo {
    /// Number of frames in the data block.
    pub count: usize,
    /// ROIs in acquisition order.
    pub rois: Vec<RoiInfo>,
    /// Bytes per frame: all ROI strides plus the tracking block.
    pub stride: usize,
    pub pixel_format: PixelFormat,
    /// Index into [`MetaFormat::blocks`] of the active tracking layout.
    pub meta_format: Option<usize>,
}

impl FrameInfo {
    /// Returns the ROI at `index`.
    ///
    /// # Errors
    /// Returns [`Error::RoiIndexOutOfRange`] past the last ROI.
    pub fn roi(&self, index: usize) -> Result<&RoiInfo> {
        self.rois.get(index).ok_or(Error::RoiIndexOutOfRange {
            index,
            count: self.rois.len(),
        })
    }

    /// Byte offset of ROI `index` inside a frame (sum of the preceding strides).
    ///
    /// # Errors
    /// Returns [`Error::RoiIndexOutOfRange`] past the last ROI.
    pub fn roi_offset(&self, index: usize) -> Result<usize> {
        self.roi(index)?;
        Ok(stride_sum(&self.rois[..index]))
    }

    /// Byte offset of the tracking block inside a frame.
    #[must_use]
    pub fn tracking_block_offset(&self) -> usize {
        stride_sum(&self.rois)
    }

    /// Absolute file offset of frame `frame`, `None` past the address space.
    #[inline]
    #[must_use]
    pub fn frame_offset(&self, frame: usize) -> Option<usize> {
        frame.checked_mul(self.stride)?.checked_add(HEADER_SIZE)
    }

    /// Absolute file offset of ROI `index` in frame `frame`.
    ///
    /// # Errors
    /// Returns [`Error::RoiIndexOutOfRange`] past the last ROI and
    /// [`Error::SchemaConsistency`] when the offset does not fit in `usize`.
    pub fn roi_file_offset(&self, frame: usize, index: usize) -> Result<usize> {
        let within = self.roi_offset(index)?;
        self.frame_offset(frame)
            .and_then(|offset| offset.checked_add(within))
            .ok_or_else(|| Error::overflow(format!("frame {frame} offset"), frame, self.stride))
    }

    /// Total size of the data block in bytes, `None` when it overflows.
    #[must_use]
    pub fn data_size(&self) -> Option<usize> {
        self.count.checked_mul(self.stride)
    }
}

/// Sum of ROI strides, saturating so that overflowing layouts surface as
/// offset errors instead of wrapping.
fn stride_sum(rois: &[RoiInfo]) -> usize {
    rois.iter().fold(0, |acc, r| acc.saturating_add(r.stride))
}

/// Per-frame values LightField can record alongside the pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TrackedFieldKind {
    ExposureStarted,
    ExposureEnded,
    FrameTrackingNumber,
    GateTrackingDelay,
    GateTrackingWidth,
    ModulationTrackingPhase,
}

impl TrackedFieldKind {
    /// Order in which present fields are packed into the tracking block.
    pub const FIELD_ORDER: [TrackedFieldKind; 6] = [
        TrackedFieldKind::ExposureStarted,
        TrackedFieldKind::ExposureEnded,
        TrackedFieldKind::FrameTrackingNumber,
        TrackedFieldKind::GateTrackingDelay,
        TrackedFieldKind::GateTrackingWidth,
        TrackedFieldKind::ModulationTrackingPhase,
    ];

    /// Position of this kind in [`TrackedFieldKind::FIELD_ORDER`].
    #[must_use]
    pub fn order(self) -> usize {
        Self::FIELD_ORDER
            .iter()
            .position(|k| *k == self)
            .unwrap_or(Self::FIELD_ORDER.len())
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            TrackedFieldKind::ExposureStarted => "ExposureStarted",
            TrackedFieldKind::ExposureEnded => "ExposureEnded",
            TrackedFieldKind::FrameTrackingNumber => "FrameTrackingNumber",
            TrackedFieldKind::GateTrackingDelay => "GateTrackingDelay",
            TrackedFieldKind::GateTrackingWidth => "GateTrackingWidth",
            TrackedFieldKind::ModulationTrackingPhase => "ModulationTrackingPhase",
        }
    }
}

impl std::fmt::Display for TrackedFieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One tracked value declared in a `MetaBlock`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackedField {
    pub kind: TrackedFieldKind,
    pub value_type: ValueType,
    /// Fixed-point divisor; stored values are divided by it.
    pub resolution: Option<f64>,
}

impl TrackedField {
    /// Divisor to apply to raw values, 1 when no resolution is declared.
    #[must_use]
    pub fn divisor(&self) -> f64 {
        match self.resolution {
            Some(r) if r != 0.0 => r,
            _ => 1.0,
        }
    }
}

/// Layout of the per-frame tracking block.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MetaBlock {
    pub id: u32,
    /// Fields in declaration order, as present in the file.
    pub fields: Vec<TrackedField>,
}

impl MetaBlock {
    /// Present fields in packing order with their byte offset in the tracking block.
    ///
    /// Fields follow [`TrackedFieldKind::FIELD_ORDER`]; when a kind is declared
    /// more than once only its first declaration counts.
    #[must_use]
    pub fn layout(&self) -> Vec<(usize, TrackedField)> {
        let mut offset = 0;
        let mut out = Vec::with_capacity(self.fields.len());
        for kind in TrackedFieldKind::FIELD_ORDER {
            let Some(field) = self.fields.iter().find(|f| f.kind == kind) else {
                continue;
            };
            out.push((offset, *field));
            offset += field.value_type.size();
        }
        out
    }

    /// Bytes occupied by the tracking block in each frame.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.layout()
            .iter()
            .map(|(_, f)| f.value_type.size())
            .sum()
    }
}

/// All tracking layouts declared in the file.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MetaFormat {
    pub blocks: Vec<MetaBlock>,
}

/// Wavelength calibration and the orientation it was recorded in.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WavelengthCalibration {
    /// Orientation label at calibration time; `None` means "Normal".
    pub orientation: Option<String>,
    /// Polynomial coefficients, lowest order first.
    pub coefficients: Option<Vec<f64>>,
    /// Wavelength per calibration index.
    pub wavelengths: Vec<f64>,
}

impl WavelengthCalibration {
    /// Parsed calibration-time orientation.
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
            .as_deref()
            .map_or(Orientation::NORMAL, Orientation::parse)
    }
}

/// Evaluates a polynomial (lowest order first) at `0..count`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn evaluate_polynomial(coefficients: &[f64], count: usize) -> Vec<f64> {
    (0..count)
        .map(|p| {
            let p = p as f64;
            coefficients.iter().rev().fold(0.0, |acc, c| acc * p + c)
        })
        .collect()
}

/// Physical sensor description.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorInformation {
    pub width: usize,
    pub height: usize,
    /// Current orientation label.
    pub orientation: String,
}

impl Default for SensorInformation {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            orientation: Orientation::NORMAL.label(),
        }
    }
}

/// Where a ROI sits on the sensor, in unbinned sensor pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorMapping {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub x_binning: usize,
    pub y_binning: usize,
}

impl SensorMapping {
    /// Sensor x coordinate of each binned column (bin centre).
    #[must_use]
    pub fn x_coordinates(&self) -> Vec<usize> {
        axis_coordinates(self.x, self.width, self.x_binning)
    }

    /// Sensor y coordinate of each binned row (bin centre).
    #[must_use]
    pub fn y_coordinates(&self) -> Vec<usize> {
        axis_coordinates(self.y, self.height, self.y_binning)
    }
}

fn axis_coordinates(start: usize, extent: usize, binning: usize) -> Vec<usize> {
    let bin = binning.max(1);
    (0..extent / bin).map(|j| start + j * bin + bin / 2).collect()
}

/// Calibration data attached to the file.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Calibrations {
    pub wavelength: Option<WavelengthCalibration>,
    pub sensor_information: SensorInformation,
    /// One entry per ROI, in ROI order.
    pub sensor_mapping: Vec<SensorMapping>,
}

impl Calibrations {
    /// Wavelength per sensor pixel, empty without a calibration.
    #[must_use]
    pub fn wl(&self) -> &[f64] {
        self.wavelength
            .as_ref()
            .map_or(&[][..], |w| w.wavelengths.as_slice())
    }

    /// Orientation the calibration was recorded in ("Normal" if unknown).
    #[must_use]
    pub fn calibration_orientation(&self) -> Orientation {
        self.wavelength
            .as_ref()
            .map_or(Orientation::NORMAL, WavelengthCalibration::orientation)
    }

    /// Current sensor orientation.
    #[must_use]
    pub fn sensor_orientation(&self) -> Orientation {
        Orientation::parse(&self.sensor_information.orientation)
    }
}

/// Acquisition bookkeeping carried by either header layout.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeneralInformation {
    pub date: Option<String>,
    pub software: Option<String>,
    pub experiment_time_local: Option<String>,
    pub experiment_time_utc: Option<String>,
}

/// The unified description of an SPE file.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpeMetadata {
    pub version: FormatVersion,
    pub frame_info: FrameInfo,
    pub meta_format: MetaFormat,
    pub calibrations: Calibrations,
    pub general: GeneralInformation,
}

impl SpeMetadata {
    /// Assembles and validates a metadata instance.
    ///
    /// `declared_rois` is the ROI count the source announced independently of
    /// the ROI list itself.
    ///
    /// # Errors
    /// Returns [`Error::SchemaConsistency`] when ROI sizes, ROI count or the
    /// frame stride disagree with each other, when a ROI is empty, or when
    /// the data block does not fit in `usize`.
    pub fn new(
        version: FormatVersion,
        frame_info: FrameInfo,
        meta_format: MetaFormat,
        calibrations: Calibrations,
        general: GeneralInformation,
        declared_rois: usize,
    ) -> Result<Self> {
        let metadata = Self {
            version,
            frame_info,
            meta_format,
            calibrations,
            general,
        };
        metadata.validate(declared_rois)?;
        Ok(metadata)
    }

    /// The tracking layout selected by the frame, if any.
    #[must_use]
    pub fn active_meta_block(&self) -> Option<&MetaBlock> {
        self.frame_info
            .meta_format
            .and_then(|i| self.meta_format.blocks.get(i))
    }

    /// Bytes of tracking data per frame.
    #[must_use]
    pub fn tracking_block_size(&self) -> usize {
        self.active_meta_block().map_or(0, MetaBlock::block_size)
    }

    /// Total file size implied by header and data block (footer excluded).
    #[must_use]
    pub fn expected_data_end(&self) -> usize {
        self.frame_info
            .data_size()
            .and_then(|size| size.checked_add(HEADER_SIZE))
            .unwrap_or(usize::MAX)
    }

    fn validate(&self, declared_rois: usize) -> Result<()> {
        let frame = &self.frame_info;
        if frame.rois.len() != declared_rois {
            return Err(Error::inconsistent(
                "ROI count",
                declared_rois,
                frame.rois.len(),
            ));
        }
        if let Some(index) = frame.meta_format {
            if index >= self.meta_format.blocks.len() {
                return Err(Error::inconsistent(
                    "meta block index",
                    self.meta_format.blocks.len(),
                    index,
                ));
            }
        }

        let bpp = frame.pixel_format.bytes_per_pixel();
        let mut span = 0usize;
        for (i, roi) in frame.rois.iter().enumerate() {
            if roi.width == 0 || roi.height == 0 {
                return Err(Error::inconsistent(
                    format!("ROI {i} pixel count (at least 1)"),
                    1,
                    roi.pixel_count(),
                ));
            }
            let expected = roi.checked_size(frame.pixel_format).ok_or_else(|| {
                Error::overflow(format!("ROI {i} rows"), roi.height, roi.width.saturating_mul(bpp))
            })?;
            if roi.size != expected {
                return Err(Error::inconsistent(format!("ROI {i} size"), expected, roi.size));
            }
            if roi.stride < roi.size {
                return Err(Error::inconsistent(format!("ROI {i} stride"), roi.size, roi.stride));
            }
            span = span.checked_add(roi.stride).ok_or_else(|| {
                Error::inconsistent(format!("ROI {i} stride"), usize::MAX - span, roi.stride)
            })?;
        }

        let tracking = self.tracking_block_size();
        let expected = span
            .checked_add(tracking)
            .ok_or_else(|| Error::inconsistent("tracking block size", usize::MAX - span, tracking))?;
        if frame.stride != expected {
            return Err(Error::inconsistent("frame stride", expected, frame.stride));
        }
        if frame
            .data_size()
            .and_then(|size| size.checked_add(HEADER_SIZE))
            .is_none()
        {
            return Err(Error::overflow("frame count", frame.count, frame.stride));
        }
        Ok(())
    }

    /// Dimension labels of each stored frame, outermost first.
    ///
    /// Frames are stored row-major as `(rows, columns)`; the labels follow the
    /// transform from the calibration orientation to the sensor orientation.
    #[must_use]
    pub fn dimension_order(&self) -> (Axis, Axis) {
        let delta = Orientation::transformation_between(
            self.calibrations.calibration_orientation(),
            self.calibrations.sensor_orientation(),
        );
        delta.apply(Axis::Y, Axis::X)
    }

    /// Labelled coordinates for ROI `index`.
    ///
    /// Uses the sensor mapping when one exists for the ROI, plain pixel indices otherwise.
    ///
    /// # Errors
    /// Returns [`Error::RoiIndexOutOfRange`] past the last ROI.
    pub fn roi_axes(&self, index: usize) -> Result<RoiAxes> {
        let roi = self.frame_info.roi(index)?;
        let (row_axis, column_axis) = self.dimension_order();
        let (rows, columns) = match self.calibrations.sensor_mapping.get(index) {
            Some(mapping) => (mapping.y_coordinates(), mapping.x_coordinates()),
            None => ((0..roi.height).collect(), (0..roi.width).collect()),
        };
        Ok(RoiAxes {
            row_axis,
            rows,
            column_axis,
            columns,
        })
    }
}

/// Axis labels and sensor coordinates for the two pixel dimensions of a ROI.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoiAxes {
    pub row_axis: Axis,
    pub rows: Vec<usize>,
    pub column_axis: Axis,
    pub columns: Vec<usize>,
}

impl RoiAxes {
    /// Coordinates along the named axis.
    #[must_use]
    pub fn coordinates(&self, axis: Axis) -> &[usize] {
        if axis == self.row_axis {
            &self.rows
        } else {
            &self.columns
        }
    }
}
