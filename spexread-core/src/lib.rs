//! spexread-core: metadata model and geometry for SPE camera files.
//!
//! This crate holds the format-independent half of the decoder: the
//! normalized metadata schema both header layouts are reduced to, the
//! orientation algebra, and the wavelength calibration remapping.
//!

pub mod calibration;
pub mod error;
pub mod metadata;
pub mod orientation;
pub mod pixel;

pub use calibration::{map_calibration_to_current, remap_calibration, CalibrationMapping};
pub use error::{Error, Result};
pub use metadata::{
    evaluate_polynomial, Calibrations, FormatVersion, FrameInfo, GeneralInformation, MetaBlock,
    MetaFormat, RoiAxes, RoiInfo, SensorInformation, SensorMapping, SpeMetadata, TrackedField,
    TrackedFieldKind, WavelengthCalibration, HEADER_SIZE,
};
pub use orientation::{parse_orientation, transformation_between, Axis, Orientation, Reversible};
pub use pixel::{PixelFormat, ValueType};
