//! Metadata from the legacy (v1.x/v2.x) header fields.

use crate::header::{RawHeader, RoiBlock, MAX_ROIS};
use crate::Result;
use spexread_core::{
    evaluate_polynomial, Calibrations, FrameInfo, GeneralInformation, MetaFormat,
    Orientation, PixelFormat, RoiInfo, SensorInformation, SensorMapping, SpeMetadata,
    WavelengthCalibration,
};

/// `geometric` bit: rotate 90° clockwise.
const GEOMETRIC_ROTATE: u16 = 0b001;
/// `geometric` bit: reverse, i.e. horizontal flip.
const GEOMETRIC_REVERSE: u16 = 0b010;
/// `geometric` bit: flip, i.e. vertical flip.
const GEOMETRIC_FLIP: u16 = 0b100;

/// Orientation encoded in the legacy `geometric` field.
#[must_use]
pub fn orientation_from_geometric(geometric: u16) -> Orientation {
    Orientation::new(
        geometric & GEOMETRIC_REVERSE != 0,
        geometric & GEOMETRIC_FLIP != 0,
        geometric & GEOMETRIC_ROTATE != 0,
    )
}

/// Builds metadata purely from header fields.
///
/// Legacy files carry no tracking block, so ROI strides equal ROI sizes and
/// the frame stride is their sum. A `NumROI` of zero means the whole
/// `xdim × ydim` frame is a single ROI.
///
/// # Errors
/// Fails when the pixel type code is unknown, the ROI count or frame count
/// is out of range, or the computed geometry is inconsistent.
pub fn from_struct(header: &RawHeader) -> Result<SpeMetadata> {
    let version = header.format_version()?;
    let pixel_format = PixelFormat::from_legacy_code(header.datatype)?;

    let declared = usize::try_from(header.num_roi).map_err(|_| {
        spexread_core::Error::SchemaConsistency {
            what: "NumROI".into(),
            expected: 0,
            actual: u64::from(header.num_roi.unsigned_abs()),
        }
    })?;
    if declared > MAX_ROIS {
        return Err(spexread_core::Error::inconsistent("NumROI (at most 10)", MAX_ROIS, declared).into());
    }
    let count = usize::try_from(header.num_frames).map_err(|_| {
        spexread_core::Error::SchemaConsistency {
            what: "NumFrames".into(),
            expected: 0,
            actual: u64::from(header.num_frames.unsigned_abs()),
        }
    })?;

    let blocks: Vec<RoiBlock> = if declared == 0 {
        vec![RoiBlock {
            startx: 1,
            endx: header.xdim,
            groupx: 1,
            starty: 1,
            endy: header.ydim,
            groupy: 1,
        }]
    } else {
        header.roi_info[..declared].to_vec()
    };

    let rois: Vec<RoiInfo> = blocks
        .iter()
        .map(|b| RoiInfo::new(b.width(), b.height(), pixel_format))
        .collect();
    let sensor_mapping = blocks.iter().map(sensor_mapping).collect();

    let stride = rois.iter().map(|r| r.stride).sum();
    let frame_info = FrameInfo {
        count,
        rois,
        stride,
        pixel_format,
        meta_format: None,
    };

    let orientation = orientation_from_geometric(header.geometric).label();
    let sensor_width = if header.x_dim_det > 0 {
        header.x_dim_det
    } else {
        header.xdim
    };
    let sensor_height = if header.y_dim_det > 0 {
        header.y_dim_det
    } else {
        header.ydim
    };

    let wavelength = (header.x_calibration.calib_valid != 0).then(|| {
        let coefficients = header.x_calibration.coefficients().to_vec();
        let wavelengths = evaluate_polynomial(&coefficients, usize::from(sensor_width));
        WavelengthCalibration {
            // WinSpec calibrates the stored data, so the calibration shares the
            // data orientation.
            orientation: Some(orientation.clone()),
            coefficients: Some(coefficients),
            wavelengths,
        }
    });

    let calibrations = Calibrations {
        wavelength,
        sensor_information: SensorInformation {
            width: usize::from(sensor_width),
            height: usize::from(sensor_height),
            orientation,
        },
        sensor_mapping,
    };

    let general = GeneralInformation {
        date: non_empty(&header.date),
        software: non_empty(&header.sw_version),
        experiment_time_local: non_empty(&header.experiment_time_local),
        experiment_time_utc: non_empty(&header.experiment_time_utc),
    };

    log::debug!(
        "legacy header v{}: {} frame(s), {} ROI(s), {}, frame stride {} bytes",
        version.number(),
        frame_info.count,
        frame_info.rois.len(),
        pixel_format,
        frame_info.stride
    );

    // NumROIsInExperiment is 0 when the writer left it unset.
    let declared_rois = match usize::try_from(header.num_rois_in_experiment) {
        Ok(n) if n > 0 => n,
        _ => frame_info.rois.len(),
    };
    Ok(SpeMetadata::new(
        version,
        frame_info,
        MetaFormat::default(),
        calibrations,
        general,
        declared_rois,
    )?)
}

fn sensor_mapping(block: &RoiBlock) -> SensorMapping {
    SensorMapping {
        x: usize::from(block.startx.saturating_sub(1)),
        y: usize::from(block.starty.saturating_sub(1)),
        width: usize::from(block.endx.saturating_sub(block.startx)) + 1,
        height: usize::from(block.endy.saturating_sub(block.starty)) + 1,
        x_binning: usize::from(block.groupx.max(1)),
        y_binning: usize::from(block.groupy.max(1)),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use approx::assert_relative_eq;

    fn header(xdim: u16, ydim: u16, xbin: u16, ybin: u16, frames: i32, rois: i16) -> RawHeader {
        let mut header = RawHeader {
            file_header_ver: 2.2,
            xdim: xdim / xbin,
            ydim: ydim / ybin,
            x_dim_det: xdim,
            y_dim_det: ydim,
            datatype: 1,
            num_roi: rois,
            num_frames: frames,
            ..RawHeader::default()
        };
        for i in 0..rois as usize {
            header.roi_info[i] = RoiBlock {
                startx: 1,
                endx: xdim,
                groupx: xbin,
                starty: 1,
                endy: ydim,
                groupy: ybin,
            };
        }
        header.x_calibration.calib_valid = 1;
        header.x_calibration.polynom_coeff = [0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        header
    }

    #[test]
    fn test_geometry() {
        let metadata = from_struct(&header(128, 64, 2, 4, 5, 3)).unwrap();
        let frame = &metadata.frame_info;
        assert_eq!(frame.count, 5);
        assert_eq!(frame.rois.len(), 3);
        for roi in &frame.rois {
            assert_eq!(roi.width, 64);
            assert_eq!(roi.height, 16);
            assert_eq!(roi.size, 64 * 16 * 4);
            assert_eq!(roi.stride, roi.size);
        }
        assert_eq!(frame.stride, 3 * 64 * 16 * 4);
        assert_eq!(frame.pixel_format, PixelFormat::MonochromeSigned32);
        assert!(frame.meta_format.is_none());

        let mapping = metadata.calibrations.sensor_mapping[1];
        assert_eq!((mapping.width, mapping.height), (128, 64));
        assert_eq!((mapping.x_binning, mapping.y_binning), (2, 4));
    }

    #[test]
    fn test_zero_rois_means_full_frame() {
        let mut h = header(32, 8, 1, 1, 2, 0);
        h.xdim = 32;
        h.ydim = 8;
        let metadata = from_struct(&h).unwrap();
        assert_eq!(metadata.frame_info.rois.len(), 1);
        assert_eq!(metadata.frame_info.rois[0].width, 32);
        assert_eq!(metadata.frame_info.rois[0].height, 8);
    }

    #[test]
    fn test_zeroed_header_has_no_frame() {
        let h = RawHeader {
            file_header_ver: 2.2,
            datatype: 3,
            num_frames: 1,
            ..RawHeader::default()
        };
        assert_eq!((h.xdim, h.ydim, h.num_roi), (0, 0, 0));
        match from_struct(&h) {
            Err(Error::CoreError(spexread_core::Error::SchemaConsistency { what, actual, .. })) => {
                assert_eq!(what, "ROI 0 pixel count (at least 1)");
                assert_eq!(actual, 0);
            }
            other => panic!("zeroed header decoded as {other:?}"),
        }
    }

    #[test]
    fn test_calibration_polynomial() {
        let metadata = from_struct(&header(16, 4, 1, 1, 1, 1)).unwrap();
        let wl = metadata.calibrations.wl();
        assert_eq!(wl.len(), 16);
        assert_relative_eq!(wl[0], 0.0);
        assert_relative_eq!(wl[15], 15.0);

        let mut h = header(16, 4, 1, 1, 1, 1);
        h.x_calibration.calib_valid = 0;
        assert!(from_struct(&h).unwrap().calibrations.wavelength.is_none());
    }

    #[test]
    fn test_geometric_orientation() {
        assert_eq!(orientation_from_geometric(0), Orientation::NORMAL);
        assert_eq!(
            orientation_from_geometric(0b011),
            Orientation::new(true, false, true)
        );

        let mut h = header(16, 4, 1, 1, 1, 1);
        h.geometric = 0b100;
        let metadata = from_struct(&h).unwrap();
        assert_eq!(metadata.calibrations.sensor_information.orientation, "FlipVertical");
        assert_eq!(
            metadata.calibrations.sensor_orientation(),
            Orientation::new(false, true, false)
        );
    }

    #[test]
    fn test_invalid_counts() {
        let mut h = header(16, 4, 1, 1, 1, 1);
        h.num_roi = 11;
        assert!(matches!(
            from_struct(&h),
            Err(Error::CoreError(spexread_core::Error::SchemaConsistency { .. }))
        ));

        let mut h = header(16, 4, 1, 1, 1, 1);
        h.num_frames = -1;
        assert!(from_struct(&h).is_err());

        let mut h = header(16, 4, 1, 1, 1, 2);
        h.num_rois_in_experiment = 3;
        match from_struct(&h) {
            Err(Error::CoreError(err)) => assert_eq!(
                err,
                spexread_core::Error::SchemaConsistency {
                    what: "ROI count".into(),
                    expected: 3,
                    actual: 2,
                }
            ),
            other => panic!("expected a ROI count mismatch, got {other:?}"),
        }
        h.num_rois_in_experiment = 2;
        assert!(from_struct(&h).is_ok());

        let mut h = header(16, 4, 1, 1, 1, 1);
        h.datatype = 42;
        assert!(matches!(
            from_struct(&h),
            Err(Error::CoreError(spexread_core::Error::UnsupportedPixelFormat(_)))
        ));
    }
}
