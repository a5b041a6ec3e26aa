//! Fixed 4100-byte SPE header.
//!
//! The header is the WinView/WinSpec C structure, little-endian and packed.
//! LightField (v3.0) keeps the layout for compatibility but only fills in a
//! handful of fields; the real metadata lives in the XML footer whose offset
//! is stored at byte 678.

use crate::{Error, Result};
use spexread_core::{FormatVersion, HEADER_SIZE};
use std::io::Read;

/// Byte offsets of the decoded header fields.
mod offsets {
    pub const X_DIM_DET: usize = 6;
    pub const MODE: usize = 8;
    pub const EXPOSURE_SEC: usize = 10;
    pub const Y_DIM_DET: usize = 18;
    pub const DATE: usize = 20;
    pub const NOSCAN: usize = 34;
    pub const DET_TEMPERATURE: usize = 36;
    pub const DET_TYPE: usize = 40;
    pub const XDIM: usize = 42;
    pub const DELAY_TIME: usize = 46;
    pub const DATATYPE: usize = 108;
    pub const EXPERIMENT_TIME_LOCAL: usize = 172;
    pub const EXPERIMENT_TIME_UTC: usize = 179;
    pub const COMMENTS: usize = 200;
    pub const GEOMETRIC: usize = 600;
    pub const YDIM: usize = 656;
    pub const LNOSCAN: usize = 664;
    pub const LAVGEXP: usize = 668;
    pub const READOUT_TIME: usize = 672;
    pub const XML_OFFSET: usize = 678;
    pub const SW_VERSION: usize = 688;
    pub const NUM_FRAMES: usize = 1446;
    pub const NUM_ROIS_IN_EXPERIMENT: usize = 1488;
    pub const NUM_ROI: usize = 1510;
    pub const ROI_INFO: usize = 1512;
    pub const FILE_HEADER_VER: usize = 1992;
    pub const WINVIEW_ID: usize = 2996;
    pub const X_CALIBRATION: usize = 3000;
    pub const Y_CALIBRATION: usize = 3489;
    pub const LAST_VALUE: usize = 4098;
}

/// Byte offsets inside a calibration record.
mod calib_offsets {
    pub const OFFSET: usize = 0;
    pub const FACTOR: usize = 8;
    pub const CURRENT_UNIT: usize = 16;
    pub const STRING: usize = 18;
    pub const CALIB_VALID: usize = 98;
    pub const INPUT_UNIT: usize = 99;
    pub const POLYNOM_UNIT: usize = 100;
    pub const POLYNOM_ORDER: usize = 101;
    pub const CALIB_COUNT: usize = 102;
    pub const PIXEL_POSITION: usize = 103;
    pub const CALIB_VALUE: usize = 183;
    pub const POLYNOM_COEFF: usize = 263;
    pub const LASER_POSITION: usize = 311;
    pub const NEW_CALIB_FLAG: usize = 320;
    pub const CALIB_LABEL: usize = 321;
}

/// Expected `lnoscan` value.
pub const LNOSCAN_SENTINEL: i32 = -1;
/// Expected `WinView_id` value (0x01234567).
pub const WINVIEW_ID_SENTINEL: i32 = 19_088_743;
/// Expected `lastvalue` value (0x5555).
pub const LAST_VALUE_SENTINEL: i16 = 21_845;
/// Number of ROI records reserved in the header.
pub const MAX_ROIS: usize = 10;
/// Size of one ROI record.
const ROI_RECORD_SIZE: usize = 12;

/// One legacy ROI record, in 1-based inclusive sensor pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoiBlock {
    pub startx: u16,
    pub endx: u16,
    pub groupx: u16,
    pub starty: u16,
    pub endy: u16,
    pub groupy: u16,
}

impl RoiBlock {
    /// Binned width, `(endx - startx + 1) / groupx`.
    #[must_use]
    pub fn width(&self) -> usize {
        binned_extent(self.startx, self.endx, self.groupx)
    }

    /// Binned height, `(endy - starty + 1) / groupy`.
    #[must_use]
    pub fn height(&self) -> usize {
        binned_extent(self.starty, self.endy, self.groupy)
    }

    /// Returns true for an all-zero record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == RoiBlock::default()
    }
}

/// Zero when `end < start`.
fn binned_extent(start: u16, end: u16, group: u16) -> usize {
    if end < start {
        return 0;
    }
    (usize::from(end - start) + 1) / usize::from(group.max(1))
}

/// Legacy x/y calibration record (489 bytes).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LegacyCalibration {
    pub offset: f64,
    pub factor: f64,
    pub current_unit: u8,
    pub string: String,
    pub calib_valid: u8,
    pub input_unit: u8,
    pub polynom_unit: u8,
    pub polynom_order: u8,
    pub calib_count: u8,
    pub pixel_position: [f64; 10],
    pub calib_value: [f64; 10],
    pub polynom_coeff: [f64; 6],
    pub laser_position: f64,
    pub new_calib_flag: u8,
    pub calib_label: String,
}

impl LegacyCalibration {
    /// Coefficients in use, lowest order first.
    ///
    /// WinSpec leaves `polynom_order` at 0 in many files; all six
    /// coefficients are used then.
    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        let order = usize::from(self.polynom_order);
        if order == 0 || order >= self.polynom_coeff.len() {
            &self.polynom_coeff
        } else {
            &self.polynom_coeff[..=order]
        }
    }

    fn parse(bytes: &[u8]) -> Self {
        use calib_offsets as o;
        Self {
            offset: f64_at(bytes, o::OFFSET),
            factor: f64_at(bytes, o::FACTOR),
            current_unit: bytes[o::CURRENT_UNIT],
            string: string_at(bytes, o::STRING, 40),
            calib_valid: bytes[o::CALIB_VALID],
            input_unit: bytes[o::INPUT_UNIT],
            polynom_unit: bytes[o::POLYNOM_UNIT],
            polynom_order: bytes[o::POLYNOM_ORDER],
            calib_count: bytes[o::CALIB_COUNT],
            pixel_position: std::array::from_fn(|i| f64_at(bytes, o::PIXEL_POSITION + 8 * i)),
            calib_value: std::array::from_fn(|i| f64_at(bytes, o::CALIB_VALUE + 8 * i)),
            polynom_coeff: std::array::from_fn(|i| f64_at(bytes, o::POLYNOM_COEFF + 8 * i)),
            laser_position: f64_at(bytes, o::LASER_POSITION),
            new_calib_flag: bytes[o::NEW_CALIB_FLAG],
            calib_label: string_at(bytes, o::CALIB_LABEL, 81),
        }
    }

    fn write(&self, bytes: &mut [u8]) {
        use calib_offsets as o;
        put(bytes, o::OFFSET, &self.offset.to_le_bytes());
        put(bytes, o::FACTOR, &self.factor.to_le_bytes());
        bytes[o::CURRENT_UNIT] = self.current_unit;
        put_string(bytes, o::STRING, 40, &self.string);
        bytes[o::CALIB_VALID] = self.calib_valid;
        bytes[o::INPUT_UNIT] = self.input_unit;
        bytes[o::POLYNOM_UNIT] = self.polynom_unit;
        bytes[o::POLYNOM_ORDER] = self.polynom_order;
        bytes[o::CALIB_COUNT] = self.calib_count;
        for (i, v) in self.pixel_position.iter().enumerate() {
            put(bytes, o::PIXEL_POSITION + 8 * i, &v.to_le_bytes());
        }
        for (i, v) in self.calib_value.iter().enumerate() {
            put(bytes, o::CALIB_VALUE + 8 * i, &v.to_le_bytes());
        }
        for (i, v) in self.polynom_coeff.iter().enumerate() {
            put(bytes, o::POLYNOM_COEFF + 8 * i, &v.to_le_bytes());
        }
        put(bytes, o::LASER_POSITION, &self.laser_position.to_le_bytes());
        bytes[o::NEW_CALIB_FLAG] = self.new_calib_flag;
        put_string(bytes, o::CALIB_LABEL, 81, &self.calib_label);
    }
}

/// Decoded fixed header.
#[derive(Debug, Clone, PartialEq)]
pub struct RawHeader {
    pub x_dim_det: u16,
    pub mode: i16,
    pub exposure_sec: f32,
    pub y_dim_det: u16,
    pub date: String,
    pub noscan: i16,
    pub det_temperature: f32,
    pub det_type: i16,
    pub xdim: u16,
    pub delay_time: f32,
    pub datatype: i16,
    pub experiment_time_local: String,
    pub experiment_time_utc: String,
    pub comments: [String; 5],
    /// Bit 0 rotate, bit 1 reverse (horizontal flip), bit 2 flip (vertical).
    pub geometric: u16,
    pub ydim: u16,
    pub lnoscan: i32,
    pub lavgexp: i32,
    pub readout_time: f32,
    /// Absolute offset of the XML footer (v3.0 only).
    pub xml_offset: u64,
    pub sw_version: String,
    pub num_frames: i32,
    pub num_rois_in_experiment: i16,
    pub num_roi: i16,
    pub roi_info: [RoiBlock; MAX_ROIS],
    pub file_header_ver: f32,
    pub winview_id: i32,
    pub x_calibration: LegacyCalibration,
    pub y_calibration: LegacyCalibration,
    pub lastvalue: i16,
}

impl Default for RawHeader {
    /// An empty header with valid sentinels.
    fn default() -> Self {
        Self {
            x_dim_det: 0,
            mode: 0,
            exposure_sec: 0.0,
            y_dim_det: 0,
            date: String::new(),
            noscan: 0,
            det_temperature: 0.0,
            det_type: 0,
            xdim: 0,
            delay_time: 0.0,
            datatype: 0,
            experiment_time_local: String::new(),
            experiment_time_utc: String::new(),
            comments: Default::default(),
            geometric: 0,
            ydim: 0,
            lnoscan: LNOSCAN_SENTINEL,
            lavgexp: 0,
            readout_time: 0.0,
            xml_offset: 0,
            sw_version: String::new(),
            num_frames: 0,
            num_rois_in_experiment: 0,
            num_roi: 0,
            roi_info: [RoiBlock::default(); MAX_ROIS],
            file_header_ver: 0.0,
            winview_id: WINVIEW_ID_SENTINEL,
            x_calibration: LegacyCalibration::default(),
            y_calibration: LegacyCalibration::default(),
            lastvalue: LAST_VALUE_SENTINEL,
        }
    }
}

impl RawHeader {
    /// Reads and decodes the header from the start of `reader`.
    ///
    /// Consumes exactly 4100 bytes when they are available. With `strict`,
    /// the legacy sentinels are checked as well (see [`RawHeader::validate`]).
    ///
    /// # Errors
    /// Returns [`Error::TruncatedHeader`] if the source ends early,
    /// [`Error::HeaderValidation`] on a sentinel mismatch in strict mode.
    pub fn read_from<R: Read>(reader: &mut R, strict: bool) -> Result<Self> {
        let mut buf = Vec::with_capacity(HEADER_SIZE);
        reader.take(HEADER_SIZE as u64).read_to_end(&mut buf)?;
        let header = Self::parse(&buf)?;
        if strict {
            header.validate()?;
        }
        Ok(header)
    }

    /// Decodes the header from the first 4100 bytes of `bytes`.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedHeader`] if `bytes` is shorter than 4100.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::TruncatedHeader {
                available: bytes.len(),
            });
        }
        let b = &bytes[..HEADER_SIZE];
        use offsets as o;

        let roi_info = std::array::from_fn(|i| {
            let base = o::ROI_INFO + i * ROI_RECORD_SIZE;
            RoiBlock {
                startx: u16_at(b, base),
                endx: u16_at(b, base + 2),
                groupx: u16_at(b, base + 4),
                starty: u16_at(b, base + 6),
                endy: u16_at(b, base + 8),
                groupy: u16_at(b, base + 10),
            }
        });

        Ok(Self {
            x_dim_det: u16_at(b, o::X_DIM_DET),
            mode: i16_at(b, o::MODE),
            exposure_sec: f32_at(b, o::EXPOSURE_SEC),
            y_dim_det: u16_at(b, o::Y_DIM_DET),
            date: string_at(b, o::DATE, 10),
            noscan: i16_at(b, o::NOSCAN),
            det_temperature: f32_at(b, o::DET_TEMPERATURE),
            det_type: i16_at(b, o::DET_TYPE),
            xdim: u16_at(b, o::XDIM),
            delay_time: f32_at(b, o::DELAY_TIME),
            datatype: i16_at(b, o::DATATYPE),
            experiment_time_local: string_at(b, o::EXPERIMENT_TIME_LOCAL, 7),
            experiment_time_utc: string_at(b, o::EXPERIMENT_TIME_UTC, 7),
            comments: std::array::from_fn(|i| string_at(b, o::COMMENTS + 80 * i, 80)),
            geometric: u16_at(b, o::GEOMETRIC),
            ydim: u16_at(b, o::YDIM),
            lnoscan: i32_at(b, o::LNOSCAN),
            lavgexp: i32_at(b, o::LAVGEXP),
            readout_time: f32_at(b, o::READOUT_TIME),
            xml_offset: u64::from_le_bytes(array_at(b, o::XML_OFFSET)),
            sw_version: string_at(b, o::SW_VERSION, 16),
            num_frames: i32_at(b, o::NUM_FRAMES),
            num_rois_in_experiment: i16_at(b, o::NUM_ROIS_IN_EXPERIMENT),
            num_roi: i16_at(b, o::NUM_ROI),
            roi_info,
            file_header_ver: f32_at(b, o::FILE_HEADER_VER),
            winview_id: i32_at(b, o::WINVIEW_ID),
            x_calibration: LegacyCalibration::parse(&b[o::X_CALIBRATION..o::Y_CALIBRATION]),
            y_calibration: LegacyCalibration::parse(&b[o::Y_CALIBRATION..]),
            lastvalue: i16_at(b, o::LAST_VALUE),
        })
    }

    /// Encodes the header back into its 4100-byte layout.
    ///
    /// Fields this type does not decode are written as zeros.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        use offsets as o;
        let mut b = vec![0u8; HEADER_SIZE];
        put(&mut b, o::X_DIM_DET, &self.x_dim_det.to_le_bytes());
        put(&mut b, o::MODE, &self.mode.to_le_bytes());
        put(&mut b, o::EXPOSURE_SEC, &self.exposure_sec.to_le_bytes());
        put(&mut b, o::Y_DIM_DET, &self.y_dim_det.to_le_bytes());
        put_string(&mut b, o::DATE, 10, &self.date);
        put(&mut b, o::NOSCAN, &self.noscan.to_le_bytes());
        put(&mut b, o::DET_TEMPERATURE, &self.det_temperature.to_le_bytes());
        put(&mut b, o::DET_TYPE, &self.det_type.to_le_bytes());
        put(&mut b, o::XDIM, &self.xdim.to_le_bytes());
        put(&mut b, o::DELAY_TIME, &self.delay_time.to_le_bytes());
        put(&mut b, o::DATATYPE, &self.datatype.to_le_bytes());
        put_string(&mut b, o::EXPERIMENT_TIME_LOCAL, 7, &self.experiment_time_local);
        put_string(&mut b, o::EXPERIMENT_TIME_UTC, 7, &self.experiment_time_utc);
        for (i, comment) in self.comments.iter().enumerate() {
            put_string(&mut b, o::COMMENTS + 80 * i, 80, comment);
        }
        put(&mut b, o::GEOMETRIC, &self.geometric.to_le_bytes());
        put(&mut b, o::YDIM, &self.ydim.to_le_bytes());
        put(&mut b, o::LNOSCAN, &self.lnoscan.to_le_bytes());
        put(&mut b, o::LAVGEXP, &self.lavgexp.to_le_bytes());
        put(&mut b, o::READOUT_TIME, &self.readout_time.to_le_bytes());
        put(&mut b, o::XML_OFFSET, &self.xml_offset.to_le_bytes());
        put_string(&mut b, o::SW_VERSION, 16, &self.sw_version);
        put(&mut b, o::NUM_FRAMES, &self.num_frames.to_le_bytes());
        put(
            &mut b,
            o::NUM_ROIS_IN_EXPERIMENT,
            &self.num_rois_in_experiment.to_le_bytes(),
        );
        put(&mut b, o::NUM_ROI, &self.num_roi.to_le_bytes());
        for (i, roi) in self.roi_info.iter().enumerate() {
            let base = o::ROI_INFO + i * ROI_RECORD_SIZE;
            let fields = [roi.startx, roi.endx, roi.groupx, roi.starty, roi.endy, roi.groupy];
            for (j, v) in fields.iter().enumerate() {
                put(&mut b, base + 2 * j, &v.to_le_bytes());
            }
        }
        put(&mut b, o::FILE_HEADER_VER, &self.file_header_ver.to_le_bytes());
        put(&mut b, o::WINVIEW_ID, &self.winview_id.to_le_bytes());
        self.x_calibration
            .write(&mut b[o::X_CALIBRATION..o::Y_CALIBRATION]);
        self.y_calibration.write(&mut b[o::Y_CALIBRATION..]);
        put(&mut b, o::LAST_VALUE, &self.lastvalue.to_le_bytes());
        b
    }

    /// Checks the three legacy sentinels, in header order.
    ///
    /// # Errors
    /// Returns [`Error::HeaderValidation`] naming the first mismatching field.
    pub fn validate(&self) -> Result<()> {
        let checks: [(&'static str, i64, i64); 3] = [
            ("lnoscan", LNOSCAN_SENTINEL.into(), self.lnoscan.into()),
            ("WinView_id", WINVIEW_ID_SENTINEL.into(), self.winview_id.into()),
            ("lastvalue", LAST_VALUE_SENTINEL.into(), self.lastvalue.into()),
        ];
        for (field, expected, actual) in checks {
            if expected != actual {
                return Err(Error::HeaderValidation {
                    field,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Returns true when all legacy sentinels hold.
    #[must_use]
    pub fn sentinels_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Resolves which metadata layout this file uses.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedFormat`] for versions outside `[0, 4)`.
    pub fn format_version(&self) -> Result<FormatVersion> {
        let v = self.file_header_ver;
        if v.is_finite() && (0.0..3.0).contains(&v) {
            Ok(FormatVersion::Legacy(v))
        } else if (3.0..4.0).contains(&v) {
            Ok(FormatVersion::Xml(v))
        } else {
            Err(Error::UnsupportedFormat(v))
        }
    }
}

fn array_at<const N: usize>(bytes: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[offset..offset + N]);
    out
}

fn u16_at(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes(array_at(bytes, offset))
}

fn i16_at(bytes: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes(array_at(bytes, offset))
}

fn i32_at(bytes: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes(array_at(bytes, offset))
}

fn f32_at(bytes: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes(array_at(bytes, offset))
}

fn f64_at(bytes: &[u8], offset: usize) -> f64 {
    f64::from_le_bytes(array_at(bytes, offset))
}

/// NUL-terminated C string field.
fn string_at(bytes: &[u8], offset: usize, len: usize) -> String {
    let raw = &bytes[offset..offset + len];
    let end = raw.iter().position(|&c| c == 0).unwrap_or(len);
    String::from_utf8_lossy(&raw[..end]).trim_end().to_string()
}

fn put(bytes: &mut [u8], offset: usize, value: &[u8]) {
    bytes[offset..offset + value.len()].copy_from_slice(value);
}

fn put_string(bytes: &mut [u8], offset: usize, len: usize, value: &str) {
    let raw = value.as_bytes();
    let n = raw.len().min(len);
    bytes[offset..offset + n].copy_from_slice(&raw[..n]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_header() -> RawHeader {
        let mut header = RawHeader {
            file_header_ver: 2.2,
            xdim: 1024,
            ydim: 1,
            datatype: 3,
            num_roi: 1,
            num_frames: 3,
            date: "01Jan2024".into(),
            sw_version: "WinSpec 2.6".into(),
            ..RawHeader::default()
        };
        header.roi_info[0] = RoiBlock {
            startx: 1,
            endx: 1024,
            groupx: 1,
            starty: 1,
            endy: 100,
            groupy: 100,
        };
        header.x_calibration.calib_valid = 1;
        header.x_calibration.polynom_coeff = [400.0, 0.1, 0.0, 0.0, 0.0, 0.0];
        header
    }

    #[test]
    fn test_layout_round_trip() {
        let header = sample_header();
        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(&bytes[4098..4100], &21845i16.to_le_bytes());
        assert_eq!(&bytes[2996..3000], &19_088_743i32.to_le_bytes());

        let parsed = RawHeader::parse(&bytes).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.roi_info[0].width(), 1024);
        assert_eq!(parsed.roi_info[0].height(), 1);
    }

    #[test]
    fn test_read_from_advances_to_data() {
        let mut bytes = sample_header().to_bytes();
        bytes.extend_from_slice(&[0xAB, 0xCD]);
        let mut cursor = Cursor::new(bytes);

        let header = RawHeader::read_from(&mut cursor, true).unwrap();
        assert_eq!(header.num_frames, 3);
        assert_eq!(cursor.position(), HEADER_SIZE as u64);
    }

    #[test]
    fn test_truncated_header() {
        let bytes = sample_header().to_bytes();
        let mut cursor = Cursor::new(&bytes[..4000]);
        let err = RawHeader::read_from(&mut cursor, false).unwrap_err();
        assert!(matches!(err, Error::TruncatedHeader { available: 4000 }));
    }

    #[test]
    fn test_strict_validation() {
        let header = RawHeader {
            lastvalue: 0,
            ..sample_header()
        };
        let bytes = header.to_bytes();

        let err = RawHeader::read_from(&mut Cursor::new(&bytes), true).unwrap_err();
        match err {
            Error::HeaderValidation {
                field,
                expected,
                actual,
            } => {
                assert_eq!(field, "lastvalue");
                assert_eq!(expected, 21845);
                assert_eq!(actual, 0);
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(RawHeader::read_from(&mut Cursor::new(&bytes), false).is_ok());
    }

    #[test]
    fn test_validation_reports_first_field() {
        let header = RawHeader {
            lnoscan: 0,
            winview_id: 0,
            ..sample_header()
        };
        assert!(matches!(
            header.validate(),
            Err(Error::HeaderValidation {
                field: "lnoscan",
                ..
            })
        ));
        assert!(!header.sentinels_valid());
    }

    #[test]
    fn test_format_version() {
        let mut header = sample_header();
        assert_eq!(header.format_version().unwrap(), FormatVersion::Legacy(2.2));
        header.file_header_ver = 3.0;
        assert_eq!(header.format_version().unwrap(), FormatVersion::Xml(3.0));
        header.file_header_ver = 0.0;
        assert!(header.format_version().is_ok());
        header.file_header_ver = f32::NAN;
        assert!(matches!(
            header.format_version(),
            Err(Error::UnsupportedFormat(_))
        ));
        header.file_header_ver = 7.5;
        assert!(header.format_version().is_err());
    }

    #[test]
    fn test_calibration_coefficients() {
        let mut calib = LegacyCalibration {
            polynom_coeff: [1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            ..LegacyCalibration::default()
        };
        assert_eq!(calib.coefficients().len(), 6);
        calib.polynom_order = 2;
        assert_eq!(calib.coefficients(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_binned_roi_extent() {
        let roi = RoiBlock {
            startx: 1,
            endx: 255,
            groupx: 4,
            starty: 11,
            endy: 20,
            groupy: 1,
        };
        assert_eq!(roi.width(), 63);
        assert_eq!(roi.height(), 10);
        assert!(RoiBlock::default().is_empty());

        let inverted = RoiBlock {
            startx: 1,
            endx: 0,
            groupx: 1,
            ..roi
        };
        assert_eq!(inverted.width(), 0);
        assert_eq!(inverted.height(), 10);
    }
}
