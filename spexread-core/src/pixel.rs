//! Sample types for pixel data and tracked per-frame values.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pixel sample type of the data block.
///
/// Names follow the LightField `pixelFormat` attribute; the legacy header
/// stores the same information as a small integer code in `datatype`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PixelFormat {
    /// Unsigned 8-bit (legacy code 6).
    MonochromeUnsigned8,
    /// Unsigned 16-bit (legacy code 3, LightField default).
    MonochromeUnsigned16,
    /// Unsigned 32-bit (legacy code 8).
    MonochromeUnsigned32,
    /// Signed 16-bit (legacy code 2).
    MonochromeSigned16,
    /// Signed 32-bit (legacy code 1).
    MonochromeSigned32,
    /// IEEE single precision (legacy code 0).
    MonochromeFloating32,
    /// IEEE double precision (legacy code 5).
    MonochromeFloating64,
}

impl PixelFormat {
    /// Size of a single sample in bytes.
    #[inline]
    #[must_use]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::MonochromeUnsigned8 => 1,
            PixelFormat::MonochromeUnsigned16 | PixelFormat::MonochromeSigned16 => 2,
            PixelFormat::MonochromeUnsigned32
            | PixelFormat::MonochromeSigned32
            | PixelFormat::MonochromeFloating32 => 4,
            PixelFormat::MonochromeFloating64 => 8,
        }
    }

    /// Maps the legacy header `datatype` code.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedPixelFormat`] for codes WinSpec never wrote.
    pub fn from_legacy_code(code: i16) -> Result<Self> {
        match code {
            0 => Ok(PixelFormat::MonochromeFloating32),
            1 => Ok(PixelFormat::MonochromeSigned32),
            2 => Ok(PixelFormat::MonochromeSigned16),
            3 => Ok(PixelFormat::MonochromeUnsigned16),
            5 => Ok(PixelFormat::MonochromeFloating64),
            6 => Ok(PixelFormat::MonochromeUnsigned8),
            8 => Ok(PixelFormat::MonochromeUnsigned32),
            other => Err(Error::UnsupportedPixelFormat(format!("legacy datatype {other}"))),
        }
    }

    /// Legacy `datatype` code for this format.
    #[must_use]
    pub fn legacy_code(self) -> i16 {
        match self {
            PixelFormat::MonochromeFloating32 => 0,
            PixelFormat::MonochromeSigned32 => 1,
            PixelFormat::MonochromeSigned16 => 2,
            PixelFormat::MonochromeUnsigned16 => 3,
            PixelFormat::MonochromeFloating64 => 5,
            PixelFormat::MonochromeUnsigned8 => 6,
            PixelFormat::MonochromeUnsigned32 => 8,
        }
    }

    /// The LightField name of this format.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PixelFormat::MonochromeUnsigned8 => "MonochromeUnsigned8",
            PixelFormat::MonochromeUnsigned16 => "MonochromeUnsigned16",
            PixelFormat::MonochromeUnsigned32 => "MonochromeUnsigned32",
            PixelFormat::MonochromeSigned16 => "MonochromeSigned16",
            PixelFormat::MonochromeSigned32 => "MonochromeSigned32",
            PixelFormat::MonochromeFloating32 => "MonochromeFloating32",
            PixelFormat::MonochromeFloating64 => "MonochromeFloating64",
        }
    }
}

impl std::str::FromStr for PixelFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MonochromeUnsigned8" => Ok(PixelFormat::MonochromeUnsigned8),
            "MonochromeUnsigned16" => Ok(PixelFormat::MonochromeUnsigned16),
            "MonochromeUnsigned32" => Ok(PixelFormat::MonochromeUnsigned32),
            "MonochromeSigned16" => Ok(PixelFormat::MonochromeSigned16),
            "MonochromeSigned32" => Ok(PixelFormat::MonochromeSigned32),
            "MonochromeFloating32" => Ok(PixelFormat::MonochromeFloating32),
            "MonochromeFloating64" => Ok(PixelFormat::MonochromeFloating64),
            other => Err(Error::UnsupportedPixelFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Binary type of a tracked per-frame value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ValueType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Single,
    Double,
}

impl ValueType {
    /// Width of the value in bytes.
    #[must_use]
    pub fn size(self) -> usize {
        match self {
            ValueType::Int8 | ValueType::UInt8 => 1,
            ValueType::Int16 | ValueType::UInt16 => 2,
            ValueType::Int32 | ValueType::UInt32 | ValueType::Single => 4,
            ValueType::Int64 | ValueType::UInt64 | ValueType::Double => 8,
        }
    }

    /// Width of the value in bits, as declared by `bitDepth`.
    #[must_use]
    pub fn bit_depth(self) -> u32 {
        self.size() as u32 * 8
    }

    /// Decodes one little-endian value into `f64`.
    ///
    /// `bytes` must hold at least [`ValueType::size`] bytes; extra bytes are ignored.
    /// Returns `None` when the slice is too short.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn decode_le(self, bytes: &[u8]) -> Option<f64> {
        let raw = bytes.get(..self.size())?;
        let mut buf = [0u8; 8];
        buf[..raw.len()].copy_from_slice(raw);
        let value = match self {
            ValueType::Int8 => f64::from(i8::from_le_bytes([buf[0]])),
            ValueType::Int16 => f64::from(i16::from_le_bytes([buf[0], buf[1]])),
            ValueType::Int32 => f64::from(i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])),
            ValueType::Int64 => i64::from_le_bytes(buf) as f64,
            ValueType::UInt8 => f64::from(buf[0]),
            ValueType::UInt16 => f64::from(u16::from_le_bytes([buf[0], buf[1]])),
            ValueType::UInt32 => f64::from(u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])),
            ValueType::UInt64 => u64::from_le_bytes(buf) as f64,
            ValueType::Single => f64::from(f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])),
            ValueType::Double => f64::from_le_bytes(buf),
        };
        Some(value)
    }
}

impl std::str::FromStr for ValueType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Int8" | "SByte" => Ok(ValueType::Int8),
            "Int16" => Ok(ValueType::Int16),
            "Int32" => Ok(ValueType::Int32),
            "Int64" => Ok(ValueType::Int64),
            "UInt8" | "Byte" => Ok(ValueType::UInt8),
            "UInt16" => Ok(ValueType::UInt16),
            "UInt32" => Ok(ValueType::UInt32),
            "UInt64" => Ok(ValueType::UInt64),
            "Single" | "Float" => Ok(ValueType::Single),
            "Double" => Ok(ValueType::Double),
            other => Err(Error::UnsupportedValueType(other.to_string())),
        }
    }
}
