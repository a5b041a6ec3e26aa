//! spexread-spe: SPE header decoder, XML footer parser and metadata construction.
//!
//! This crate turns the raw bytes of an SPE file into a validated
//! [`SpeMetadata`](spexread_core::SpeMetadata).
//!
//! # Key Components
//!
//! - [`RawHeader`] - The fixed 4100-byte WinView/WinSpec header
//! - [`footer`] - Locating and parsing the LightField XML footer
//! - [`from_struct`] / [`from_xml`] - The two metadata constructors
//!
//! # Decoding
//!
//! 1. Decode the header (optionally checking the legacy sentinels)
//! 2. Resolve the [`FormatVersion`] once
//! 3. Build metadata from the header (v2.x) or from the footer (v3.0)

mod error;
pub mod footer;
pub mod header;
mod legacy;
mod xml;

pub use error::{Error, Result};
pub use footer::{locate_footer, parse_footer, read_footer, TreeNode};
pub use header::{LegacyCalibration, RawHeader, RoiBlock};
pub use legacy::{from_struct, orientation_from_geometric};
pub use xml::from_xml;

use spexread_core::{FormatVersion, SpeMetadata};
use std::io::{Read, Seek};

/// Decodes header and metadata from a whole file held in memory.
///
/// # Errors
/// Propagates header, footer and schema errors.
pub fn decode_metadata(bytes: &[u8], strict: bool) -> Result<(RawHeader, SpeMetadata)> {
    let header = decode_header(bytes, strict)?;
    let metadata = match header.format_version()? {
        FormatVersion::Legacy(_) => from_struct(&header)?,
        FormatVersion::Xml(_) => {
            let text = locate_footer(bytes, header.xml_offset)?;
            let doc = parse_footer(text, header.xml_offset)?;
            from_xml(doc.root_element())?
        }
    };
    Ok((header, metadata))
}

/// Decodes header and metadata from a seekable stream.
///
/// # Errors
/// Propagates I/O, header, footer and schema errors.
pub fn read_metadata<R: Read + Seek>(reader: &mut R, strict: bool) -> Result<(RawHeader, SpeMetadata)> {
    let header = RawHeader::read_from(reader, false)?;
    check_sentinels(&header, strict)?;
    let metadata = match header.format_version()? {
        FormatVersion::Legacy(_) => from_struct(&header)?,
        FormatVersion::Xml(_) => {
            let text = read_footer(reader, header.xml_offset)?;
            let doc = parse_footer(&text, header.xml_offset)?;
            from_xml(doc.root_element())?
        }
    };
    Ok((header, metadata))
}

fn decode_header(bytes: &[u8], strict: bool) -> Result<RawHeader> {
    let header = RawHeader::parse(bytes)?;
    check_sentinels(&header, strict)?;
    Ok(header)
}

fn check_sentinels(header: &RawHeader, strict: bool) -> Result<()> {
    if strict {
        header.validate()
    } else {
        if let Err(e) = header.validate() {
            log::warn!("ignoring header sentinel mismatch: {e}");
        }
        Ok(())
    }
}
