//! XML footer location and tree access.
//!
//! LightField appends the experiment description as XML after the data
//! block and records its absolute offset in the header. The footer runs from
//! that offset to the end of the file.

use crate::{Error, Result};
use std::io::{Read, Seek, SeekFrom};

/// Minimal element lookup used to build metadata from a footer.
///
/// Any XML tree can back the schema construction as long as it offers
/// element names, attributes, text and child elements.
pub trait TreeNode: Sized + Copy {
    /// Local element name (namespace stripped).
    fn tag(&self) -> &str;

    /// Attribute value by local name.
    fn attr(&self, name: &str) -> Option<&str>;

    /// Concatenated text content directly under this element.
    fn text(&self) -> Option<&str>;

    /// Child elements in document order.
    fn child_elements(&self) -> Vec<Self>;

    /// First child element named `name`.
    fn child(&self, name: &str) -> Option<Self> {
        self.child_elements().into_iter().find(|c| c.tag() == name)
    }

    /// All child elements named `name`.
    fn children_named(&self, name: &str) -> Vec<Self> {
        self.child_elements()
            .into_iter()
            .filter(|c| c.tag() == name)
            .collect()
    }

    /// Follows a path of child element names.
    fn find(&self, path: &[&str]) -> Option<Self> {
        path.iter().try_fold(*self, |node, name| node.child(name))
    }
}

impl<'a, 'input> TreeNode for roxmltree::Node<'a, 'input> {
    fn tag(&self) -> &str {
        self.tag_name().name()
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attribute(name)
    }

    fn text(&self) -> Option<&str> {
        roxmltree::Node::text(self)
    }

    fn child_elements(&self) -> Vec<Self> {
        self.children().filter(roxmltree::Node::is_element).collect()
    }
}

/// Returns the footer text starting at `offset` in `bytes`.
///
/// # Errors
/// Returns [`Error::FooterParse`] if the offset lies outside the file or the
/// footer is empty or not UTF-8.
pub fn locate_footer(bytes: &[u8], offset: u64) -> Result<&str> {
    let start = usize::try_from(offset)
        .ok()
        .filter(|&s| s < bytes.len())
        .ok_or_else(|| Error::FooterParse {
            offset,
            message: format!("offset is past the end of the file ({} bytes)", bytes.len()),
        })?;
    footer_text(&bytes[start..], offset)
}

/// Seeks to `offset` and reads the footer to the end of the stream.
///
/// # Errors
/// Returns [`Error::FooterParse`] for an empty or non-UTF-8 footer, or an
/// I/O error from the underlying reader.
pub fn read_footer<R: Read + Seek>(reader: &mut R, offset: u64) -> Result<String> {
    reader.seek(SeekFrom::Start(offset))?;
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    footer_text(&buf, offset).map(str::to_owned)
}

fn footer_text(raw: &[u8], offset: u64) -> Result<&str> {
    let text = std::str::from_utf8(raw).map_err(|e| Error::FooterParse {
        offset,
        message: e.to_string(),
    })?;
    let text = text
        .trim_start_matches('\u{feff}')
        .trim_end_matches(|c: char| c == '\0' || c.is_whitespace());
    if text.is_empty() {
        return Err(Error::FooterParse {
            offset,
            message: "footer is empty".into(),
        });
    }
    log::trace!("footer at offset {offset}: {} bytes", text.len());
    Ok(text)
}

/// Parses footer text into an XML document.
///
/// # Errors
/// Returns [`Error::FooterParse`] if the text is not well-formed XML.
pub fn parse_footer(text: &str, offset: u64) -> Result<roxmltree::Document<'_>> {
    roxmltree::Document::parse(text).map_err(|e| Error::FooterParse {
        offset,
        message: e.to_string(),
    })
}
