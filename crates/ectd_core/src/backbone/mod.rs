//! Backbone XML writers for eCTD 3.2 sequences.
//!
//! Both files are written with `quick_xml::Writer` so element order and
//! attribute order are fixed: downstream viewers and the FDA gateway parse
//! them against the ICH and FDA DTDs.

pub mod index;
pub mod regional;

use std::io::Write;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::checksum::ChecksumAlgorithm;
use crate::error::{Error, Result};
use crate::models::registry::DocumentRegistryEntry;

pub use index::render_index_xml;
pub use regional::{render_us_regional_xml, RegionalInfo};

pub const XLINK_NS: &str = "http://www.w3c.org/1999/xlink";

/// Leaf IDs must be valid XML IDs, so they start with a letter.
pub fn leaf_id(position: usize) -> String {
    format!("leaf-{:04}", position + 1)
}

pub(crate) fn new_writer() -> Writer<Vec<u8>> {
    Writer::new_with_indent(Vec::new(), b' ', 2)
}

pub(crate) fn finish(writer: Writer<Vec<u8>>) -> Result<String> {
    String::from_utf8(writer.into_inner())
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

pub(crate) fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

// <leaf ID operation checksum checksum-type xlink:type xlink:href><title/></leaf>
// `href` is relative to the backbone file being written.
pub(crate) fn write_leaf<W: Write>(
    writer: &mut Writer<W>,
    position: usize,
    entry: &DocumentRegistryEntry,
    href: &str,
    algorithm: ChecksumAlgorithm,
) -> Result<()> {
    let id = leaf_id(position);
    let mut leaf = BytesStart::new("leaf");
    leaf.push_attribute(("ID", id.as_str()));
    leaf.push_attribute(("operation", entry.operation.as_str()));
    leaf.push_attribute(("checksum", entry.checksum.as_str()));
    leaf.push_attribute(("checksum-type", algorithm.as_str()));
    leaf.push_attribute(("xlink:type", "simple"));
    leaf.push_attribute(("xlink:href", href));

    writer.write_event(Event::Start(leaf))?;
    write_text_element(writer, "title", &entry.title)?;
    writer.write_event(Event::End(BytesEnd::new("leaf")))?;
    Ok(())
}
