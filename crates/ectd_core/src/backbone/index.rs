use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::backbone::{finish, new_writer, write_leaf, write_text_element, XLINK_NS};
use crate::checksum::ChecksumAlgorithm;
use crate::error::Result;
use crate::models::registry::DocumentRegistryEntry;
use crate::models::sequence::SequenceNumber;

pub const ICH_ECTD_NS: &str = "http://www.ich.org/ectd";
pub const ICH_DTD_VERSION: &str = "3.2";
const ICH_DOCTYPE: &str = r#"ectd:ectd SYSTEM "util/dtd/ich-ectd-3-2.dtd""#;

/// Renders `index.xml`: one flat leaf list covering every registry entry, in
/// registry order.
pub fn render_index_xml(
    sequence: SequenceNumber,
    entries: &[DocumentRegistryEntry],
    algorithm: ChecksumAlgorithm,
) -> Result<String> {
    let mut writer = new_writer();

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::DocType(BytesText::from_escaped(ICH_DOCTYPE)))?;

    let mut root = BytesStart::new("ectd:ectd");
    root.push_attribute(("xmlns:ectd", ICH_ECTD_NS));
    root.push_attribute(("xmlns:xlink", XLINK_NS));
    root.push_attribute(("dtd-version", ICH_DTD_VERSION));
    writer.write_event(Event::Start(root))?;

    write_text_element(&mut writer, "title", &format!("eCTD Submission Sequence {}", sequence))?;

    for (position, entry) in entries.iter().enumerate() {
        write_leaf(&mut writer, position, entry, &entry.href, algorithm)?;
    }

    writer.write_event(Event::End(BytesEnd::new("ectd:ectd")))?;
    finish(writer)
}
