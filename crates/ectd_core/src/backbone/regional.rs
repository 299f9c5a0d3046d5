use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::{Deserialize, Serialize};

use crate::backbone::{finish, new_writer, write_leaf, write_text_element, XLINK_NS};
use crate::checksum::ChecksumAlgorithm;
use crate::error::Result;
use crate::layout::{is_module_one, US_REGIONAL_DIR};
use crate::models::registry::DocumentRegistryEntry;
use crate::models::sequence::SequenceNumber;

pub const FDA_REGIONAL_NS: &str = "http://www.ich.org/fda";
pub const FDA_DTD_VERSION: &str = "3.3";
const FDA_DOCTYPE: &str = r#"fda-regional:fda-regional SYSTEM "../../util/dtd/us-regional-v3-3.dtd""#;

/// Rewrites a sequence-relative href so it resolves from `m1/us/`, where the
/// regional backbone lives.
pub fn regional_href(href: &str) -> String {
    match href.strip_prefix(US_REGIONAL_DIR).and_then(|rest| rest.strip_prefix('/')) {
        Some(local) => local.to_string(),
        None => format!("../../{}", href),
    }
}

/// Administrative block of the US regional backbone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalInfo {
    pub application_number: String,
    pub application_type: String,
    pub submission_type: String,
    pub company_name: String,
}

impl Default for RegionalInfo {
    fn default() -> Self {
        Self {
            application_number: "000000".to_string(),
            application_type: "ind".to_string(),
            submission_type: "original".to_string(),
            company_name: String::new(),
        }
    }
}

/// Renders `m1/us/us-regional.xml`. Only Module 1 entries become leaves; with
/// none the `m1-regional` index is empty but the document stays well formed.
pub fn render_us_regional_xml(
    sequence: SequenceNumber,
    entries: &[DocumentRegistryEntry],
    info: &RegionalInfo,
    algorithm: ChecksumAlgorithm,
) -> Result<String> {
    let mut writer = new_writer();

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::DocType(BytesText::from_escaped(FDA_DOCTYPE)))?;

    let mut root = BytesStart::new("fda-regional:fda-regional");
    root.push_attribute(("xmlns:fda-regional", FDA_REGIONAL_NS));
    root.push_attribute(("xmlns:xlink", XLINK_NS));
    root.push_attribute(("dtd-version", FDA_DTD_VERSION));
    root.push_attribute(("xml:lang", "en"));
    writer.write_event(Event::Start(root))?;

    // <admin>
    writer.write_event(Event::Start(BytesStart::new("admin")))?;

    writer.write_event(Event::Start(BytesStart::new("applicant-info")))?;
    write_text_element(&mut writer, "id", &info.application_number)?;
    write_text_element(&mut writer, "company-name", &info.company_name)?;
    writer.write_event(Event::End(BytesEnd::new("applicant-info")))?;

    writer.write_event(Event::Start(BytesStart::new("application-set")))?;
    let mut application = BytesStart::new("application");
    application.push_attribute(("application-containing-files", "true"));
    writer.write_event(Event::Start(application))?;

    writer.write_event(Event::Start(BytesStart::new("application-information")))?;
    let mut number = BytesStart::new("application-number");
    number.push_attribute(("application-type", info.application_type.as_str()));
    writer.write_event(Event::Start(number))?;
    writer.write_event(Event::Text(BytesText::new(&info.application_number)))?;
    writer.write_event(Event::End(BytesEnd::new("application-number")))?;
    writer.write_event(Event::End(BytesEnd::new("application-information")))?;

    writer.write_event(Event::Start(BytesStart::new("submission-information")))?;
    let mut submission_id = BytesStart::new("submission-id");
    submission_id.push_attribute(("submission-type", info.submission_type.as_str()));
    writer.write_event(Event::Start(submission_id))?;
    writer.write_event(Event::Text(BytesText::new(&info.application_number)))?;
    writer.write_event(Event::End(BytesEnd::new("submission-id")))?;
    write_text_element(&mut writer, "sequence-number", &sequence.to_string())?;
    writer.write_event(Event::End(BytesEnd::new("submission-information")))?;

    writer.write_event(Event::End(BytesEnd::new("application")))?;
    writer.write_event(Event::End(BytesEnd::new("application-set")))?;
    writer.write_event(Event::End(BytesEnd::new("admin")))?;

    // <m1-regional>
    writer.write_event(Event::Start(BytesStart::new("m1-regional")))?;
    let module_one = entries.iter().filter(|e| is_module_one(&e.module));
    for (position, entry) in module_one.enumerate() {
        write_leaf(&mut writer, position, entry, &regional_href(&entry.href), algorithm)?;
    }
    writer.write_event(Event::End(BytesEnd::new("m1-regional")))?;

    writer.write_event(Event::End(BytesEnd::new("fda-regional:fda-regional")))?;
    finish(writer)
}
