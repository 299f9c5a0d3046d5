/// Longest title stem kept in a normalized filename.
pub const MAX_STEM_LEN: usize = 32;

const DEFAULT_STEM: &str = "document";
const DEFAULT_EXTENSION: &str = "pdf";
const DEFAULT_VERSION: &str = "1";

/// Maps a document title and version to a CTD-compliant file name:
/// `<alphanumeric title prefix>-v<version>.<ext>`.
///
/// The extension is `pdf` unless the metadata carries a `fileExtension`.
pub fn normalize_filename(title: &str, version: &str, metadata: &serde_json::Value) -> String {
    let stem: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(MAX_STEM_LEN)
        .collect();
    let stem = if stem.is_empty() { DEFAULT_STEM.to_string() } else { stem };

    let version: String = version
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
        .collect();
    let version = version.trim_matches('.');
    let version = if version.is_empty() { DEFAULT_VERSION } else { version };

    format!("{}-v{}.{}", stem, version, extension(metadata))
}

fn extension(metadata: &serde_json::Value) -> String {
    let ext: String = metadata
        .get("fileExtension")
        .and_then(serde_json::Value::as_str)
        .unwrap_or(DEFAULT_EXTENSION)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();

    if ext.is_empty() {
        DEFAULT_EXTENSION.to_string()
    } else {
        ext
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn is_ctd_name(name: &str, version: &str) -> bool {
        let Some(stem) = name.strip_suffix(&format!("-v{}.pdf", version)) else {
            return false;
        };
        (1..=MAX_STEM_LEN).contains(&stem.len()) && stem.chars().all(|c| c.is_ascii_alphanumeric())
    }

    #[test]
    fn strips_punctuation_and_whitespace() {
        let name = normalize_filename("Clinical Summary Report!", "2", &json!({}));
        assert_eq!(name, "ClinicalSummaryReport-v2.pdf");
        assert!(is_ctd_name(&name, "2"));
    }

    #[test]
    fn truncates_long_titles() {
        let title = "Integrated Summary of Safety and Effectiveness for Device X";
        let name = normalize_filename(title, "10", &json!(null));
        assert!(is_ctd_name(&name, "10"));
        assert_eq!(name.len(), MAX_STEM_LEN + "-v10.pdf".len());
    }

    #[test]
    fn falls_back_for_empty_parts() {
        assert_eq!(normalize_filename("!!!", "", &json!({})), "document-v1.pdf");
        assert_eq!(normalize_filename("Label", "1.2/rc", &json!({})), "Label-v1.2rc.pdf");
    }

    #[test]
    fn metadata_can_override_extension() {
        let name = normalize_filename("Define XML", "3", &json!({"fileExtension": ".XML"}));
        assert_eq!(name, "DefineXML-v3.xml");
    }
}
