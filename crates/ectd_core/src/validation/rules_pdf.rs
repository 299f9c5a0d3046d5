use std::path::Path;

use lopdf::Document as PdfDocument;

use crate::validation::{PlanSnapshot, Severity, ValidationError, ValidationRule};

/// What a structural pass over a PDF found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfInspection {
    Unreadable,
    Parsed { linearized: bool, has_javascript: bool },
}

/// Loads the PDF and scans its object table for a linearization dictionary
/// and for JavaScript (`/JS`, `/JavaScript` keys, or `/S /JavaScript` actions).
pub fn inspect_pdf(path: &Path) -> PdfInspection {
    let pdf = match PdfDocument::load(path) {
        Ok(pdf) => pdf,
        Err(e) => {
            tracing::debug!("lopdf could not parse {}: {}", path.display(), e);
            return PdfInspection::Unreadable;
        }
    };

    let linearized = pdf
        .objects
        .values()
        .any(|obj| obj.as_dict().map_or(false, |dict| dict.has(b"Linearized")));

    let has_javascript = pdf.objects.values().any(|obj| {
        obj.as_dict().map_or(false, |dict| {
            if dict.has(b"JS") || dict.has(b"JavaScript") {
                return true;
            }
            dict.get(b"S")
                .and_then(|s| s.as_name())
                .map_or(false, |name| name == b"JavaScript")
        })
    });

    PdfInspection::Parsed { linearized, has_javascript }
}

/// Turns an inspection into findings for one file.
pub fn pdf_findings(inspection: PdfInspection, label: &str) -> Vec<(Severity, String)> {
    match inspection {
        PdfInspection::Unreadable => vec![(
            Severity::HighError,
            format!("Unable to parse PDF Document '{}'. It may be corrupt or encrypted.", label),
        )],
        PdfInspection::Parsed { linearized, has_javascript } => {
            let mut out = Vec::new();
            if !linearized {
                out.push((
                    Severity::MediumError,
                    format!("PDF Document '{}' is not Linearized (Fast Web View disabled)", label),
                ));
            }
            if has_javascript {
                out.push((
                    Severity::HighError,
                    format!("PDF Document '{}' contains forbidden JavaScript", label),
                ));
            }
            out
        }
    }
}

// =========================================================================
// RULE: US-eCTD4-533
// "PDF files must have Fast Web View enabled and must not contain JavaScript."
// Runs against the stored source file of every planned PDF document.
// =========================================================================
pub struct RuleEctd4_533;

impl RuleEctd4_533 {
    pub const ID: &'static str = "US-eCTD4-533";
}

impl ValidationRule for RuleEctd4_533 {
    fn rule_id(&self) -> &str { Self::ID }

    fn check(&self, plan: &PlanSnapshot<'_>) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for (index, entry) in plan.entries.iter().enumerate() {
            let Some(doc) = plan.documents.get(&entry.document_id) else {
                continue;
            };
            let path = Path::new(&doc.file_path);
            if !is_pdf(path) || !path.exists() {
                continue;
            }

            for (severity, message) in pdf_findings(inspect_pdf(path), &doc.title) {
                errors.push(ValidationError {
                    code: self.rule_id().to_string(),
                    severity,
                    message,
                    entry_index: Some(index),
                    target_id: Some(doc.id.to_string()),
                });
            }
        }
        errors
    }
}

pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Object, Stream};

    fn write_pdf(path: &Path, with_javascript: bool) {
        let mut doc = PdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(dictionary! {}, b"BT ET".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };
        if with_javascript {
            let action_id = doc.add_object(dictionary! {
                "S" => "JavaScript",
                "JS" => Object::string_literal("app.alert('hi')"),
            });
            catalog.set("OpenAction", action_id);
        }
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn garbage_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();
        assert_eq!(inspect_pdf(&path), PdfInspection::Unreadable);

        let findings = pdf_findings(PdfInspection::Unreadable, "broken");
        assert!(findings.iter().any(|(s, _)| s.is_blocking()));
    }

    #[test]
    fn detects_javascript_actions() {
        let dir = tempfile::tempdir().unwrap();
        let clean = dir.path().join("clean.pdf");
        let scripted = dir.path().join("scripted.pdf");
        write_pdf(&clean, false);
        write_pdf(&scripted, true);

        assert_eq!(
            inspect_pdf(&clean),
            PdfInspection::Parsed { linearized: false, has_javascript: false }
        );
        assert!(matches!(
            inspect_pdf(&scripted),
            PdfInspection::Parsed { has_javascript: true, .. }
        ));
    }

    #[test]
    fn unlinearized_pdf_is_not_blocking() {
        let findings = pdf_findings(
            PdfInspection::Parsed { linearized: false, has_javascript: false },
            "cover",
        );
        assert_eq!(findings.len(), 1);
        assert!(!findings[0].0.is_blocking());
    }
}
