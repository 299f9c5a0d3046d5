use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use ectd_core::models::{Document, PlannedDocumentEntry};
use ectd_core::validation::{annotate_plan, PlanSnapshot, ValidationEngine, ValidationError};
use ectd_core::{get_full_validator, get_offline_validator, get_standard_validator};

use crate::error::Result;
use crate::EctdService;

/// Findings for a plan, plus the plan with blocking findings copied into
/// each entry's `errors` list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanValidation {
    pub findings: Vec<ValidationError>,
    pub plan: Vec<PlannedDocumentEntry>,
    pub blocking: usize,
}

impl PlanValidation {
    fn from_findings(entries: &[PlannedDocumentEntry], findings: Vec<ValidationError>) -> Self {
        let blocking = findings.iter().filter(|f| f.severity.is_blocking()).count();
        let plan = annotate_plan(entries, &findings);
        Self { findings, plan, blocking }
    }

    pub fn is_clean(&self) -> bool {
        self.blocking == 0
    }
}

impl EctdService {
    /// Runs the plan rules against the documents the store knows about.
    pub async fn validate_plan(&self, entries: &[PlannedDocumentEntry]) -> Result<PlanValidation> {
        let ids: Vec<Uuid> = entries.iter().map(|e| e.document_id).collect();
        let documents: HashMap<Uuid, Document> = self
            .store()
            .find_documents(&ids)
            .await?
            .into_iter()
            .map(|mut doc| {
                doc.file_path = self.options().resolve_source(&doc.file_path).to_string_lossy().into_owned();
                (doc.id, doc)
            })
            .collect();

        let engine = if self.options().pdf_checks {
            get_full_validator()
        } else {
            get_standard_validator()
        };

        Ok(run_engine(&engine, entries, &documents))
    }
}

/// Checks what can be checked without a document store: module paths and
/// duplicate entries.
pub fn validate_offline(entries: &[PlannedDocumentEntry]) -> PlanValidation {
    run_engine(&get_offline_validator(), entries, &HashMap::new())
}

fn run_engine(
    engine: &ValidationEngine,
    entries: &[PlannedDocumentEntry],
    documents: &HashMap<Uuid, Document>,
) -> PlanValidation {
    let snapshot = PlanSnapshot { entries, documents };
    let findings = engine.run(&snapshot);
    tracing::debug!(rules = ?engine.rule_ids(), findings = findings.len(), "plan validated");
    PlanValidation::from_findings(entries, findings)
}
