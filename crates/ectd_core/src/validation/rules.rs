use std::collections::HashMap;

use uuid::Uuid;

use crate::layout::is_valid_module_path;
use crate::models::plan::Operation;
use crate::validation::{PlanSnapshot, Severity, ValidationError, ValidationRule};

// =========================================================================
// RULE: PLAN-001
// "Target module must be a relative path under m1-m5 or util"
// =========================================================================
pub struct ModulePathRule;

impl ValidationRule for ModulePathRule {
    fn rule_id(&self) -> &str { "PLAN-001" }

    fn check(&self, plan: &PlanSnapshot<'_>) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for (index, entry) in plan.entries.iter().enumerate() {
            if !is_valid_module_path(&entry.module) {
                errors.push(ValidationError {
                    code: self.rule_id().to_string(),
                    severity: Severity::HighError,
                    message: format!("Module path '{}' is not a valid eCTD folder", entry.module),
                    entry_index: Some(index),
                    target_id: Some(entry.document_id.to_string()),
                });
            }
        }
        errors
    }
}

// =========================================================================
// RULE: PLAN-002
// "A document may appear only once per sequence"
// The first occurrence wins; later ones are flagged.
// =========================================================================
pub struct DuplicateDocumentRule;

impl ValidationRule for DuplicateDocumentRule {
    fn rule_id(&self) -> &str { "PLAN-002" }

    fn check(&self, plan: &PlanSnapshot<'_>) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut first_seen: HashMap<Uuid, usize> = HashMap::new();

        for (index, entry) in plan.entries.iter().enumerate() {
            if let Some(first) = first_seen.get(&entry.document_id) {
                errors.push(ValidationError {
                    code: self.rule_id().to_string(),
                    severity: Severity::HighError,
                    message: format!("Document already planned at entry {}", first),
                    entry_index: Some(index),
                    target_id: Some(entry.document_id.to_string()),
                });
            } else {
                first_seen.insert(entry.document_id, index);
            }
        }
        errors
    }
}

// =========================================================================
// RULE: PLAN-003
// "Every planned document must exist in the document store"
// =========================================================================
pub struct DocumentExistsRule;

impl ValidationRule for DocumentExistsRule {
    fn rule_id(&self) -> &str { "PLAN-003" }

    fn check(&self, plan: &PlanSnapshot<'_>) -> Vec<ValidationError> {
        plan.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| !plan.documents.contains_key(&entry.document_id))
            .map(|(index, entry)| ValidationError {
                code: self.rule_id().to_string(),
                severity: Severity::HighError,
                message: format!("Document {} does not exist", entry.document_id),
                entry_index: Some(index),
                target_id: Some(entry.document_id.to_string()),
            })
            .collect()
    }
}

// =========================================================================
// RULE: PLAN-004
// "replace and delete need a previously submitted version"
// A "new" leaf for something already submitted is only a warning.
// =========================================================================
pub struct LifecycleOperationRule;

impl ValidationRule for LifecycleOperationRule {
    fn rule_id(&self) -> &str { "PLAN-004" }

    fn check(&self, plan: &PlanSnapshot<'_>) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for (index, entry) in plan.entries.iter().enumerate() {
            // Missing documents are PLAN-003's business
            let Some(doc) = plan.documents.get(&entry.document_id) else {
                continue;
            };

            let submitted = doc.last_submitted_version.is_some();
            let finding = match entry.operation {
                Operation::Replace | Operation::Delete if !submitted => Some((
                    Severity::HighError,
                    format!("Cannot {} '{}': it has never been submitted", entry.operation, doc.title),
                )),
                Operation::New if submitted => Some((
                    Severity::Warning,
                    format!(
                        "'{}' was already submitted as version {}; consider 'replace'",
                        doc.title,
                        doc.last_submitted_version.as_deref().unwrap_or_default()
                    ),
                )),
                _ => None,
            };

            if let Some((severity, message)) = finding {
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
