use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::document::Document;
use crate::models::plan::PlannedDocumentEntry;

pub mod rules;
pub mod rules_pdf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    #[serde(rename = "High Error")]
    HighError,
    #[serde(rename = "Medium Error")]
    MediumError,
    Warning,
}

impl Severity {
    /// High errors keep an entry out of the sequence.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Severity::HighError)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::HighError => "High Error",
            Severity::MediumError => "Medium Error",
            Severity::Warning => "Warning",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// The structure of a finding
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub code: String,               // e.g., "PLAN-001"
    pub severity: Severity,
    pub message: String,
    pub entry_index: Option<usize>, // Which plan line failed?
    pub target_id: Option<String>,  // Which document?
}

/// What a rule gets to look at: the plan plus whatever documents resolved.
pub struct PlanSnapshot<'a> {
    pub entries: &'a [PlannedDocumentEntry],
    pub documents: &'a HashMap<Uuid, Document>,
}

// The contract every rule must fulfill
pub trait ValidationRule: Send + Sync {
    fn check(&self, plan: &PlanSnapshot<'_>) -> Vec<ValidationError>;
    fn rule_id(&self) -> &str;
}

// The Engine that holds the registry of all rules
#[derive(Default)]
pub struct ValidationEngine {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ValidationEngine {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add_rule<R: ValidationRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.rule_id()).collect()
    }

    pub fn run(&self, plan: &PlanSnapshot<'_>) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for rule in &self.rules {
            let mut rule_errors = rule.check(plan);
            errors.append(&mut rule_errors);
        }
        errors
    }
}

/// Copies blocking findings onto their plan entries so the annotated plan can
/// be sent straight back to the sequence builder.
pub fn annotate_plan(entries: &[PlannedDocumentEntry], findings: &[ValidationError]) -> Vec<PlannedDocumentEntry> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let mut annotated = entry.clone();
            let blocking: Vec<serde_json::Value> = findings
                .iter()
                .filter(|f| f.entry_index == Some(index) && f.severity.is_blocking())
                .map(|f| serde_json::json!({ "code": f.code, "message": f.message }))
                .collect();
            if !blocking.is_empty() {
                annotated.errors.get_or_insert_with(Vec::new).extend(blocking);
            }
            annotated
        })
        .collect()
}
