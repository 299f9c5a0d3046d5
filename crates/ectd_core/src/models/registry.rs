use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::plan::Operation;

/// A document that made it into the sequence. Built once per build and folded
/// into the backbone XML and the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRegistryEntry {
    pub document_id: Uuid,
    pub title: String,
    pub module: String,
    pub operation: Operation,
    // Relative to the sequence root, always '/' separated
    pub href: String,
    pub checksum: String,
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ValidationErrors,
    InvalidModulePath,
    DocumentNotFound,
    DuplicateTarget,
}

/// What happened to each planned entry, in plan order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryOutcome {
    #[serde(rename_all = "camelCase")]
    Included {
        document_id: Uuid,
        href: String,
        checksum: String,
    },
    #[serde(rename_all = "camelCase")]
    Skipped {
        document_id: Uuid,
        reason: SkipReason,
    },
}

impl EntryOutcome {
    pub fn is_included(&self) -> bool {
        matches!(self, EntryOutcome::Included { .. })
    }
}
