use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Leaf lifecycle operation
// Serialized lowercase, matching the `operation` attribute of a backbone leaf.
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    New,
    Replace,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::New => "new",
            Operation::Replace => "replace",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a submission plan, as sent by the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlannedDocumentEntry {
    pub document_id: Uuid,

    // Target folder inside the sequence, e.g. "m1/us" or "m2/25-clin-over"
    pub module: String,

    pub operation: Operation,

    // Findings attached by a previous validation pass. Free-form on the wire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<serde_json::Value>>,
}

impl PlannedDocumentEntry {
    pub fn new(document_id: Uuid, module: impl Into<String>, operation: Operation) -> Self {
        Self {
            document_id,
            module: module.into(),
            operation,
            errors: None,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().is_some_and(|e| !e.is_empty())
    }
}
