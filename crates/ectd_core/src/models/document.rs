use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Stored Document
// Owned by the document-management side. The sequence builder reads it and
// only ever writes back `last_submitted_version`.
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub file_path: String,
    pub title: String,
    pub version: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(default)]
    pub last_submitted_version: Option<String>,
}
