use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::registry::DocumentRegistryEntry;
use crate::models::sequence::SequenceNumber;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventType {
    SequenceCreated,
    DocumentIncluded,
}

impl AuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventType::SequenceCreated => "SEQUENCE_CREATED",
            AuditEventType::DocumentIncluded => "DOCUMENT_INCLUDED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "SEQUENCE_CREATED" => Some(AuditEventType::SequenceCreated),
            "DOCUMENT_INCLUDED" => Some(AuditEventType::DocumentIncluded),
            _ => None,
        }
    }
}

/// Append-only record of what was submitted, by whom and when.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub event_type: AuditEventType,
    pub user_id: String,
    pub sequence_number: SequenceNumber,
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    pub fn sequence_created(
        actor: &str,
        sequence: SequenceNumber,
        document_count: usize,
        skipped_count: usize,
        directory_path: &str,
    ) -> Self {
        Self {
            event_type: AuditEventType::SequenceCreated,
            user_id: actor.to_string(),
            sequence_number: sequence,
            details: json!({
                "sequence": sequence,
                "documentCount": document_count,
                "skippedCount": skipped_count,
                "path": directory_path,
            }),
            timestamp: Utc::now(),
        }
    }

    pub fn document_included(actor: &str, sequence: SequenceNumber, entry: &DocumentRegistryEntry) -> Self {
        Self {
            event_type: AuditEventType::DocumentIncluded,
            user_id: actor.to_string(),
            sequence_number: sequence,
            details: json!({
                "sequence": sequence,
                "documentId": entry.document_id,
                "title": entry.title,
                "module": entry.module,
                "operation": entry.operation,
                "href": entry.href,
                "checksum": entry.checksum,
                "version": entry.version,
            }),
            timestamp: Utc::now(),
        }
    }
}
