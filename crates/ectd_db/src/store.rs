use async_trait::async_trait;
use uuid::Uuid;

use ectd_core::models::{
    AuditEvent, Document, DocumentRegistryEntry, SequenceNumber, SubmissionSequence,
};

use crate::error::Result;

/// Everything a finished build needs persisted, in one unit.
#[derive(Debug, Clone)]
pub struct SequenceRecord {
    /// The sequence the caller based the build on (`None` or `0000` for the first).
    pub base: Option<SequenceNumber>,
    /// The number the build was staged under. Allocation must agree with it.
    pub sequence_number: SequenceNumber,
    pub created_by: String,
    pub directory_path: String,
    pub registry: Vec<DocumentRegistryEntry>,
    pub skipped_count: usize,
}

impl SequenceRecord {
    /// The audit events this record appends: one SEQUENCE_CREATED, then one
    /// DOCUMENT_INCLUDED per registry entry.
    pub fn audit_events(&self) -> Vec<AuditEvent> {
        let mut events = Vec::with_capacity(self.registry.len() + 1);
        events.push(AuditEvent::sequence_created(
            &self.created_by,
            self.sequence_number,
            self.registry.len(),
            self.skipped_count,
            &self.directory_path,
        ));
        for entry in &self.registry {
            events.push(AuditEvent::document_included(&self.created_by, self.sequence_number, entry));
        }
        events
    }
}

/// Storage port used by the sequence builder.
///
/// `record_sequence` is all-or-nothing: allocation, the sequence row, version
/// stamps and audit events either all land or none do.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn last_sequence(&self) -> Result<Option<SequenceNumber>>;

    async fn find_document(&self, id: Uuid) -> Result<Option<Document>>;

    async fn find_documents(&self, ids: &[Uuid]) -> Result<Vec<Document>>;

    async fn record_sequence(&self, record: &SequenceRecord) -> Result<SubmissionSequence>;

    async fn audit_events(&self, sequence: SequenceNumber) -> Result<Vec<AuditEvent>>;
}
