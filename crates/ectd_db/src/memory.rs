use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use ectd_core::models::sequence::allocate;
use ectd_core::models::{AuditEvent, Document, SequenceNumber, SubmissionSequence};

use crate::error::{Error, Result};
use crate::store::{SequenceRecord, SubmissionStore};

#[derive(Default)]
struct MemoryState {
    documents: HashMap<Uuid, Document>,
    sequences: Vec<SubmissionSequence>,
    audit_trail: Vec<AuditEvent>,
}

/// In-process store with the same all-or-nothing contract as Postgres.
/// Used by tests and offline runs.
#[derive(Default)]
pub struct MemorySubmissionStore {
    state: Mutex<MemoryState>,
    fail_writes: AtomicBool,
}

impl MemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_document(&self, document: Document) {
        self.state.lock().await.documents.insert(document.id, document);
    }

    pub async fn document(&self, id: Uuid) -> Option<Document> {
        self.state.lock().await.documents.get(&id).cloned()
    }

    pub async fn sequences(&self) -> Vec<SubmissionSequence> {
        self.state.lock().await.sequences.clone()
    }

    pub async fn audit_trail(&self) -> Vec<AuditEvent> {
        self.state.lock().await.audit_trail.clone()
    }

    /// Makes every following `record_sequence` fail, as a dropped connection would.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SubmissionStore for MemorySubmissionStore {
    async fn last_sequence(&self) -> Result<Option<SequenceNumber>> {
        let state = self.state.lock().await;
        Ok(state.sequences.iter().map(|s| s.sequence_number).max())
    }

    async fn find_document(&self, id: Uuid) -> Result<Option<Document>> {
        Ok(self.state.lock().await.documents.get(&id).cloned())
    }

    async fn find_documents(&self, ids: &[Uuid]) -> Result<Vec<Document>> {
        let state = self.state.lock().await;
        Ok(ids.iter().filter_map(|id| state.documents.get(id).cloned()).collect())
    }

    async fn record_sequence(&self, record: &SequenceRecord) -> Result<SubmissionSequence> {
        // The lock is held for the whole write, like the advisory lock in Postgres
        let mut state = self.state.lock().await;

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Unavailable("writes disabled".to_string()));
        }

        let last = state.sequences.iter().map(|s| s.sequence_number).max();
        let allocated = allocate(record.base, last)?;
        if allocated != record.sequence_number {
            return Err(Error::Domain(ectd_core::Error::SequenceConflict {
                base: record.base.unwrap_or(SequenceNumber::ZERO),
                last,
            }));
        }

        let sequence = SubmissionSequence {
            sequence_number: allocated,
            created_at: Utc::now(),
            created_by: record.created_by.clone(),
            document_count: record.registry.len() as u32,
            directory_path: record.directory_path.clone(),
        };

        for entry in &record.registry {
            if let Some(doc) = state.documents.get_mut(&entry.document_id) {
                doc.last_submitted_version = Some(entry.version.clone());
            }
        }
        state.audit_trail.extend(record.audit_events());
        state.sequences.push(sequence.clone());

        Ok(sequence)
    }

    async fn audit_events(&self, sequence: SequenceNumber) -> Result<Vec<AuditEvent>> {
        let state = self.state.lock().await;
        Ok(state
            .audit_trail
            .iter()
            .filter(|e| e.sequence_number == sequence)
            .cloned()
            .collect())
    }
}
