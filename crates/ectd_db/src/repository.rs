use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use ectd_core::models::sequence::allocate;
use ectd_core::models::{AuditEvent, AuditEventType, Document, SequenceNumber, SubmissionSequence};

use crate::error::{Error, Result};
use crate::store::{SequenceRecord, SubmissionStore};

// Key for pg_advisory_xact_lock; serializes sequence allocation across builders.
const SEQUENCE_LOCK_KEY: i64 = 0x6543_5444_5345_51;

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: Uuid,
    file_path: String,
    title: String,
    version: String,
    metadata: serde_json::Value,
    last_submitted_version: Option<String>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: row.id,
            file_path: row.file_path,
            title: row.title,
            version: row.version,
            metadata: row.metadata,
            last_submitted_version: row.last_submitted_version,
        }
    }
}

#[derive(Debug, FromRow)]
struct AuditRow {
    event_type: String,
    user_id: String,
    sequence_number: String,
    event_details: serde_json::Value,
    timestamp: DateTime<Utc>,
}

impl TryFrom<AuditRow> for AuditEvent {
    type Error = Error;

    fn try_from(row: AuditRow) -> Result<Self> {
        let event_type = AuditEventType::parse(&row.event_type).ok_or_else(|| Error::CorruptRow {
            table: "audit_trail",
            reason: format!("unknown event type '{}'", row.event_type),
        })?;
        Ok(AuditEvent {
            event_type,
            user_id: row.user_id,
            sequence_number: row.sequence_number.parse()?,
            details: row.event_details,
            timestamp: row.timestamp,
        })
    }
}

/// Postgres-backed store. All SQL is runtime-checked.
#[derive(Clone)]
pub struct PgSubmissionStore {
    pool: PgPool,
}

impl PgSubmissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_unique_violation(err: sqlx::Error, base: Option<SequenceNumber>, last: Option<SequenceNumber>) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => Error::Domain(ectd_core::Error::SequenceConflict {
            base: base.unwrap_or(SequenceNumber::ZERO),
            last,
        }),
        _ => Error::Database(err),
    }
}

#[async_trait]
impl SubmissionStore for PgSubmissionStore {
    async fn last_sequence(&self) -> Result<Option<SequenceNumber>> {
        let raw: Option<String> = sqlx::query_scalar(
            "SELECT sequence_number FROM ind_sequences ORDER BY sequence_number DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(raw.map(|s| s.parse::<SequenceNumber>()).transpose()?)
    }

    async fn find_document(&self, id: Uuid) -> Result<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, file_path, title, version, metadata, last_submitted_version
            FROM documents
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Document::from))
    }

    async fn find_documents(&self, ids: &[Uuid]) -> Result<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, file_path, title, version, metadata, last_submitted_version
            FROM documents
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    /// Allocation, the sequence row, version stamps and audit events share one
    /// transaction. If anything errors, `tx` drops and rolls back.
    async fn record_sequence(&self, record: &SequenceRecord) -> Result<SubmissionSequence> {
        let mut tx = self.pool.begin().await?;

        // 1. Serialize allocators
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(SEQUENCE_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        // 2. Compare the caller's base against what is actually recorded
        let last: Option<String> = sqlx::query_scalar(
            "SELECT sequence_number FROM ind_sequences ORDER BY sequence_number DESC LIMIT 1",
        )
        .fetch_optional(&mut *tx)
        .await?;
        let last: Option<SequenceNumber> = last.map(|s| s.parse()).transpose()?;

        let allocated = allocate(record.base, last)?;
        if allocated != record.sequence_number {
            return Err(Error::Domain(ectd_core::Error::SequenceConflict {
                base: record.base.unwrap_or(SequenceNumber::ZERO),
                last,
            }));
        }

        // 3. The sequence row
        let created_at = Utc::now();
        let document_count = record.registry.len() as i32;
        sqlx::query(
            r#"
            INSERT INTO ind_sequences
            (sequence_number, created_by, document_count, directory_path, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(allocated.to_string())
        .bind(&record.created_by)
        .bind(document_count)
        .bind(&record.directory_path)
        .bind(created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, record.base, last))?;

        // 4. Version stamps
        for entry in &record.registry {
            sqlx::query(
                r#"
                UPDATE documents
                SET last_submitted_version = $2, updated_at = now()
                WHERE id = $1
                "#,
            )
            .bind(entry.document_id)
            .bind(&entry.version)
            .execute(&mut *tx)
            .await?;
        }

        // 5. Audit trail
        for event in record.audit_events() {
            sqlx::query(
                r#"
                INSERT INTO audit_trail
                (event_type, user_id, sequence_number, event_details, timestamp)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(event.event_type.as_str())
            .bind(&event.user_id)
            .bind(event.sequence_number.to_string())
            .bind(&event.details)
            .bind(event.timestamp)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            sequence = %allocated,
            documents = document_count,
            "recorded sequence"
        );

        Ok(SubmissionSequence {
            sequence_number: allocated,
            created_at,
            created_by: record.created_by.clone(),
            document_count: document_count as u32,
            directory_path: record.directory_path.clone(),
        })
    }

    async fn audit_events(&self, sequence: SequenceNumber) -> Result<Vec<AuditEvent>> {
        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT event_type, user_id, sequence_number, event_details, timestamp
            FROM audit_trail
            WHERE sequence_number = $1
            ORDER BY id ASC
            "#,
        )
        .bind(sequence.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AuditEvent::try_from).collect()
    }
}
