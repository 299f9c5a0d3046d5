use std::path::Path;

use serde::Serialize;

use ectd_core::layout::create_skeleton;
use ectd_core::models::sequence::allocate;
use ectd_core::models::{EntryOutcome, PlannedDocumentEntry, SequenceNumber};
use ectd_db::SequenceRecord;

use crate::error::{io_error, Error, Result};
use crate::export::write_backbone;
use crate::EctdService;

/// What a finished build reports back.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceSummary {
    pub sequence: SequenceNumber,
    pub document_count: usize,
    pub path: String,
    pub entries: Vec<EntryOutcome>,
}

/// Parses a caller-supplied base sequence.
pub fn parse_base(raw: &str) -> Result<SequenceNumber> {
    Ok(raw.parse::<SequenceNumber>()?)
}

impl EctdService {
    /// Builds the sequence that follows `base` from `plan`.
    ///
    /// Files are staged under the export root first. The database records the
    /// sequence, version stamps and audit trail in one transaction, and only
    /// then is the staged tree renamed to `<export_root>/<sequence>`. A failure
    /// before the commit leaves neither files nor rows behind.
    pub async fn build_sequence(
        &self,
        base: SequenceNumber,
        plan: &[PlannedDocumentEntry],
        actor: &str,
    ) -> Result<SequenceSummary> {
        // 1. Claim a number (re-checked under lock at commit)
        let last = self.store().last_sequence().await?;
        let sequence = allocate(Some(base), last)?;

        let export_root = &self.options().export_root;
        let target = export_root.join(sequence.to_string());
        if tokio::fs::try_exists(&target).await.map_err(io_error(&target))? {
            return Err(Error::TargetExists { sequence, path: target });
        }

        tracing::info!(%base, %sequence, entries = plan.len(), actor, "building sequence");

        // 2. Stage
        tokio::fs::create_dir_all(export_root)
            .await
            .map_err(io_error(export_root))?;
        let staging = tempfile::Builder::new()
            .prefix(&format!(".staging-{}-", sequence))
            .tempdir_in(export_root)
            .map_err(io_error(export_root))?;

        let skeleton_root = staging.path().to_path_buf();
        tokio::task::spawn_blocking(move || create_skeleton(&skeleton_root))
            .await?
            .map_err(io_error(staging.path()))?;
        let staged = self.stage_documents(staging.path(), plan).await?;
        let index_checksum = write_backbone(staging.path(), sequence, &staged.registry, self.options()).await?;

        // 3. Commit
        let record = SequenceRecord {
            base: Some(base),
            sequence_number: sequence,
            created_by: actor.to_string(),
            directory_path: display_path(&target),
            registry: staged.registry.clone(),
            skipped_count: staged.skipped_count(),
        };
        self.store().record_sequence(&record).await?;

        // 4. Publish
        let staged_path = staging.keep();
        tokio::fs::rename(&staged_path, &target)
            .await
            .map_err(|source| Error::Publish {
                sequence,
                staged: staged_path.clone(),
                source,
            })?;

        tracing::info!(
            %sequence,
            included = staged.registry.len(),
            skipped = record.skipped_count,
            index_checksum = %index_checksum,
            "sequence published"
        );

        Ok(SequenceSummary {
            sequence,
            document_count: staged.registry.len(),
            path: record.directory_path,
            entries: staged.outcomes,
        })
    }
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
