use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncReadExt;

use ectd_core::checksum::{ChecksumAlgorithm, Hasher};
use ectd_core::layout::module_dir;
use ectd_core::models::{DocumentRegistryEntry, EntryOutcome, PlannedDocumentEntry, SkipReason};
use ectd_core::naming::normalize_filename;
use ectd_core::validation::rules_pdf::{inspect_pdf, is_pdf, pdf_findings};

use crate::error::{io_error, Error, Result};
use crate::EctdService;

/// Result of copying a plan into a staging tree.
#[derive(Debug, Default)]
pub struct StagedDocuments {
    pub registry: Vec<DocumentRegistryEntry>,
    pub outcomes: Vec<EntryOutcome>,
}

impl StagedDocuments {
    pub fn skipped_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_included()).count()
    }

    fn skip(&mut self, entry: &PlannedDocumentEntry, reason: SkipReason) {
        self.outcomes.push(EntryOutcome::Skipped {
            document_id: entry.document_id,
            reason,
        });
    }
}

impl EctdService {
    /// Copies every eligible plan entry into `root`, one at a time, in plan order.
    ///
    /// Entries are skipped (and reported) when they carry errors, target an
    /// invalid module, reference a missing document or collide with an
    /// earlier entry's file name. I/O failures abort.
    pub async fn stage_documents(&self, root: &Path, plan: &[PlannedDocumentEntry]) -> Result<StagedDocuments> {
        let mut staged = StagedDocuments::default();
        let mut hrefs: HashSet<String> = HashSet::new();

        for entry in plan {
            // 1. Entries flagged by validation never get near the filesystem
            if entry.has_errors() {
                tracing::debug!(document = %entry.document_id, "skipping entry with validation errors");
                staged.skip(entry, SkipReason::ValidationErrors);
                continue;
            }

            let Some(target_dir) = module_dir(root, &entry.module) else {
                tracing::warn!(document = %entry.document_id, module = %entry.module, "invalid module path");
                staged.skip(entry, SkipReason::InvalidModulePath);
                continue;
            };

            // 2. Resolve the stored document
            let Some(doc) = self.store().find_document(entry.document_id).await? else {
                tracing::warn!(document = %entry.document_id, "document not found, skipping");
                staged.skip(entry, SkipReason::DocumentNotFound);
                continue;
            };

            // 3. CTD file name, unique within the sequence
            let file_name = normalize_filename(&doc.title, &doc.version, &doc.metadata);
            let module = entry.module.trim_end_matches('/');
            let href = format!("{}/{}", module, file_name);
            if !hrefs.insert(href.clone()) {
                tracing::warn!(document = %doc.id, href = %href, "target path already used in this sequence");
                staged.skip(entry, SkipReason::DuplicateTarget);
                continue;
            }

            let source = self.options().resolve_source(&doc.file_path);
            if self.options().pdf_checks && is_pdf(&source) {
                screen_pdf(source.clone(), doc.title.clone(), doc.id).await?;
            }

            // 4. Copy, then hash what actually landed on disk
            tokio::fs::create_dir_all(&target_dir)
                .await
                .map_err(io_error(&target_dir))?;
            let target = target_dir.join(&file_name);
            tokio::fs::copy(&source, &target).await.map_err(io_error(&source))?;
            let checksum = hash_file(self.options().checksum, &target).await?;

            tracing::debug!(document = %doc.id, href = %href, checksum = %checksum, "copied");

            staged.outcomes.push(EntryOutcome::Included {
                document_id: doc.id,
                href: href.clone(),
                checksum: checksum.clone(),
            });
            staged.registry.push(DocumentRegistryEntry {
                document_id: doc.id,
                title: doc.title,
                module: module.to_string(),
                operation: entry.operation,
                href,
                checksum,
                version: doc.version,
            });
        }

        Ok(staged)
    }
}

/// lopdf parses synchronously, so the inspection runs on the blocking pool.
async fn screen_pdf(source: PathBuf, title: String, document_id: uuid::Uuid) -> Result<()> {
    let inspection = tokio::task::spawn_blocking(move || inspect_pdf(&source)).await?;
    let blocking: Vec<String> = pdf_findings(inspection, &title)
        .into_iter()
        .filter(|(severity, _)| severity.is_blocking())
        .map(|(_, message)| message)
        .collect();

    if blocking.is_empty() {
        Ok(())
    } else {
        Err(Error::PdfRejected {
            document_id,
            message: blocking.join("; "),
        })
    }
}

/// Streams the file through the hasher in 8KB chunks.
pub async fn hash_file(algorithm: ChecksumAlgorithm, path: &Path) -> Result<String> {
    let mut file = File::open(path).await.map_err(io_error(path))?;

    let mut hasher = Hasher::new(algorithm);
    let mut buffer = [0; 8192];
    loop {
        let n = file.read(&mut buffer).await.map_err(io_error(path))?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hasher.finalize_hex())
}
