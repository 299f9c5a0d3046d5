pub mod config;
pub mod documents;
pub mod error;
pub mod export;
pub mod submission;
pub mod validation;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ectd_core::backbone::RegionalInfo;
use ectd_core::checksum::ChecksumAlgorithm;
use ectd_core::models::{AuditEvent, SequenceNumber};
use ectd_db::SubmissionStore;

pub use error::{Error, Result};
pub use submission::{parse_base, SequenceSummary};
pub use validation::PlanValidation;

/// Knobs for a sequence build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Finished sequences land in `<export_root>/<sequence>`.
    pub export_root: PathBuf,
    /// Relative document file paths are resolved against this.
    pub document_root: PathBuf,
    pub checksum: ChecksumAlgorithm,
    /// Screen PDF sources for JavaScript before copying them.
    pub pdf_checks: bool,
    pub regional: RegionalInfo,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            export_root: PathBuf::from("exports/ectd"),
            document_root: PathBuf::from("."),
            checksum: ChecksumAlgorithm::default(),
            pdf_checks: false,
            regional: RegionalInfo::default(),
        }
    }
}

impl BuildOptions {
    pub fn resolve_source(&self, stored: &str) -> PathBuf {
        let path = Path::new(stored);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.document_root.join(path)
        }
    }
}

#[derive(Clone)]
pub struct EctdService {
    store: Arc<dyn SubmissionStore>,
    options: Arc<BuildOptions>,
}

impl EctdService {
    pub fn new(store: Arc<dyn SubmissionStore>, options: BuildOptions) -> Self {
        Self {
            store,
            options: Arc::new(options),
        }
    }

    pub fn store(&self) -> &Arc<dyn SubmissionStore> {
        &self.store
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// The most recent sequence, or `0000` when nothing has been submitted.
    pub async fn last_sequence(&self) -> Result<SequenceNumber> {
        Ok(self.store.last_sequence().await?.unwrap_or(SequenceNumber::ZERO))
    }

    pub async fn audit_trail(&self, sequence: SequenceNumber) -> Result<Vec<AuditEvent>> {
        Ok(self.store.audit_events(sequence).await?)
    }
}
