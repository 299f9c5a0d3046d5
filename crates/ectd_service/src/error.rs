use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use ectd_core::models::SequenceNumber;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Sequence {sequence} already exists at {}", .path.display())]
    TargetExists { sequence: SequenceNumber, path: PathBuf },

    #[error("PDF rejected for document {document_id}: {message}")]
    PdfRejected { document_id: Uuid, message: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Sequence {sequence} was recorded but could not be moved into place; files kept at {}: {source}", .staged.display())]
    Publish {
        sequence: SequenceNumber,
        staged: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Core(#[from] ectd_core::Error),

    #[error(transparent)]
    Store(#[from] ectd_db::Error),
}

impl Error {
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Core(ectd_core::Error::SequenceConflict { .. }) => true,
            Error::Store(e) => e.is_sequence_conflict(),
            Error::TargetExists { .. } => true,
            _ => false,
        }
    }

    pub fn is_invalid_request(&self) -> bool {
        matches!(self, Error::InvalidRequest(_) | Error::Core(ectd_core::Error::InvalidSequence(_)))
    }
}

/// Tags an I/O error with the path it happened on.
pub(crate) fn io_error(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Error {
    let path = path.into();
    move |source| Error::Io { path, source }
}

pub type Result<T> = std::result::Result<T, Error>;
