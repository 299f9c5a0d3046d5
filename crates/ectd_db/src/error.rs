use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Domain(#[from] ectd_core::Error),

    #[error("Schema asset missing: {0}")]
    MissingSchemaAsset(String),

    #[error("Corrupt row in {table}: {reason}")]
    CorruptRow { table: &'static str, reason: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl Error {
    pub fn is_sequence_conflict(&self) -> bool {
        matches!(self, Error::Domain(ectd_core::Error::SequenceConflict { .. }))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
