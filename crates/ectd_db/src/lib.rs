pub mod error;
pub mod memory;
pub mod repository;
pub mod schema;
pub mod store;

// Re-export common types for convenience
pub use error::{Error, Result};
pub use memory::MemorySubmissionStore;
pub use repository::PgSubmissionStore;
pub use store::{SequenceRecord, SubmissionStore};
