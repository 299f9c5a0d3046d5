pub mod audit;
pub mod document;
pub mod plan;
pub mod registry;
pub mod sequence;

pub use audit::{AuditEvent, AuditEventType};
pub use document::Document;
pub use plan::{Operation, PlannedDocumentEntry};
pub use registry::{DocumentRegistryEntry, EntryOutcome, SkipReason};
pub use sequence::{SequenceNumber, SubmissionSequence};
