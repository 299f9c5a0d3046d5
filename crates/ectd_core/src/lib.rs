pub mod backbone;
pub mod checksum;
pub mod error;
pub mod layout;
pub mod models;
pub mod naming;
pub mod validation;

pub use error::{Error, Result};

use validation::{ValidationEngine, rules, rules_pdf};

/// Rules that only need the plan and the resolved documents.
pub fn get_standard_validator() -> ValidationEngine {
    ValidationEngine::new()
        .add_rule(rules::ModulePathRule)
        .add_rule(rules::DuplicateDocumentRule)
        .add_rule(rules::DocumentExistsRule)
        .add_rule(rules::LifecycleOperationRule)
}

/// Standard rules plus the PDF screening rule, which opens every source file.
pub fn get_full_validator() -> ValidationEngine {
    get_standard_validator().add_rule(rules_pdf::RuleEctd4_533)
}

/// Rules that can run without a document store.
pub fn get_offline_validator() -> ValidationEngine {
    ValidationEngine::new()
        .add_rule(rules::ModulePathRule)
        .add_rule(rules::DuplicateDocumentRule)
}
