pub mod build;
pub mod last_sequence;
pub mod rebuild;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use ectd_core::models::PlannedDocumentEntry;
use ectd_db::PgSubmissionStore;
use ectd_service::config::Config;
use ectd_service::EctdService;

pub async fn connect(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(config.require_database_url()?)
        .await
        .context("Failed to connect to database")
}

pub async fn pg_service(config: &Config) -> Result<EctdService> {
    let pool = connect(config).await?;
    Ok(EctdService::new(Arc::new(PgSubmissionStore::new(pool)), config.build.clone()))
}

/// A plan file is either a bare array of entries or `{ "plan": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PlanFile {
    Entries(Vec<PlannedDocumentEntry>),
    Wrapped { plan: Vec<PlannedDocumentEntry> },
}

pub fn load_plan(path: &Path) -> Result<Vec<PlannedDocumentEntry>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan {}", path.display()))?;
    let file: PlanFile = serde_json::from_str(&raw)
        .with_context(|| format!("Plan {} is not a valid plan document", path.display()))?;
    Ok(match file {
        PlanFile::Entries(entries) => entries,
        PlanFile::Wrapped { plan } => plan,
    })
}
