use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;

use ectd_core::checksum::ChecksumAlgorithm;

use crate::BuildOptions;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: Option<String>,
    pub bind_addr: String,
    /// Actor recorded in the audit trail when a request names none.
    pub default_actor: String,
    pub build: BuildOptions,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok(); // Load .env if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let checksum = match var("ECTD_CHECKSUM") {
            Some(raw) => raw
                .parse::<ChecksumAlgorithm>()
                .map_err(|e| anyhow!("ECTD_CHECKSUM: {}", e))?,
            None => ChecksumAlgorithm::default(),
        };

        let pdf_checks = match var("ECTD_PDF_CHECKS") {
            Some(raw) => parse_flag(&raw).with_context(|| "ECTD_PDF_CHECKS must be true or false")?,
            None => false,
        };

        let mut build = BuildOptions {
            checksum,
            pdf_checks,
            ..BuildOptions::default()
        };
        if let Some(root) = var("EXPORT_ROOT") {
            build.export_root = PathBuf::from(root);
        }
        if let Some(root) = var("DOCUMENT_ROOT") {
            build.document_root = PathBuf::from(root);
        }
        if let Some(number) = var("ECTD_APPLICATION_NUMBER") {
            build.regional.application_number = number;
        }
        if let Some(company) = var("ECTD_COMPANY_NAME") {
            build.regional.company_name = company;
        }

        Ok(Config {
            database_url: var("DATABASE_URL"),
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            default_actor: var("ECTD_DEFAULT_ACTOR").unwrap_or_else(|| "system".to_string()),
            build,
        })
    }

    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL must be set")
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("not a boolean: {}", other)),
    }
}
