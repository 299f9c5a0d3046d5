use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use ectd_core::models::EntryOutcome;
use ectd_service::config::Config;
use ectd_service::{parse_base, EctdService};

use super::load_plan;

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Sequence the new one follows ("0000" for the first)
    #[arg(short, long)]
    pub base: String,

    /// JSON plan file
    #[arg(short, long)]
    pub plan: PathBuf,

    /// Actor recorded in the audit trail
    #[arg(long)]
    pub actor: Option<String>,
}

pub async fn execute(service: &EctdService, config: &Config, args: BuildArgs) -> Result<()> {
    let base = parse_base(&args.base)?;
    let plan = load_plan(&args.plan)?;
    let actor = args.actor.as_deref().unwrap_or(&config.default_actor);

    println!("🚀 Building sequence after {} ({} planned documents)...", base, plan.len());

    let summary = service
        .build_sequence(base, &plan, actor)
        .await
        .with_context(|| format!("Failed to build sequence after {}", base))?;

    for entry in &summary.entries {
        match entry {
            EntryOutcome::Included { href, checksum, .. } => println!("   📄 {}  {}", href, checksum),
            EntryOutcome::Skipped { document_id, reason } => {
                println!("   ⏭️  {} skipped ({})", document_id, serde_json::to_string(reason)?.trim_matches('"'))
            }
        }
    }

    println!("✅ Sequence {} written to {}", summary.sequence, summary.path);
    println!("   Included: {} document(s)", summary.document_count);
    Ok(())
}
