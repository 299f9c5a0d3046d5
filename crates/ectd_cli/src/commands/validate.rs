use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use ectd_service::validation::validate_offline;
use ectd_service::EctdService;

use super::load_plan;

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// JSON plan file to check
    #[arg(short, long)]
    pub plan: PathBuf,

    /// Write the plan, with blocking findings attached to each entry, here
    #[arg(long)]
    pub annotated: Option<PathBuf>,
}

pub async fn execute(service: Option<&EctdService>, args: ValidateArgs) -> Result<()> {
    println!("🔍 Validating: {:?}", args.plan);

    let plan = load_plan(&args.plan)?;
    let result = match service {
        Some(service) => service.validate_plan(&plan).await?,
        None => {
            println!("ℹ️  DATABASE_URL not set; checking module paths and duplicates only.");
            validate_offline(&plan)
        }
    };

    if let Some(out) = &args.annotated {
        let json = serde_json::to_string_pretty(&result.plan)?;
        std::fs::write(out, json).with_context(|| format!("Failed to write {}", out.display()))?;
    }

    if result.findings.is_empty() {
        println!("🎉 VALIDATION PASSED!");
        println!("No findings. This plan is ready to build.");
        return Ok(());
    }

    println!("⚠️  Found {} finding(s).", result.findings.len());
    println!("{:-<50}", "-");
    for finding in &result.findings {
        let icon = if finding.severity.is_blocking() { "🛑" } else { "⚠️" };
        let line = finding.entry_index.map(|i| format!(" entry {}", i)).unwrap_or_default();
        println!("{} [{}]{} {}", icon, finding.code, line, finding.severity);
        println!("   Msg: {}", finding.message);
        if let Some(target) = &finding.target_id {
            println!("   Ref: {}", target);
        }
        println!("{:-<50}", "-");
    }

    if !result.is_clean() {
        bail!("{} blocking finding(s)", result.blocking);
    }
    Ok(())
}
