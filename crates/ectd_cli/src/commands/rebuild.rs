use anyhow::{Context, Result};
use clap::Args;
use sqlx::PgPool;

use ectd_db::schema::rebuild_database;

#[derive(Debug, Args)]
pub struct RebuildArgs {
    /// DANGER: drop the sequence, audit and document tables before rebuilding
    #[arg(long)]
    pub reset: bool,
}

pub async fn execute(pool: PgPool, args: RebuildArgs) -> Result<()> {
    println!("🏗️  Rebuilding Database Schema...");

    if args.reset {
        println!("🔥 Reset requested. Dropping eCTD tables...");
        sqlx::raw_sql("DROP TABLE IF EXISTS audit_trail, ind_sequences, documents CASCADE;")
            .execute(&pool)
            .await
            .context("Failed to drop tables")?;
    }

    rebuild_database(&pool).await.context("Failed to apply schema")?;

    println!("✅ Database Schema Applied Successfully.");
    Ok(())
}
