use rust_embed::RustEmbed;
use sqlx::PgPool;

use crate::error::{Error, Result};

#[derive(RustEmbed)]
#[folder = "schema/"]
struct SchemaAssets;

const BUILD_ORDER: &str = "00_build_order.sql";

/// Reads the build order and applies all SQL files in a single transaction.
pub async fn rebuild_database(pool: &PgPool) -> Result<()> {
    let full_script = assemble_script()?;

    let mut tx = pool.begin().await?;
    sqlx::raw_sql(&full_script).execute(&mut *tx).await?;
    tx.commit().await?;

    tracing::info!("schema applied");
    Ok(())
}

/// Resolves `-- @include` directives from the manifest into one script.
pub fn assemble_script() -> Result<String> {
    let manifest = get_file_content(BUILD_ORDER)?;
    let mut full_script = String::new();

    for line in manifest.lines() {
        let trimmed = line.trim();

        if let Some(path) = parse_include_directive(trimmed) {
            tracing::debug!("including {}", path);
            full_script.push_str(&get_file_content(path)?);
            full_script.push('\n');
        } else if !trimmed.starts_with("--") {
            full_script.push_str(line);
            full_script.push('\n');
        }
    }

    Ok(full_script)
}

fn get_file_content(path: &str) -> Result<String> {
    let file = SchemaAssets::get(path).ok_or_else(|| Error::MissingSchemaAsset(path.to_string()))?;
    String::from_utf8(file.data.into_owned()).map_err(|_| Error::MissingSchemaAsset(format!("{} (not UTF-8)", path)))
}

fn parse_include_directive(line: &str) -> Option<&str> {
    if line.starts_with("--") && line.contains("@include") {
        line.split_whitespace().last()
    } else {
        None
    }
}
