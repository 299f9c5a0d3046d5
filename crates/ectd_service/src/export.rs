use std::path::Path;

use ectd_core::backbone::{render_index_xml, render_us_regional_xml};
use ectd_core::checksum::digest_bytes;
use ectd_core::layout::US_REGIONAL_PATH;
use ectd_core::models::{DocumentRegistryEntry, SequenceNumber};

use crate::error::{io_error, Result};
use crate::BuildOptions;

/// Writes `index.xml`, its digest file and `m1/us/us-regional.xml` under `root`.
/// Returns the digest of `index.xml`.
pub async fn write_backbone(
    root: &Path,
    sequence: SequenceNumber,
    registry: &[DocumentRegistryEntry],
    options: &BuildOptions,
) -> Result<String> {
    // 1. Global index
    let index_xml = render_index_xml(sequence, registry, options.checksum)?;
    let index = root.join("index.xml");
    tokio::fs::write(&index, index_xml.as_bytes())
        .await
        .map_err(io_error(&index))?;

    // 2. Digest of the index itself
    let index_checksum = digest_bytes(options.checksum, index_xml.as_bytes());
    let manifest = root.join(options.checksum.manifest_file_name());
    tokio::fs::write(&manifest, index_checksum.as_bytes())
        .await
        .map_err(io_error(&manifest))?;

    // 3. US regional (Module 1 only)
    let regional_xml = render_us_regional_xml(sequence, registry, &options.regional, options.checksum)?;
    let regional = US_REGIONAL_PATH
        .split('/')
        .fold(root.to_path_buf(), |path, segment| path.join(segment));
    if let Some(parent) = regional.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_error(parent))?;
    }
    tokio::fs::write(&regional, regional_xml.as_bytes())
        .await
        .map_err(io_error(&regional))?;

    tracing::debug!(%sequence, leaves = registry.len(), "backbone written");

    Ok(index_checksum)
}
