//! Manifest file persistence
//!
//! Writes go to a temp file next to the target and are renamed into place so
//! a failed write never leaves a truncated manifest behind.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::errors::ManifestError;

/// Serialize `manifest` to `output_path`, pretty-printed or compact
pub async fn write_to_path(
    manifest: &Value,
    output_path: &Path,
    pretty: bool,
) -> Result<(), ManifestError> {
    debug!("Writing manifest to: {:?}", output_path);

    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ManifestError::io(parent, e))?;
    }

    let mut content = if pretty {
        serde_json::to_string_pretty(manifest)?
    } else {
        serde_json::to_string(manifest)?
    };
    content.push('\n');

    let temp_path = output_path.with_extension("json.tmp");
    {
        let mut file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| ManifestError::io(&temp_path, e))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| ManifestError::io(&temp_path, e))?;
        file.flush()
            .await
            .map_err(|e| ManifestError::io(&temp_path, e))?;
    }

    tokio::fs::rename(&temp_path, output_path)
        .await
        .map_err(|e| ManifestError::io(output_path, e))?;

    info!("Manifest written successfully to: {:?}", output_path);
    Ok(())
}

/// Read a written manifest back
pub async fn read_from_path(manifest_path: &Path) -> Result<Value> {
    debug!("Reading manifest from: {:?}", manifest_path);

    let content = tokio::fs::read_to_string(manifest_path)
        .await
        .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
    let manifest: Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid manifest JSON in {}", manifest_path.display()))?;
    Ok(manifest)
}
