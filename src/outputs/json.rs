//! JSON file output.

use crate::error::{IngestError, Result};
use crate::utils::ensure_parent_dir;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Serialize `value` to `path`, creating parent directories as needed.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string(value)?;
    ensure_parent_dir(path).await?;
    fs::write(path, &json)
        .await
        .map_err(|e| IngestError::io(path, e))?;
    info!(bytes = json.len(), "Wrote JSON file");
    Ok(())
}

/// Read and deserialize a JSON file.
///
/// # Returns
///
/// [`IngestError::Io`] if `path` cannot be read, [`IngestError::Json`] if
/// it does not hold a `T`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|e| IngestError::io(path, e))?;
    Ok(serde_json::from_str(&text)?)
}
