//! CSV file output for tables.

use crate::error::{IngestError, Result};
use crate::table::Table;
use crate::utils::ensure_parent_dir;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Write `table` to `path` as CSV, with or without a leading index column.
///
/// The CSV is rendered in memory and written in one call, so a failed
/// render never leaves a partial file behind.
///
/// # Arguments
///
/// * `table` - Rows to write
/// * `path` - Output file; parent directories are created
/// * `index` - Whether to prepend the row-number column
#[instrument(level = "info", skip_all, fields(path = %path.display(), rows = table.len(), index = index))]
pub async fn write_table(table: &Table, path: &Path, index: bool) -> Result<()> {
    let mut buf = Vec::new();
    table.write_csv(&mut buf, index)?;

    ensure_parent_dir(path).await?;
    fs::write(path, &buf)
        .await
        .map_err(|e| IngestError::io(path, e))?;
    info!(bytes = buf.len(), "Wrote CSV file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_table_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tmp/out.csv");

        let mut t = Table::new(vec!["a".to_string(), "b".to_string()]);
        t.push_row(vec!["1".to_string(), "2".to_string()]).unwrap();
        write_table(&t, &path, false).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b\n1,2\n");
    }
}
