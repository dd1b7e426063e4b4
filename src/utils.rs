//! Utility functions for log formatting and output-path preparation.

use crate::error::{IngestError, Result};
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (backing off to a character
/// boundary) with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Create the parent directory of `path` if it has one.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| IngestError::io(parent, e))?;
            debug!(parent = %parent.display(), "Ensured parent directory");
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a scratch file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| IngestError::io(path, e))?;

    // a small sync write using std fs (simpler error surface)
    let scratch_path = path.join("..__write_check__");
    stdfs::File::create(&scratch_path).map_err(|e| IngestError::io(&scratch_path, e))?;
    let _ = stdfs::remove_file(&scratch_path);
    info!("Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte_boundary() {
        // "é" is two bytes; cutting at 1 must not split it
        assert_eq!(truncate_for_log("éa", 1), "…(+3 bytes)");
    }

    #[tokio::test]
    async fn test_ensure_parent_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a/b/c.csv");
        ensure_parent_dir(&file).await.unwrap();
        assert!(dir.path().join("a/b").is_dir());
    }

    #[tokio::test]
    async fn test_ensure_parent_dir_bare_filename() {
        ensure_parent_dir(Path::new("out.json")).await.unwrap();
    }

    #[tokio::test]
    async fn test_ensure_writable_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("reports");
        ensure_writable_dir(&target).await.unwrap();
        assert!(target.is_dir());
        assert!(!target.join("..__write_check__").exists());
    }
}
