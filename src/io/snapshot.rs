//! Read/write published JSON snapshots.
//!
//! Writes stage through a temp file in the destination directory followed by
//! an atomic rename, so a crashed or failed run leaves the previously
//! published file untouched. The fallback path of the contribution pipeline
//! reads snapshots back through the same module.

use std::fs::{self, File};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

use crate::error::AppError;

/// Write `value` as pretty-printed JSON at `path`, creating parent
/// directories and replacing any existing file in one rename.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)
        .map_err(|e| AppError::Io(format!("Failed to create '{}': {e}", dir.display())))?;

    // Temp file must live in the destination directory so the final rename
    // stays on one filesystem.
    let tmp = NamedTempFile::new_in(dir)
        .map_err(|e| AppError::Io(format!("Failed to stage snapshot in '{}': {e}", dir.display())))?;
    serde_json::to_writer_pretty(tmp.as_file(), value)
        .map_err(|e| AppError::Io(format!("Failed to serialize '{}': {e}", path.display())))?;
    tmp.persist(path)
        .map_err(|e| AppError::Io(format!("Failed to persist '{}': {e}", path.display())))?;

    Ok(())
}

/// Read a previously published snapshot.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::Io(format!("Failed to open snapshot '{}': {e}", path.display())))?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::Io(format!("Invalid snapshot JSON '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn write_creates_parent_directories_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.json");
        let value = json!({"total": 12, "weeks": [[{"count": 3}]]});

        write_json(&path, &value).unwrap();
        let read: Value = read_json(&path).unwrap();

        assert_eq!(read, value);
    }

    #[test]
    fn write_replaces_existing_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_json(&path, &json!({"v": 1})).unwrap();
        write_json(&path, &json!({"v": 2})).unwrap();

        let read: Value = read_json(&path).unwrap();
        assert_eq!(read, json!({"v": 2}));
    }

    #[test]
    fn snapshots_are_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_json(&path, &json!({"a": 1})).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(
            raw.contains("{\n  \"a\": 1"),
            "expected indented output, got: {raw}"
        );
    }

    #[test]
    fn reading_a_missing_snapshot_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_json::<Value>(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }
}
