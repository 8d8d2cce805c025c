use std::path::{Path, PathBuf};

use crate::models::Record;
use crate::normalizer::{rows_from_json, to_raw_rows, RawRow};

pub const DATA_FILE: &str = "data.json";

pub fn data_file(data_dir: &Path) -> PathBuf {
    data_dir.join(DATA_FILE)
}

/// Result of a save. A failed save leaves the in-memory dataset authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub success: bool,
    pub message: String,
}

/// Write the records as a pretty-printed JSON array.
pub fn save_dataset(path: &Path, records: &[Record]) -> SaveOutcome {
    let rows = to_raw_rows(records);
    match write_rows(path, &rows) {
        Ok(()) => {
            tracing::info!(path = %path.display(), rows = rows.len(), "dataset saved");
            SaveOutcome {
                success: true,
                message: format!("Saved {} records", rows.len()),
            }
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "dataset save failed");
            SaveOutcome {
                success: false,
                message: format!("Failed to save data: {e}"),
            }
        }
    }
}

fn write_rows(path: &Path, rows: &[RawRow]) -> crate::error::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(rows)?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

/// Read the saved rows. Absent, unreadable or malformed files give an empty
/// dataset.
pub fn load_dataset(path: &Path) -> Vec<RawRow> {
    if !path.exists() {
        return Vec::new();
    }
    let parsed = std::fs::read_to_string(path)
        .map_err(crate::error::HangarError::from)
        .and_then(|content| Ok(serde_json::from_str::<serde_json::Value>(&content)?))
        .and_then(rows_from_json);
    match parsed {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable dataset");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize;
    use serde_json::json;

    fn sample() -> Vec<Record> {
        let rows: Vec<RawRow> = json!([
            {"Drone QR Code ID": "QR-1", "Weight": 2.5, "In": {"Out": "Out"}},
            {"Drone QR Code ID": "QR-2", "Broken code": "Destroyed"},
        ])
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r.as_object().unwrap().clone())
        .collect();
        normalize(&rows)
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(dir.path());
        let records = sample();
        let outcome = save_dataset(&path, &records);
        assert!(outcome.success, "{}", outcome.message);
        assert_eq!(outcome.message, "Saved 2 records");

        let loaded = normalize(&load_dataset(&path));
        assert_eq!(loaded, records);
        assert_eq!(loaded[0].status_marker(), Some("Out"));
    }

    #[test]
    fn test_saved_file_is_pretty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(dir.path());
        save_dataset(&path, &sample());
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("[\n"));
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_save_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a dir").unwrap();
        let outcome = save_dataset(&blocker.join("data.json"), &sample());
        assert!(!outcome.success);
        assert!(outcome.message.starts_with("Failed to save data"));
    }

    #[test]
    fn test_load_missing_or_malformed_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_dataset(&dir.path().join("nope.json")).is_empty());

        let path = dir.path().join("object.json");
        std::fs::write(&path, r#"{"rows": []}"#).unwrap();
        assert!(load_dataset(&path).is_empty());

        let path = dir.path().join("garbage.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(load_dataset(&path).is_empty());
    }
}
