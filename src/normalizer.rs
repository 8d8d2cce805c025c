use std::collections::{BTreeMap, HashSet};

use crate::error::{HangarError, Result};
use crate::models::{Condition, Record, Value, ASSET_HEADERS, BROKEN_CODE, CONDITION, IN_OUT, IN_OUT_ALT, STATUS_IN};

/// A row as it arrives from a spreadsheet or the saved JSON file.
pub type RawRow = serde_json::Map<String, serde_json::Value>;

/// Key of the nested status object (`{"In": {"Out": "..."}}`).
const MARKER_KEY: &str = "In";
const MARKER_FIELD: &str = "Out";

/// Accept only a JSON array of objects.
pub fn rows_from_json(value: serde_json::Value) -> Result<Vec<RawRow>> {
    let serde_json::Value::Array(items) = value else {
        return Err(HangarError::InvalidShape {
            expected: "a JSON array of objects",
            found: json_kind(&value).to_string(),
        });
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(HangarError::InvalidShape {
                expected: "a JSON array of objects",
                found: format!("{} at index {i}", json_kind(&other)),
            }),
        })
        .collect()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Union of the asset headers and every scalar-valued key, asset headers first.
pub fn column_set(rows: &[RawRow]) -> Vec<String> {
    let mut keys: Vec<String> = ASSET_HEADERS.iter().map(|h| h.to_string()).collect();
    let mut seen: HashSet<String> = keys.iter().cloned().collect();
    for row in rows {
        for (key, value) in row {
            if value.is_object() || seen.contains(key) {
                continue;
            }
            seen.insert(key.clone());
            keys.push(key.clone());
        }
    }
    keys
}

fn nested_marker(row: &RawRow) -> Option<String> {
    let out = row.get(MARKER_KEY)?.as_object()?.get(MARKER_FIELD)?.as_str()?;
    if out.trim().is_empty() {
        None
    } else {
        Some(out.to_string())
    }
}

/// A header row completed with any asset header it lacks, appended in
/// asset-header order. Every record carries those keys, so the table must too.
pub fn with_asset_headers(mut columns: Vec<String>) -> Vec<String> {
    for header in ASSET_HEADERS {
        if !columns.iter().any(|c| c == header) {
            columns.push(header.to_string());
        }
    }
    columns
}

/// Turn raw rows into records with `Condition` and `In/Out` derived.
/// Never fails: absent or odd fields fall back to defaults.
pub fn normalize(rows: &[RawRow]) -> Vec<Record> {
    let keys = column_set(rows);
    rows.iter().map(|row| normalize_row(row, &keys)).collect()
}

fn normalize_row(row: &RawRow, keys: &[String]) -> Record {
    let mut fields: BTreeMap<String, Value> = keys
        .iter()
        .map(|key| {
            let value = row
                .get(key)
                .filter(|v| !v.is_object())
                .map(Value::from_json)
                .unwrap_or_default();
            (key.clone(), value)
        })
        .collect();

    let broken_code = fields.get(BROKEN_CODE).cloned().unwrap_or_default();
    let condition = Condition::from_broken_code(&broken_code);
    fields.insert(CONDITION.to_string(), Value::text(condition.as_str()));

    let raw_status = |key: &str| {
        row.get(key)
            .filter(|v| !v.is_object())
            .map(Value::from_json)
            .filter(Value::is_truthy)
    };
    let status = raw_status(IN_OUT_ALT)
        .or_else(|| raw_status(IN_OUT))
        .unwrap_or_else(|| Value::text(STATUS_IN));
    fields.insert(IN_OUT.to_string(), status);

    Record {
        fields,
        status_marker: nested_marker(row),
    }
}

/// Convert a record back to its raw form, nested marker included.
pub fn to_raw(record: &Record) -> RawRow {
    let mut row: RawRow = record
        .fields()
        .map(|(k, v)| (k.to_string(), v.to_json()))
        .collect();
    if let Some(marker) = record.status_marker() {
        let mut nested = serde_json::Map::new();
        nested.insert(MARKER_FIELD.to_string(), serde_json::Value::String(marker.to_string()));
        row.insert(MARKER_KEY.to_string(), serde_json::Value::Object(nested));
    }
    row
}

pub fn to_raw_rows(records: &[Record]) -> Vec<RawRow> {
    records.iter().map(to_raw).collect()
}
