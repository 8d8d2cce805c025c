use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{Record, Value, CATEGORY, LOCATION, STATUS_IN, STATUS_OUT};

const UNKNOWN: &str = "Unknown";

// ---------------------------------------------------------------------------
// Number parsing
// ---------------------------------------------------------------------------

fn leading_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
            .expect("leading number pattern is valid")
    })
}

/// Parse the numeric prefix of a cell: `"12kg"` is 12, `"x"` is nothing.
pub fn parse_leading_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) if !n.is_nan() => Some(*n),
        Value::Text(s) => {
            let m = leading_number_re().find(s.trim_start())?;
            let n: f64 = m.as_str().parse().ok()?;
            (!n.is_nan()).then_some(n)
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Numeric statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub column: String,
    pub sum: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl ColumnStats {
    /// Spread relative to the maximum, as a percentage.
    pub fn range_pct(&self) -> f64 {
        if self.max == 0.0 {
            0.0
        } else {
            (self.max - self.min) / self.max * 100.0
        }
    }
}

/// Sum/avg/min/max/count for each numeric column. Cells that do not parse are
/// skipped; columns with nothing parseable are left out.
pub fn aggregate(records: &[Record], numeric_columns: &[String]) -> Vec<ColumnStats> {
    numeric_columns
        .iter()
        .filter_map(|column| column_stats(records, column))
        .collect()
}

fn column_stats(records: &[Record], column: &str) -> Option<ColumnStats> {
    let values: Vec<f64> = records
        .iter()
        .filter_map(|r| parse_leading_number(r.get(column)))
        .collect();
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().sum();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(ColumnStats {
        column: column.to_string(),
        sum,
        avg: sum / values.len() as f64,
        min,
        max,
        count: values.len(),
    })
}

// ---------------------------------------------------------------------------
// Categorical tallies
// ---------------------------------------------------------------------------

/// Count records per key, in order of first appearance.
pub fn tally<'a, F>(records: impl IntoIterator<Item = &'a Record>, key: F) -> Vec<(String, usize)>
where
    F: Fn(&Record) -> String,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for record in records {
        let k = key(record);
        match index.get(&k) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(k.clone(), counts.len());
                counts.push((k, 1));
            }
        }
    }
    counts
}

fn field_or_unknown(record: &Record, field: &str) -> String {
    let value = record.get(field);
    if value.is_truthy() {
        value.to_string()
    } else {
        UNKNOWN.to_string()
    }
}

pub fn by_category(records: &[Record]) -> Vec<(String, usize)> {
    tally(records, |r| field_or_unknown(r, CATEGORY))
}

pub fn by_location(records: &[Record]) -> Vec<(String, usize)> {
    tally(records, |r| field_or_unknown(r, LOCATION))
}

// ---------------------------------------------------------------------------
// Condition / stock status counts
// ---------------------------------------------------------------------------

/// Which records feed the condition and stock counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusScope {
    /// Only records imported with a nested `In.Out` status object. Plain
    /// spreadsheet rows never carry one, so most counts come out as zero.
    #[default]
    NestedMarker,
    AllRecords,
}

impl StatusScope {
    pub fn includes(&self, record: &Record) -> bool {
        match self {
            StatusScope::NestedMarker => record.status_marker().is_some(),
            StatusScope::AllRecords => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusSummary {
    pub total: usize,
    pub good: usize,
    pub bad: usize,
    pub destroyed: usize,
    pub in_stock: usize,
    pub out_stock: usize,
}

pub fn status_summary(records: &[Record], scope: StatusScope) -> StatusSummary {
    let mut summary = StatusSummary::default();
    for record in records.iter().filter(|r| scope.includes(r)) {
        summary.total += 1;
        match record.condition() {
            "Good" => summary.good += 1,
            "Bad" => summary.bad += 1,
            "Destroyed" => summary.destroyed += 1,
            _ => {}
        }
        match record.stock_status().as_str() {
            STATUS_IN => summary.in_stock += 1,
            STATUS_OUT => summary.out_stock += 1,
            _ => {}
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::{normalize, RawRow};
    use serde_json::json;

    fn records(rows: serde_json::Value) -> Vec<Record> {
        let rows: Vec<RawRow> = rows
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r.as_object().unwrap().clone())
            .collect();
        normalize(&rows)
    }

    #[test]
    fn test_parse_leading_number() {
        assert_eq!(parse_leading_number(&Value::text("12kg")), Some(12.0));
        assert_eq!(parse_leading_number(&Value::text("  -3.5e1x")), Some(-35.0));
        assert_eq!(parse_leading_number(&Value::text(".5")), Some(0.5));
        assert_eq!(parse_leading_number(&Value::text("x12")), None);
        assert_eq!(parse_leading_number(&Value::text("-")), None);
        assert_eq!(parse_leading_number(&Value::Number(7.0)), Some(7.0));
        assert_eq!(parse_leading_number(&Value::Empty), None);
    }

    #[test]
    fn test_aggregate_skips_unparseable() {
        let recs = records(json!([
            {"Weight": 10}, {"Weight": "20"}, {"Weight": "x"}, {"Weight": 30},
        ]));
        let stats = aggregate(&recs, &["Weight".to_string()]);
        assert_eq!(stats.len(), 1);
        let s = &stats[0];
        assert_eq!(s.sum, 60.0);
        assert_eq!(s.avg, 20.0);
        assert_eq!(s.min, 10.0);
        assert_eq!(s.max, 30.0);
        assert_eq!(s.count, 3);
    }

    #[test]
    fn test_aggregate_omits_columns_without_values() {
        let recs = records(json!([{"A": "x", "B": 1}, {"A": "", "B": 2}]));
        let stats = aggregate(&recs, &["A".to_string(), "B".to_string()]);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].column, "B");
        assert!(aggregate(&[], &["B".to_string()]).is_empty());
    }

    #[test]
    fn test_range_pct() {
        let recs = records(json!([{"A": 5}, {"A": 10}]));
        let stats = aggregate(&recs, &["A".to_string()]);
        assert_eq!(stats[0].range_pct(), 50.0);
        let zeros = records(json!([{"A": 0}]));
        assert_eq!(aggregate(&zeros, &["A".to_string()])[0].range_pct(), 0.0);
    }

    #[test]
    fn test_by_category_and_location_default_unknown() {
        let recs = records(json!([
            {"Category": "Racing drones", "Current Location": "NYC"},
            {"Category": "", "Current Location": "Mumbai"},
            {"Category": "Racing drones", "Current Location": "NYC"},
            {"Current Location": ""},
        ]));
        assert_eq!(
            by_category(&recs),
            vec![("Racing drones".to_string(), 2), ("Unknown".to_string(), 2)]
        );
        assert_eq!(
            by_location(&recs),
            vec![
                ("NYC".to_string(), 2),
                ("Mumbai".to_string(), 1),
                ("Unknown".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_status_summary_nested_marker_scope() {
        let recs = records(json!([
            {"Broken code": "Broken", "In/Out": "Out", "In": {"Out": "Out"}},
            {"Broken code": "", "In/Out": "In", "In": {"Out": "In"}},
            {"Broken code": "Destroyed", "In/Out": "In"},
        ]));
        let s = status_summary(&recs, StatusScope::NestedMarker);
        assert_eq!(s.total, 2);
        assert_eq!((s.good, s.bad, s.destroyed), (1, 1, 0));
        assert_eq!((s.in_stock, s.out_stock), (1, 1));

        let all = status_summary(&recs, StatusScope::AllRecords);
        assert_eq!(all.total, 3);
        assert_eq!(all.destroyed, 1);
        assert_eq!(all.in_stock, 2);
    }

    #[test]
    fn test_plain_rows_count_zero_under_marker_scope() {
        let recs = records(json!([{"In/Out": "In"}, {"In/Out": "Out"}]));
        assert_eq!(status_summary(&recs, StatusScope::NestedMarker), StatusSummary::default());
    }
}
