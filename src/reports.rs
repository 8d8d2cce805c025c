use std::collections::{HashMap, HashSet};

use crate::aggregator::{self, parse_leading_number, ColumnStats, StatusSummary};
use crate::classifier::Classification;
use crate::fmt::truncate_label;
use crate::models::{Condition, Record, STATUS_IN_TRANSIT};

const GROUPED_BAR_LIMIT: usize = 10;
const GROUPED_BAR_COLUMNS: usize = 2;
const SHARE_SLICE_LIMIT: usize = 8;
const LINE_POINT_LIMIT: usize = 20;
const LABEL_WIDTH: usize = 15;
const UNKNOWN: &str = "Unknown";

// ---------------------------------------------------------------------------
// Overview cards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetOverview {
    pub total_rows: usize,
    pub total_columns: usize,
    pub numeric_columns: usize,
    pub text_columns: usize,
    pub stats: Vec<ColumnStats>,
}

impl DatasetOverview {
    pub fn numeric_share_pct(&self) -> f64 {
        percent_of(self.numeric_columns, self.total_columns)
    }
}

pub fn dataset_overview(
    records: &[Record],
    columns: &[String],
    classification: &Classification,
) -> DatasetOverview {
    DatasetOverview {
        total_rows: records.len(),
        total_columns: columns.len(),
        numeric_columns: classification.numeric.len(),
        text_columns: classification.text.len(),
        stats: aggregator::aggregate(records, &classification.numeric),
    }
}

// ---------------------------------------------------------------------------
// Column analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Text,
}

impl ColumnKind {
    pub fn label(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "Numeric",
            ColumnKind::Text => "Text",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    pub column: String,
    pub kind: ColumnKind,
    /// Distinct display values, the empty value included.
    pub unique: usize,
    pub filled: usize,
    pub completeness_pct: f64,
}

pub fn column_profiles(
    records: &[Record],
    columns: &[String],
    classification: &Classification,
) -> Vec<ColumnProfile> {
    columns
        .iter()
        .map(|column| {
            let unique: HashSet<String> = records.iter().map(|r| r.display(column)).collect();
            let filled = records.iter().filter(|r| !r.get(column).is_empty()).count();
            ColumnProfile {
                column: column.clone(),
                kind: if classification.is_numeric(column) {
                    ColumnKind::Numeric
                } else {
                    ColumnKind::Text
                },
                unique: unique.len(),
                filled,
                completeness_pct: percent_of(filled, records.len()),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Chart series
// ---------------------------------------------------------------------------

/// One labelled count, as drawn in a pie or bar chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub value: usize,
}

impl Slice {
    fn new(label: impl Into<String>, value: usize) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

pub fn slice_total(slices: &[Slice]) -> usize {
    slices.iter().map(|s| s.value).sum()
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupedBar {
    pub label: String,
    pub sums: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupedBars {
    pub group_column: String,
    pub value_columns: Vec<String>,
    pub bars: Vec<GroupedBar>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub column: String,
    /// `(row number, value)`, row numbers starting at 1.
    pub points: Vec<(usize, f64)>,
}

fn group_label(record: &Record, column: &str) -> String {
    let value = record.get(column);
    if value.is_truthy() {
        value.to_string()
    } else {
        UNKNOWN.to_string()
    }
}

/// Sums of the first two numeric columns per value of the first text column.
pub fn grouped_bars(records: &[Record], classification: &Classification) -> Option<GroupedBars> {
    let group_column = classification.first_text()?;
    let value_columns: Vec<String> = classification
        .numeric
        .iter()
        .take(GROUPED_BAR_COLUMNS)
        .cloned()
        .collect();
    if value_columns.is_empty() {
        return None;
    }

    let mut bars: Vec<GroupedBar> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for record in records {
        let label = group_label(record, group_column);
        let i = *index.entry(label.clone()).or_insert_with(|| {
            bars.push(GroupedBar {
                label,
                sums: vec![0.0; value_columns.len()],
            });
            bars.len() - 1
        });
        for (slot, column) in value_columns.iter().enumerate() {
            if let Some(n) = parse_leading_number(record.get(column)) {
                bars[i].sums[slot] += n;
            }
        }
    }
    bars.truncate(GROUPED_BAR_LIMIT);

    Some(GroupedBars {
        group_column: group_column.to_string(),
        value_columns,
        bars,
    })
}

/// Row counts per value of the first text column.
pub fn share_slices(records: &[Record], classification: &Classification) -> Option<(String, Vec<Slice>)> {
    let column = classification.first_text()?;
    let mut slices: Vec<Slice> = aggregator::tally(records, |r| group_label(r, column))
        .into_iter()
        .map(|(label, value)| Slice::new(label, value))
        .collect();
    slices.truncate(SHARE_SLICE_LIMIT);
    Some((column.to_string(), slices))
}

/// First numeric column over the leading rows; unparseable cells plot as 0.
pub fn line_series(records: &[Record], classification: &Classification) -> Option<LineSeries> {
    let column = classification.numeric.first()?;
    let points = records
        .iter()
        .take(LINE_POINT_LIMIT)
        .enumerate()
        .map(|(i, r)| (i + 1, parse_leading_number(r.get(column)).unwrap_or(0.0)))
        .collect();
    Some(LineSeries {
        column: column.clone(),
        points,
    })
}

pub fn condition_slices(summary: &StatusSummary) -> Vec<Slice> {
    Condition::ALL
        .into_iter()
        .map(|condition| {
            let value = match condition {
                Condition::Good => summary.good,
                Condition::Bad => summary.bad,
                Condition::Destroyed => summary.destroyed,
            };
            Slice::new(condition.as_str(), value)
        })
        .collect()
}

pub fn status_slices(summary: &StatusSummary, in_transit: usize) -> Vec<Slice> {
    vec![
        Slice::new("In Stock", summary.in_stock),
        Slice::new("Out", summary.out_stock),
        Slice::new(STATUS_IN_TRANSIT, in_transit),
    ]
}

pub fn category_bars(records: &[Record]) -> Vec<Slice> {
    aggregator::by_category(records)
        .into_iter()
        .map(|(label, value)| Slice::new(label, value))
        .collect()
}

/// Location tallies with long names shortened for chart axes.
pub fn location_bars(records: &[Record]) -> Vec<Slice> {
    aggregator::by_location(records)
        .into_iter()
        .map(|(label, value)| Slice::new(truncate_label(&label, LABEL_WIDTH), value))
        .collect()
}

/// Everything the charts view draws, computed in one pass over the inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSet {
    pub condition: Vec<Slice>,
    pub status: Vec<Slice>,
    pub categories: Vec<Slice>,
    pub locations: Vec<Slice>,
    pub grouped: Option<GroupedBars>,
    pub share: Option<(String, Vec<Slice>)>,
    pub line: Option<LineSeries>,
}

pub fn chart_set(
    records: &[Record],
    classification: &Classification,
    summary: &StatusSummary,
    in_transit: usize,
) -> ChartSet {
    ChartSet {
        condition: condition_slices(summary),
        status: status_slices(summary, in_transit),
        categories: category_bars(records),
        locations: location_bars(records),
        grouped: grouped_bars(records, classification),
        share: share_slices(records, classification),
        line: line_series(records, classification),
    }
}

pub fn percent_of(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{classify, NumericRule};
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

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> (Vec<Record>, Vec<String>) {
        let recs = records(json!([
            {"Model": "Falcon", "Weight": 2, "Range": "10km"},
            {"Model": "Hawk", "Weight": "3", "Range": 8},
            {"Model": "Falcon", "Weight": "x", "Range": 4},
            {"Model": "", "Weight": 1, "Range": ""},
        ]));
        (recs, cols(&["Model", "Weight", "Range"]))
    }

    #[test]
    fn test_overview_counts_and_share() {
        let (recs, columns) = sample();
        let c = classify(&recs, &columns, NumericRule::AnyCell);
        let o = dataset_overview(&recs, &columns, &c);
        assert_eq!(o.total_rows, 4);
        assert_eq!(o.total_columns, 3);
        assert_eq!((o.numeric_columns, o.text_columns), (2, 1));
        assert!((o.numeric_share_pct() - 66.666).abs() < 0.01);
        assert_eq!(o.stats.len(), 2);
        assert_eq!(o.stats[1].sum, 22.0);
    }

    #[test]
    fn test_column_profiles() {
        let (recs, columns) = sample();
        let c = classify(&recs, &columns, NumericRule::AnyCell);
        let profiles = column_profiles(&recs, &columns, &c);
        assert_eq!(profiles[0].kind, ColumnKind::Text);
        assert_eq!(profiles[0].unique, 3);
        assert_eq!(profiles[0].completeness_pct, 75.0);
        assert_eq!(profiles[1].kind, ColumnKind::Numeric);
        assert_eq!(profiles[1].filled, 4);
        assert_eq!(column_profiles(&[], &columns, &c)[0].completeness_pct, 0.0);
    }

    #[test]
    fn test_grouped_bars_sum_first_two_numeric_columns() {
        let (recs, columns) = sample();
        let c = classify(&recs, &columns, NumericRule::AnyCell);
        let g = grouped_bars(&recs, &c).unwrap();
        assert_eq!(g.group_column, "Model");
        assert_eq!(g.value_columns, cols(&["Weight", "Range"]));
        assert_eq!(
            g.bars,
            vec![
                GroupedBar { label: "Falcon".into(), sums: vec![2.0, 14.0] },
                GroupedBar { label: "Hawk".into(), sums: vec![3.0, 8.0] },
                GroupedBar { label: "Unknown".into(), sums: vec![1.0, 0.0] },
            ]
        );
    }

    #[test]
    fn test_grouped_bars_need_both_kinds() {
        let recs = records(json!([{"A": 1}]));
        let c = classify(&recs, &cols(&["A"]), NumericRule::AnyCell);
        assert!(grouped_bars(&recs, &c).is_none());
        assert!(share_slices(&recs, &c).is_none());
        assert!(line_series(&recs, &c).is_some());
    }

    #[test]
    fn test_share_slices_capped() {
        let rows: Vec<serde_json::Value> = (0..12).map(|i| json!({"Name": format!("n{i}")})).collect();
        let recs = records(serde_json::Value::Array(rows));
        let c = classify(&recs, &cols(&["Name"]), NumericRule::AnyCell);
        let (column, slices) = share_slices(&recs, &c).unwrap();
        assert_eq!(column, "Name");
        assert_eq!(slices.len(), 8);
        assert_eq!(slices[0], Slice::new("n0", 1));
    }

    #[test]
    fn test_line_series_first_twenty_rows() {
        let rows: Vec<serde_json::Value> = (0..25)
            .map(|i| if i == 2 { json!({"V": "n/a"}) } else { json!({"V": i}) })
            .collect();
        let recs = records(serde_json::Value::Array(rows));
        let c = classify(&recs, &cols(&["V"]), NumericRule::AnyCell);
        let line = line_series(&recs, &c).unwrap();
        assert_eq!(line.points.len(), 20);
        assert_eq!(line.points[0], (1, 0.0));
        assert_eq!(line.points[2], (3, 0.0));
        assert_eq!(line.points[19], (20, 19.0));
    }

    #[test]
    fn test_location_labels_truncated() {
        let recs = records(json!([
            {"Current Location": "Warehouse North Wing"},
            {"Current Location": "NYC"},
        ]));
        let bars = location_bars(&recs);
        assert_eq!(bars[0].label, "Warehouse North...");
        assert_eq!(bars[1].label, "NYC");
    }

    #[test]
    fn test_status_slices_include_transit() {
        let summary = StatusSummary {
            total: 3,
            good: 2,
            bad: 1,
            destroyed: 0,
            in_stock: 2,
            out_stock: 1,
        };
        let slices = status_slices(&summary, 4);
        assert_eq!(slices[2], Slice::new("In Transit", 4));
        assert_eq!(slice_total(&slices), 7);
        assert_eq!(slice_total(&condition_slices(&summary)), 3);
    }
}
