use std::collections::{BTreeMap, HashSet};

use crate::models::{Record, CATEGORY, CONDITION, IN_OUT, LOCATION};

/// Equality value meaning "no constraint".
pub const ALL: &str = "all";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSpec {
    pub free_text: Option<String>,
    pub equality: BTreeMap<String, String>,
}

impl FilterSpec {
    /// Build the dashboard's standard filter set. `None` means "all".
    pub fn from_parts(
        search: Option<&str>,
        category: Option<&str>,
        condition: Option<&str>,
        location: Option<&str>,
        status: Option<&str>,
    ) -> Self {
        let mut spec = FilterSpec {
            free_text: search.map(str::to_string),
            equality: BTreeMap::new(),
        };
        for (field, value) in [
            (CATEGORY, category),
            (CONDITION, condition),
            (LOCATION, location),
            (IN_OUT, status),
        ] {
            if let Some(v) = value {
                spec.equality.insert(field.to_string(), v.to_string());
            }
        }
        spec
    }

    fn search_term(&self) -> Option<&str> {
        self.free_text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }

    fn active_equality(&self) -> impl Iterator<Item = (&String, &String)> {
        self.equality.iter().filter(|(_, v)| v.as_str() != ALL)
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Number of constraints currently narrowing the set.
    pub fn active_count(&self) -> usize {
        self.active_equality().count() + usize::from(self.search_term().is_some())
    }

    pub fn clear(&mut self) {
        self.free_text = None;
        self.equality.clear();
    }

    pub fn matches(&self, record: &Record) -> bool {
        if let Some(term) = self.search_term() {
            let needle = term.to_lowercase();
            let hit = record
                .fields()
                .filter(|(_, v)| !v.is_empty())
                .any(|(_, v)| v.to_string().to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        self.active_equality()
            .all(|(field, expected)| record.display(field) == *expected)
    }

    /// Short human description, e.g. `search: nyc, Category: Racing drones`.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(term) = self.search_term() {
            parts.push(format!("search: {term}"));
        }
        for (field, value) in self.active_equality() {
            parts.push(format!("{field}: {value}"));
        }
        parts.join(", ")
    }
}

/// Records satisfying every active constraint, in input order.
pub fn filter(records: &[Record], spec: &FilterSpec) -> Vec<Record> {
    records.iter().filter(|r| spec.matches(r)).cloned().collect()
}

/// Choices offered by the category and location filters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterOptions {
    pub categories: Vec<String>,
    pub locations: Vec<String>,
}

pub fn filter_options(records: &[Record]) -> FilterOptions {
    FilterOptions {
        categories: distinct_values(records, CATEGORY),
        locations: distinct_values(records, LOCATION),
    }
}

fn distinct_values(records: &[Record], field: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .map(|r| r.get(field))
        .filter(|v| v.is_truthy())
        .map(|v| v.to_string())
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QR_CODE;
    use crate::normalizer::{normalize, RawRow};
    use serde_json::json;

    fn fleet() -> Vec<Record> {
        let rows: Vec<RawRow> = json!([
            {"Drone QR Code ID": "QR-1", "Category": "Racing drones", "Current Location": "NYC", "In/Out": "In"},
            {"Drone QR Code ID": "QR-2", "Category": "Racing drones", "Current Location": "Mumbai", "In/Out": "Out"},
            {"Drone QR Code ID": "QR-3", "Category": "Camera drones", "Current Location": "NYC warehouse", "Broken code": "Broken"},
            {"Drone QR Code ID": "QR-4", "Category": "", "Current Location": "nyc", "Rack No": 12},
        ])
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r.as_object().unwrap().clone())
        .collect();
        normalize(&rows)
    }

    fn qrs(records: &[Record]) -> Vec<String> {
        records.iter().map(|r| r.display(QR_CODE)).collect()
    }

    #[test]
    fn test_empty_spec_is_identity() {
        let records = fleet();
        let out = filter(&records, &FilterSpec::default());
        assert_eq!(out, records);
    }

    #[test]
    fn test_all_sentinel_and_blank_search_are_no_constraint() {
        let records = fleet();
        let spec = FilterSpec::from_parts(Some("   "), Some("all"), Some("all"), None, Some("all"));
        assert!(spec.is_empty());
        assert_eq!(filter(&records, &spec), records);
    }

    #[test]
    fn test_free_text_is_case_insensitive_across_fields() {
        let records = fleet();
        let spec = FilterSpec::from_parts(Some("NYC"), None, None, None, None);
        assert_eq!(qrs(&filter(&records, &spec)), vec!["QR-1", "QR-3", "QR-4"]);
    }

    #[test]
    fn test_free_text_matches_numbers_and_derived_fields() {
        let records = fleet();
        let spec = FilterSpec::from_parts(Some("12"), None, None, None, None);
        assert_eq!(qrs(&filter(&records, &spec)), vec!["QR-4"]);
        let spec = FilterSpec::from_parts(Some("bad"), None, None, None, None);
        assert_eq!(qrs(&filter(&records, &spec)), vec!["QR-3"]);
    }

    #[test]
    fn test_conjunction_of_category_and_free_text() {
        let records = fleet();
        let spec = FilterSpec::from_parts(Some("NYC"), Some("Racing drones"), None, None, None);
        assert_eq!(qrs(&filter(&records, &spec)), vec!["QR-1"]);
        assert_eq!(spec.active_count(), 2);
    }

    #[test]
    fn test_equality_is_exact() {
        let records = fleet();
        let spec = FilterSpec::from_parts(None, None, None, Some("NYC"), None);
        assert_eq!(qrs(&filter(&records, &spec)), vec!["QR-1"]);
        let spec = FilterSpec::from_parts(None, None, Some("Good"), None, Some("In"));
        assert_eq!(qrs(&filter(&records, &spec)), vec!["QR-1", "QR-4"]);
    }

    #[test]
    fn test_filter_does_not_mutate_input() {
        let records = fleet();
        let before = records.clone();
        let _ = filter(&records, &FilterSpec::from_parts(Some("x"), None, None, None, None));
        assert_eq!(records, before);
    }

    #[test]
    fn test_filter_options_distinct_in_order() {
        let opts = filter_options(&fleet());
        assert_eq!(opts.categories, vec!["Racing drones", "Camera drones"]);
        assert_eq!(opts.locations, vec!["NYC", "Mumbai", "NYC warehouse", "nyc"]);
    }

    #[test]
    fn test_clear_and_describe() {
        let mut spec = FilterSpec::from_parts(Some("nyc"), Some("Racing drones"), None, None, None);
        assert_eq!(spec.describe(), "search: nyc, Category: Racing drones");
        spec.clear();
        assert!(spec.is_empty());
        assert_eq!(spec.describe(), "");
    }
}
