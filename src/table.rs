use std::cmp::Ordering;

use crate::models::{Record, Value};

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Asc => "\u{2191}",
            SortDirection::Desc => "\u{2193}",
        }
    }
}

/// Current sort column and direction of a table view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortState {
    pub column: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    /// Same column flips the direction; a new column starts ascending.
    pub fn toggle(&mut self, column: &str) {
        if self.column.as_deref() == Some(column) {
            self.direction = self.direction.flipped();
        } else {
            self.column = Some(column.to_string());
            self.direction = SortDirection::Asc;
        }
    }

    pub fn apply(&self, records: &mut [Record]) {
        if let Some(column) = &self.column {
            sort_records(records, column, self.direction);
        }
    }
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Empty => 0,
        Value::Number(_) => 1,
        Value::Text(_) => 2,
    }
}

/// Total order over cells: empty first, then numbers, then text. Text is
/// compared as text even when it looks numeric.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Stable sort on one column.
pub fn sort_records(records: &mut [Record], column: &str, direction: SortDirection) {
    records.sort_by(|a, b| {
        let ord = compare_values(a.get(column), b.get(column));
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    total.div_ceil(page_size).max(1)
}

/// 1-indexed page slice; out-of-range pages are empty.
pub fn paginate<T>(items: &[T], page_size: usize, page: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}
