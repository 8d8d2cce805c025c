use serde::{Deserialize, Serialize};

use crate::models::{Record, Value};

/// Which cells must look numeric for a column to count as numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericRule {
    /// One numeric-looking cell promotes the whole column.
    #[default]
    AnyCell,
    /// Every non-empty cell must be numeric, and there must be at least one.
    EveryFilledCell,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Classification {
    pub numeric: Vec<String>,
    pub text: Vec<String>,
}

impl Classification {
    pub fn is_numeric(&self, column: &str) -> bool {
        self.numeric.iter().any(|c| c == column)
    }

    /// First column (in table order) that is not numeric.
    pub fn first_text(&self) -> Option<&str> {
        self.text.first().map(String::as_str)
    }
}

/// A finite decimal number, either stored as one or written as the whole
/// (trimmed) text of the cell.
pub fn parse_decimal(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => *n,
        Value::Text(s) => s.trim().parse::<f64>().ok()?,
        Value::Empty => return None,
    };
    n.is_finite().then_some(n)
}

pub fn classify(records: &[Record], columns: &[String], rule: NumericRule) -> Classification {
    let mut result = Classification::default();
    for column in columns {
        if is_numeric_column(records, column, rule) {
            result.numeric.push(column.clone());
        } else {
            result.text.push(column.clone());
        }
    }
    result
}

fn is_numeric_column(records: &[Record], column: &str, rule: NumericRule) -> bool {
    match rule {
        NumericRule::AnyCell => records
            .iter()
            .any(|r| parse_decimal(r.get(column)).is_some()),
        NumericRule::EveryFilledCell => {
            let mut filled = records
                .iter()
                .map(|r| r.get(column))
                .filter(|v| !v.is_empty())
                .peekable();
            filled.peek().is_some() && filled.all(|v| parse_decimal(v).is_some())
        }
    }
}
