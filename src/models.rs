use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::ser::{Serialize, Serializer};

pub const QR_CODE: &str = "Drone QR Code ID";
pub const DRONE_ID: &str = "Drone ID";
pub const BROKEN_CODE: &str = "Broken code";
pub const RACK_NO: &str = "Rack No";
pub const BOX_NO: &str = "Box No.";
pub const CATEGORY: &str = "Category";
pub const IN_OUT: &str = "In/Out";
pub const IN_OUT_ALT: &str = "In/In-Transit";
pub const LOCATION: &str = "Current Location";
pub const COMMENTS: &str = "Comments";
pub const CONDITION: &str = "Condition";

/// Headers every dataset carries, in default table order.
pub const ASSET_HEADERS: &[&str] = &[
    QR_CODE,
    DRONE_ID,
    BROKEN_CODE,
    RACK_NO,
    BOX_NO,
    CATEGORY,
    IN_OUT,
    LOCATION,
    COMMENTS,
    CONDITION,
];

pub const STATUS_IN: &str = "In";
pub const STATUS_OUT: &str = "Out";
pub const STATUS_IN_TRANSIT: &str = "In Transit";

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A single scalar cell. Empty strings are always `Empty`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

static EMPTY: Value = Value::Empty;

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            Value::Empty
        } else {
            Value::Text(s)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Non-empty text, or a number that is neither zero nor NaN.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Empty => false,
            Value::Text(s) => !s.is_empty(),
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a JSON scalar. Objects and arrays are kept as compact JSON text.
    pub fn from_json(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Empty,
            serde_json::Value::Bool(b) => Value::Text(b.to_string()),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or_default(),
            serde_json::Value::String(s) => Value::text(s.as_str()),
            other => Value::Text(other.to_string()),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Empty => serde_json::Value::String(String::new()),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(n.to_string())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{n}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

// ---------------------------------------------------------------------------
// Condition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Good,
    Bad,
    Destroyed,
}

impl Condition {
    pub const ALL: [Condition; 3] = [Condition::Good, Condition::Bad, Condition::Destroyed];

    pub fn from_broken_code(code: &Value) -> Self {
        match code.as_str() {
            Some("Destroyed") => Condition::Destroyed,
            Some("Broken") => Condition::Bad,
            _ => Condition::Good,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Good => "Good",
            Condition::Bad => "Bad",
            Condition::Destroyed => "Destroyed",
        }
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One inventory row. Construct through `normalizer::normalize` so the derived
/// fields are always present.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub(crate) fields: BTreeMap<String, Value>,
    pub(crate) status_marker: Option<String>,
}

impl Record {
    pub fn get(&self, field: &str) -> &Value {
        self.fields.get(field).unwrap_or(&EMPTY)
    }

    pub fn display(&self, field: &str) -> String {
        self.get(field).to_string()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn condition(&self) -> &str {
        self.get(CONDITION).as_str().unwrap_or("")
    }

    pub fn stock_status(&self) -> String {
        self.display(IN_OUT)
    }

    pub fn qr_code(&self) -> String {
        self.display(QR_CODE)
    }

    /// The `In.Out` string of a nested status object, when the raw row had one.
    pub fn status_marker(&self) -> Option<&str> {
        self.status_marker.as_deref()
    }

    /// Overwrite a raw field. Derived fields are refused; a new broken code
    /// recomputes the condition.
    pub fn set_field(&mut self, field: &str, value: Value) -> bool {
        if field == CONDITION || field == IN_OUT {
            return false;
        }
        if field == BROKEN_CODE {
            let condition = Condition::from_broken_code(&value);
            self.fields
                .insert(CONDITION.to_string(), Value::text(condition.as_str()));
        }
        self.fields.insert(field.to_string(), value);
        true
    }
}

// ---------------------------------------------------------------------------
// Transit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitStatus {
    InTransit,
    Delivered,
    Delayed,
}

impl TransitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitStatus::InTransit => STATUS_IN_TRANSIT,
            TransitStatus::Delivered => "Delivered",
            TransitStatus::Delayed => "Delayed",
        }
    }
}

impl fmt::Display for TransitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransitStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        match key.as_str() {
            "intransit" => Ok(TransitStatus::InTransit),
            "delivered" => Ok(TransitStatus::Delivered),
            "delayed" => Ok(TransitStatus::Delayed),
            _ => Err(format!(
                "unknown transit status '{s}' (expected: in-transit, delivered, delayed)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitEntry {
    pub id: i64,
    pub drone_id: String,
    pub drone_qr_code: String,
    pub from: String,
    pub to: String,
    pub shipping_date_time: String,
    pub eta: String,
    pub status: TransitStatus,
}
