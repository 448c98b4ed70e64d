use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use chrono::{NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y", "%d/%m/%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

/// Tokens that spreadsheet and CSV exports use in place of an empty cell.
const PLACEHOLDER_TOKENS: &[&str] = &["na", "n/a", "nan", "null", "none", "#n/a"];

#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    Number(f64),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(f) => format_number(*f),
            Value::Timestamp(ts) => format_timestamp(ts),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(f) => Some(*f),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Number(_) => 0,
            Value::Timestamp(_) => 1,
            Value::Text(_) => 2,
        }
    }
}

// -0.0 and 0.0 compare equal, and every NaN payload collapses into one.
fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else if value.is_nan() {
        f64::NAN.to_bits()
    } else {
        value.to_bits()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => canonical_bits(*a) == canonical_bits(*b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Text(s) => s.hash(state),
            Value::Number(f) => canonical_bits(*f).hash(state),
            Value::Timestamp(ts) => ts.hash(state),
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) if canonical_bits(*a) == canonical_bits(*b) => {
                Ordering::Equal
            }
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::Timestamp(value)
    }
}

pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn parse_naive_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

pub fn parse_naive_datetime(value: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Parses a calendar timestamp; plain dates land on midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    parse_naive_datetime(trimmed).or_else(|| {
        parse_naive_date(trimmed).and_then(|date| date.and_hms_opt(0, 0, 0))
    })
}

/// Parses a plain decimal or scientific literal.
pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

pub fn is_placeholder_token(value: &str) -> bool {
    let lowered = value.trim().to_ascii_lowercase();
    PLACEHOLDER_TOKENS.contains(&lowered.as_str())
}
