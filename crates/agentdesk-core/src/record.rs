//! Record types for fetched resources.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stable record identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One domain object (booking, voucher, forex order) as returned by the backend.
///
/// The shape varies by resource, so a record is kept as the decoded JSON
/// object. Consumers read it through the typed accessors, which return
/// `None` for missing, `null`, or malformed values instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Create a record from a JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Create a record from a JSON value. Returns `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// The record identifier: `_id`, falling back to `id`.
    pub fn id(&self) -> Option<RecordId> {
        self.text("_id")
            .or_else(|| self.text("id"))
            .map(RecordId)
    }

    /// Raw value of a field. `null` is treated as absent.
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self.fields.get(field) {
            Some(Value::Null) | None => None,
            Some(value) => Some(value),
        }
    }

    /// Check if a field is present and non-null.
    pub fn has(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// String form of a scalar field.
    ///
    /// Numbers keep their JSON text (`500`, `900.5`). Arrays and objects
    /// have no string form.
    pub fn text(&self, field: &str) -> Option<String> {
        match self.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Numeric value of a field, from a JSON number or a numeric string.
    pub fn amount(&self, field: &str) -> Option<Decimal> {
        match self.get(field)? {
            Value::Number(n) => parse_amount(&n.to_string()),
            Value::String(s) => parse_amount(s),
            _ => None,
        }
    }

    /// Calendar date of a field. Time-of-day is discarded.
    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        match self.get(field)? {
            Value::String(s) => parse_calendar_date(s),
            _ => None,
        }
    }

    /// Convert back into a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Parse a decimal amount, accepting plain and scientific notation.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Parse the calendar date out of a date or timestamp string.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive `YYYY-MM-DDThh:mm:ss`.
/// Timestamps keep the date as written; no timezone conversion is applied.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|ts| ts.date())
}
