//! Conversions between domain values and their TEXT column encodings.
//!
//! Money is stored as decimal strings and timestamps as RFC 3339 strings;
//! reads are lenient so one corrupted cell cannot poison a whole listing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

pub(crate) fn json_list_to_db(values: &[Value]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

pub(crate) fn json_list_from_db(raw: &str) -> Vec<Value> {
    serde_json::from_str(raw).unwrap_or_default()
}

pub(crate) fn json_opt_to_db(value: &Option<Value>) -> Option<String> {
    value
        .as_ref()
        .and_then(|v| serde_json::to_string(v).ok())
}

pub(crate) fn json_opt_from_db(raw: Option<&str>) -> Option<Value> {
    raw.and_then(|r| serde_json::from_str(r).ok())
}

pub(crate) fn datetime_to_db(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(|dt| dt.to_rfc3339())
}

pub(crate) fn datetime_from_db(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|r| DateTime::parse_from_rfc3339(r).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

pub(crate) fn decimal_to_db(value: Decimal) -> String {
    value.to_string()
}

pub(crate) fn decimal_from_db(raw: &str) -> Decimal {
    Decimal::from_str(raw).unwrap_or(Decimal::ZERO)
}
