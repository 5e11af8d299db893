//! Defensive coercion of loosely-typed remote payload values.
//!
//! The CRM API is inconsistent about value shapes: monetary amounts arrive as
//! numbers or strings, timestamps arrive as full ISO datetimes, date-only
//! strings, or epoch milliseconds. These helpers are total over any
//! structurally-plausible input and fall back to documented defaults instead
//! of failing a whole record.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Parse a monetary value, defaulting to `default` for missing or
/// non-numeric input.
pub fn parse_decimal(value: Option<&Value>, default: Decimal) -> Decimal {
    let Some(value) = value else {
        return default;
    };
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Decimal::from(i)
            } else {
                n.as_f64()
                    .and_then(|f| Decimal::try_from(f).ok())
                    .unwrap_or(default)
            }
        }
        Value::String(s) => Decimal::from_str(s.trim()).unwrap_or(default),
        _ => default,
    }
}

/// Parse a timestamp that may be a full ISO-8601 datetime or a date-only
/// string. Date-only values are normalized to midnight UTC. Unparseable or
/// absent values yield `None` rather than a fabricated date.
pub fn parse_datetime_flexible(value: Option<&Value>) -> Option<DateTime<Utc>> {
    let raw = match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim(),
        _ => return None,
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Naive datetime without offset, e.g. "2024-05-01T10:30:00"
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(DateTime::from_naive_utc_and_offset(naive, Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return Some(DateTime::from_naive_utc_and_offset(midnight, Utc));
    }
    None
}

/// Coerce a pagination timestamp cursor to epoch milliseconds.
///
/// Strings are parsed as ISO-8601 first, then as a literal numeric epoch;
/// numbers are taken as-is. `None` means the cursor should be omitted for
/// the next page rather than aborting the fetch.
pub fn parse_epoch_millis(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => {
            let raw = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
                return Some(dt.timestamp_millis());
            }
            raw.parse::<f64>().ok().map(|f| f as i64)
        }
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    }
}

/// Extract a trimmed, non-empty string from a JSON value.
pub fn as_clean_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse an integer attribute, yielding `None` for anything non-numeric.
pub fn parse_int(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|i| i32::try_from(i).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}
