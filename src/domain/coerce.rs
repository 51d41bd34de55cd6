//! Lenient conversion of loosely-typed form input.
//!
//! The frontend posts numbers as strings (`"40"`, `"3"`) and clears optional
//! fields with `""`. These helpers accept that shape and fold it into the
//! typed values the store expects.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoerceError {
    #[error("{0} invalide")]
    InvalidId(&'static str),

    #[error("{0} invalide")]
    InvalidDate(&'static str),
}

/// Deserializes a field so that an explicit `null` stays distinguishable from
/// an absent key: absent → `None` (via `#[serde(default)]`), `null` →
/// `Some(Value::Null)`.
pub fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Typed counterpart of [`present`] for nullable columns: absent → `None`,
/// `null` → `Some(None)`, a value → `Some(Some(v))`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Integer prefix of a value, the way a form's `parseInt` reads it.
///
/// Numbers are truncated; strings yield their leading (optionally signed)
/// digits after whitespace; everything else has no integer.
pub fn lenient_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => leading_int(s),
        _ => None,
    }
}

fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let digits: &str = &rest[..rest.bytes().take_while(u8::is_ascii_digit).count()];
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok().map(|n| sign * n)
}

/// Progress percentage: unparseable input is 0, the result is kept in [0, 100].
pub fn progress(value: &Value) -> i32 {
    clamp_progress(lenient_int(value).unwrap_or(0))
}

pub fn clamp_progress(value: i64) -> i32 {
    value.clamp(0, 100) as i32
}

/// Optional foreign key. `null` and `""` clear it, anything else must parse.
pub fn nullable_id(value: &Value, field: &'static str) -> Result<Option<i32>, CoerceError> {
    if is_blank(value) {
        return Ok(None);
    }
    required_id(value, field).map(Some)
}

pub fn required_id(value: &Value, field: &'static str) -> Result<i32, CoerceError> {
    lenient_int(value)
        .and_then(|n| i32::try_from(n).ok())
        .ok_or(CoerceError::InvalidId(field))
}

/// Optional date. Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` (read as UTC),
/// a bare `YYYY-MM-DD` (midnight UTC) or epoch milliseconds.
pub fn nullable_date(
    value: &Value,
    field: &'static str,
) -> Result<Option<DateTime<Utc>>, CoerceError> {
    if is_blank(value) {
        return Ok(None);
    }
    let parsed = match value {
        Value::String(s) => parse_date(s.trim()),
        Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    };
    parsed.map(Some).ok_or(CoerceError::InvalidDate(field))
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
