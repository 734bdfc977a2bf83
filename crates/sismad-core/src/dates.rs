//! # Date Coercion
//!
//! Stored documents carry dates in several shapes, depending on which screen
//! (and which year) wrote them:
//!
//! ```text
//! ┌──────────────────────────────┬──────────────────────────────────────────┐
//! │ Stored value                 │ Example                                  │
//! ├──────────────────────────────┼──────────────────────────────────────────┤
//! │ ISO-8601 / RFC 3339 string   │ "2024-03-05", "2024-03-05T10:00:00-03:00"│
//! │ Brazilian date string        │ "05/03/2024"                             │
//! │ Timestamp object             │ {"seconds": 1709647200, "nanoseconds": 0}│
//! │ Epoch milliseconds           │ 1709647200000                            │
//! └──────────────────────────────┴──────────────────────────────────────────┘
//! ```
//!
//! [`parse_date`] and [`parse_timestamp`] are the single entry points; the
//! `deserialize_*` helpers plug them into serde so each document field is
//! coerced exactly once, at load time.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// Why a stored date could not be read.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DateParseError {
    #[error("unsupported date representation: {0}")]
    UnsupportedType(String),

    #[error("unrecognized date text: '{0}'")]
    InvalidText(String),

    #[error("timestamp out of range: {0}")]
    OutOfRange(String),
}

/// Coerces any supported stored representation to a UTC instant.
///
/// Date-only strings resolve to midnight UTC.
pub fn parse_timestamp(value: &Value) -> Result<DateTime<Utc>, DateParseError> {
    match value {
        Value::String(text) => parse_timestamp_text(text),
        Value::Number(number) => {
            let millis = number
                .as_i64()
                .or_else(|| number.as_f64().map(|f| f.round() as i64))
                .ok_or_else(|| DateParseError::OutOfRange(number.to_string()))?;
            Utc.timestamp_millis_opt(millis)
                .single()
                .ok_or_else(|| DateParseError::OutOfRange(millis.to_string()))
        }
        Value::Object(map) => {
            let seconds = map
                .get("seconds")
                .or_else(|| map.get("_seconds"))
                .and_then(Value::as_i64)
                .ok_or_else(|| DateParseError::UnsupportedType(value.to_string()))?;
            let nanos = map
                .get("nanoseconds")
                .or_else(|| map.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            let nanos = u32::try_from(nanos)
                .map_err(|_| DateParseError::OutOfRange(value.to_string()))?;
            Utc.timestamp_opt(seconds, nanos)
                .single()
                .ok_or_else(|| DateParseError::OutOfRange(value.to_string()))
        }
        other => Err(DateParseError::UnsupportedType(other.to_string())),
    }
}

/// Coerces any supported stored representation to a calendar date.
///
/// Strings keep the date as written (an RFC 3339 value keeps the date in its
/// own offset); timestamps and epoch numbers use the UTC date.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use serde_json::json;
/// use sismad_core::dates::parse_date;
///
/// let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
/// assert_eq!(parse_date(&json!("2024-03-05")).unwrap(), expected);
/// assert_eq!(parse_date(&json!("05/03/2024")).unwrap(), expected);
/// assert_eq!(parse_date(&json!({"seconds": 1709647200, "nanoseconds": 0})).unwrap(), expected);
/// assert_eq!(parse_date(&json!(1709647200000_i64)).unwrap(), expected);
/// assert!(parse_date(&json!(true)).is_err());
/// ```
pub fn parse_date(value: &Value) -> Result<NaiveDate, DateParseError> {
    match value {
        Value::String(text) => parse_date_text(text),
        other => parse_timestamp(other).map(|ts| ts.date_naive()),
    }
}

fn parse_date_text(text: &str) -> Result<NaiveDate, DateParseError> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%d/%m/%Y") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.date_naive());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.date());
    }
    Err(DateParseError::InvalidText(text.to_string()))
}

fn parse_timestamp_text(text: &str) -> Result<DateTime<Utc>, DateParseError> {
    let trimmed = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    let date = parse_date_text(trimmed)?;
    Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

// =============================================================================
// Serde Adapters
// =============================================================================

/// `#[serde(deserialize_with = "...")]` adapter for `NaiveDate` fields.
pub fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_date(&value).map_err(serde::de::Error::custom)
}

/// Adapter for `Option<NaiveDate>` fields; `null` and absent map to `None`.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => parse_date(&v).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Adapter for `DateTime<Utc>` fields.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_timestamp(&value).map_err(serde::de::Error::custom)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_rfc3339_keeps_local_date() {
        // 22:30 in Brasília is already the next day in UTC
        let value = json!("2024-03-05T22:30:00-03:00");
        assert_eq!(parse_date(&value).unwrap(), ymd(2024, 3, 5));
        assert_eq!(
            parse_timestamp(&value).unwrap().date_naive(),
            ymd(2024, 3, 6)
        );
    }

    #[test]
    fn test_underscore_timestamp_object() {
        let value = json!({"_seconds": 1709647200, "_nanoseconds": 500});
        let ts = parse_timestamp(&value).unwrap();
        assert_eq!(ts.timestamp(), 1709647200);
        assert_eq!(ts.timestamp_subsec_nanos(), 500);
    }

    #[test]
    fn test_naive_datetime_string() {
        let ts = parse_timestamp(&json!("2024-03-05T10:15:00")).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-05T10:15:00+00:00");
    }

    #[test]
    fn test_date_only_timestamp_is_midnight() {
        let ts = parse_timestamp(&json!("2024-03-05")).unwrap();
        assert_eq!(ts.timestamp() % 86_400, 0);
    }

    #[test]
    fn test_failures() {
        assert!(matches!(
            parse_date(&json!("ontem")),
            Err(DateParseError::InvalidText(_))
        ));
        assert!(matches!(
            parse_date(&json!({"foo": 1})),
            Err(DateParseError::UnsupportedType(_))
        ));
        assert!(matches!(
            parse_date(&json!(null)),
            Err(DateParseError::UnsupportedType(_))
        ));
        assert!(matches!(
            parse_date(&json!("31/02/2024")),
            Err(DateParseError::InvalidText(_))
        ));
    }

    #[test]
    fn test_serde_adapters() {
        #[derive(Deserialize)]
        struct Doc {
            #[serde(deserialize_with = "deserialize_date")]
            date: NaiveDate,
            #[serde(default, deserialize_with = "deserialize_optional_date")]
            valid_until: Option<NaiveDate>,
        }

        let doc: Doc = serde_json::from_value(json!({"date": "05/03/2024"})).unwrap();
        assert_eq!(doc.date, ymd(2024, 3, 5));
        assert_eq!(doc.valid_until, None);

        let doc: Doc = serde_json::from_value(json!({
            "date": 1709647200000_i64,
            "valid_until": {"seconds": 1710892800}
        }))
        .unwrap();
        assert_eq!(doc.valid_until, Some(ymd(2024, 3, 20)));

        assert!(serde_json::from_value::<Doc>(json!({"date": false})).is_err());
    }
}
