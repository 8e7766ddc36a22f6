//! Date inputs accepted by historical lookups

use crate::core::error::{FxError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use serde_json::Value;
use std::fmt::Display;

/// A date in one of the shapes callers hand us.
///
/// Each shape is normalized to a `YYYY-MM-DD` string with [`DateInput::to_iso`].
/// Text is taken verbatim up to its first 10 characters, so an ISO timestamp
/// like `2024-09-01T10:00:00` becomes `2024-09-01`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl DateInput {
    pub fn to_iso(&self) -> String {
        match self {
            DateInput::Text(text) => text.chars().take(10).collect(),
            DateInput::Date(date) => date.format("%Y-%m-%d").to_string(),
            DateInput::DateTime(datetime) => datetime.date().format("%Y-%m-%d").to_string(),
        }
    }
}

impl Display for DateInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_iso())
    }
}

impl From<&str> for DateInput {
    fn from(text: &str) -> Self {
        DateInput::Text(text.to_string())
    }
}

impl From<String> for DateInput {
    fn from(text: String) -> Self {
        DateInput::Text(text)
    }
}

impl From<NaiveDate> for DateInput {
    fn from(date: NaiveDate) -> Self {
        DateInput::Date(date)
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(datetime: NaiveDateTime) -> Self {
        DateInput::DateTime(datetime)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DateInput {
    fn from(datetime: DateTime<Tz>) -> Self {
        DateInput::DateTime(datetime.naive_local())
    }
}

/// Loosely typed values (config files, JSON payloads) only convert when they
/// hold a string.
impl TryFrom<&Value> for DateInput {
    type Error = FxError;

    fn try_from(value: &Value) -> Result<Self> {
        let kind = match value {
            Value::String(text) => return Ok(DateInput::Text(text.clone())),
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        };
        Err(FxError::UnsupportedDateInput(format!(
            "expected a date string, got {kind}: {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_text_is_truncated_to_ten_chars() {
        assert_eq!(DateInput::from("2024-09-01T10:00:00").to_iso(), "2024-09-01");
        assert_eq!(DateInput::from("2024-09-01").to_iso(), "2024-09-01");
        // Short or non-date text passes through untouched
        assert_eq!(DateInput::from("latest").to_iso(), "latest");
    }

    #[test]
    fn test_date_and_datetime_shapes() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        assert_eq!(DateInput::from(date).to_iso(), "2024-09-01");

        let datetime = date.and_hms_opt(23, 59, 59).unwrap();
        assert_eq!(DateInput::from(datetime).to_iso(), "2024-09-01");

        let utc = Utc.from_utc_datetime(&datetime);
        assert_eq!(DateInput::from(utc).to_iso(), "2024-09-01");
    }

    #[test]
    fn test_try_from_value() {
        let input = DateInput::try_from(&json!("2024-09-01")).unwrap();
        assert_eq!(input, DateInput::Text("2024-09-01".to_string()));

        for value in [json!(20240901), json!(null), json!(true), json!(["2024-09-01"])] {
            let err = DateInput::try_from(&value).unwrap_err();
            assert!(
                matches!(err, FxError::UnsupportedDateInput(_)),
                "unexpected error for {value}: {err}"
            );
        }
    }
}
