//! Typed filter values.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::schema::ScalarKind;

/// One decoded filter value, typed by the attribute's [`ScalarKind`].
///
/// Decimals keep their original text so no precision is lost before a
/// backend binds them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Str(String),
    Int(i64),
    Float(f64),
    Decimal(String),
    Bool(bool),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Uuid(Uuid),
}

impl FilterValue {
    /// Coerces one raw wire string into a value of `kind`.
    pub fn parse(kind: ScalarKind, raw: &str) -> Result<FilterValue, ValueError> {
        match kind {
            ScalarKind::Str => Ok(FilterValue::Str(raw.to_owned())),
            ScalarKind::Int => raw
                .parse::<i64>()
                .map(FilterValue::Int)
                .map_err(|_| ValueError::new("value is not a valid integer")),
            ScalarKind::Float => raw
                .parse::<f64>()
                .map(FilterValue::Float)
                .map_err(|_| ValueError::new("value is not a valid float")),
            ScalarKind::Decimal => parse_decimal(raw),
            ScalarKind::Bool => parse_bool(raw)
                .map(FilterValue::Bool)
                .ok_or_else(|| ValueError::new("value could not be parsed to a boolean")),
            ScalarKind::Date => raw
                .parse::<NaiveDate>()
                .map(FilterValue::Date)
                .map_err(|_| ValueError::new("invalid date format")),
            ScalarKind::DateTime => DateTime::parse_from_rfc3339(raw)
                .map(|ts| FilterValue::DateTime(ts.with_timezone(&Utc)))
                .map_err(|_| ValueError::new("invalid datetime format")),
            ScalarKind::Uuid => Uuid::parse_str(raw)
                .map(FilterValue::Uuid)
                .map_err(|_| ValueError::new("value is not a valid uuid")),
        }
    }
}

/// `true`/`false`/`1`/`0`, case-insensitive.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") || raw == "1" {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") || raw == "0" {
        Some(false)
    } else {
        None
    }
}

/// Optional sign, at most one point, at least one digit, nothing else. No
/// exponent form: the text is kept verbatim and must stay unambiguous.
fn parse_decimal(raw: &str) -> Result<FilterValue, ValueError> {
    const ERROR: &str = "value is not a valid decimal";

    let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    let mut seen_digit = false;
    let mut seen_point = false;
    for c in digits.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_point => seen_point = true,
            _ => return Err(ValueError::new(ERROR)),
        }
    }
    if seen_digit {
        Ok(FilterValue::Decimal(raw.to_owned()))
    } else {
        Err(ValueError::new(ERROR))
    }
}

/// A raw wire string failed coercion to its declared kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValueError {
    message: &'static str,
}

impl ValueError {
    const fn new(message: &'static str) -> Self {
        ValueError { message }
    }

    pub fn message(&self) -> &'static str {
        self.message
    }
}
