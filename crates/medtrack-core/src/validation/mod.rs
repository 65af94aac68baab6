//! Schema-table validation of raw JSON input.
//!
//! Each entity has a fixed table of [`FieldRule`]s. [`validate`] walks the
//! whole table and collects every violation instead of stopping at the first
//! one. In [`Mode::Create`] every field is required; in [`Mode::Update`]
//! absent (or `null`) fields are skipped but present ones get the same
//! checks. Fields not in the table are ignored.

mod schemas;

pub use schemas::*;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::start_of_day;

/// A single violated constraint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every constraint the input violated, in table order.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Validation failed: {}", summarize(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(field, message)],
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    /// Whether any error concerns `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

pub type ValidationResult<T> = Result<T, ValidationErrors>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Update,
}

/// A bound and the message reported when it is violated.
#[derive(Debug, Clone, Copy)]
pub struct Limit<T> {
    pub value: T,
    pub message: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub enum DateCheck {
    /// Date must not be after today.
    NotInFuture { message: &'static str },
    /// Date must be on or after the given calendar day.
    NotBefore {
        year: i32,
        month: u32,
        day: u32,
        message: &'static str,
    },
    /// Midnight UTC of the date must not be earlier than `now - hours`.
    NotOlderThan { hours: i64, message: &'static str },
}

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Trimmed string with a character-count range.
    Text { min: Limit<usize>, max: Limit<usize> },
    /// `YYYY-MM-DD` or RFC 3339 timestamp.
    Date { checks: &'static [DateCheck] },
    /// Whole number with optional range.
    Integer {
        min: Limit<i64>,
        max: Option<Limit<i64>>,
        whole: &'static str,
    },
}

/// One row of a validation table.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    /// Reported in create mode when the field is missing or blank.
    pub required: &'static str,
    pub kind: FieldKind,
}

/// A field value that passed its checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    Integer(i64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Date(d) => write!(f, "{d}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
        }
    }
}

/// Validated, normalised fields keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validated {
    values: BTreeMap<&'static str, FieldValue>,
}

impl Validated {
    pub fn take_text(&mut self, field: &str) -> Option<String> {
        match self.values.remove(field) {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn take_date(&mut self, field: &str) -> Option<NaiveDate> {
        match self.values.remove(field) {
            Some(FieldValue::Date(d)) => Some(d),
            _ => None,
        }
    }

    pub fn take_integer(&mut self, field: &str) -> Option<i64> {
        match self.values.remove(field) {
            Some(FieldValue::Integer(i)) => Some(i),
            _ => None,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.values.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Check `body` against `rules`, collecting every violation.
pub fn validate(
    rules: &[FieldRule],
    body: &Value,
    mode: Mode,
    now: DateTime<Utc>,
) -> ValidationResult<Validated> {
    let Some(object) = body.as_object() else {
        return Err(ValidationErrors::single(
            "body",
            "Request body must be a JSON object",
        ));
    };

    let mut errors = Vec::new();
    let mut validated = Validated::default();

    for rule in rules {
        let raw = object.get(rule.field).filter(|v| !v.is_null());
        let Some(raw) = raw else {
            if mode == Mode::Create {
                errors.push(FieldError::new(rule.field, rule.required));
            }
            continue;
        };

        let before = errors.len();
        let value = check_field(rule, raw, mode, now, &mut errors);
        if let (Some(value), true) = (value, errors.len() == before) {
            validated.values.insert(rule.field, value);
        }
    }

    if errors.is_empty() {
        Ok(validated)
    } else {
        Err(ValidationErrors { errors })
    }
}

fn check_field(
    rule: &FieldRule,
    raw: &Value,
    mode: Mode,
    now: DateTime<Utc>,
    errors: &mut Vec<FieldError>,
) -> Option<FieldValue> {
    let mut fail = |message: &str| errors.push(FieldError::new(rule.field, message));

    match rule.kind {
        FieldKind::Text { min, max } => {
            let Some(s) = raw.as_str() else {
                fail(&format!("{} must be a string", rule.field));
                return None;
            };
            let trimmed = s.trim();
            let len = trimmed.chars().count();
            if len == 0 && mode == Mode::Create {
                fail(rule.required);
                return None;
            }
            if len < min.value {
                fail(min.message);
            }
            if len > max.value {
                fail(max.message);
            }
            Some(FieldValue::Text(trimmed.to_string()))
        }
        FieldKind::Date { checks } => {
            let Some(date) = raw.as_str().and_then(parse_date) else {
                fail(&format!("{} must be a valid date", rule.field));
                return None;
            };
            for check in checks {
                if let Some(message) = violated(check, date, now) {
                    fail(message);
                }
            }
            Some(FieldValue::Date(date))
        }
        FieldKind::Integer { min, max, whole } => {
            let Some(number) = as_number(raw) else {
                fail(&format!("{} must be a number", rule.field));
                return None;
            };
            if number < min.value as f64 {
                fail(min.message);
            }
            if let Some(max) = max {
                if number > max.value as f64 {
                    fail(max.message);
                }
            }
            if number.fract() != 0.0 {
                fail(whole);
                return None;
            }
            if number < i64::MIN as f64 || number > i64::MAX as f64 {
                fail(&format!("{} is out of range", rule.field));
                return None;
            }
            Some(FieldValue::Integer(number as i64))
        }
    }
}

fn violated(check: &DateCheck, date: NaiveDate, now: DateTime<Utc>) -> Option<&'static str> {
    match *check {
        DateCheck::NotInFuture { message } => (date > now.date_naive()).then_some(message),
        DateCheck::NotBefore {
            year,
            month,
            day,
            message,
        } => {
            let floor = NaiveDate::from_ymd_opt(year, month, day)?;
            (date < floor).then_some(message)
        }
        DateCheck::NotOlderThan { hours, message } => {
            (start_of_day(date) < now - Duration::hours(hours)).then_some(message)
        }
    }
}

/// Parse `YYYY-MM-DD`, or an RFC 3339 timestamp reduced to its UTC date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

/// JSON numbers, and strings holding a number, as `f64`.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}
