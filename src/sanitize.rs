//! Coercion of loosely typed client JSON into typed record fields.
//!
//! Every recognized field is listed once in [`RECORD_FIELDS`]; the create and
//! update paths both go through [`sanitize`] and differ only in how they treat
//! blank values.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

pub const ORDINAL_MAX: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Float,
    /// Symptom rating on the 0..=4 scale.
    Ordinal,
    Date,
    Text,
}

#[derive(Debug)]
pub struct FieldDef {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldDef {
    FieldDef { name, aliases: &[], kind }
}

pub const RECORD_FIELDS: &[FieldDef] = &[
    field("lh", FieldKind::Float),
    field("estrogen", FieldKind::Float),
    field("pdg", FieldKind::Float),
    field("overall_score", FieldKind::Float),
    FieldDef {
        name: "deep_sleep_minutes",
        aliases: &["deep_sleep_in_minutes"],
        kind: FieldKind::Float,
    },
    field("avg_resting_heart_rate", FieldKind::Float),
    field("stress_score", FieldKind::Float),
    field("daily_steps", FieldKind::Float),
    field("cramps", FieldKind::Ordinal),
    field("fatigue", FieldKind::Ordinal),
    field("moodswing", FieldKind::Ordinal),
    field("stress", FieldKind::Ordinal),
    field("bloating", FieldKind::Ordinal),
    field("sleepissue", FieldKind::Ordinal),
    field("last_period_date", FieldKind::Date),
    field("daily_note", FieldKind::Text),
];

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Integer(i32),
    Date(NaiveDate),
    Text(String),
    /// Explicit clear of a stored value.
    Null,
}

/// What to do with a recognized field sent as `null` or `""`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankPolicy {
    /// Treat it as absent (create path).
    Skip,
    /// Clear the stored value (update path).
    Clear,
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("invalid {field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Cleaned column → value mapping, keyed by canonical column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordChanges {
    fields: BTreeMap<&'static str, FieldValue>,
}

impl RecordChanges {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn insert(&mut self, name: &'static str, value: FieldValue) {
        self.fields.insert(name, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// Parses a `YYYY-MM-DD` date, naming `field` on failure.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ValidationError> {
    if !DATE_PATTERN.is_match(raw) {
        return Err(ValidationError::new(field, "expected a date in YYYY-MM-DD format"));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ValidationError::new(field, format!("{raw} is not a calendar date")))
}

/// Reads an optional date field; a present but malformed value is an error.
pub fn date_field(
    input: &Map<String, Value>,
    field: &str,
) -> Result<Option<NaiveDate>, ValidationError> {
    match input.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => parse_date(field, s.trim()).map(Some),
        Some(_) => Err(ValidationError::new(field, "expected a date string")),
    }
}

/// Converts every recognized field of `input` to its declared type.
///
/// Numeric fields that fail to convert are dropped silently. Dates are
/// strict: a malformed date fails the whole call.
pub fn sanitize(
    input: &Map<String, Value>,
    policy: BlankPolicy,
) -> Result<RecordChanges, ValidationError> {
    let mut changes = RecordChanges::default();

    for column in RECORD_FIELDS {
        let Some((key, raw)) = lookup(input, column) else {
            continue;
        };

        if is_blank(raw) {
            if policy == BlankPolicy::Clear {
                changes.insert(column.name, FieldValue::Null);
            }
            continue;
        }

        let converted = match column.kind {
            FieldKind::Float => to_float(raw).map(FieldValue::Float),
            FieldKind::Ordinal => to_ordinal(raw).map(FieldValue::Integer),
            FieldKind::Text => raw.as_str().map(|s| FieldValue::Text(s.trim().to_string())),
            FieldKind::Date => match raw {
                Value::String(s) => Some(FieldValue::Date(parse_date(key, s.trim())?)),
                _ => return Err(ValidationError::new(key, "expected a date string")),
            },
        };

        match converted {
            Some(value) => changes.insert(column.name, value),
            None => tracing::debug!(field = key, value = %raw, "dropping unconvertible field"),
        }
    }

    Ok(changes)
}

fn lookup<'a>(input: &'a Map<String, Value>, column: &FieldDef) -> Option<(&'a str, &'a Value)> {
    std::iter::once(column.name)
        .chain(column.aliases.iter().copied())
        .find_map(|name| input.get_key_value(name))
        .map(|(k, v)| (k.as_str(), v))
}

fn is_blank(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn to_float(raw: &Value) -> Option<f64> {
    let v = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

fn to_ordinal(raw: &Value) -> Option<i32> {
    let v = match raw {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => {
                let f = n.as_f64()?;
                if !f.is_finite() {
                    return None;
                }
                f.trunc() as i64
            }
        },
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    i32::try_from(v).ok().filter(|v| (0..=ORDINAL_MAX).contains(v))
}
