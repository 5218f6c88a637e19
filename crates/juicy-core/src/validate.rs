//! Document validation against the content schema.
//!
//! Validation is a pure function of the schema and the raw front-matter
//! mapping: every declared field is checked, coerced and defaulted, and all
//! violations are returned together.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    content::{Page, Post, Record},
    schema::{CollectionKind, FieldDef, FieldKind, LocaleSet, Presence, Schema, fields},
};

/// Untyped front-matter value.
pub use serde_yaml::Value as RawValue;

/// Untyped front-matter mapping, keyed by field name.
pub type RawDocument = BTreeMap<String, RawValue>;

/// A single reason a document does not conform to its collection schema.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason")]
pub enum Violation {
    /// A required field is absent.
    #[serde(rename = "missing")]
    #[error("{field}: missing")]
    MissingRequiredField { field: String },

    /// A field is present but cannot be coerced to its declared type.
    #[serde(rename = "type mismatch")]
    #[error("{field}: type mismatch (expected {expected}, got {got})")]
    TypeMismatch {
        field: String,
        expected: String,
        got: String,
    },

    /// A locale value outside the closed set.
    #[serde(rename = "not in enum")]
    #[error("{field}: not in enum ({value:?} is not one of {})", .allowed.join(", "))]
    EnumViolation {
        field: String,
        value: String,
        allowed: Vec<String>,
    },
}

impl Violation {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
        }
    }

    pub fn mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
            got: got.into(),
        }
    }

    pub fn not_in_enum(field: impl Into<String>, value: impl Into<String>, allowed: &[String]) -> Self {
        Self::EnumViolation {
            field: field.into(),
            value: value.into(),
            allowed: allowed.to_vec(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            Self::MissingRequiredField { field }
            | Self::TypeMismatch { field, .. }
            | Self::EnumViolation { field, .. } => field,
        }
    }
}

/// Validate a raw document as a member of `kind`.
///
/// On success every declared field is present in the returned record, with
/// `tags` defaulted to `[]` and `lang` to the default locale when the schema
/// carries locales. On failure the full violation list is returned.
pub fn validate(
    schema: &Schema,
    kind: CollectionKind,
    raw: &RawDocument,
) -> std::result::Result<Record, Vec<Violation>> {
    let collection = schema.collection(kind);
    let mut values = FieldValues::default();
    let mut violations = Vec::new();

    for field in &collection.fields {
        if let Some(value) = check_field(field, raw.get(field.name), schema.locales(), &mut violations)
        {
            values.0.insert(field.name, value);
        }
    }

    if !violations.is_empty() {
        return Err(violations);
    }

    let record = match kind {
        CollectionKind::Posts => values.into_post().map(Record::Post),
        CollectionKind::Pages => values.into_page().map(Record::Page),
    };
    record.map_err(|v| vec![v])
}

/// A coerced field value.
#[derive(Debug, Clone, PartialEq)]
enum Coerced {
    Text(String),
    Date(DateTime<Utc>),
    Tags(Vec<String>),
}

/// Coerced values of one document, consumed when building the record.
#[derive(Debug, Default)]
struct FieldValues(HashMap<&'static str, Coerced>);

impl FieldValues {
    fn text(&mut self, name: &'static str) -> Option<String> {
        match self.0.remove(name) {
            Some(Coerced::Text(s)) => Some(s),
            _ => None,
        }
    }

    fn required_text(&mut self, name: &'static str) -> Result<String, Violation> {
        self.text(name).ok_or_else(|| Violation::missing(name))
    }

    fn required_date(&mut self, name: &'static str) -> Result<DateTime<Utc>, Violation> {
        match self.0.remove(name) {
            Some(Coerced::Date(d)) => Ok(d),
            _ => Err(Violation::missing(name)),
        }
    }

    fn tags(&mut self, name: &'static str) -> Vec<String> {
        match self.0.remove(name) {
            Some(Coerced::Tags(tags)) => tags,
            _ => Vec::new(),
        }
    }

    fn into_post(mut self) -> Result<Post, Violation> {
        Ok(Post {
            title: self.required_text(fields::TITLE)?,
            published_at: self.required_date(fields::PUBLISHED_AT)?,
            summary: self.required_text(fields::SUMMARY)?,
            image: self.text(fields::IMAGE),
            tags: self.tags(fields::TAGS),
            lang: self.text(fields::LANG),
        })
    }

    fn into_page(mut self) -> Result<Page, Violation> {
        Ok(Page {
            title: self.required_text(fields::TITLE)?,
            lang: self.text(fields::LANG),
        })
    }
}

/// Check one field, pushing any violations. Returns the coerced (or
/// defaulted) value, or `None` when the field has no value.
fn check_field(
    field: &FieldDef,
    raw: Option<&RawValue>,
    locales: Option<&LocaleSet>,
    violations: &mut Vec<Violation>,
) -> Option<Coerced> {
    // An explicit null is how YAML spells an empty key.
    let Some(value) = raw.filter(|v| !v.is_null()) else {
        return match field.presence {
            Presence::Required => {
                violations.push(Violation::missing(field.name));
                None
            }
            Presence::Optional => None,
            Presence::Defaulted => default_for(field, locales),
        };
    };

    let result = match &field.kind {
        FieldKind::Slug | FieldKind::Text => coerce_text(value).map(Coerced::Text),
        FieldKind::Image { .. } => match value.as_str() {
            Some(s) if s.trim().is_empty() => return None,
            Some(s) => Ok(Coerced::Text(s.to_string())),
            None => Err(("text".to_string(), describe(value))),
        },
        FieldKind::Date => coerce_date(value).map(Coerced::Date),
        FieldKind::Tags => return coerce_tags(field.name, value, violations).map(Coerced::Tags),
        FieldKind::Locale => match (value.as_str(), locales) {
            (Some(s), Some(set)) if !set.contains(s) => {
                violations.push(Violation::not_in_enum(field.name, s, set.allowed()));
                return None;
            }
            (Some(s), _) => Ok(Coerced::Text(s.to_string())),
            (None, _) => Err(("locale tag".to_string(), describe(value))),
        },
    };

    match result {
        Ok(v) => Some(v),
        Err((expected, got)) => {
            violations.push(Violation::mismatch(field.name, expected, got));
            None
        }
    }
}

fn default_for(field: &FieldDef, locales: Option<&LocaleSet>) -> Option<Coerced> {
    match field.kind {
        FieldKind::Tags => Some(Coerced::Tags(Vec::new())),
        FieldKind::Locale => locales.map(|set| Coerced::Text(set.default_locale().to_string())),
        _ => None,
    }
}

type Mismatch = (String, String);

fn coerce_text(value: &RawValue) -> Result<String, Mismatch> {
    match value.as_str() {
        Some(s) if s.trim().is_empty() => Err(("non-empty text".into(), "empty text".into())),
        Some(s) => Ok(s.to_string()),
        None => Err(("non-empty text".into(), describe(value))),
    }
}

/// Coerce a date-like value to UTC.
///
/// Text is tried as RFC 3339, then as ISO 8601 with an offset, then as a
/// naive date-time, then as a plain `YYYY-MM-DD` date (midnight UTC). Numbers
/// are milliseconds since the epoch. Years must fall within `0..=9999` so the
/// RFC 3339 form written back to front-matter parses again.
pub fn coerce_date(value: &RawValue) -> Result<DateTime<Utc>, (String, String)> {
    let expected = || "date".to_string();

    let date = match value {
        RawValue::String(s) => {
            parse_date_text(s.trim()).ok_or_else(|| (expected(), format!("text {s:?}")))?
        }
        RawValue::Number(n) => {
            let millis = n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64));
            millis
                .and_then(DateTime::from_timestamp_millis)
                .ok_or_else(|| (expected(), format!("number {n}")))?
        }
        other => return Err((expected(), describe(other))),
    };

    if !(0..=MAX_YEAR).contains(&date.year()) {
        return Err(("date in range".to_string(), format!("year {}", date.year())));
    }

    Ok(date)
}

const MAX_YEAR: i32 = 9999;

const OFFSET_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f %:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

fn parse_date_text(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // A `Z` suffix is UTC, which is how naive text is read anyway.
    let naive_text = s.strip_suffix(['Z', 'z']).unwrap_or(s);
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(naive_text, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn coerce_tags(
    name: &str,
    value: &RawValue,
    violations: &mut Vec<Violation>,
) -> Option<Vec<String>> {
    let Some(items) = value.as_sequence() else {
        violations.push(Violation::mismatch(
            name,
            "sequence of text",
            describe(value),
        ));
        return None;
    };

    let before = violations.len();
    let tags: Vec<String> = items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| match item.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                violations.push(Violation::mismatch(format!("{name}[{i}]"), "text", describe(item)));
                None
            }
        })
        .collect();

    (violations.len() == before).then_some(tags)
}

/// Human-readable name of a raw value's type.
fn describe(value: &RawValue) -> String {
    match value {
        RawValue::Null => "null",
        RawValue::Bool(_) => "boolean",
        RawValue::Number(_) => "number",
        RawValue::String(_) => "text",
        RawValue::Sequence(_) => "sequence",
        RawValue::Mapping(_) => "mapping",
        RawValue::Tagged(_) => "tagged value",
    }
    .to_string()
}
