//! Front-matter splitting and parsing for content files.
//!
//! Front-matter is read into the untyped [`RawDocument`] model; typing and
//! defaulting happen in [`crate::validate`].

use std::path::Path;

use crate::{
    error::{CoreError, Result},
    validate::{RawDocument, RawValue},
};

/// Delimiter types for frontmatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontmatterFormat {
    /// YAML frontmatter delimited by `---`.
    Yaml,
    /// TOML frontmatter delimited by `+++`.
    Toml,
}

impl FrontmatterFormat {
    /// Get the delimiter string for this format.
    pub fn delimiter(&self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }
}

/// Split content into frontmatter and body.
///
/// The closing delimiter must start a line.
pub fn split_frontmatter(content: &str) -> Option<(FrontmatterFormat, &str, &str)> {
    let content = content.trim_start_matches('\u{feff}').trim_start();

    let format = if content.starts_with("---") {
        FrontmatterFormat::Yaml
    } else if content.starts_with("+++") {
        FrontmatterFormat::Toml
    } else {
        return None;
    };

    let delimiter = format.delimiter();
    let after_first = &content[delimiter.len()..];

    let closing = format!("\n{delimiter}");
    let closing_pos = after_first.find(&closing)?;

    let frontmatter = after_first[..closing_pos].trim();
    let body = after_first[closing_pos + closing.len()..].trim_start();

    Some((format, frontmatter, body))
}

/// Parse a document into its raw front-matter mapping and body.
///
/// A document without front-matter yields an empty mapping and the full text
/// as body, so validation reports the missing fields.
pub fn parse_document(content: &str, path: &Path) -> Result<(RawDocument, String)> {
    let Some((format, fm_str, body)) = split_frontmatter(content) else {
        return Ok((RawDocument::new(), content.to_string()));
    };

    let raw = parse_raw(format, fm_str).map_err(|e| CoreError::frontmatter(path, e))?;
    Ok((raw, body.to_string()))
}

/// Parse a front-matter block (without delimiters) in the given format.
pub fn parse_raw(format: FrontmatterFormat, text: &str) -> std::result::Result<RawDocument, String> {
    if text.trim().is_empty() {
        return Ok(RawDocument::new());
    }

    match format {
        FrontmatterFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        FrontmatterFormat::Toml => {
            let table: toml::Table = toml::from_str(text).map_err(|e| e.to_string())?;
            Ok(table
                .into_iter()
                .map(|(key, value)| (key, toml_to_raw(value)))
                .collect())
        }
    }
}

/// Convert a TOML value into the raw model. Date literals become their
/// canonical text, which the date coercion accepts.
fn toml_to_raw(value: toml::Value) -> RawValue {
    match value {
        toml::Value::String(s) => RawValue::String(s),
        toml::Value::Integer(i) => RawValue::Number(i.into()),
        toml::Value::Float(f) => RawValue::Number(f.into()),
        toml::Value::Boolean(b) => RawValue::Bool(b),
        toml::Value::Datetime(dt) => RawValue::String(dt.to_string()),
        toml::Value::Array(items) => {
            RawValue::Sequence(items.into_iter().map(toml_to_raw).collect())
        }
        toml::Value::Table(table) => RawValue::Mapping(
            table
                .into_iter()
                .map(|(k, v)| (RawValue::String(k), toml_to_raw(v)))
                .collect(),
        ),
    }
}
