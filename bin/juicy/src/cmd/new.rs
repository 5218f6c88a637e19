//! New command - create a new document in a collection

use std::{fs, path::Path};

use chrono::Utc;
use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use juicy_core::{
    CollectionKind, RawDocument, RawValue, Record, Schema, schema::fields, validate,
};

use super::{content_dir, load_config};

/// Options for a new document.
#[derive(Debug, Default)]
pub struct NewDocument<'a> {
    pub collection: &'a str,
    pub slug: &'a str,
    pub title: Option<&'a str>,
    pub lang: Option<&'a str>,
}

/// Run the new command.
///
/// Writes a document whose front-matter already passes validation.
pub fn run(config_path: &Path, doc: &NewDocument<'_>) -> Result<()> {
    tracing::info!(?config_path, collection = doc.collection, slug = doc.slug, "Creating new content");

    let config = load_config(config_path)?;
    let schema = Schema::from_config(&config)?;
    let kind: CollectionKind = doc.collection.parse()?;

    let slug = doc.slug.trim_matches('/');
    if slug.is_empty() {
        bail!("Slug cannot be empty");
    }

    let file_path = content_dir(config_path, &config)
        .join(kind.name())
        .join(format!("{slug}.md"));
    if file_path.exists() {
        bail!("{} already exists", file_path.display());
    }

    let record = build_record(&schema, kind, slug, doc)?;
    let text = record.to_document("Write your content here.\n")?;

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).wrap_err("Failed to create directories")?;
    }
    fs::write(&file_path, text).wrap_err("Failed to write file")?;

    tracing::info!(?file_path, "Created new content file");
    println!("Created: {}", file_path.display());

    Ok(())
}

/// Build the front-matter through the validator so defaults and the locale
/// check apply exactly as they do at build time.
fn build_record(
    schema: &Schema,
    kind: CollectionKind,
    slug: &str,
    doc: &NewDocument<'_>,
) -> Result<Record> {
    let title = doc
        .title
        .map(str::to_string)
        .unwrap_or_else(|| title_from_slug(slug));

    let mut raw = RawDocument::new();
    raw.insert(fields::TITLE.to_string(), RawValue::String(title));

    if kind == CollectionKind::Posts {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        raw.insert(fields::PUBLISHED_AT.to_string(), RawValue::String(today));
        raw.insert(
            fields::SUMMARY.to_string(),
            RawValue::String("Write a short summary.".to_string()),
        );
    }

    if let Some(lang) = doc.lang {
        raw.insert(fields::LANG.to_string(), RawValue::String(lang.to_string()));
    }

    validate(schema, kind, &raw).map_err(|violations| {
        let details: Vec<String> = violations.iter().map(ToString::to_string).collect();
        eyre!("Invalid document: {}", details.join("; "))
    })
}

fn title_from_slug(slug: &str) -> String {
    let stem = slug.rsplit('/').next().unwrap_or(slug);
    let title = stem.replace(['-', '_'], " ");
    if title.trim().is_empty() {
        "Untitled".to_string()
    } else {
        title
    }
}
