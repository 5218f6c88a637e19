//! Check command - validate configuration and content

use std::path::Path;

use color_eyre::eyre::{Result, bail};
use juicy_collector::{ContentCollector, DocumentFailure};
use juicy_core::{CmsConfig, CollectionKind, Config, Schema, cms};
use serde::Serialize;

use super::{content_dir, load_config, project_root};

/// Validation result.
#[derive(Debug, Default, Serialize)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
    failures: Vec<DocumentFailure>,
    #[serde(skip)]
    lines: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Progress line for human-readable output.
    fn note(&mut self, msg: impl Into<String>) {
        self.lines.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
///
/// Validates configuration, every content document, and the committed CMS
/// schema when one is configured.
pub fn run(config_path: &Path, strict: bool, json: bool) -> Result<()> {
    tracing::info!(?config_path, strict, "Checking configuration and content");

    let result = check(config_path);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&result);
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    if !json {
        println!();
        println!("✓ All checks passed");
    }

    Ok(())
}

fn check(config_path: &Path) -> ValidationResult {
    let mut result = ValidationResult::default();

    result.note("Checking configuration...");
    let config = match load_config(config_path) {
        Ok(c) => {
            result.note("  ✓ Configuration valid");
            c
        }
        Err(e) => {
            result.add_error(format!("Configuration error: {e:#}"));
            result.note(format!("  ✗ Configuration invalid: {e:#}"));
            return result;
        }
    };

    let schema = match Schema::from_config(&config) {
        Ok(s) => s,
        Err(e) => {
            result.add_error(format!("Schema error: {e}"));
            return result;
        }
    };

    result.note("");
    result.note("Checking content files...");
    check_content(config_path, &config, schema.clone(), &mut result);

    if let Some(file) = &config.cms.schema_file {
        result.note("");
        result.note("Checking CMS schema...");
        check_cms(&project_root(config_path).join(file), &config, &schema, &mut result);
    }

    result
}

/// Validate every document of every collection.
fn check_content(config_path: &Path, config: &Config, schema: Schema, result: &mut ValidationResult) {
    let dir = content_dir(config_path, config);

    if !dir.is_dir() {
        result.add_error(format!("Content directory missing: {}", dir.display()));
        result.note(format!("  ✗ {} missing", dir.display()));
        return;
    }

    for kind in CollectionKind::ALL {
        if !dir.join(kind.name()).is_dir() {
            result.add_warning(format!("Collection directory missing: {kind}/"));
        }
    }

    let content = match ContentCollector::new(schema, &dir).collect() {
        Ok(c) => c,
        Err(e) => {
            result.add_error(format!("Failed to collect content: {e}"));
            return;
        }
    };

    let checked = content.total();
    let failed = content.failures.len();

    if failed == 0 {
        result.note(format!(
            "  ✓ All {checked} documents valid ({} posts, {} pages)",
            content.posts.len(),
            content.pages.len()
        ));
    } else {
        result.note(format!("  ✗ {failed}/{checked} documents have errors"));
    }

    if checked == 0 {
        result.add_warning("No documents found");
    }

    for failure in content.failures {
        for message in failure.messages() {
            result.add_error(message);
        }
        result.failures.push(failure);
    }
}

/// Compare the committed CMS schema with the one derived from the content schema.
fn check_cms(path: &Path, config: &Config, schema: &Schema, result: &mut ValidationResult) {
    if !path.exists() {
        result.add_warning(format!(
            "CMS schema file not found: {} (run `juicy cms --output {}`)",
            path.display(),
            path.display()
        ));
        return;
    }

    let committed = match CmsConfig::load(path) {
        Ok(c) => c,
        Err(e) => {
            result.add_error(format!("{}: {e}", path.display()));
            return;
        }
    };

    let drift = cms::verify(&CmsConfig::derive(schema, &config.cms), &committed);
    if drift.is_empty() {
        result.note("  ✓ CMS schema matches content schema");
    } else {
        result.note(format!("  ⚠ {} difference(s) in CMS schema", drift.len()));
        for d in drift {
            result.add_warning(format!("CMS schema drift: {d}"));
        }
    }
}

fn print_report(result: &ValidationResult) {
    for line in &result.lines {
        println!("{line}");
    }

    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn site(posts: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("juicy.toml"),
            "[site]\ntitle = \"T\"\nurl = \"https://example.com\"\n",
        )
        .expect("config");

        let posts_dir = dir.path().join("src/content/posts");
        fs::create_dir_all(&posts_dir).expect("mkdir");
        fs::create_dir_all(dir.path().join("src/content/pages")).expect("mkdir");
        for (name, text) in posts {
            fs::write(posts_dir.join(name), text).expect("write");
        }
        dir
    }

    #[test]
    fn test_check_valid_site() {
        let dir = site(&[(
            "a.md",
            "---\ntitle: A\npublishedAt: 2024-01-05\nsummary: s\n---\n",
        )]);

        let result = check(&dir.path().join("juicy.toml"));
        assert!(!result.has_errors(), "{:?}", result.errors);
        assert!(!result.has_warnings(), "{:?}", result.warnings);
    }

    #[test]
    fn test_check_reports_each_violation() {
        let dir = site(&[("a.md", "---\nsummary: s\nlang: fr\n---\n")]);

        let result = check(&dir.path().join("juicy.toml"));
        assert_eq!(result.errors.len(), 3);
        assert_eq!(result.failures.len(), 1);
        assert!(result.errors.iter().any(|e| e.ends_with("title: missing")));
        assert!(result.errors.iter().any(|e| e.contains("lang: not in enum")));
    }

    #[test]
    fn test_check_missing_config() {
        let dir = tempfile::tempdir().expect("tempdir");

        let result = check(&dir.path().join("juicy.toml"));
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("Configuration error"));
    }

    #[test]
    fn test_check_warns_on_missing_cms_file() {
        let dir = site(&[]);
        fs::write(
            dir.path().join("juicy.toml"),
            "[site]\ntitle = \"T\"\nurl = \"https://example.com\"\n\n[cms]\nschema_file = \"cms.json\"\n",
        )
        .expect("config");

        let result = check(&dir.path().join("juicy.toml"));
        assert!(!result.has_errors());
        assert!(
            result
                .warnings
                .iter()
                .any(|w| w.starts_with("CMS schema file not found"))
        );
        assert!(run(&dir.path().join("juicy.toml"), true, true).is_err());
    }

    #[test]
    fn test_json_report_shape() {
        let dir = site(&[("a.md", "---\ntitle: A\nsummary: s\n---\n")]);

        let result = check(&dir.path().join("juicy.toml"));
        let json = serde_json::to_value(&result).expect("json");

        assert_eq!(json["failures"][0]["error"], "invalid");
        assert_eq!(json["failures"][0]["violations"][0]["reason"], "missing");
        assert_eq!(json["failures"][0]["violations"][0]["field"], "publishedAt");
        assert!(json.get("lines").is_none());
    }
}
