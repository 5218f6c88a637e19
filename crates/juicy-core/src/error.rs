//! Error types for the Juicy core library.

use std::path::PathBuf;

use thiserror::Error;

use crate::validate::Violation;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types for Juicy.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration loading or parsing error.
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Schema construction error (bad locale set, unknown collection).
    #[error("Schema error: {0}")]
    Schema(String),

    /// Frontmatter parsing error.
    #[error("Frontmatter error in {path}: {message}")]
    Frontmatter { path: PathBuf, message: String },

    /// Document failed schema validation.
    #[error("Invalid document {path}: {}", format_violations(.violations))]
    Invalid {
        path: PathBuf,
        violations: Vec<Violation>,
    },

    /// File system I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic configuration crate error.
    #[error("Config crate error: {0}")]
    ConfigCrate(#[from] config::ConfigError),
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl CoreError {
    /// Create a new configuration error with a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source.
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new schema error.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Create a new frontmatter error.
    pub fn frontmatter(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Frontmatter {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Wrap a violation list for a specific document.
    pub fn invalid(path: impl Into<PathBuf>, violations: Vec<Violation>) -> Self {
        Self::Invalid {
            path: path.into(),
            violations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CoreError::config("missing field");
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("missing field"));
    }

    #[test]
    fn test_frontmatter_error() {
        let err = CoreError::frontmatter("src/content/posts/a.md", "bad yaml");
        assert!(err.to_string().contains("Frontmatter error"));
        assert!(err.to_string().contains("posts/a.md"));
    }

    #[test]
    fn test_invalid_error_lists_every_violation() {
        let err = CoreError::invalid(
            "posts/a.md",
            vec![
                Violation::missing("title"),
                Violation::missing("publishedAt"),
            ],
        );
        let msg = err.to_string();
        assert!(msg.contains("title: missing"));
        assert!(msg.contains("publishedAt: missing"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CoreError = io_err.into();
        assert!(err.to_string().contains("IO error"));
    }
}
