//! Site configuration management.

use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::{CoreError, Result},
    schema::LocaleSet,
};

/// Environment variable that selects the build environment.
///
/// Only the exact value `production` selects [`BuildEnv::Production`].
pub const ENV_VAR: &str = "JUICY_ENV";

/// Main configuration structure for Juicy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,

    /// Locale settings.
    #[serde(default)]
    pub i18n: I18nConfig,

    /// Content schema options.
    #[serde(default)]
    pub schema: SchemaConfig,

    /// Content location.
    #[serde(default)]
    pub content: ContentConfig,

    /// CMS editing schema settings.
    #[serde(default)]
    pub cms: CmsSettings,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,

    /// Origin the site is published under (e.g., "https://txgo.github.io").
    pub url: String,

    /// Base paths for generated links, one per build environment.
    #[serde(default)]
    pub base_path: BasePaths,
}

/// The two literal base paths selected by [`BuildEnv`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasePaths {
    /// Used when `JUICY_ENV=production`.
    #[serde(default = "default_production_base")]
    pub production: String,

    /// Used for every other build.
    #[serde(default = "default_development_base")]
    pub development: String,
}

/// Locale configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct I18nConfig {
    /// Closed set of locale tags content may declare.
    #[serde(default = "default_locales")]
    pub locales: Vec<String>,

    /// Locale applied to documents that omit `lang`.
    #[serde(default = "default_locale")]
    pub default_locale: String,
}

/// Content schema options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Whether documents carry a validated `lang` field.
    #[serde(default = "default_true")]
    pub locale: bool,
}

/// Content location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Directory holding one sub-directory per collection.
    #[serde(default = "default_content_dir")]
    pub dir: String,
}

/// Settings for the derived CMS editing schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmsSettings {
    /// Storage backend kind handed to the editor.
    #[serde(default = "default_storage")]
    pub storage: String,

    /// Repository the editor commits to.
    #[serde(default = "default_repo")]
    pub repo: String,

    /// Directory uploaded images are written to.
    #[serde(default = "default_image_dir")]
    pub image_dir: String,

    /// Public URL prefix for uploaded images.
    #[serde(default = "default_image_public_path")]
    pub image_public_path: String,

    /// Committed copy of the editing schema, checked for drift.
    #[serde(default)]
    pub schema_file: Option<String>,
}

/// Build environment, selected by [`ENV_VAR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildEnv {
    /// Deployment build.
    Production,
    /// Local builds and previews.
    #[default]
    Development,
}

impl BuildEnv {
    /// Read the build environment from the process environment.
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(ENV_VAR).ok().as_deref())
    }

    /// Interpret a raw flag value. Only `production` selects production.
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some("production") => Self::Production,
            _ => Self::Development,
        }
    }
}

impl fmt::Display for BuildEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => f.write_str("production"),
            Self::Development => f.write_str("development"),
        }
    }
}

// Default value functions
fn default_production_base() -> String {
    "/juicy-ai-blog".to_string()
}

fn default_development_base() -> String {
    "/".to_string()
}

fn default_locales() -> Vec<String> {
    vec!["zh-cn".to_string(), "en".to_string()]
}

fn default_locale() -> String {
    "zh-cn".to_string()
}

fn default_true() -> bool {
    true
}

fn default_content_dir() -> String {
    "src/content".to_string()
}

fn default_storage() -> String {
    "github".to_string()
}

fn default_repo() -> String {
    "yourusername/juicy-ai-blog".to_string()
}

fn default_image_dir() -> String {
    "public/images".to_string()
}

fn default_image_public_path() -> String {
    "/images".to_string()
}

impl Default for BasePaths {
    fn default() -> Self {
        Self {
            production: default_production_base(),
            development: default_development_base(),
        }
    }
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            locales: default_locales(),
            default_locale: default_locale(),
        }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self { locale: true }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: default_content_dir(),
        }
    }
}

impl Default for CmsSettings {
    fn default() -> Self {
        Self {
            storage: default_storage(),
            repo: default_repo(),
            image_dir: default_image_dir(),
            image_public_path: default_image_public_path(),
            schema_file: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig {
                title: "Juicy AI Blog".to_string(),
                url: "https://txgo.github.io".to_string(),
                base_path: BasePaths::default(),
            },
            i18n: I18nConfig::default(),
            schema: SchemaConfig::default(),
            content: ContentConfig::default(),
            cms: CmsSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Load configuration with `JUICY__SECTION__KEY` environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("JUICY").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.site.title.is_empty() {
            return Err(CoreError::config("site.title cannot be empty"));
        }

        if self.site.url.is_empty() {
            return Err(CoreError::config("site.url cannot be empty"));
        }

        if self.site.url.ends_with('/') {
            tracing::warn!("site.url should not have a trailing slash");
        }

        for (name, path) in [
            ("production", &self.site.base_path.production),
            ("development", &self.site.base_path.development),
        ] {
            if !path.starts_with('/') {
                return Err(CoreError::config(format!(
                    "site.base_path.{name} must start with '/': {path:?}"
                )));
            }
        }

        self.locale_set()
            .map_err(|e| CoreError::config_with_source("invalid [i18n] section", e))?;

        Ok(())
    }

    /// Build the locale set declared in `[i18n]`.
    pub fn locale_set(&self) -> Result<LocaleSet> {
        LocaleSet::new(self.i18n.locales.clone(), self.i18n.default_locale.clone())
    }

    /// Base path for generated links in the given environment.
    pub fn base_path(&self, env: BuildEnv) -> &str {
        match env {
            BuildEnv::Production => &self.site.base_path.production,
            BuildEnv::Development => &self.site.base_path.development,
        }
    }

    /// Get the full URL for a path in the given environment.
    pub fn url_for(&self, env: BuildEnv, path: &str) -> String {
        let origin = self.site.url.trim_end_matches('/');
        let base = self.base_path(env).trim_matches('/');
        let path = path.trim_start_matches('/');

        [origin, base, path]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("/")
    }
}
