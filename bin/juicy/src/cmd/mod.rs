//! Command implementations.

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use juicy_core::Config;

pub mod check;
pub mod cms;
pub mod env;
pub mod new;

/// Load the site configuration, applying `JUICY__*` environment overrides.
pub fn load_config(config_path: &Path) -> Result<Config> {
    Config::load_with_env(config_path)
        .wrap_err_with(|| format!("Failed to load {}", config_path.display()))
}

/// Content directory, resolved against the directory holding the config file.
pub fn content_dir(config_path: &Path, config: &Config) -> PathBuf {
    project_root(config_path).join(&config.content.dir)
}

/// Directory holding the config file.
pub fn project_root(config_path: &Path) -> &Path {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_root() {
        assert_eq!(project_root(Path::new("juicy.toml")), Path::new("."));
        assert_eq!(project_root(Path::new("site/juicy.toml")), Path::new("site"));
    }

    #[test]
    fn test_content_dir_is_relative_to_config() {
        let config = Config::default();
        assert_eq!(
            content_dir(Path::new("site/juicy.toml"), &config),
            Path::new("site/src/content")
        );
    }
}
