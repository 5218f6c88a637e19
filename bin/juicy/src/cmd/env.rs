//! Env command - show the resolved build environment

use std::path::Path;

use color_eyre::eyre::Result;
use juicy_core::{BuildEnv, Config, config::ENV_VAR};

use super::{content_dir, load_config};

/// Run the env command.
pub fn run(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let env = BuildEnv::from_env();

    for line in describe(config_path, &config, env) {
        println!("{line}");
    }

    Ok(())
}

fn describe(config_path: &Path, config: &Config, env: BuildEnv) -> Vec<String> {
    let locales = if config.schema.locale {
        format!(
            "{} (default {})",
            config.i18n.locales.join(", "),
            config.i18n.default_locale
        )
    } else {
        "disabled".to_string()
    };

    vec![
        format!("Environment: {env} ({ENV_VAR})"),
        format!("Base path:   {}", config.base_path(env)),
        format!("Site URL:    {}", config.url_for(env, "")),
        format!("Locales:     {locales}"),
        format!("Content:     {}", content_dir(config_path, config).display()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_production() {
        let lines = describe(Path::new("juicy.toml"), &Config::default(), BuildEnv::Production);

        assert_eq!(lines[0], "Environment: production (JUICY_ENV)");
        assert_eq!(lines[1], "Base path:   /juicy-ai-blog");
        assert_eq!(lines[2], "Site URL:    https://txgo.github.io/juicy-ai-blog");
        assert_eq!(lines[3], "Locales:     zh-cn, en (default zh-cn)");
    }

    #[test]
    fn test_describe_development_without_locales() {
        let mut config = Config::default();
        config.schema.locale = false;

        let lines = describe(Path::new("juicy.toml"), &config, BuildEnv::Development);
        assert_eq!(lines[1], "Base path:   /");
        assert_eq!(lines[2], "Site URL:    https://txgo.github.io");
        assert_eq!(lines[3], "Locales:     disabled");
    }
}
