//! CMS command - emit or verify the CMS editing schema

use std::{fs, path::Path};

use color_eyre::eyre::{Result, WrapErr, bail};
use juicy_core::{CmsConfig, Schema, cms};

use super::load_config;

/// Run the cms command.
///
/// Without flags the derived schema is printed to stdout. `output` writes it
/// to a file; `verify` compares a committed copy and fails on any drift.
pub fn run(config_path: &Path, output: Option<&Path>, verify: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let schema = Schema::from_config(&config)?;
    let derived = CmsConfig::derive(&schema, &config.cms);

    if let Some(path) = verify {
        tracing::info!(?path, "Verifying CMS schema");
        let committed = CmsConfig::load(path)
            .wrap_err_with(|| format!("Failed to load {}", path.display()))?;

        let drift = cms::verify(&derived, &committed);
        if drift.is_empty() {
            println!("✓ {} matches the content schema", path.display());
            return Ok(());
        }

        for d in &drift {
            println!("  ✗ {d}");
        }
        bail!("CMS schema has {} difference(s)", drift.len());
    }

    let json = derived.to_json()?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).wrap_err("Failed to create directories")?;
            }
            fs::write(path, json).wrap_err("Failed to write CMS schema")?;
            tracing::info!(?path, "Wrote CMS schema");
            println!("Wrote: {}", path.display());
        }
        None => print!("{json}"),
    }

    Ok(())
}
