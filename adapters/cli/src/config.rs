//! Loading of session configuration files.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use road_defence_core::GameConfig;

/// Reads the configuration at `path`, or the defaults when no path is given.
///
/// The returned configuration has already been validated.
pub(crate) fn load(path: Option<&Path>) -> Result<GameConfig> {
    let config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            parse(&text).with_context(|| format!("invalid config {}", path.display()))?
        }
        None => GameConfig::default(),
    };
    config.validate().context("config rejected")?;
    Ok(config)
}

/// Parses a TOML document; omitted keys keep their default values.
pub(crate) fn parse(text: &str) -> Result<GameConfig> {
    toml::from_str(text).context("failed to parse TOML")
}
