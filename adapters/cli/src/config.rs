use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use jungle_escape_core::Tuning;
use log::{info, warn};
use serde::Deserialize;

const SUPPORTED_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    version: u32,
    #[serde(default)]
    tuning: Tuning,
}

/// Loads tuning overrides from `path`, falling back to defaults without one.
pub(crate) fn load_tuning(path: Option<&Path>) -> Result<Tuning> {
    let Some(path) = path else {
        return Ok(Tuning::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    let tuning = parse_tuning(&contents)
        .with_context(|| format!("invalid config at {}", path.display()))?;
    info!("loaded tuning from {}", path.display());
    Ok(tuning)
}

fn parse_tuning(contents: &str) -> Result<Tuning> {
    let config: ConfigFile =
        toml::from_str(contents).context("failed to parse config toml contents")?;
    if config.version != SUPPORTED_CONFIG_VERSION {
        bail!(
            "unsupported config version {}; expected {}",
            config.version,
            SUPPORTED_CONFIG_VERSION
        );
    }

    if let Err(error) = config.tuning.validate() {
        warn!("rejecting tuning: {error}");
        return Err(error).context("tuning failed validation");
    }
    Ok(config.tuning)
}
