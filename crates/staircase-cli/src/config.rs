//! CLI configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use staircase_core::{ControllerConfig, Engine};

/// Top-level staircase configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaircaseConfig {
    /// Rolling window length for tuned controllers.
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Rolling window length for generic controllers.
    #[serde(default = "default_window_size")]
    pub generic_window_size: usize,
    /// Starting level when neither a flag nor a snapshot provides one.
    #[serde(default = "default_initial_level")]
    pub default_initial_level: u32,
    /// Force an engine for every game instead of each game's default.
    #[serde(default)]
    pub default_engine: Option<Engine>,
}

fn default_window_size() -> usize {
    10
}
fn default_initial_level() -> u32 {
    1
}

impl Default for StaircaseConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            generic_window_size: default_window_size(),
            default_initial_level: default_initial_level(),
            default_engine: None,
        }
    }
}

impl StaircaseConfig {
    /// Controller tunables for an engine.
    pub fn controller_config(&self, engine: Engine) -> ControllerConfig {
        let window_size = match engine {
            Engine::Tuned => self.window_size,
            Engine::Generic => self.generic_window_size,
        };
        ControllerConfig { window_size }
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.window_size >= 1, "window_size must be at least 1");
        anyhow::ensure!(
            self.generic_window_size >= 1,
            "generic_window_size must be at least 1"
        );
        anyhow::ensure!(
            self.default_initial_level >= 1,
            "default_initial_level must be at least 1"
        );
        Ok(())
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `staircase.toml` in the current directory
/// 2. `~/.config/staircase/config.toml`
///
/// `STAIRCASE_WINDOW_SIZE` overrides `window_size` and `generic_window_size`.
pub fn load_config_from(path: Option<&Path>) -> Result<StaircaseConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("staircase.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => StaircaseConfig::default(),
    };

    if let Ok(value) = std::env::var("STAIRCASE_WINDOW_SIZE") {
        let size: usize = value
            .trim()
            .parse()
            .with_context(|| format!("invalid STAIRCASE_WINDOW_SIZE: '{value}'"))?;
        config.window_size = size;
        config.generic_window_size = size;
    }

    config.validate()?;
    Ok(config)
}

/// Parse a TOML config string.
pub fn parse_config(content: &str) -> Result<StaircaseConfig> {
    Ok(toml::from_str::<StaircaseConfig>(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("staircase"))
}
