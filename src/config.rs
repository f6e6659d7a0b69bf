//! Layered settings: defaults, an optional TOML file, then the environment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use fleetwatch_render::RenderSettings;
use serde::Deserialize;

/// Prefix for environment overrides, e.g. `FLEETWATCH_RENDER__TIMEOUT_SECS=30`.
pub const ENV_PREFIX: &str = "FLEETWATCH";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceSettings,
    pub render: RenderSettings,
    pub log: LogSettings,
}

/// Where status trees are read from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub path: PathBuf,
    pub refresh_ms: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("status.json"),
            refresh_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Filter directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings, reading `path` if given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("Failed to load configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration")
    }
}
