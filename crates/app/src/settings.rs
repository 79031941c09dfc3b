//! Configuration discovery
//!
//! `QUILL_CONFIG` names a config file explicitly and it must exist.
//! Otherwise `quill.toml` in the platform config directory is used if
//! present, and the built-in defaults if not.

use std::ffi::OsString;
use std::path::PathBuf;

use directories::ProjectDirs;
use quill_core::{BlogConfig, Result};

pub const CONFIG_ENV: &str = "QUILL_CONFIG";
const CONFIG_FILE: &str = "quill.toml";

/// Where configuration comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named by the environment; must exist
    Explicit(PathBuf),
    /// Platform default location; optional
    Default(PathBuf),
    /// No usable location
    BuiltIn,
}

impl ConfigSource {
    pub fn resolve(env_value: Option<OsString>) -> Self {
        if let Some(path) = env_value.filter(|v| !v.is_empty()) {
            return ConfigSource::Explicit(PathBuf::from(path));
        }

        match ProjectDirs::from("dev", "quill", "quill") {
            Some(dirs) => ConfigSource::Default(dirs.config_dir().join(CONFIG_FILE)),
            None => ConfigSource::BuiltIn,
        }
    }

    pub fn load(&self) -> Result<BlogConfig> {
        let config = match self {
            ConfigSource::Explicit(path) => BlogConfig::load(path)?,
            ConfigSource::Default(path) => BlogConfig::load_or_default(path)?,
            ConfigSource::BuiltIn => BlogConfig::default(),
        };
        Ok(config)
    }
}

/// Resolve and load configuration from the process environment
pub fn load_config() -> Result<BlogConfig> {
    let source = ConfigSource::resolve(std::env::var_os(CONFIG_ENV));
    tracing::info!(source = ?source, "Loading configuration");
    source.load()
}
