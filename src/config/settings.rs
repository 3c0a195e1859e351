//! Application settings loading from config.toml
//!
//! This module loads the optional `config.toml` file. Every key has a default,
//! so a missing file yields a fully usable configuration; a file that exists
//! but cannot be parsed is an error.

use crate::entities::Units;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default location of the settings file
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Planner-wide defaults
    pub planner: PlannerSettings,
    /// AI collaborator settings
    pub generator: GeneratorSettings,
}

/// Defaults applied when a user or request does not specify otherwise
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    /// Username used when no authenticated user is present
    pub default_username: String,
    /// Servings used for new users and generation requests
    pub default_servings: i32,
    /// Measurement system for new users
    pub preferred_units: Units,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            default_username: "admin".to_string(),
            default_servings: 4,
            preferred_units: Units::Metric,
        }
    }
}

/// Settings for the OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Model name sent with each request
    pub model: String,
    /// API base URL, without a trailing slash
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Total attempts per call, including the first
    pub max_attempts: u32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout_secs: 60,
            max_attempts: 2,
        }
    }
}

impl GeneratorSettings {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Parses settings from TOML text.
///
/// # Errors
/// Returns an error if the TOML syntax is invalid or a value has the wrong type.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if settings.planner.default_username.trim().is_empty() {
        return Err(Error::Config {
            message: "planner.default_username cannot be empty".to_string(),
        });
    }
    if settings.planner.default_servings < 1 {
        return Err(Error::Config {
            message: "planner.default_servings must be at least 1".to_string(),
        });
    }
    if settings.generator.max_attempts < 1 {
        return Err(Error::Config {
            message: "generator.max_attempts must be at least 1".to_string(),
        });
    }

    Ok(settings)
}

/// Loads settings from a TOML file, falling back to defaults when it is absent.
///
/// # Errors
/// Returns an error if:
/// - The file exists but cannot be read
/// - The TOML syntax is invalid
/// - A value fails validation
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        tracing::info!("No settings file at {:?}, using defaults", path_ref);
        return Ok(Settings::default());
    }

    tracing::debug!("Loading settings from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;
    parse_settings(&contents)
}

/// Loads settings from the default location (./config.toml)
pub fn load_default_settings() -> Result<Settings> {
    load_settings(DEFAULT_CONFIG_PATH)
}
