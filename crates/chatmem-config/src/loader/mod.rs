//! Layered configuration loader.
//!
//! Builds the effective config from built-in defaults, an optional JSON5
//! file, and the process environment, validating every layer against the
//! schema before merging.

mod env;
mod layer_io;
mod merge;
mod schema;

#[cfg(test)]
mod tests;

use crate::{ChatmemConfig, ConfigError};
use log::{debug, info};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Default config filename looked up in the working directory.
const DEFAULT_CONFIG_FILE: &str = "chatmem.json5";

/// Effective config plus metadata about which layers were loaded.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// The merged, validated config.
    pub config: ChatmemConfig,
    /// Metadata for each layer that contributed values.
    pub layers: Vec<ConfigLayer>,
}

/// Origin for a single config layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// JSON5 config file.
    File,
    /// Process environment variables (highest precedence).
    Environment,
}

/// Metadata about a loaded config layer.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    /// Layer origin.
    pub source: ConfigLayerSource,
    /// Location on disk for file layers.
    pub path: Option<PathBuf>,
}

/// Options controlling layered config discovery.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Working directory searched for `chatmem.json5` when no path is given.
    pub cwd: PathBuf,
    /// Explicit config file; a missing file is an error.
    pub config_path: Option<PathBuf>,
    /// Environment snapshot used for the environment layer.
    pub env: HashMap<String, String>,
}

impl LayeredConfigOptions {
    /// Create options for the provided cwd using the current process environment.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            config_path: None,
            env: std::env::vars().collect(),
        }
    }

    /// Use an explicit config file instead of the cwd default.
    pub fn with_config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Replace the environment snapshot.
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self
    }
}

impl ChatmemConfig {
    /// Load a single config from a path (no layering, no required-setting checks).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!("loading config from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        let value: Value = json5::from_str(&contents)?;
        config_from_value(value, "config")
    }

    /// Load a single config from JSON5 contents (no layering, no required-setting checks).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        config_from_value(value, "config")
    }

    /// Load the layered config for a working directory from the process environment.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        Self::load_layered_with_options(LayeredConfigOptions::new(cwd))
    }

    /// Load the layered config using explicit options.
    ///
    /// Layer precedence (low -> high): defaults, file, environment.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let mut layers = Vec::new();
        let mut merged = Value::Object(serde_json::Map::new());

        let file_layer = match options.config_path.as_deref() {
            Some(path) => Some(layer_io::load_required_layer(path)?),
            None => layer_io::load_optional_layer(&options.cwd.join(DEFAULT_CONFIG_FILE))?,
        };
        if let Some(layer) = file_layer {
            merge::merge_json_values(&mut merged, &layer.value);
            layers.push(layer.meta);
        }

        let env_value = env::environment_layer(&options.env)?;
        if env::has_values(&env_value) {
            debug!("applying environment layer");
            merge::merge_json_values(&mut merged, &env_value);
            layers.push(ConfigLayer {
                source: ConfigLayerSource::Environment,
                path: None,
            });
        }

        let config = config_from_value(merged, "effective")?;
        config.validate()?;
        info!("layered config loaded (layers={})", layers.len());
        Ok(LayeredConfig { config, layers })
    }

    /// Validate invariants that cannot be expressed in serde.
    ///
    /// Required settings are named after the environment variable that
    /// usually supplies them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(self.auth.api_key.as_deref(), env::API_SECRET_KEY)?;
        require(self.notion.token.as_deref(), env::NOTION_TOKEN)?;
        require(
            self.databases.chat_memories.as_deref(),
            env::DB_CHAT_MEMORIES,
        )?;
        require(self.databases.memory_areas.as_deref(), env::DB_MEMORY_AREAS)?;

        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::InvalidField {
                path: "effective:server.bind".to_string(),
                message: format!("invalid socket address `{}`", self.server.bind),
            });
        }
        if self.notion.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "notion.base_url cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Internal representation of a loaded config layer.
#[derive(Debug, Clone)]
struct LoadedLayer {
    meta: ConfigLayer,
    value: Value,
}

fn config_from_value(value: Value, label: &str) -> Result<ChatmemConfig, ConfigError> {
    schema::validate_layer_schema(&value, label)?;
    let config: ChatmemConfig = serde_json::from_value(value)?;
    Ok(config)
}

fn require(value: Option<&str>, name: &str) -> Result<(), ConfigError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(()),
        _ => Err(ConfigError::Missing(name.to_string())),
    }
}
