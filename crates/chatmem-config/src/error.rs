//! Config loading and validation failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read chatmem config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// The config file is not valid JSON5.
    #[error("failed to parse chatmem config: {0}")]
    ParseFailed(#[from] json5::Error),
    /// The merged layers do not match the config model.
    #[error("failed to decode chatmem config: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
    /// A required setting has no value in any layer.
    #[error("missing required setting: {0}")]
    Missing(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}
