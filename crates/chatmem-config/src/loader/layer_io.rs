//! IO helpers for reading config layers from disk.

use super::{ConfigLayer, ConfigLayerSource, LoadedLayer, schema};
use crate::ConfigError;
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Load an optional file layer if the provided path exists.
pub(super) fn load_optional_layer(path: &Path) -> Result<Option<LoadedLayer>, ConfigError> {
    if !path.exists() {
        debug!("optional config file missing (path={})", path.display());
        return Ok(None);
    }
    Ok(Some(load_required_layer(path)?))
}

/// Load and validate a required file layer.
pub(super) fn load_required_layer(path: &Path) -> Result<LoadedLayer, ConfigError> {
    debug!("loading config layer (path={})", path.display());
    let contents = fs::read_to_string(path)?;
    let value: Value = json5::from_str(&contents)?;
    let label = format!("file({})", path.display());
    schema::validate_layer_schema(&value, &label)?;
    Ok(LoadedLayer {
        meta: ConfigLayer {
            source: ConfigLayerSource::File,
            path: Some(path.to_path_buf()),
        },
        value,
    })
}
