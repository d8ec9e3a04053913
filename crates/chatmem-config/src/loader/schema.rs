//! Schema validation helpers for chatmem JSON5 configuration.

use crate::ConfigError;
use serde_json::{Map, Value};

/// Validate a single config layer against the schema.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    let allowed = ["$schema", "server", "auth", "notion", "databases", "memory"];
    ensure_allowed_keys(map, &allowed, layer, "")?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("server") {
        validate_string_section(value, &["bind"], layer, "server")?;
    }
    if let Some(value) = map.get("auth") {
        validate_string_section(value, &["api_key"], layer, "auth")?;
    }
    if let Some(value) = map.get("notion") {
        validate_string_section(value, &["token", "base_url", "version"], layer, "notion")?;
    }
    if let Some(value) = map.get("databases") {
        validate_string_section(
            value,
            &["chat_memories", "memory_areas", "memory_groups"],
            layer,
            "databases",
        )?;
    }
    if let Some(value) = map.get("memory") {
        validate_memory(value, layer, "memory")?;
    }

    Ok(())
}

/// Validate a block whose values are all optional strings.
fn validate_string_section(
    value: &Value,
    keys: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, keys, layer, path)?;
    for (key, value) in map {
        if value.is_null() {
            continue;
        }
        expect_string(value, layer, &join_path(path, key))?;
    }
    Ok(())
}

/// Validate the "memory" block.
fn validate_memory(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["keyword_match", "area_resolution"], layer, path)?;
    if let Some(value) = map.get("keyword_match") {
        expect_enum(
            value,
            &["first", "any"],
            layer,
            &join_path(path, "keyword_match"),
        )?;
    }
    if let Some(value) = map.get("area_resolution") {
        expect_enum(
            value,
            &["unguarded", "serialized"],
            layer,
            &join_path(path, "area_resolution"),
        )?;
    }
    Ok(())
}

/// Expect a JSON object or return a typed error.
fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

/// Expect a JSON string or return a typed error.
fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.as_str().is_some() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected string"))
    }
}

/// Expect one of a fixed set of string values.
fn expect_enum(
    value: &Value,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    match value.as_str() {
        Some(value) if allowed.contains(&value) => Ok(()),
        _ => Err(invalid_field(
            layer,
            path,
            &format!("expected one of {}", allowed.join(", ")),
        )),
    }
}

/// Ensure an object contains only allowed keys.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(invalid_field(layer, &join_path(path, key), "unknown key"));
        }
    }
    Ok(())
}

/// Join nested paths for better error messages.
fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Build a structured invalid-field error.
fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{normalized_path}"),
        message: message.to_string(),
    }
}
