//! Environment variable layer.

use crate::ConfigError;
use serde_json::{Map, Value, json};
use std::collections::HashMap;

pub(super) const API_SECRET_KEY: &str = "API_SECRET_KEY";
pub(super) const NOTION_TOKEN: &str = "NOTION_TOKEN";
pub(super) const NOTION_BASE_URL: &str = "NOTION_BASE_URL";
pub(super) const DB_CHAT_MEMORIES: &str = "DB_CHAT_MEMORIES";
pub(super) const DB_MEMORY_AREAS: &str = "DB_MEMORY_AREAS";
pub(super) const DB_MEMORY_GROUPS: &str = "DB_MEMORY_GROUPS";
pub(super) const PORT: &str = "PORT";

/// Variable name to config path (section, key).
const MAPPINGS: &[(&str, &str, &str)] = &[
    (API_SECRET_KEY, "auth", "api_key"),
    (NOTION_TOKEN, "notion", "token"),
    (NOTION_BASE_URL, "notion", "base_url"),
    (DB_CHAT_MEMORIES, "databases", "chat_memories"),
    (DB_MEMORY_AREAS, "databases", "memory_areas"),
    (DB_MEMORY_GROUPS, "databases", "memory_groups"),
];

/// Build a config layer from environment variables. Blank values are ignored.
pub(super) fn environment_layer(vars: &HashMap<String, String>) -> Result<Value, ConfigError> {
    let mut root = Map::new();
    for (name, section, key) in MAPPINGS {
        let Some(value) = lookup(vars, name) else {
            continue;
        };
        insert(&mut root, section, key, Value::String(value.to_string()));
    }

    if let Some(port) = lookup(vars, PORT) {
        let port: u16 = port.trim().parse().map_err(|_| ConfigError::InvalidField {
            path: format!("env:{PORT}"),
            message: format!("expected port number, got `{port}`"),
        })?;
        insert(&mut root, "server", "bind", json!(format!("0.0.0.0:{port}")));
    }

    Ok(Value::Object(root))
}

/// Whether the environment layer carries any setting.
pub(super) fn has_values(value: &Value) -> bool {
    value.as_object().is_some_and(|map| !map.is_empty())
}

/// Raw value of a variable; blank values count as unset.
fn lookup<'a>(vars: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    vars.get(name)
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
}

fn insert(root: &mut Map<String, Value>, section: &str, key: &str, value: Value) {
    let entry = root
        .entry(section.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(map) = entry {
        map.insert(key.to_string(), value);
    }
}
