//! Tests for layered configuration loading.

use super::*;
use crate::{AreaResolution, KeywordMatch};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn required_env() -> Vec<(&'static str, &'static str)> {
    vec![
        ("API_SECRET_KEY", "secret"),
        ("NOTION_TOKEN", "token"),
        ("DB_CHAT_MEMORIES", "memories-db"),
        ("DB_MEMORY_AREAS", "areas-db"),
    ]
}

/// Verify that a minimal config parses with defaults.
#[test]
fn parse_minimal_config() {
    let config = ChatmemConfig::load_from_str("{}").expect("config");
    assert_eq!(config.server.bind, "0.0.0.0:3000");
    assert_eq!(config.notion.base_url, "https://api.notion.com/v1");
    assert_eq!(config.notion.version, "2022-06-28");
    assert_eq!(config.memory.keyword_match, KeywordMatch::First);
    assert_eq!(config.memory.area_resolution, AreaResolution::Serialized);
}

/// Reject unexpected top-level config keys.
#[test]
fn rejects_unknown_top_level_key() {
    let err = ChatmemConfig::load_from_str(r#"{ unexpected: true }"#).unwrap_err();
    assert!(format!("{err}").contains("unknown key"));
}

/// Reject unsupported strategy values with the offending path.
#[test]
fn rejects_invalid_keyword_match() {
    let err =
        ChatmemConfig::load_from_str(r#"{ memory: { keyword_match: "all" } }"#).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("memory.keyword_match"));
}

#[test]
fn parses_memory_strategies() {
    let config = ChatmemConfig::load_from_str(
        r#"{ memory: { keyword_match: "any", area_resolution: "unguarded" } }"#,
    )
    .expect("config");
    assert_eq!(config.memory.keyword_match, KeywordMatch::Any);
    assert_eq!(config.memory.area_resolution, AreaResolution::Unguarded);
}

/// Environment variables alone are enough for a complete config.
#[test]
fn layered_config_from_environment_only() {
    let temp = TempDir::new().expect("tmp");
    let options = LayeredConfigOptions::new(temp.path()).with_env(required_env());
    let layered = ChatmemConfig::load_layered_with_options(options).expect("config");

    assert_eq!(layered.layers.len(), 1);
    assert_eq!(layered.layers[0].source, ConfigLayerSource::Environment);
    assert_eq!(layered.config.api_key(), "secret");
    assert_eq!(layered.config.notion_token(), "token");
    assert_eq!(
        layered.config.databases.chat_memories.as_deref(),
        Some("memories-db")
    );
    assert_eq!(layered.config.databases.memory_groups, None);
}

/// Environment values take precedence over the file layer.
#[test]
fn environment_overrides_file_layer() {
    let temp = TempDir::new().expect("tmp");
    fs::write(
        temp.path().join("chatmem.json5"),
        r#"{
            server: { bind: "127.0.0.1:8080" },
            databases: { memory_groups: "groups-db", chat_memories: "from-file" },
            memory: { keyword_match: "any" },
        }"#,
    )
    .expect("write");

    let options = LayeredConfigOptions::new(temp.path()).with_env(required_env());
    let layered = ChatmemConfig::load_layered_with_options(options).expect("config");

    assert_eq!(layered.layers.len(), 2);
    assert_eq!(layered.layers[0].source, ConfigLayerSource::File);
    assert_eq!(layered.config.server.bind, "127.0.0.1:8080");
    assert_eq!(
        layered.config.databases.chat_memories.as_deref(),
        Some("memories-db")
    );
    assert_eq!(
        layered.config.databases.memory_groups.as_deref(),
        Some("groups-db")
    );
    assert_eq!(layered.config.memory.keyword_match, KeywordMatch::Any);
}

#[test]
fn port_variable_sets_bind_address() {
    let temp = TempDir::new().expect("tmp");
    let mut env = required_env();
    env.push(("PORT", "4100"));
    let options = LayeredConfigOptions::new(temp.path()).with_env(env);
    let layered = ChatmemConfig::load_layered_with_options(options).expect("config");
    assert_eq!(layered.config.server.bind, "0.0.0.0:4100");
}

#[test]
fn invalid_port_is_rejected() {
    let temp = TempDir::new().expect("tmp");
    let mut env = required_env();
    env.push(("PORT", "http"));
    let options = LayeredConfigOptions::new(temp.path()).with_env(env);
    let err = ChatmemConfig::load_layered_with_options(options).unwrap_err();
    assert!(format!("{err}").contains("env:PORT"));
}

/// A missing secret names the variable that should provide it.
#[test]
fn missing_secret_is_reported() {
    let temp = TempDir::new().expect("tmp");
    let env: Vec<_> = required_env()
        .into_iter()
        .filter(|(name, _)| *name != "API_SECRET_KEY")
        .collect();
    let options = LayeredConfigOptions::new(temp.path()).with_env(env);
    let err = ChatmemConfig::load_layered_with_options(options).unwrap_err();
    let ConfigError::Missing(name) = err else {
        panic!("expected missing setting");
    };
    assert_eq!(name, "API_SECRET_KEY");
}

#[test]
fn empty_environment_values_are_ignored() {
    let temp = TempDir::new().expect("tmp");
    let mut env = required_env();
    env.retain(|(name, _)| *name != "DB_MEMORY_AREAS");
    env.push(("DB_MEMORY_AREAS", "  "));
    let options = LayeredConfigOptions::new(temp.path()).with_env(env);
    let err = ChatmemConfig::load_layered_with_options(options).unwrap_err();
    assert!(matches!(err, ConfigError::Missing(name) if name == "DB_MEMORY_AREAS"));
}

#[test]
fn secret_keeps_surrounding_whitespace() {
    let temp = TempDir::new().expect("tmp");
    let mut env = required_env();
    env.retain(|(name, _)| *name != "API_SECRET_KEY");
    env.push(("API_SECRET_KEY", " padded secret "));
    env.push(("PORT", " 4200 "));
    let options = LayeredConfigOptions::new(temp.path()).with_env(env);
    let layered = ChatmemConfig::load_layered_with_options(options).expect("config");
    assert_eq!(layered.config.api_key(), " padded secret ");
    assert_eq!(layered.config.server.bind, "0.0.0.0:4200");
}

/// An explicit config path must exist.
#[test]
fn explicit_config_path_must_exist() {
    let temp = TempDir::new().expect("tmp");
    let options = LayeredConfigOptions::new(temp.path())
        .with_config_path(temp.path().join("missing.json5"))
        .with_env(required_env());
    let err = ChatmemConfig::load_layered_with_options(options).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFailed(_)));
}

#[test]
fn file_layer_label_appears_in_schema_errors() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("custom.json5");
    fs::write(&path, r#"{ notion: { token: 42 } }"#).expect("write");
    let options = LayeredConfigOptions::new(temp.path())
        .with_config_path(&path)
        .with_env(required_env());
    let err = ChatmemConfig::load_layered_with_options(options).unwrap_err();
    let ConfigError::InvalidField { path: field, message } = err else {
        panic!("expected invalid field");
    };
    assert!(field.starts_with("file("));
    assert!(field.ends_with(":notion.token"));
    assert_eq!(message, "expected string");
}

#[test]
fn invalid_bind_address_fails_validation() {
    let config = ChatmemConfig::builder()
        .api_key("secret")
        .server(crate::ServerConfig {
            bind: "not an address".to_string(),
        })
        .notion(crate::NotionConfig {
            token: Some("token".to_string()),
            ..crate::NotionConfig::default()
        })
        .databases(crate::DatabasesConfig {
            chat_memories: Some("m".to_string()),
            memory_areas: Some("a".to_string()),
            memory_groups: None,
        })
        .build();
    let err = config.validate().unwrap_err();
    assert!(format!("{err}").contains("server.bind"));
}
