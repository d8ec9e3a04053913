//! Configuration schema for chatmem.

use serde::{Deserialize, Serialize};

/// Root config for the chatmem relay.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChatmemConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub notion: NotionConfig,
    #[serde(default)]
    pub databases: DatabasesConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl ChatmemConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> ChatmemConfigBuilder {
        ChatmemConfigBuilder::new()
    }

    /// Shared secret expected in the `api-key` header.
    ///
    /// Only meaningful after `validate` succeeded.
    pub fn api_key(&self) -> &str {
        self.auth.api_key.as_deref().unwrap_or_default()
    }

    /// Remote service credential.
    pub fn notion_token(&self) -> &str {
        self.notion.token.as_deref().unwrap_or_default()
    }
}

/// Builder for assembling a `ChatmemConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct ChatmemConfigBuilder {
    config: ChatmemConfig,
}

impl ChatmemConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: ChatmemConfig::default(),
        }
    }

    /// Set the shared secret checked by the gatekeeper.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.auth.api_key = Some(api_key.into());
        self
    }

    /// Replace the server configuration.
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.config.server = server;
        self
    }

    /// Replace the remote service configuration.
    pub fn notion(mut self, notion: NotionConfig) -> Self {
        self.config.notion = notion;
        self
    }

    /// Replace the collection identifiers.
    pub fn databases(mut self, databases: DatabasesConfig) -> Self {
        self.config.databases = databases;
        self
    }

    /// Replace the memory behaviour settings.
    pub fn memory(mut self, memory: MemoryConfig) -> Self {
        self.config.memory = memory;
        self
    }

    /// Finalize and return the built `ChatmemConfig`.
    pub fn build(self) -> ChatmemConfig {
        self.config
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

/// Shared-secret authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Remote document database connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_notion_base_url")]
    pub base_url: String,
    #[serde(default = "default_notion_version")]
    pub version: String,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_notion_base_url(),
            version: default_notion_version(),
        }
    }
}

/// Default API root of the remote service.
fn default_notion_base_url() -> String {
    "https://api.notion.com/v1".to_string()
}

/// Default API version header value.
fn default_notion_version() -> String {
    "2022-06-28".to_string()
}

/// Collection identifiers in the remote store.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabasesConfig {
    #[serde(default)]
    pub chat_memories: Option<String>,
    #[serde(default)]
    pub memory_areas: Option<String>,
    #[serde(default)]
    pub memory_groups: Option<String>,
}

/// How keyword lists are turned into a query filter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KeywordMatch {
    /// Only the first keyword is tested.
    #[default]
    First,
    /// A record matches when it carries any of the keywords.
    Any,
}

/// Concurrency strategy for resolve-or-create of memory areas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AreaResolution {
    /// Plain read-then-write with no coordination.
    Unguarded,
    /// Read-then-write held under an in-process lock per area name.
    #[default]
    Serialized,
}

/// Memory service behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MemoryConfig {
    #[serde(default)]
    pub keyword_match: KeywordMatch,
    #[serde(default)]
    pub area_resolution: AreaResolution,
}
