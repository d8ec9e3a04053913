//! Public surface of chatmem.
//!
//! Re-exports the member crates and wires a validated config into a ready
//! HTTP router.

/// Re-export for convenience.
pub use chatmem_config as config;
pub use chatmem_core as core;
/// Re-export for convenience.
pub use chatmem_server as server;
/// Re-export for convenience.
pub use chatmem_store as store;

use axum::Router;
use chatmem_config::ChatmemConfig;
use chatmem_core::{MemoryService, MemorySettings};
use chatmem_server::AppState;
use chatmem_store::{NotionSettings, NotionStore};
use log::info;
use std::sync::Arc;

#[inline]
/// Initialize logging using env_logger.
///
/// `RUST_LOG` selects the level. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();
}

/// Remote store settings taken from a validated config.
pub fn notion_settings(config: &ChatmemConfig) -> NotionSettings {
    NotionSettings {
        base_url: config.notion.base_url.clone(),
        token: config.notion_token().to_string(),
        version: config.notion.version.clone(),
    }
}

/// Build the HTTP router backed by the remote store named in `config`.
///
/// `config` is expected to have passed validation.
pub fn build_router(config: &ChatmemConfig) -> Router {
    let store = Arc::new(NotionStore::new(notion_settings(config)));
    let service = Arc::new(MemoryService::new(
        store,
        MemorySettings::from_config(config),
    ));
    info!(
        "router ready (base_url={}, groups={})",
        config.notion.base_url,
        config.databases.memory_groups.is_some()
    );
    chatmem_server::router(AppState::new(config.api_key(), service))
}
