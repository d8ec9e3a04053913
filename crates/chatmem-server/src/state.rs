use chatmem_core::MemoryService;
use std::sync::Arc;

/// State shared by every handler. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    api_key: Arc<str>,
    service: Arc<MemoryService>,
}

impl AppState {
    pub fn new(api_key: impl Into<String>, service: Arc<MemoryService>) -> Self {
        Self {
            api_key: Arc::from(api_key.into()),
            service,
        }
    }

    pub(crate) fn accepts(&self, presented: &str) -> bool {
        presented == &*self.api_key
    }

    pub fn service(&self) -> &MemoryService {
        &self.service
    }
}
