//! Memory service operations against the remote store.

use crate::area::AreaLocks;
use crate::error::{MemoryErrorKind, MemoryServiceError};
use crate::filter::{memory_filter, memory_sorts};
use crate::model::{AreaId, MemoryQuery, NewMemory, area_fields, memory_fields};
use chatmem_config::{AreaResolution, ChatmemConfig, KeywordMatch};
use chatmem_store::{Condition, Fields, Filter, PropertyValue, Record, RemoteStore, StoreError};
use chrono::Utc;
use log::{debug, error, info, warn};
use std::sync::Arc;

/// Collection identifiers and behaviour switches for [`MemoryService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySettings {
    /// Collection holding chat memory records.
    pub memories_collection: String,
    /// Collection holding memory areas.
    pub areas_collection: String,
    /// Collection holding memory groups, when enabled.
    pub groups_collection: Option<String>,
    pub keyword_match: KeywordMatch,
    pub area_resolution: AreaResolution,
}

impl MemorySettings {
    /// Settings with default strategies for the given collections.
    pub fn new(
        memories_collection: impl Into<String>,
        areas_collection: impl Into<String>,
    ) -> Self {
        Self {
            memories_collection: memories_collection.into(),
            areas_collection: areas_collection.into(),
            groups_collection: None,
            keyword_match: KeywordMatch::default(),
            area_resolution: AreaResolution::default(),
        }
    }

    /// Extract settings from a validated config.
    pub fn from_config(config: &ChatmemConfig) -> Self {
        Self {
            memories_collection: config.databases.chat_memories.clone().unwrap_or_default(),
            areas_collection: config.databases.memory_areas.clone().unwrap_or_default(),
            groups_collection: config.databases.memory_groups.clone(),
            keyword_match: config.memory.keyword_match,
            area_resolution: config.memory.area_resolution,
        }
    }
}

/// Translates memory operations into remote store calls.
///
/// Every store failure is logged with its detail and returned as a
/// [`MemoryServiceError`] whose message is fixed per operation.
pub struct MemoryService {
    pub(crate) store: Arc<dyn RemoteStore>,
    pub(crate) settings: MemorySettings,
    area_locks: AreaLocks,
}

impl MemoryService {
    pub fn new(store: Arc<dyn RemoteStore>, settings: MemorySettings) -> Self {
        info!(
            "memory service ready (keyword_match={:?}, area_resolution={:?}, groups={})",
            settings.keyword_match,
            settings.area_resolution,
            settings.groups_collection.is_some()
        );
        Self {
            store,
            settings,
            area_locks: AreaLocks::new(),
        }
    }

    pub fn settings(&self) -> &MemorySettings {
        &self.settings
    }

    /// Create a chat memory record stamped with the current time.
    pub async fn create_message(&self, memory: NewMemory) -> Result<Record, MemoryServiceError> {
        let fields = memory_record_fields(memory);
        debug!(
            "creating memory (keywords={}, has_area={})",
            keyword_count(&fields),
            fields.contains_key(memory_fields::AREA)
        );
        match self
            .store
            .create_record(&self.settings.memories_collection, fields)
            .await
        {
            Ok(record) => {
                info!("memory stored (record_id={})", record.id);
                Ok(record)
            }
            Err(err) => {
                error!("error storing message: {err}");
                Err(MemoryServiceError::new(
                    MemoryErrorKind::StoreWrite,
                    Some(err),
                ))
            }
        }
    }

    /// Fetch one page of memories matching the query, newest first.
    pub async fn query_messages(
        &self,
        query: MemoryQuery,
    ) -> Result<Vec<Record>, MemoryServiceError> {
        let filter = memory_filter(&query, self.settings.keyword_match);
        match self
            .store
            .query_records(&self.settings.memories_collection, filter, memory_sorts())
            .await
        {
            Ok(records) => {
                debug!("memories retrieved (count={})", records.len());
                Ok(records)
            }
            Err(err) => {
                error!("error retrieving memories: {err}");
                Err(MemoryServiceError::new(
                    MemoryErrorKind::StoreQuery,
                    Some(err),
                ))
            }
        }
    }

    /// Return the id of the area titled `name`, creating the area when none
    /// exists.
    ///
    /// With [`AreaResolution::Serialized`] the lookup and the create run
    /// under a per-name lock, so concurrent calls in this process agree on a
    /// single area. Separate processes can still race.
    pub async fn resolve_or_create_area(&self, name: &str) -> Result<AreaId, MemoryServiceError> {
        if name.is_empty() {
            warn!("area resolution requested with an empty name");
            return Err(MemoryServiceError::new(
                MemoryErrorKind::AreaResolution,
                None,
            ));
        }
        let _guard = match self.settings.area_resolution {
            AreaResolution::Serialized => Some(self.area_locks.acquire(name).await),
            AreaResolution::Unguarded => None,
        };
        self.lookup_or_create_area(name).await.map_err(|err| {
            error!("error assigning memory area: {err}");
            MemoryServiceError::new(MemoryErrorKind::AreaResolution, Some(err))
        })
    }

    /// Look up an area by exact name without creating it.
    pub async fn find_area(&self, name: &str) -> Result<Option<AreaId>, MemoryServiceError> {
        self.lookup_area(name).await.map_err(|err| {
            error!("error looking up memory area: {err}");
            MemoryServiceError::new(MemoryErrorKind::AreaResolution, Some(err))
        })
    }

    async fn lookup_or_create_area(&self, name: &str) -> Result<AreaId, StoreError> {
        if let Some(area) = self.lookup_area(name).await? {
            debug!("memory area found (area_id={area})");
            return Ok(area);
        }
        let mut fields = Fields::new();
        fields.insert(
            area_fields::NAME.to_string(),
            PropertyValue::Title(name.to_string()),
        );
        let record = self
            .store
            .create_record(&self.settings.areas_collection, fields)
            .await?;
        info!("memory area created (area_id={})", record.id);
        Ok(AreaId::new(record.id))
    }

    async fn lookup_area(&self, name: &str) -> Result<Option<AreaId>, StoreError> {
        let filter = Filter::property(area_fields::NAME, Condition::TitleEquals(name.to_string()));
        let matches = self
            .store
            .query_records(&self.settings.areas_collection, Some(filter), Vec::new())
            .await?;
        if matches.len() > 1 {
            warn!(
                "multiple memory areas share a name; using the first (matches={})",
                matches.len()
            );
        }
        Ok(matches.into_iter().next().map(|record| AreaId::new(record.id)))
    }
}

/// Shape a new memory into record fields, stamping the current instant.
fn memory_record_fields(memory: NewMemory) -> Fields {
    let mut fields = Fields::new();
    fields.insert(
        memory_fields::MESSAGE.to_string(),
        PropertyValue::Title(memory.message),
    );
    fields.insert(
        memory_fields::KEYWORDS.to_string(),
        PropertyValue::MultiSelect(memory.keywords),
    );
    fields.insert(
        memory_fields::INFERENCE.to_string(),
        PropertyValue::RichText(memory.inference),
    );
    fields.insert(
        memory_fields::HEXCODE.to_string(),
        PropertyValue::RichText(memory.hexcode),
    );
    fields.insert(
        memory_fields::TIMESTAMP.to_string(),
        PropertyValue::Date(Utc::now()),
    );
    if let Some(area) = memory.area {
        fields.insert(
            memory_fields::AREA.to_string(),
            PropertyValue::Relation(vec![area.as_str().to_string()]),
        );
    }
    fields
}

fn keyword_count(fields: &Fields) -> usize {
    match fields.get(memory_fields::KEYWORDS) {
        Some(PropertyValue::MultiSelect(tags)) => tags.len(),
        _ => 0,
    }
}
