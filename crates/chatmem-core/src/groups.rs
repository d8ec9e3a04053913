//! Memory groups: records that bundle related memories under a short code.

use crate::error::{MemoryErrorKind, MemoryServiceError};
use crate::model::{GroupAssignment, group_fields};
use crate::service::MemoryService;
use chatmem_store::{Condition, Fields, Filter, PropertyValue, Record, StoreError};
use log::{error, info};

/// Derive a group code from the first three keywords, joined with `-` and
/// lower-cased.
pub fn generate_group_code<S: AsRef<str>>(keywords: &[S]) -> String {
    keywords
        .iter()
        .take(3)
        .map(|keyword| keyword.as_ref())
        .collect::<Vec<&str>>()
        .join("-")
        .to_lowercase()
}

fn group_record_fields(name: &str, code: String, member: Option<&str>) -> Fields {
    let mut fields = Fields::new();
    fields.insert(
        group_fields::NAME.to_string(),
        PropertyValue::Title(name.to_string()),
    );
    fields.insert(group_fields::CODE.to_string(), PropertyValue::RichText(code));
    if let Some(member) = member {
        fields.insert(
            group_fields::MEMORIES.to_string(),
            PropertyValue::Relation(vec![member.to_string()]),
        );
    }
    fields
}

impl MemoryService {
    fn groups_collection(&self) -> Result<&str, StoreError> {
        self.settings
            .groups_collection
            .as_deref()
            .ok_or_else(|| StoreError::NotConfigured("memory groups".to_string()))
    }

    /// Create a group named `group_name` whose code is derived from `keywords`.
    pub async fn create_memory_group(
        &self,
        group_name: &str,
        keywords: &[String],
    ) -> Result<Record, MemoryServiceError> {
        let result = async {
            let collection = self.groups_collection()?;
            let fields = group_record_fields(group_name, generate_group_code(keywords), None);
            self.store.create_record(collection, fields).await
        }
        .await;
        match result {
            Ok(record) => {
                info!("memory group created (group_id={})", record.id);
                Ok(record)
            }
            Err(err) => {
                error!("error creating memory group: {err}");
                Err(MemoryServiceError::new(
                    MemoryErrorKind::GroupCreation,
                    Some(err),
                ))
            }
        }
    }

    /// Link a memory to the group carrying `group_code`, creating the group
    /// when none has that code.
    pub async fn assign_memory_to_group(
        &self,
        memory_id: &str,
        group_code: &str,
    ) -> Result<GroupAssignment, MemoryServiceError> {
        self.link_memory(memory_id, group_code).await.map_err(|err| {
            error!("error assigning memory to group: {err}");
            MemoryServiceError::new(MemoryErrorKind::GroupAssignment, Some(err))
        })
    }

    async fn link_memory(
        &self,
        memory_id: &str,
        group_code: &str,
    ) -> Result<GroupAssignment, StoreError> {
        let collection = self.groups_collection()?;
        let filter = Filter::property(
            group_fields::CODE,
            Condition::RichTextEquals(group_code.to_string()),
        );
        let existing = self
            .store
            .query_records(collection, Some(filter), Vec::new())
            .await?;

        if let Some(group) = existing.into_iter().next() {
            let mut fields = Fields::new();
            fields.insert(
                group_fields::MEMORIES.to_string(),
                PropertyValue::Relation(vec![memory_id.to_string()]),
            );
            self.store.update_record(&group.id, fields).await?;
            info!("memory assigned to existing group (group_id={})", group.id);
            return Ok(GroupAssignment::Assigned { group_id: group.id });
        }

        // Stored verbatim; lookups compare codes exactly.
        let fields = group_record_fields(group_code, group_code.to_string(), Some(memory_id));
        let group = self.store.create_record(collection, fields).await?;
        info!("memory assigned to new group (group_id={})", group.id);
        Ok(GroupAssignment::Created { group_id: group.id })
    }
}
