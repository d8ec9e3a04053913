use async_trait::async_trait;
use chatmem_store::notion::encode_properties;
use chatmem_store::{
    Condition, Fields, Filter, PropertyValue, Record, RemoteStore, Sort, SortDirection, StoreError,
};
use parking_lot::Mutex;
use serde_json::json;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::time::Duration;
use uuid::Uuid;

/// Store operation kinds, used for call inspection and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    Create,
    Query,
    Update,
}

/// A single call received by [`InMemoryStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Create {
        collection: String,
        fields: Fields,
    },
    Query {
        collection: String,
        filter: Option<Filter>,
        sorts: Vec<Sort>,
    },
    Update {
        record_id: String,
        fields: Fields,
    },
}

impl StoreCall {
    pub fn operation(&self) -> StoreOperation {
        match self {
            StoreCall::Create { .. } => StoreOperation::Create,
            StoreCall::Query { .. } => StoreOperation::Query,
            StoreCall::Update { .. } => StoreOperation::Update,
        }
    }
}

#[derive(Debug, Clone)]
struct StoredRecord {
    collection: String,
    id: String,
    fields: Fields,
}

impl StoredRecord {
    fn to_record(&self) -> Record {
        Record {
            id: self.id.clone(),
            payload: json!({
                "object": "page",
                "id": self.id,
                "parent": { "database_id": self.collection },
                "properties": encode_properties(&self.fields),
            }),
        }
    }
}

/// In-memory [`RemoteStore`] that evaluates filters and sorts locally and
/// records every call it receives.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<Vec<StoredRecord>>,
    calls: Mutex<Vec<StoreCall>>,
    failing: Mutex<HashSet<StoreOperation>>,
    query_delay: Mutex<Option<Duration>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record without recording a call.
    pub fn insert(&self, collection: &str, fields: Fields) -> Record {
        let stored = StoredRecord {
            collection: collection.to_string(),
            id: Uuid::new_v4().to_string(),
            fields,
        };
        let record = stored.to_record();
        self.records.lock().push(stored);
        record
    }

    /// Seed a record with a fixed id.
    pub fn insert_with_id(&self, collection: &str, id: &str, fields: Fields) -> Record {
        let stored = StoredRecord {
            collection: collection.to_string(),
            id: id.to_string(),
            fields,
        };
        let record = stored.to_record();
        self.records.lock().push(stored);
        record
    }

    /// Make every future call of this kind fail.
    pub fn fail(&self, operation: StoreOperation) {
        self.failing.lock().insert(operation);
    }

    /// Delay every query response. Results still reflect the records
    /// present when the query arrived.
    pub fn delay_queries(&self, delay: Duration) {
        *self.query_delay.lock() = Some(delay);
    }

    /// All calls received so far.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    /// Number of calls of the given kind.
    pub fn count(&self, operation: StoreOperation) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    /// Records currently held in a collection, in insertion order.
    pub fn records_in(&self, collection: &str) -> Vec<Record> {
        self.records
            .lock()
            .iter()
            .filter(|stored| stored.collection == collection)
            .map(StoredRecord::to_record)
            .collect()
    }

    /// Stored fields of a record.
    pub fn fields_of(&self, record_id: &str) -> Option<Fields> {
        self.records
            .lock()
            .iter()
            .find(|stored| stored.id == record_id)
            .map(|stored| stored.fields.clone())
    }

    fn check(&self, operation: StoreOperation) -> Result<(), StoreError> {
        if self.failing.lock().contains(&operation) {
            return Err(StoreError::Other(format!(
                "injected {operation:?} failure"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for InMemoryStore {
    async fn create_record(&self, collection: &str, fields: Fields) -> Result<Record, StoreError> {
        self.calls.lock().push(StoreCall::Create {
            collection: collection.to_string(),
            fields: fields.clone(),
        });
        self.check(StoreOperation::Create)?;
        Ok(self.insert(collection, fields))
    }

    async fn query_records(
        &self,
        collection: &str,
        filter: Option<Filter>,
        sorts: Vec<Sort>,
    ) -> Result<Vec<Record>, StoreError> {
        self.calls.lock().push(StoreCall::Query {
            collection: collection.to_string(),
            filter: filter.clone(),
            sorts: sorts.clone(),
        });
        self.check(StoreOperation::Query)?;

        // Snapshot before the delay.
        let mut matched: Vec<StoredRecord> = self
            .records
            .lock()
            .iter()
            .filter(|stored| stored.collection == collection)
            .filter(|stored| {
                filter
                    .as_ref()
                    .is_none_or(|filter| matches(filter, &stored.fields))
            })
            .cloned()
            .collect();
        matched.sort_by(|left, right| compare(&sorts, &left.fields, &right.fields));

        let delay = *self.query_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(matched.iter().map(StoredRecord::to_record).collect())
    }

    async fn update_record(&self, record_id: &str, fields: Fields) -> Result<Record, StoreError> {
        self.calls.lock().push(StoreCall::Update {
            record_id: record_id.to_string(),
            fields: fields.clone(),
        });
        self.check(StoreOperation::Update)?;
        let mut records = self.records.lock();
        let stored = records
            .iter_mut()
            .find(|stored| stored.id == record_id)
            .ok_or_else(|| StoreError::Api {
                status: 404,
                code: "object_not_found".to_string(),
                message: format!("record {record_id} not found"),
            })?;
        stored.fields.extend(fields);
        Ok(stored.to_record())
    }
}

fn matches(filter: &Filter, fields: &Fields) -> bool {
    match filter {
        Filter::And(filters) => filters.iter().all(|filter| matches(filter, fields)),
        Filter::Or(filters) => filters.iter().any(|filter| matches(filter, fields)),
        Filter::Property {
            property,
            condition,
        } => {
            let value = fields.get(property);
            match (condition, value) {
                (Condition::TitleEquals(expected), Some(PropertyValue::Title(actual))) => {
                    actual == expected
                }
                (Condition::RichTextEquals(expected), Some(PropertyValue::RichText(actual))) => {
                    actual == expected
                }
                (Condition::MultiSelectContains(tag), Some(PropertyValue::MultiSelect(tags))) => {
                    tags.contains(tag)
                }
                (Condition::RelationContains(id), Some(PropertyValue::Relation(ids))) => {
                    ids.contains(id)
                }
                (Condition::DateRange { after, before }, Some(PropertyValue::Date(instant))) => {
                    after.is_none_or(|after| *instant > after)
                        && before.is_none_or(|before| *instant < before)
                }
                _ => false,
            }
        }
    }
}

fn compare(sorts: &[Sort], left: &Fields, right: &Fields) -> Ordering {
    for sort in sorts {
        let ordering = compare_values(left.get(&sort.property), right.get(&sort.property));
        let ordering = match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn compare_values(left: Option<&PropertyValue>, right: Option<&PropertyValue>) -> Ordering {
    match (left, right) {
        (Some(PropertyValue::Date(left)), Some(PropertyValue::Date(right))) => left.cmp(right),
        (Some(PropertyValue::Title(left)), Some(PropertyValue::Title(right)))
        | (Some(PropertyValue::RichText(left)), Some(PropertyValue::RichText(right))) => {
            left.cmp(right)
        }
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}
