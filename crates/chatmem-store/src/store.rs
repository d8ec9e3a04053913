//! Store capability interface.

use crate::error::StoreError;
use crate::model::{Fields, Filter, Record, Sort};
use async_trait::async_trait;

/// Narrow view of a document database used by the memory service.
///
/// Collections and records are addressed by opaque identifier strings.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Create a record in a collection and return the stored representation.
    async fn create_record(&self, collection: &str, fields: Fields) -> Result<Record, StoreError>;

    /// Query one page of records, optionally filtered and sorted.
    async fn query_records(
        &self,
        collection: &str,
        filter: Option<Filter>,
        sorts: Vec<Sort>,
    ) -> Result<Vec<Record>, StoreError>;

    /// Overwrite the given properties of an existing record.
    async fn update_record(&self, record_id: &str, fields: Fields) -> Result<Record, StoreError>;
}
