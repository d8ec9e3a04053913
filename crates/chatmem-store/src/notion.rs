//! HTTP store backed by a Notion-compatible REST API.

use crate::error::StoreError;
use crate::model::{Condition, Fields, Filter, PropertyValue, Record, Sort, SortDirection};
use crate::store::RemoteStore;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, warn};
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use serde_json::{Map, Value, json};

/// Connection settings for [`NotionStore`].
#[derive(Debug, Clone)]
pub struct NotionSettings {
    /// API root, e.g. `https://api.notion.com/v1`.
    pub base_url: String,
    /// Integration token sent as a bearer credential.
    pub token: String,
    /// Value of the `Notion-Version` header.
    pub version: String,
}

/// Remote store speaking the Notion pages/databases API.
#[derive(Debug, Clone)]
pub struct NotionStore {
    client: Client,
    settings: NotionSettings,
}

/// Query endpoint response; only the first page of `results` is used.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    results: Vec<Value>,
    #[serde(default)]
    has_more: bool,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl NotionStore {
    /// Create a store with a fresh HTTP client.
    pub fn new(settings: NotionSettings) -> Self {
        Self::with_client(Client::new(), settings)
    }

    /// Create a store reusing an existing HTTP client.
    pub fn with_client(client: Client, settings: NotionSettings) -> Self {
        Self { client, settings }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path);
        self.client
            .request(method, url)
            .bearer_auth(&self.settings.token)
            .header("Notion-Version", &self.settings.version)
    }

    async fn send(&self, request: RequestBuilder, body: Value) -> Result<Value, StoreError> {
        let response = request.json(&body).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            let error = serde_json::from_slice::<ErrorBody>(&bytes).unwrap_or(ErrorBody {
                code: String::new(),
                message: String::from_utf8_lossy(&bytes).into_owned(),
            });
            warn!(
                "remote store request failed (status={}, code={})",
                status.as_u16(),
                error.code
            );
            return Err(StoreError::Api {
                status: status.as_u16(),
                code: error.code,
                message: error.message,
            });
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl RemoteStore for NotionStore {
    async fn create_record(&self, collection: &str, fields: Fields) -> Result<Record, StoreError> {
        debug!(
            "creating record (collection={}, properties={})",
            collection,
            fields.len()
        );
        let body = json!({
            "parent": { "database_id": collection },
            "properties": encode_properties(&fields),
        });
        let payload = self.send(self.request(Method::POST, "pages"), body).await?;
        Record::from_payload(payload)
    }

    async fn query_records(
        &self,
        collection: &str,
        filter: Option<Filter>,
        sorts: Vec<Sort>,
    ) -> Result<Vec<Record>, StoreError> {
        let mut body = Map::new();
        if let Some(filter) = &filter {
            body.insert("filter".to_string(), encode_filter(filter));
        }
        if !sorts.is_empty() {
            body.insert("sorts".to_string(), encode_sorts(&sorts));
        }
        let path = format!("databases/{collection}/query");
        let payload = self
            .send(self.request(Method::POST, &path), Value::Object(body))
            .await?;
        let response: QueryResponse = serde_json::from_value(payload)?;
        debug!(
            "queried records (collection={}, returned={}, has_more={})",
            collection,
            response.results.len(),
            response.has_more
        );
        response
            .results
            .into_iter()
            .map(Record::from_payload)
            .collect()
    }

    async fn update_record(&self, record_id: &str, fields: Fields) -> Result<Record, StoreError> {
        debug!(
            "updating record (record_id={}, properties={})",
            record_id,
            fields.len()
        );
        let body = json!({ "properties": encode_properties(&fields) });
        let path = format!("pages/{record_id}");
        let payload = self.send(self.request(Method::PATCH, &path), body).await?;
        Record::from_payload(payload)
    }
}

/// Format an instant as ISO-8601 UTC with millisecond precision.
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn text_content(content: &str) -> Value {
    json!([{ "text": { "content": content } }])
}

/// Encode record fields into the API's property object.
pub fn encode_properties(fields: &Fields) -> Value {
    let properties = fields
        .iter()
        .map(|(name, value)| (name.clone(), encode_property(value)))
        .collect::<Map<_, _>>();
    Value::Object(properties)
}

fn encode_property(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::Title(text) => json!({ "title": text_content(text) }),
        PropertyValue::RichText(text) => json!({ "rich_text": text_content(text) }),
        PropertyValue::MultiSelect(tags) => json!({
            "multi_select": tags.iter().map(|tag| json!({ "name": tag })).collect::<Vec<_>>()
        }),
        PropertyValue::Date(instant) => json!({ "date": { "start": format_instant(instant) } }),
        PropertyValue::Relation(ids) => json!({
            "relation": ids.iter().map(|id| json!({ "id": id })).collect::<Vec<_>>()
        }),
    }
}

/// Encode a filter tree into the API's filter object.
pub fn encode_filter(filter: &Filter) -> Value {
    match filter {
        Filter::And(filters) => {
            json!({ "and": filters.iter().map(encode_filter).collect::<Vec<_>>() })
        }
        Filter::Or(filters) => {
            json!({ "or": filters.iter().map(encode_filter).collect::<Vec<_>>() })
        }
        Filter::Property {
            property,
            condition,
        } => {
            let (kind, predicate) = encode_condition(condition);
            let mut object = Map::new();
            object.insert("property".to_string(), json!(property));
            object.insert(kind.to_string(), predicate);
            Value::Object(object)
        }
    }
}

fn encode_condition(condition: &Condition) -> (&'static str, Value) {
    match condition {
        Condition::TitleEquals(value) => ("title", json!({ "equals": value })),
        Condition::RichTextEquals(value) => ("rich_text", json!({ "equals": value })),
        Condition::MultiSelectContains(value) => ("multi_select", json!({ "contains": value })),
        Condition::RelationContains(value) => ("relation", json!({ "contains": value })),
        Condition::DateRange { after, before } => {
            let mut range = Map::new();
            if let Some(after) = after {
                range.insert("after".to_string(), json!(format_instant(after)));
            }
            if let Some(before) = before {
                range.insert("before".to_string(), json!(format_instant(before)));
            }
            ("date", Value::Object(range))
        }
    }
}

/// Encode sorts into the API's sort list.
pub fn encode_sorts(sorts: &[Sort]) -> Value {
    let sorts = sorts
        .iter()
        .map(|sort| {
            let direction = match sort.direction {
                SortDirection::Ascending => "ascending",
                SortDirection::Descending => "descending",
            };
            json!({ "property": sort.property, "direction": direction })
        })
        .collect::<Vec<_>>();
    Value::Array(sorts)
}
