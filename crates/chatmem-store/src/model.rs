//! Record, property, filter and sort models shared by store implementations.

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Typed value of a single record property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// The record's title text.
    Title(String),
    /// Free text. An empty string is a valid value.
    RichText(String),
    /// Independent tag values, stored in the given order.
    MultiSelect(Vec<String>),
    /// A point in time.
    Date(DateTime<Utc>),
    /// Identifiers of related records.
    Relation(Vec<String>),
}

/// Property name to value. Properties missing from the map are omitted
/// from the request entirely.
pub type Fields = BTreeMap<String, PropertyValue>;

/// Predicate applied to a single property.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Exact, case-sensitive title match.
    TitleEquals(String),
    /// Exact rich-text match.
    RichTextEquals(String),
    /// Tag list contains the value.
    MultiSelectContains(String),
    /// Relation list contains the identifier.
    RelationContains(String),
    /// Date strictly after and/or before the given bounds.
    DateRange {
        after: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    },
}

/// Query filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Single property predicate.
    Property {
        property: String,
        condition: Condition,
    },
    /// All sub-filters must match.
    And(Vec<Filter>),
    /// Any sub-filter must match.
    Or(Vec<Filter>),
}

impl Filter {
    /// Build a single property predicate.
    pub fn property(property: impl Into<String>, condition: Condition) -> Self {
        Self::Property {
            property: property.into(),
            condition,
        }
    }

    /// Collect every property name referenced by the filter tree.
    pub fn properties(&self) -> Vec<&str> {
        match self {
            Filter::Property { property, .. } => vec![property.as_str()],
            Filter::And(filters) | Filter::Or(filters) => {
                filters.iter().flat_map(Filter::properties).collect()
            }
        }
    }
}

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Sort on a single property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub property: String,
    pub direction: SortDirection,
}

impl Sort {
    /// Sort by a property, most recent / largest first.
    pub fn descending(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Sort by a property, oldest / smallest first.
    pub fn ascending(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Ascending,
        }
    }
}

/// A record as returned by the remote store.
///
/// `payload` is kept untouched and serializes as-is so callers see the
/// store's own representation.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Store-assigned identifier.
    pub id: String,
    /// Full representation returned by the store.
    pub payload: Value,
}

impl Record {
    /// Wrap a store payload, extracting its `id`.
    pub fn from_payload(payload: Value) -> Result<Self, StoreError> {
        let id = payload
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or(StoreError::MissingId)?
            .to_string();
        Ok(Self { id, payload })
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.payload.serialize(serializer)
    }
}
