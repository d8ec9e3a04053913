//! Memory service request and result models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Property names of the chat memories collection.
pub mod memory_fields {
    pub const MESSAGE: &str = "chat_message";
    pub const KEYWORDS: &str = "key_words";
    pub const INFERENCE: &str = "inference";
    pub const HEXCODE: &str = "hexcode";
    pub const TIMESTAMP: &str = "timestamp";
    pub const AREA: &str = "memory_area_id";
}

/// Property names of the memory areas collection.
pub mod area_fields {
    pub const NAME: &str = "Area";
}

/// Property names of the memory groups collection.
pub mod group_fields {
    pub const NAME: &str = "GroupName";
    pub const CODE: &str = "Groupcode";
    pub const MEMORIES: &str = "ChatMemories";
}

/// Remote identifier of a memory area.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AreaId(String);

impl AreaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A chat memory to be created.
///
/// The creation timestamp is assigned by the service, never by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewMemory {
    /// Message text, stored as the record title.
    pub message: String,
    /// Tags; order is kept and duplicates are not removed.
    pub keywords: Vec<String>,
    /// Free-text annotation.
    pub inference: String,
    /// Free-text color or marker code.
    pub hexcode: String,
    /// Area to relate the record to.
    pub area: Option<AreaId>,
}

impl NewMemory {
    /// Memory with only a message; every other field takes its default.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

/// Criteria for querying memory records. Every criterion is optional and
/// supplied criteria are combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryQuery {
    pub keywords: Vec<String>,
    pub area: Option<AreaId>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Outcome of linking a memory to a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GroupAssignment {
    /// An existing group with the code was updated.
    Assigned {
        #[serde(rename = "groupId")]
        group_id: String,
    },
    /// No group had the code, so one was created.
    Created {
        #[serde(rename = "groupId")]
        group_id: String,
    },
}
