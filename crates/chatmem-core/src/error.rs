//! Error types for memory service operations.

use chatmem_store::StoreError;

/// Failure categories surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryErrorKind {
    /// Creating a memory record failed.
    StoreWrite,
    /// Querying memory records failed.
    StoreQuery,
    /// Looking up or creating a memory area failed.
    AreaResolution,
    /// Creating a memory group failed.
    GroupCreation,
    /// Linking a memory to a group failed.
    GroupAssignment,
}

impl MemoryErrorKind {
    /// Fixed caller-visible message for the kind.
    pub fn message(self) -> &'static str {
        match self {
            MemoryErrorKind::StoreWrite => "Failed to store message in ChatMemories",
            MemoryErrorKind::StoreQuery => "Failed to retrieve memories from ChatMemories",
            MemoryErrorKind::AreaResolution => "Failed to assign memory area",
            MemoryErrorKind::GroupCreation => "Failed to create memory group",
            MemoryErrorKind::GroupAssignment => "Failed to assign memory to group",
        }
    }
}

/// Error returned by [`crate::MemoryService`].
///
/// `Display` only ever yields the kind's fixed message. The underlying store
/// error, when there is one, is reachable through `source()` for
/// diagnostics.
#[derive(Debug, thiserror::Error)]
#[error("{}", .kind.message())]
pub struct MemoryServiceError {
    kind: MemoryErrorKind,
    #[source]
    cause: Option<StoreError>,
}

impl MemoryServiceError {
    /// Build an error of the given kind with an optional cause.
    pub fn new(kind: MemoryErrorKind, cause: Option<StoreError>) -> Self {
        Self { kind, cause }
    }

    /// Failure category.
    pub fn kind(&self) -> MemoryErrorKind {
        self.kind
    }

    /// Underlying store error, if any.
    pub fn cause(&self) -> Option<&StoreError> {
        self.cause.as_ref()
    }
}
