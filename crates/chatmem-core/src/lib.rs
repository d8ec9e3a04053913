//! Memory service for chatmem.
//!
//! Shapes chat memories into remote-store records, builds query filters and
//! resolves memory areas by name. All durable state lives in the remote
//! store behind [`chatmem_store::RemoteStore`].

pub mod area;
pub mod error;
pub mod filter;
pub mod groups;
pub mod model;
pub mod service;

/// Memory service error type.
pub use error::{MemoryErrorKind, MemoryServiceError};
/// Group code derivation.
pub use groups::generate_group_code;
/// Request and result models.
pub use model::{AreaId, GroupAssignment, MemoryQuery, NewMemory};
/// Service entry point and its settings.
pub use service::{MemoryService, MemorySettings};

/// Re-exported strategy types from the config crate.
pub use chatmem_config::{AreaResolution, KeywordMatch};
