//! Remote document store access for chatmem.
//!
//! The memory service talks to its backing database only through the
//! [`RemoteStore`] trait. [`NotionStore`] is the HTTP implementation.

pub mod error;
pub mod model;
pub mod notion;
pub mod store;

/// Store error type.
pub use error::StoreError;
/// Record, field, filter and sort models.
pub use model::{Condition, Fields, Filter, PropertyValue, Record, Sort, SortDirection};
/// HTTP store implementation.
pub use notion::{NotionSettings, NotionStore};
/// Store capability interface.
pub use store::RemoteStore;
