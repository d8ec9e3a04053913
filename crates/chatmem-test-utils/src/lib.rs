//! Test helpers shared across chatmem crates.

pub mod store;

pub use store::{InMemoryStore, StoreCall, StoreOperation};
