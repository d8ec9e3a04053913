//! HTTP gatekeeper for the chatmem memory service.
//!
//! Checks the shared API key, shapes request bodies into memory service
//! calls and maps their outcome onto a small JSON envelope.

mod auth;
mod error;
mod handlers;
mod response;
mod router;
mod state;

/// API key extractor and header name.
pub use auth::{API_KEY_HEADER, Authorized};
/// Caller-visible failures.
pub use error::ApiError;
/// Response envelope.
pub use response::ApiResponse;
/// Router construction.
pub use router::router;
/// Shared handler state.
pub use state::AppState;
