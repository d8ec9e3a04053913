//! Shared-secret check on the `api-key` header.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use log::warn;

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "api-key";

/// Proof that the request presented the configured API key.
///
/// Runs before the body is read, so a rejected request never reaches the
/// memory service.
#[derive(Debug, Clone, Copy)]
pub struct Authorized;

impl<S> FromRequestParts<S> for Authorized
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let presented = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok());
        match presented {
            Some(key) if state.accepts(key) => Ok(Authorized),
            Some(_) => {
                warn!("rejected request with invalid api key (path={})", parts.uri.path());
                Err(ApiError::Unauthorized)
            }
            None => {
                warn!("rejected request without api key (path={})", parts.uri.path());
                Err(ApiError::Unauthorized)
            }
        }
    }
}
