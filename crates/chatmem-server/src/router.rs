use crate::handlers::{
    assign_group, create_group, health, method_not_allowed, not_found, query_memories,
    store_memory,
};
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};

/// Build the HTTP router.
///
/// Memory routes accept only POST; any other verb gets 405 before the API
/// key is looked at. Unmatched paths get 404.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/memory",
            post(store_memory).fallback(method_not_allowed),
        )
        .route(
            "/api/memory/query",
            post(query_memories).fallback(method_not_allowed),
        )
        .route(
            "/api/memory/groups",
            post(create_group).fallback(method_not_allowed),
        )
        .route(
            "/api/memory/groups/assign",
            post(assign_group).fallback(method_not_allowed),
        )
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(state)
}
