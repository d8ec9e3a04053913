//! Route handlers.
//!
//! Each memory route extracts [`Authorized`] first, so the key is checked
//! before the body is parsed and before any remote call.

use crate::auth::Authorized;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use chatmem_core::{AreaId, GroupAssignment, MemoryQuery, NewMemory};
use chatmem_store::Record;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Deserialize;
use serde_json::{Value, json};

type Body<T> = Result<Json<T>, JsonRejection>;
type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct StoreMemoryRequest {
    message: Option<String>,
    keywords: Option<Vec<String>>,
    inference: Option<String>,
    hexcode: Option<String>,
    area_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct QueryMemoriesRequest {
    keywords: Vec<String>,
    area_name: Option<String>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct CreateGroupRequest {
    group_name: Option<String>,
    keywords: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct AssignGroupRequest {
    memory_id: Option<String>,
    group_code: Option<String>,
}

/// Present and non-empty, or a 400 naming the field.
fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::missing_field(field))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

/// Store one chat memory, resolving its area first when one is named.
pub(crate) async fn store_memory(
    _: Authorized,
    State(state): State<AppState>,
    body: Body<StoreMemoryRequest>,
) -> ApiResult<Record> {
    let Json(request) = body?;
    let message = required(request.message, "message")?;
    let keywords = request.keywords.unwrap_or_default();
    let service = state.service();

    let area = match non_empty(request.area_name) {
        Some(name) => Some(service.resolve_or_create_area(&name).await?),
        None => None,
    };
    debug!(
        "storing memory (message_len={}, keywords={}, has_area={})",
        message.len(),
        keywords.len(),
        area.is_some()
    );
    let record = service
        .create_message(NewMemory {
            message,
            keywords,
            inference: request.inference.unwrap_or_default(),
            hexcode: request.hexcode.unwrap_or_default(),
            area,
        })
        .await?;
    Ok(Json(ApiResponse::ok(record)))
}

/// Query memories, newest first. A named area is looked up but never
/// created; an unknown area matches nothing.
pub(crate) async fn query_memories(
    _: Authorized,
    State(state): State<AppState>,
    body: Body<QueryMemoriesRequest>,
) -> ApiResult<Vec<Record>> {
    let Json(request) = body?;
    let service = state.service();

    let area: Option<AreaId> = match non_empty(request.area_name) {
        Some(name) => match service.find_area(&name).await? {
            Some(area) => Some(area),
            None => {
                debug!("query names an unknown area; returning no memories");
                return Ok(Json(ApiResponse::ok(Vec::new())));
            }
        },
        None => None,
    };
    let records = service
        .query_messages(MemoryQuery {
            keywords: request.keywords,
            area,
            start: request.start_date,
            end: request.end_date,
        })
        .await?;
    Ok(Json(ApiResponse::ok(records)))
}

pub(crate) async fn create_group(
    _: Authorized,
    State(state): State<AppState>,
    body: Body<CreateGroupRequest>,
) -> ApiResult<Record> {
    let Json(request) = body?;
    let group_name = required(request.group_name, "groupName")?;
    let record = state
        .service()
        .create_memory_group(&group_name, &request.keywords)
        .await?;
    Ok(Json(ApiResponse::ok(record)))
}

pub(crate) async fn assign_group(
    _: Authorized,
    State(state): State<AppState>,
    body: Body<AssignGroupRequest>,
) -> ApiResult<GroupAssignment> {
    let Json(request) = body?;
    let memory_id = required(request.memory_id, "memoryId")?;
    let group_code = required(request.group_code, "groupCode")?;
    let assignment = state
        .service()
        .assign_memory_to_group(&memory_id, &group_code)
        .await?;
    Ok(Json(ApiResponse::ok(assignment)))
}

pub(crate) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub(crate) async fn not_found() -> ApiError {
    info!("no route matched");
    ApiError::NotFound
}
