//! End-to-end router behaviour over the in-memory store.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use chatmem_core::{MemoryService, MemorySettings};
use chatmem_server::{AppState, router};
use chatmem_store::{Fields, PropertyValue};
use chatmem_test_utils::{InMemoryStore, StoreCall, StoreOperation};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "s3cret";
const MEMORIES: &str = "memories-db";
const AREAS: &str = "areas-db";
const GROUPS: &str = "groups-db";

fn app_with(store: Arc<InMemoryStore>, groups: bool) -> Router {
    let settings = MemorySettings {
        groups_collection: groups.then(|| GROUPS.to_string()),
        ..MemorySettings::new(MEMORIES, AREAS)
    };
    let service = Arc::new(MemoryService::new(store, settings));
    router(AppState::new(SECRET, service))
}

fn app(store: Arc<InMemoryStore>) -> Router {
    app_with(store, true)
}

fn request(method: Method, uri: &str, key: Option<&str>, body: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
        builder = builder.header("api-key", key);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

fn post(uri: &str, body: Value) -> Request<Body> {
    request(Method::POST, uri, Some(SECRET), Some(&body.to_string()))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn area(name: &str) -> Fields {
    let mut fields = Fields::new();
    fields.insert("Area".to_string(), PropertyValue::Title(name.to_string()));
    fields
}

#[tokio::test]
async fn missing_key_is_unauthorized_without_remote_calls() {
    let store = Arc::new(InMemoryStore::new());
    let (status, body) = send(
        app(store.clone()),
        request(
            Method::POST,
            "/api/memory",
            None,
            Some(r#"{"message":"hello","areaName":"Work"}"#),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({ "success": false, "message": "Unauthorized: Invalid API Key" })
    );
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn wrong_key_is_unauthorized_without_remote_calls() {
    let store = Arc::new(InMemoryStore::new());
    let (status, _) = send(
        app(store.clone()),
        request(
            Method::POST,
            "/api/memory",
            Some("S3CRET"),
            Some(r#"{"message":"hello"}"#),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn non_post_verbs_are_rejected_regardless_of_key() {
    for key in [Some(SECRET), Some("wrong"), None] {
        for method in [Method::GET, Method::PUT, Method::DELETE] {
            let store = Arc::new(InMemoryStore::new());
            let (status, body) = send(
                app(store.clone()),
                request(method.clone(), "/api/memory", key, None),
            )
            .await;

            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {key:?}");
            assert_eq!(
                body,
                json!({ "success": false, "message": "Method Not Allowed" })
            );
            assert!(store.calls().is_empty());
        }
    }
}

#[tokio::test]
async fn missing_message_is_bad_request() {
    let store = Arc::new(InMemoryStore::new());
    let (status, body) = send(
        app(store.clone()),
        post("/api/memory", json!({ "keywords": ["a"], "areaName": "Work" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "success": false, "message": "Bad Request: \"message\" is required" })
    );
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let store = Arc::new(InMemoryStore::new());
    let (status, body) = send(
        app(store.clone()),
        request(Method::POST, "/api/memory", Some(SECRET), Some("{not json")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(
        body["message"]
            .as_str()
            .is_some_and(|message| message.starts_with("Bad Request: "))
    );
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn store_without_area_skips_area_resolution() {
    let store = Arc::new(InMemoryStore::new());
    let (status, body) = send(
        app(store.clone()),
        post("/api/memory", json!({ "message": "hello", "keywords": ["a", "b"] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(
        body["data"]["properties"]["chat_message"]["title"][0]["text"]["content"],
        json!("hello")
    );
    assert!(body["data"]["properties"].get("memory_area_id").is_none());
    assert!(body.get("message").is_none());

    let calls = store.calls();
    assert_eq!(calls.len(), 1);
    let StoreCall::Create { collection, fields } = &calls[0] else {
        panic!("expected create call");
    };
    assert_eq!(collection, MEMORIES);
    assert!(!fields.contains_key("memory_area_id"));
}

#[tokio::test]
async fn empty_area_name_is_treated_as_absent() {
    let store = Arc::new(InMemoryStore::new());
    let (status, _) = send(
        app(store.clone()),
        post("/api/memory", json!({ "message": "hello", "areaName": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.count(StoreOperation::Query), 0);
    assert_eq!(store.count(StoreOperation::Create), 1);
}

#[tokio::test]
async fn existing_area_is_related_without_creating_one() {
    let store = Arc::new(InMemoryStore::new());
    store.insert_with_id(AREAS, "A1", area("Work"));
    let (status, body) = send(
        app(store.clone()),
        post("/api/memory", json!({ "message": "hello", "areaName": "Work" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["properties"]["memory_area_id"]["relation"],
        json!([{ "id": "A1" }])
    );
    assert_eq!(store.count(StoreOperation::Create), 1);
    assert_eq!(store.records_in(AREAS).len(), 1);
}

#[tokio::test]
async fn new_area_is_created_before_the_memory() {
    let store = Arc::new(InMemoryStore::new());
    let (status, _) = send(
        app(store.clone()),
        post("/api/memory", json!({ "message": "hello", "areaName": "NewArea" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let areas = store.records_in(AREAS);
    assert_eq!(areas.len(), 1);
    let operations: Vec<_> = store.calls().iter().map(StoreCall::operation).collect();
    assert_eq!(
        operations,
        vec![
            StoreOperation::Query,
            StoreOperation::Create,
            StoreOperation::Create
        ]
    );
    let memory = &store.records_in(MEMORIES)[0];
    assert_eq!(
        store.fields_of(&memory.id).expect("memory").get("memory_area_id"),
        Some(&PropertyValue::Relation(vec![areas[0].id.clone()]))
    );
}

#[tokio::test]
async fn store_failure_is_a_generic_server_error() {
    let store = Arc::new(InMemoryStore::new());
    store.fail(StoreOperation::Create);
    let (status, body) = send(
        app(store.clone()),
        post("/api/memory", json!({ "message": "hello" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "success": false, "error": "Failed to store message in ChatMemories" })
    );
}

#[tokio::test]
async fn area_failure_stops_before_memory_creation() {
    let store = Arc::new(InMemoryStore::new());
    store.fail(StoreOperation::Query);
    let (status, body) = send(
        app(store.clone()),
        post("/api/memory", json!({ "message": "hello", "areaName": "Work" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "success": false, "error": "Failed to assign memory area" })
    );
    assert_eq!(store.count(StoreOperation::Create), 0);
}

#[tokio::test]
async fn query_returns_matching_memories() {
    let store = Arc::new(InMemoryStore::new());
    let app = app(store.clone());
    for (message, keyword) in [("one", "x"), ("two", "y")] {
        let (status, _) = send(
            app.clone(),
            post(
                "/api/memory",
                json!({ "message": message, "keywords": [keyword] }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(
        app,
        post("/api/memory/query", json!({ "keywords": ["y", "x"] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_array().expect("records");
    assert_eq!(data.len(), 1);
    assert_eq!(
        data[0]["properties"]["chat_message"]["title"][0]["text"]["content"],
        json!("two")
    );
}

#[tokio::test]
async fn query_with_unknown_area_is_empty_and_creates_nothing() {
    let store = Arc::new(InMemoryStore::new());
    let (status, body) = send(
        app(store.clone()),
        post("/api/memory/query", json!({ "areaName": "Nowhere" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "data": [] }));
    assert_eq!(store.count(StoreOperation::Create), 0);
    assert_eq!(store.count(StoreOperation::Query), 1);
}

#[tokio::test]
async fn query_rejects_invalid_dates() {
    let store = Arc::new(InMemoryStore::new());
    let (status, _) = send(
        app(store.clone()),
        post("/api/memory/query", json!({ "startDate": "yesterday" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn query_requires_key() {
    let store = Arc::new(InMemoryStore::new());
    let (status, _) = send(
        app(store.clone()),
        request(Method::POST, "/api/memory/query", None, Some("{}")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn create_group_stores_derived_code() {
    let store = Arc::new(InMemoryStore::new());
    let (status, body) = send(
        app(store.clone()),
        post(
            "/api/memory/groups",
            json!({ "groupName": "Trip", "keywords": ["Travel", "Japan"] }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["properties"]["Groupcode"]["rich_text"][0]["text"]["content"],
        json!("travel-japan")
    );
    assert_eq!(store.records_in(GROUPS).len(), 1);
}

#[tokio::test]
async fn assign_group_reports_created_group() {
    let store = Arc::new(InMemoryStore::new());
    let (status, body) = send(
        app(store.clone()),
        post(
            "/api/memory/groups/assign",
            json!({ "memoryId": "M1", "groupCode": "travel" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("created"));
    let group_id = body["data"]["groupId"].as_str().expect("group id");
    assert_eq!(
        store.fields_of(group_id).expect("group").get("ChatMemories"),
        Some(&PropertyValue::Relation(vec!["M1".to_string()]))
    );
}

#[tokio::test]
async fn assign_group_requires_both_ids() {
    let store = Arc::new(InMemoryStore::new());
    let (status, body) = send(
        app(store.clone()),
        post("/api/memory/groups/assign", json!({ "memoryId": "M1" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        json!("Bad Request: \"groupCode\" is required")
    );
}

#[tokio::test]
async fn groups_without_collection_fail_generically() {
    let store = Arc::new(InMemoryStore::new());
    let (status, body) = send(
        app_with(store.clone(), false),
        post("/api/memory/groups", json!({ "groupName": "Trip" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "success": false, "error": "Failed to create memory group" })
    );
}

#[tokio::test]
async fn group_routes_only_accept_post() {
    let store = Arc::new(InMemoryStore::new());
    let (status, body) = send(
        app(store),
        request(Method::GET, "/api/memory/groups", Some(SECRET), None),
    )
    .await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["message"], json!("Method Not Allowed"));
}

#[tokio::test]
async fn health_needs_no_key() {
    let store = Arc::new(InMemoryStore::new());
    let (status, body) = send(app(store), request(Method::GET, "/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let store = Arc::new(InMemoryStore::new());
    let (status, body) = send(
        app(store),
        request(Method::POST, "/api/other", Some(SECRET), Some("{}")),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "message": "Not Found" }));
}
