/// Common test utilities for Marginalia integration tests
///
/// This file contains shared functions and utilities for all integration tests,
/// including test application setup, request builders that carry the identity
/// headers, and helpers for resolving kind ids through the API.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tower::Service;

use marginalia::{
    create_app,
    db::{init_pool, DbPool},
    registry::Registry,
    run_migrations, AppState,
};

/// Creates a test application backed by an in-memory SQLite database
///
/// ### Returns
///
/// An Axum Router configured with all routes and connected to a fresh
/// in-memory database with the default engine configuration
pub fn create_test_app() -> Router {
    create_test_app_with_pool().0
}

/// Creates a test application and exposes its connection pool
///
/// Most tests drive everything through the API; the pool is for the few
/// that need to arrange state with no endpoint, like user quota limits or
/// marking rows validated.
///
/// ### Returns
///
/// The configured Router together with the pool it is using
pub fn create_test_app_with_pool() -> (Router, Arc<DbPool>) {
    // Use a unique shared in-memory database for each test.
    // Plain ":memory:" gives each connection its own separate database,
    // so migrations run on one connection wouldn't be visible on others.
    // By using a unique URI with cache=shared, all connections in this pool
    // share the same in-memory database while remaining isolated from other tests.
    let unique_id = uuid::Uuid::new_v4();
    let database_url = format!("file:test_{}?mode=memory&cache=shared", unique_id);
    let pool = Arc::new(init_pool(&database_url));

    // Run migrations and resolve the default engine configuration
    let conn = &mut pool.get().unwrap();
    run_migrations(conn);
    let registry = Arc::new(
        Registry::ready_named(conn, "default").expect("Failed to resolve the default configuration"),
    );

    let app = create_app(AppState::new(Arc::clone(&pool), registry));
    (app, pool)
}

/// Builds a GET request, optionally carrying a user identity header
pub fn get_request(uri: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).method("GET");
    if let Some(user) = user {
        builder = builder.header("X-User-Id", user);
    }
    builder.body(Body::empty()).unwrap()
}

/// Builds a GET request carrying an admin identity
pub fn admin_get_request(uri: &str, user: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .header("X-User-Id", user)
        .header("X-Admin", "1")
        .body(Body::empty())
        .unwrap()
}

/// Builds a JSON request, optionally carrying a user identity header
pub fn json_request(method: &str, uri: &str, user: Option<&str>, payload: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .method(method)
        .header("Content-Type", "application/json");
    if let Some(user) = user {
        builder = builder.header("X-User-Id", user);
    }
    builder
        .body(Body::from(serde_json::to_string(payload).unwrap()))
        .unwrap()
}

/// Builds a bodyless request, optionally carrying a user identity header
pub fn bare_request(method: &str, uri: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(user) = user {
        builder = builder.header("X-User-Id", user);
    }
    builder.body(Body::empty()).unwrap()
}

/// Sends a request and parses the JSON response body
///
/// ### Returns
///
/// The response status and the parsed body, or `Value::Null` for an empty
/// body
pub async fn send(app: &mut Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.call(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            panic!(
                "Failed to parse response body: {} ({})",
                String::from_utf8_lossy(&bytes),
                e
            )
        })
    };
    (parts.status, value)
}

fn kind_map(kinds: Value) -> HashMap<String, i64> {
    kinds
        .as_array()
        .unwrap()
        .iter()
        .map(|kind| {
            (
                kind["model"].as_str().unwrap().to_string(),
                kind["kind_id"].as_i64().unwrap(),
            )
        })
        .collect()
}

/// Fetches the enabled strategy kinds as a model name to kind id map
pub async fn strategy_kind_ids(app: &mut Router) -> HashMap<String, i64> {
    let (status, kinds) = send(app, get_request("/kinds/strategies", None)).await;
    assert_eq!(status, StatusCode::OK);
    kind_map(kinds)
}

/// Fetches the enabled media kinds as a model name to kind id map
pub async fn media_kind_ids(app: &mut Router) -> HashMap<String, i64> {
    let (status, kinds) = send(app, get_request("/kinds/media", None)).await;
    assert_eq!(status, StatusCode::OK);
    kind_map(kinds)
}

/// Creates a review via the API, asserting success
///
/// ### Arguments
///
/// * `app` - The test application
/// * `user` - The user the review is created as
/// * `payload` - The full form submission
///
/// ### Returns
///
/// The created review as a JSON Value
pub async fn create_review(app: &mut Router, user: &str, payload: &Value) -> Value {
    let (status, body) = send(app, json_request("POST", "/reviews", Some(user), payload)).await;
    assert_eq!(
        status,
        StatusCode::OK,
        "Expected 200 OK creating a review, instead got {}: {}",
        status,
        body
    );
    body
}
