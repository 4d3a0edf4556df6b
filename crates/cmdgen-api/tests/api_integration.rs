//! Integration tests for the cmdgen hook API.
//!
//! These tests verify the endpoints run the pipeline, park suspended runs
//! and map failures to the expected status codes.
//!
//! Run with: `cargo test --package cmdgen-api --test api_integration`

use std::fs;
use std::path::Path;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use cmdgen_api::{create_api_state, create_app};
use cmdgen_ops::{Config, OpsContext};

/// Create a test router generating into `base`.
fn create_test_router(base: &Path) -> Router {
    let ctx = OpsContext::new(Config::with_base_path(base));
    create_app(create_api_state(ctx))
}

/// Helper to make a GET request.
async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap_or(json!(null));

    (status, json)
}

/// Helper to make a POST request with JSON body.
async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap_or(json!(null));

    (status, json)
}

/// Board with PlaceOrder → Order → OrderPlaced.
fn place_order_request(node: &str) -> Value {
    json!({
        "board": {
            "nodes": [
                {
                    "id": "c1",
                    "name": "PlaceOrder",
                    "kind": "command",
                    "metadata": {"schema": {"orderId": "string|format:uuid"}}
                },
                {"id": "a1", "name": "Order", "kind": "aggregate"},
                {"id": "e1", "name": "OrderPlaced", "kind": "event"}
            ],
            "edges": [
                {"from": "c1", "to": "a1"},
                {"from": "a1", "to": "e1"}
            ]
        },
        "node": node
    })
}

fn schema_path(base: &Path) -> std::path::PathBuf {
    base.join("src/Domain/Api/_schema/PlaceOrder-schema.json")
}

/// Seed a hand-edited schema file.
fn seed_schema(base: &Path) {
    let path = schema_path(base);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "{\"hand\": \"edited\"}").unwrap();
}

// =============================================================================
// Health Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_health_reports_ok() {
    let temp = TempDir::new().unwrap();
    let router = create_test_router(temp.path());

    let (status, json) = get(&router, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["pending"], 0);
    assert!(json["timestamp"].as_u64().is_some());
}

// =============================================================================
// Command Hook Tests
// =============================================================================

#[tokio::test]
async fn test_command_hook_completes_without_existing_schema() {
    let temp = TempDir::new().unwrap();
    let router = create_test_router(temp.path());

    let (status, json) = post(&router, "/api/hooks/command", place_order_request("PlaceOrder")).await;

    assert_eq!(status, StatusCode::OK, "Hook should succeed: {:?}", json);
    let data = &json["data"];
    assert_eq!(data["type"], "info");
    assert_eq!(
        data["message"],
        "Wasn't easy, but command PlaceOrder should work now!"
    );
    assert_eq!(data["style"], "color: #73dd8e;font-weight: bold");

    let details = data["details"].as_str().unwrap();
    assert!(details.starts_with("Checklist\n\n"));
    assert!(details.contains("PlaceOrder-schema.json updated\n"));
    assert!(details.contains("place_order.php updated\n"));
    assert!(details.lines().last().unwrap().starts_with("Time elapsed: "));

    assert!(schema_path(temp.path()).is_file());
    assert!(temp.path().join("src/Domain/Command/place_order.php").is_file());
}

#[tokio::test]
async fn test_command_hook_asks_then_keeps_schema() {
    let temp = TempDir::new().unwrap();
    seed_schema(temp.path());
    let router = create_test_router(temp.path());

    let (status, json) = post(&router, "/api/hooks/command", place_order_request("c1")).await;

    assert_eq!(status, StatusCode::OK);
    let data = &json["data"];
    assert_eq!(data["type"], "question");
    assert_eq!(
        data["question"],
        format!(
            "Should I overwrite the file \"{}\"?",
            schema_path(temp.path()).display()
        )
    );
    assert!(!temp.path().join("src/Domain/Command").exists());

    let (_, health) = get(&router, "/api/health").await;
    assert_eq!(health["data"]["pending"], 1);

    let run_id = data["run_id"].clone();
    let (status, json) = post(&router, "/api/question", json!({"run_id": run_id, "answer": "no"})).await;

    assert_eq!(status, StatusCode::OK, "Answer should succeed: {:?}", json);
    assert_eq!(json["data"]["type"], "info");
    assert_eq!(json["data"]["message"], "You're the boss");
    assert!(json["data"]["details"]
        .as_str()
        .unwrap()
        .contains("⬤ Skipped: Command schema file written\n"));
    assert_eq!(
        fs::read_to_string(schema_path(temp.path())).unwrap(),
        "{\"hand\": \"edited\"}"
    );
    assert!(temp.path().join("src/Domain/Command/place_order.php").is_file());
}

#[tokio::test]
async fn test_answer_yes_overwrites_schema() {
    let temp = TempDir::new().unwrap();
    seed_schema(temp.path());
    let router = create_test_router(temp.path());

    let (_, json) = post(&router, "/api/hooks/command", place_order_request("c1")).await;
    let run_id = json["data"]["run_id"].clone();

    let (status, json) = post(&router, "/api/question", json!({"run_id": run_id, "answer": "Yes!"})).await;

    assert_eq!(status, StatusCode::OK);
    let details = json["data"]["details"].as_str().unwrap();
    assert!(details.contains("PlaceOrder-schema.json updated\n"));
    assert!(!details.contains("Skipped"));

    let schema: Value =
        serde_json::from_str(&fs::read_to_string(schema_path(temp.path())).unwrap()).unwrap();
    assert_eq!(schema["type"], "object");
}

#[tokio::test]
async fn test_run_resumes_only_once() {
    let temp = TempDir::new().unwrap();
    seed_schema(temp.path());
    let router = create_test_router(temp.path());

    let (_, json) = post(&router, "/api/hooks/command", place_order_request("c1")).await;
    let run_id = json["data"]["run_id"].clone();

    let (first, _) = post(&router, "/api/question", json!({"run_id": run_id, "answer": "no"})).await;
    let (second, json) = post(&router, "/api/question", json!({"run_id": run_id, "answer": "yes"})).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::NOT_FOUND);
    assert_eq!(json["data"]["code"], "UNKNOWN_RUN");
    assert_eq!(
        fs::read_to_string(schema_path(temp.path())).unwrap(),
        "{\"hand\": \"edited\"}"
    );
}

#[tokio::test]
async fn test_unknown_run_id_is_not_found() {
    let temp = TempDir::new().unwrap();
    let router = create_test_router(temp.path());

    let (status, json) = post(
        &router,
        "/api/question",
        json!({"run_id": "6f1c2d7e-8a4b-4c3d-9e2f-1a2b3c4d5e6f", "answer": "yes"}),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["data"]["code"], "UNKNOWN_RUN");
}

// =============================================================================
// Error Mapping Tests
// =============================================================================

#[tokio::test]
async fn test_unknown_node_is_unprocessable() {
    let temp = TempDir::new().unwrap();
    let router = create_test_router(temp.path());

    let (status, json) = post(&router, "/api/hooks/command", place_order_request("CancelOrder")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["data"]["code"], "RESOLUTION_ERROR");
    assert!(json["data"].get("report").is_none());
    assert!(!temp.path().join("src").exists());
}

#[tokio::test]
async fn test_non_command_node_is_unprocessable() {
    let temp = TempDir::new().unwrap();
    let router = create_test_router(temp.path());

    let (status, json) = post(&router, "/api/hooks/command", place_order_request("Order")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["data"]["code"], "RESOLUTION_ERROR");
}

#[tokio::test]
async fn test_write_failure_returns_partial_report() {
    let temp = TempDir::new().unwrap();
    // A directory where the command file should go makes that write fail
    fs::create_dir_all(temp.path().join("src/Domain/Command/place_order.php")).unwrap();
    let router = create_test_router(temp.path());

    let (status, json) = post(&router, "/api/hooks/command", place_order_request("c1")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["data"]["code"], "WRITE_ERROR");
    let report = json["data"]["report"].as_str().unwrap();
    assert!(report.contains("PlaceOrder-schema.json updated\n"));
    assert!(report.contains("PlaceOrder.php updated\n"));
    assert!(!report.contains("Time elapsed"));
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let temp = TempDir::new().unwrap();
    let router = create_test_router(temp.path());

    let (status, _) = post(&router, "/api/hooks/command", json!({"node": "c1"})).await;

    assert!(status.is_client_error());
}
