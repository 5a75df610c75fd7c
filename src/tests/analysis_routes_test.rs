// Router-level tests for the analysis endpoints: requests go through axum
// extraction, handler validation, and JSON error rendering end to end.

use crate::config::QueryHistoryConfig;
use crate::services::advisor::AdvisorEngine;
use crate::services::{AnalysisService, QueryHistoryService, WarehouseClient};
use crate::{AppState, handlers};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    routing::{get, post},
};
use std::sync::Arc;
use tower::util::ServiceExt;

/// State whose warehouse points at an unreachable endpoint; batch analysis
/// and request validation never touch it
fn test_state() -> Arc<AppState> {
    let opts = mysql_async::OptsBuilder::default()
        .ip_or_hostname("127.0.0.1")
        .tcp_port(1);
    let warehouse = Arc::new(WarehouseClient::from_pool(mysql_async::Pool::new(opts)));
    let engine = Arc::new(AdvisorEngine::default());
    let history = Arc::new(QueryHistoryService::new(
        Arc::clone(&warehouse),
        QueryHistoryConfig::default(),
    ));
    let analysis_service = Arc::new(AnalysisService::new(history, Arc::clone(&engine), 5_000));
    Arc::new(AppState { warehouse, engine, analysis_service, default_limit: 10 })
}

fn test_router() -> Router {
    Router::new()
        .route("/api/analysis/worst-queries", get(handlers::analysis::worst_queries))
        .route("/api/analysis/batch", post(handlers::analysis::analyze_batch))
        .with_state(test_state())
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_batch_route_returns_ranked_results() {
    let app = test_router();
    let payload = r#"{
        "records": [
            {
                "query_id": "q-spill",
                "total_duration_ms": 120000,
                "execution_duration_ms": 120000,
                "spilled_bytes": 2147483648
            },
            {
                "query_id": "q-benign",
                "total_duration_ms": 30000,
                "execution_duration_ms": 30000
            }
        ]
    }"#;

    let response = app.oneshot(post_json("/api/analysis/batch", payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["analyzed"], 2);
    assert_eq!(body["mode"], "badness");
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert_eq!(body["results"][0]["query_id"], "q-spill");
    assert_eq!(body["results"][0]["primary_issue"], "MEMORY_SPILL_CRITICAL");
    assert_eq!(body["results"][0]["rank"], 1);
}

#[tokio::test]
async fn test_worst_queries_rejects_out_of_range_hours() {
    let app = test_router();

    for uri in ["/api/analysis/worst-queries?hours=0", "/api/analysis/worst-queries?hours=1000"] {
        let response = app.clone().oneshot(get_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "expected 400 for {}", uri);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_worst_queries_rejects_negative_floor() {
    let app = test_router();
    let response = app
        .oneshot(get_request("/api/analysis/worst-queries?min_duration_seconds=-5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_worst_queries_huge_floor_does_not_overflow() {
    // i64::MAX seconds saturates on the millisecond conversion; the request
    // reaches the warehouse fetch (unreachable here) instead of panicking
    let app = test_router();
    let uri = "/api/analysis/worst-queries?min_duration_seconds=9223372036854775807";
    let response = app.oneshot(get_request(uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "WAREHOUSE_CONNECTION_FAILED");
}

#[tokio::test]
async fn test_batch_rejects_out_of_range_limit() {
    let app = test_router();

    for limit in [0, 501] {
        let payload = format!(r#"{{"records": [], "limit": {}}}"#, limit);
        let response =
            app.clone().oneshot(post_json("/api/analysis/batch", &payload)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "expected 400 for limit={}", limit);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_batch_rejects_negative_floor() {
    let app = test_router();
    let payload = r#"{"records": [], "min_execution_ms": -1}"#;
    let response = app.oneshot(post_json("/api/analysis/batch", payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}
