//! HTTP transport routes.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{Harness, UNREACHABLE_API};
use meatmarket_mcp::api::create_router;

fn rpc_request(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/rpc")
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let h = Harness::new(UNREACHABLE_API, None);
    let response = create_router(h.state.clone())
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let v: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["status"], json!("ok"));
}

#[tokio::test]
async fn rpc_route_runs_the_dispatcher() {
    let h = Harness::new(UNREACHABLE_API, None);
    let response = create_router(h.state.clone())
        .oneshot(rpc_request(json!({
            "jsonrpc": "2.0",
            "id": 11,
            "method": "tools/call",
            "params": {"name": "set_auto_pay", "arguments": {"enabled": true}}
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let v: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["id"], json!(11));
    assert_eq!(v["result"]["isError"], json!(false));
    assert!(h.state.session.lock().await.auto_pay());
}

#[tokio::test]
async fn rpc_notifications_are_accepted_without_a_body() {
    let h = Harness::new(UNREACHABLE_API, None);
    let response = create_router(h.state.clone())
        .oneshot(rpc_request(json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(body.is_empty());
}
