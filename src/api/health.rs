// src/api/health.rs

use axum::{response::IntoResponse, Json};
use serde_json::json;

use crate::mcp::protocol::SERVER_NAME;

pub async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "server": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
