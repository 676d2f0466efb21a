// src/api/rpc.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::mcp::{handler::handle_mcp_request, protocol::Request};
use crate::AppState;

/// Forwards one JSON-RPC request to the MCP handler.
///
/// Notifications are accepted with `202` and an empty body.
pub async fn rpc_handler(State(state): State<AppState>, Json(req): Json<Request>) -> Response {
    match handle_mcp_request(req, state).await {
        Some(resp) => Json(resp).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
