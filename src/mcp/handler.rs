// src/mcp/handler.rs

use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::mcp::{
    dispatch::call_tool,
    protocol::{error_codes, Request, Response, PROTOCOL_VERSION, SERVER_NAME},
    tools::{Tool, TOOLS},
};
use crate::AppState;

/// Main dispatcher for incoming MCP requests.
///
/// Returns `None` for notifications: they are neither answered nor executed.
pub async fn handle_mcp_request(req: Request, state: AppState) -> Option<Response> {
    if req.is_notification() {
        debug!("Ignoring notification: {}", req.method);
        return None;
    }
    info!("Handling MCP request for method: {}", req.method);

    let response = match req.method.as_str() {
        "initialize" => handle_initialize(&req),
        "tools/list" => handle_tools_list(&req),
        "tools/call" => handle_tool_call(req, state).await,
        _ => Response::error(
            req.id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        ),
    };

    Some(response)
}

fn handle_initialize(req: &Request) -> Response {
    Response::success(
        req.id.clone(),
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            },
            "capabilities": { "tools": {} },
        }),
    )
}

fn handle_tools_list(req: &Request) -> Response {
    Response::success(req.id.clone(), json!({ "tools": &*TOOLS }))
}

/// Handles a `tools/call`: resolves the tool, runs it against the shared
/// session, and wraps the outcome as text content.
async fn handle_tool_call(req: Request, state: AppState) -> Response {
    let params = req.params.clone().unwrap_or_else(|| json!({}));

    let tool_name = match params.get("name").and_then(Value::as_str) {
        Some(name) => name,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'name' field in params".into(),
            )
        }
    };

    let Some(tool) = Tool::from_name(tool_name) else {
        return Response::error(
            req.id,
            error_codes::SERVER_ERROR,
            format!("Unknown tool: {}", tool_name),
        );
    };

    let empty_args = json!({});
    let args = match params.get("arguments") {
        Some(v) if !v.is_null() => v,
        _ => &empty_args,
    };

    // One call at a time: tools that touch credentials or the wallet must not interleave.
    let mut session = state.session.lock().await;
    match call_tool(tool, args, &mut session, &state).await {
        Ok(outcome) => {
            debug!("Tool {} finished with status {}", tool_name, outcome.status);
            match serde_json::to_value(outcome.into_result()) {
                Ok(result) => Response::success(req.id, result),
                Err(e) => Response::error(req.id, error_codes::SERVER_ERROR, e.to_string()),
            }
        }
        Err(e) => {
            error!("Tool {} failed: {}", tool_name, e);
            Response::error(req.id, error_codes::SERVER_ERROR, e.to_string())
        }
    }
}
