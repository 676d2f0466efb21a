// src/mcp/transport.rs

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info};

use crate::mcp::{codec::JsonLinesCodec, handler::handle_mcp_request, protocol::Request};
use crate::AppState;

/// Serves newline-delimited JSON-RPC until the reader hits EOF.
///
/// Requests are handled one after another, so responses leave in request
/// order. Lines that are not valid requests are dropped without a reply.
pub async fn serve<R, W>(reader: R, writer: W, state: AppState)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = FramedRead::new(reader, JsonLinesCodec::new());
    let mut out = FramedWrite::new(writer, JsonLinesCodec::new());

    while let Some(line) = lines.next().await {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read from input: {}", e);
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        debug!("Received: {}", line);

        let request = match serde_json::from_str::<Request>(line) {
            Ok(request) => request,
            Err(e) => {
                debug!("Dropping unparseable line: {}", e);
                continue;
            }
        };

        if let Some(response) = handle_mcp_request(request, state.clone()).await {
            // `send` flushes, so each reply goes out before the next request is read.
            if let Err(e) = out.send(&response).await {
                error!("Failed to write response: {}", e);
                break;
            }
        }
    }

    info!("EOF received, shutting down MCP server");
}

pub async fn serve_stdio(state: AppState) {
    info!("Starting MCP server on stdin/stdout");
    serve(tokio::io::stdin(), tokio::io::stdout(), state).await;
}
