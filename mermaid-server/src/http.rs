//! HTTP transport.

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use mermaid_mcp::{JsonRpcRequest, JsonRpcResponse};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::{health, AppState};

/// Build the router: `POST /mcp` and `GET /health`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/mcp", post(mcp_handler))
        .route("/health", get(health::health))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .with_state(state)
}

/// Bind to localhost and serve until the process stops.
///
/// # Errors
///
/// Returns an error if the port cannot be bound or the server fails.
pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Mermaid MCP server listening on http://{}/mcp", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// MCP JSON-RPC endpoint.
///
/// The body is parsed by hand so malformed JSON gets a JSON-RPC parse error
/// instead of an HTTP rejection. Notifications are acknowledged with 202.
async fn mcp_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match serde_json::from_slice::<JsonRpcRequest>(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable MCP request");
            return Json(JsonRpcResponse::parse_error(e)).into_response();
        }
    };
    match state.mcp.handle_request(request).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
