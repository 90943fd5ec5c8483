//! Mermaid MCP server binary.
//!
//! Serves the Mermaid diagram tools over stdio (default) or HTTP.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use clap::Parser;
use mermaid_server::{http, stdio, telemetry, AppState, CliArgs, ServerConfig, Transport};
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from(CliArgs::parse());
    telemetry::init_tracing(config.debug);

    let state = AppState::new(config.mcp_server());
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        transport = ?config.transport,
        raster = state.mcp.pipeline().raster_backend_name().unwrap_or("placeholder"),
        render_timeout_secs = config.render_timeout.as_secs(),
        "Starting Mermaid MCP server"
    );

    match config.transport {
        Transport::Stdio => {
            let stdin = BufReader::new(tokio::io::stdin());
            stdio::serve(&state.mcp, stdin, tokio::io::stdout()).await?;
        }
        Transport::Http => http::serve(state, config.port).await?,
    }

    Ok(())
}
