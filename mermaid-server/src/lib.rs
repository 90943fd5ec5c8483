//! # Mermaid MCP Server Library
//!
//! Transports and configuration for the Mermaid MCP server.
//! This library is used by both the binary and integration tests.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::sync::Arc;

use mermaid_mcp::MermaidMcpServer;

pub mod config;
pub mod health;
pub mod http;
pub mod stdio;
pub mod telemetry;

pub use config::{CliArgs, ServerConfig, Transport};

/// Shared application state.
#[derive(Clone, Debug)]
pub struct AppState {
    /// MCP server instance.
    pub mcp: Arc<MermaidMcpServer>,
}

impl AppState {
    /// Wrap a server for sharing across handlers.
    #[must_use]
    pub fn new(mcp: MermaidMcpServer) -> Self {
        Self { mcp: Arc::new(mcp) }
    }
}
