//! Command-line and environment configuration.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use mermaid_mcp::MermaidMcpServer;
use mermaid_renderer::{ExportPipeline, RasterBackend};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 9474;

/// Default bound on a raster backend call, in seconds.
pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 30;

/// How MCP messages reach the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// Line-delimited JSON-RPC on stdin/stdout.
    Stdio,
    /// JSON-RPC over `POST /mcp`.
    Http,
}

/// Command-line arguments for mermaid-mcp-server.
#[derive(Debug, Clone, Parser)]
#[command(name = "mermaid-mcp-server")]
#[command(about = "MCP server for generating, analyzing, validating and exporting Mermaid diagrams")]
#[command(version)]
pub struct CliArgs {
    /// Transport to serve
    #[arg(long, env = "MERMAID_MCP_TRANSPORT", value_enum, default_value_t = Transport::Stdio)]
    pub transport: Transport,

    /// HTTP port, bound on 127.0.0.1
    #[arg(long, env = "MERMAID_MCP_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Verbose diagnostics on stderr
    #[arg(long, env = "MERMAID_MCP_DEBUG")]
    pub debug: bool,

    /// Upper bound on a single PNG/PDF render, in seconds
    #[arg(long, env = "MERMAID_MCP_RENDER_TIMEOUT", default_value_t = DEFAULT_RENDER_TIMEOUT_SECS)]
    pub render_timeout_secs: u64,

    /// Render PNG/PDF with the built-in rasterizer (requires the `raster` feature)
    #[arg(long, env = "MERMAID_MCP_RASTER")]
    pub raster: bool,
}

/// Resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Transport to serve.
    pub transport: Transport,
    /// HTTP port.
    pub port: u16,
    /// Debug logging.
    pub debug: bool,
    /// Bound on a raster backend call.
    pub render_timeout: Duration,
    /// Use the built-in raster backend.
    pub raster: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: Transport::Stdio,
            port: DEFAULT_PORT,
            debug: false,
            render_timeout: Duration::from_secs(DEFAULT_RENDER_TIMEOUT_SECS),
            raster: false,
        }
    }
}

impl From<CliArgs> for ServerConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            transport: args.transport,
            port: args.port,
            debug: args.debug,
            render_timeout: Duration::from_secs(args.render_timeout_secs),
            raster: args.raster,
        }
    }
}

impl ServerConfig {
    /// Export pipeline for this configuration.
    #[must_use]
    pub fn export_pipeline(&self) -> ExportPipeline {
        let pipeline = ExportPipeline::new().with_render_timeout(self.render_timeout);
        match self.raster.then(builtin_raster_backend).flatten() {
            Some(backend) => pipeline.with_raster_backend(backend),
            None => pipeline,
        }
    }

    /// MCP server for this configuration.
    #[must_use]
    pub fn mcp_server(&self) -> MermaidMcpServer {
        MermaidMcpServer::new().with_pipeline(self.export_pipeline())
    }
}

#[cfg(feature = "raster")]
#[allow(clippy::unnecessary_wraps)]
fn builtin_raster_backend() -> Option<Arc<dyn RasterBackend>> {
    Some(Arc::new(mermaid_renderer::SvgRasterBackend::new()))
}

#[cfg(not(feature = "raster"))]
#[allow(clippy::unnecessary_wraps)]
fn builtin_raster_backend() -> Option<Arc<dyn RasterBackend>> {
    tracing::warn!(
        "Raster rendering requested without the `raster` feature; PNG/PDF stay placeholders"
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["mermaid-mcp-server"]).expect("parse");
        let config = ServerConfig::from(args);
        // The environment may override these, so only check shape.
        assert!(config.port > 0);
        assert!(config.render_timeout.as_secs() > 0);
    }

    #[test]
    fn test_explicit_flags() {
        let args = CliArgs::try_parse_from([
            "mermaid-mcp-server",
            "--transport",
            "http",
            "--port",
            "8088",
            "--debug",
            "--render-timeout-secs",
            "5",
        ])
        .expect("parse");
        let config = ServerConfig::from(args);
        assert_eq!(config.transport, Transport::Http);
        assert_eq!(config.port, 8088);
        assert!(config.debug);
        assert_eq!(config.render_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_unknown_transport_rejected() {
        assert!(CliArgs::try_parse_from(["mermaid-mcp-server", "--transport", "grpc"]).is_err());
    }

    #[test]
    fn test_pipeline_without_raster() {
        let pipeline = ServerConfig::default().export_pipeline();
        assert_eq!(pipeline.raster_backend_name(), None);
    }

    #[cfg(feature = "raster")]
    #[test]
    fn test_pipeline_with_raster() {
        let config = ServerConfig {
            raster: true,
            ..ServerConfig::default()
        };
        assert_eq!(config.export_pipeline().raster_backend_name(), Some("resvg"));
    }
}
