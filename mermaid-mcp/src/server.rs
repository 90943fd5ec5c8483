//! MCP server implementation for Mermaid tools.
//!
//! Implements the JSON-RPC 2.0 methods an MCP client needs to discover and
//! call the tools. Transport framing lives in the server binary.

use std::sync::Arc;

use mermaid_core::{Analyzer, HeuristicAnalyzer};
use mermaid_renderer::ExportPipeline;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::args::ToolArgs;
use crate::error::{ToolError, ToolResult};
use crate::registry::{ToolName, ToolRegistry};
use crate::tools;
use crate::ToolResponse;

/// MCP protocol revision implemented here.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name reported by `initialize`.
pub const SERVER_NAME: &str = "mermaid-mcp";

/// JSON-RPC parse error code.
pub const PARSE_ERROR: i32 = -32700;

/// JSON-RPC unknown method code.
pub const METHOD_NOT_FOUND: i32 = -32601;

/// Arguments that are worth echoing in the invocation log.
const LOGGED_ARGUMENTS: [&str; 10] = [
    "diagram_type",
    "language",
    "analysis_type",
    "audience",
    "workflow_type",
    "format",
    "theme",
    "output_path",
    "width",
    "height",
];

/// JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (must be "2.0").
    pub jsonrpc: String,
    /// Request ID; absent for notifications. An explicit `null` is kept as
    /// `Some(Value::Null)` and still gets a response.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<Value>,
    /// Method name.
    pub method: String,
    /// Method parameters.
    #[serde(default)]
    pub params: Value,
}

/// Wrap any value that is present, `null` included; absence is handled by
/// `#[serde(default)]`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0").
    pub jsonrpc: String,
    /// Request ID (matches request).
    pub id: Value,
    /// Result (on success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error (on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i32,
    /// Error message.
    pub message: String,
    /// Additional data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    #[must_use]
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    #[must_use]
    pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Response to a message that could not be parsed.
    #[must_use]
    pub fn parse_error(detail: impl std::fmt::Display) -> Self {
        Self::error(Value::Null, PARSE_ERROR, format!("Parse error: {detail}"))
    }
}

/// MCP tool definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// Input schema (JSON Schema).
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// MCP server for Mermaid tools.
///
/// Holds no per-request state; one instance can serve any number of
/// concurrent requests.
#[derive(Clone)]
pub struct MermaidMcpServer {
    analyzer: Arc<dyn Analyzer>,
    pipeline: ExportPipeline,
    registry: ToolRegistry,
}

impl MermaidMcpServer {
    /// Create a server backed by the heuristic analyzer and a placeholder
    /// export pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            analyzer: Arc::new(HeuristicAnalyzer::new()),
            pipeline: ExportPipeline::new(),
            registry: ToolRegistry::standard(),
        }
    }

    /// Replace the analyzer.
    #[must_use]
    pub fn with_analyzer(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Replace the export pipeline.
    #[must_use]
    pub fn with_pipeline(mut self, pipeline: ExportPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// The tool catalog.
    #[must_use]
    pub const fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// The export pipeline.
    #[must_use]
    pub const fn pipeline(&self) -> &ExportPipeline {
        &self.pipeline
    }

    /// Handle a JSON-RPC message.
    ///
    /// Returns `None` for notifications, which get no response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        tracing::debug!(method = %request.method, params = %request.params, "MCP request");

        let Some(id) = request.id else {
            tracing::debug!(method = %request.method, "Notification received");
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => Self::handle_initialize(id),
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, &request.params).await,
            method if method.starts_with("notifications/") => return None,
            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };
        Some(response)
    }

    /// Handle initialize request.
    fn handle_initialize(id: Value) -> JsonRpcResponse {
        JsonRpcResponse::success(
            id,
            serde_json::json!({
                "protocolVersion": PROTOCOL_VERSION,
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION")
                },
                "capabilities": {
                    "tools": {}
                }
            }),
        )
    }

    /// Handle tools/list request.
    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        JsonRpcResponse::success(id, serde_json::json!({ "tools": self.registry.tools() }))
    }

    /// Handle tools/call request.
    async fn handle_tools_call(&self, id: Value, params: &Value) -> JsonRpcResponse {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let arguments = params.get("arguments").unwrap_or(&Value::Null);

        let response = self.call_tool(name, arguments).await;
        match serde_json::to_value(&response) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::success(
                id,
                serde_json::json!({
                    "content": [{ "type": "text", "text": format!("Error executing {name}: {e}") }],
                    "isError": true
                }),
            ),
        }
    }

    /// Invoke a tool by name.
    ///
    /// Never fails: any error is reported as an `isError` text block that
    /// names the tool.
    pub async fn call_tool(&self, name: &str, arguments: &Value) -> ToolResponse {
        tracing::info!(tool = name, params = %key_params(arguments), "Tool invoked");

        match self.dispatch(name, arguments).await {
            Ok(text) => ToolResponse::text(text),
            Err(err) => {
                tracing::warn!(tool = name, error = %err, "Tool failed");
                ToolResponse::error(format!("Error executing {name}: {err}"))
            }
        }
    }

    async fn dispatch(&self, name: &str, arguments: &Value) -> ToolResult<String> {
        let descriptor = self
            .registry
            .find(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let args = ToolArgs::bind(descriptor, arguments)?;
        let analyzer = self.analyzer.as_ref();

        match descriptor.name {
            ToolName::GenerateDiagramFromCode => {
                tools::generate_diagram_from_code(analyzer, &args).await
            }
            ToolName::AnalyzeDiagramStructure => {
                tools::analyze_diagram_structure(analyzer, &args).await
            }
            ToolName::SuggestDiagramImprovements => {
                tools::suggest_diagram_improvements(analyzer, &args).await
            }
            ToolName::CreateWorkflowDiagram => {
                tools::create_workflow_diagram(analyzer, &args).await
            }
            ToolName::ExportDiagramFormats => {
                tools::export_diagram_formats(&self.pipeline, &args).await
            }
            ToolName::ValidateDiagramSyntax => {
                tools::validate_diagram_syntax(analyzer, &args).await
            }
        }
    }
}

impl Default for MermaidMcpServer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MermaidMcpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MermaidMcpServer")
            .field("pipeline", &self.pipeline)
            .field("tools", &self.registry.list().len())
            .finish_non_exhaustive()
    }
}

/// Short scalar arguments for the invocation log; diagram and code bodies
/// are left out.
fn key_params(arguments: &Value) -> String {
    LOGGED_ARGUMENTS
        .iter()
        .filter_map(|key| {
            let value = arguments.get(key)?;
            match value {
                Value::String(s) => Some(format!("{key}={s}")),
                Value::Number(_) | Value::Bool(_) => Some(format!("{key}={value}")),
                _ => None,
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
