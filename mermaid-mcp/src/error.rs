//! Tool invocation errors.

use mermaid_core::AnalyzerError;
use mermaid_renderer::RenderError;
use thiserror::Error;

/// Result type for tool invocations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors raised while resolving or running a tool.
///
/// None of these cross the dispatcher: they are reported as the text of an
/// `isError` tool response.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No tool with this name is registered.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments are missing or have the wrong type.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The export pipeline failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The analyzer failed.
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),

    /// A structured result could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
