//! # Mermaid MCP
//!
//! MCP (Model Context Protocol) tools for working with Mermaid diagrams.
//!
//! ## MCP Tools
//!
//! - `generate_diagram_from_code` - Turn source code into a diagram
//! - `analyze_diagram_structure` - Count and score an existing diagram
//! - `suggest_diagram_improvements` - Prioritised suggestions for a reader
//! - `create_workflow_diagram` - Workflow diagram from a description
//! - `export_diagram_formats` - Export to SVG, PNG, PDF or HTML
//! - `validate_diagram_syntax` - Line-numbered syntax report
//!
//! Failures inside a tool never become protocol errors: the dispatcher turns
//! them into a text block flagged with `isError`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod args;
pub mod error;
pub mod registry;
pub mod server;
pub mod tools;

// Re-export key types for convenience
pub use error::{ToolError, ToolResult};
pub use registry::{ToolDescriptor, ToolName, ToolRegistry};
pub use server::{JsonRpcRequest, JsonRpcResponse, MermaidMcpServer};

use serde::{Deserialize, Serialize};

/// MCP tool response: the `result` of a `tools/call`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Ordered content blocks; never empty.
    pub content: Vec<ContentBlock>,
    /// Set when the block describes a failed invocation.
    #[serde(rename = "isError", default, skip_serializing_if = "is_false")]
    pub is_error: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

impl ToolResponse {
    /// A single text block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// A single text block describing a failure.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(message)
        }
    }

    /// Text of the first text block.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            ContentBlock::Image { .. } => None,
        })
    }
}

/// MCP content block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    /// UTF-8 text.
    Text {
        /// The text payload.
        text: String,
    },
    /// Binary image data.
    Image {
        /// Base64-encoded data.
        data: String,
        /// MIME type.
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_response_shape() {
        let json = serde_json::to_value(ToolResponse::text("hello")).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({ "content": [{ "type": "text", "text": "hello" }] })
        );
    }

    #[test]
    fn test_error_response_is_flagged() {
        let json = serde_json::to_value(ToolResponse::error("boom")).expect("serialize");
        assert_eq!(json["isError"], true);
        assert_eq!(json["content"][0]["text"], "boom");
    }

    #[test]
    fn test_image_block_shape() {
        let block = ContentBlock::Image {
            data: "AAAA".into(),
            mime_type: "image/png".into(),
        };
        let json = serde_json::to_value(block).expect("serialize");
        assert_eq!(json["type"], "image");
        assert_eq!(json["mimeType"], "image/png");
    }
}
