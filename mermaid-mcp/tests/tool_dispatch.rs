//! Integration tests for tool dispatch (mermaid-mcp).
//!
//! Every tool is listed with a complete schema, callable with only its
//! required arguments, and degrades to an `isError` text block on failure.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use mermaid_core::{
    AnalysisDepth, Analyzer, AnalyzerError, AnalyzerResult, Audience, HeuristicAnalyzer,
    Improvement, Inspection, RequestedKind, StructureAnalysis, Validation, WorkflowFormat,
    WorkflowType,
};
use mermaid_mcp::args::ToolArgs;
use mermaid_mcp::{
    tools, JsonRpcRequest, MermaidMcpServer, ToolName, ToolRegistry, ToolResponse, ToolResult,
};
use mermaid_renderer::ExportPipeline;
use serde_json::{json, Value};

/// Analyzer that fails every call.
struct UnavailableAnalyzer;

fn unavailable<T>() -> AnalyzerResult<T> {
    Err(AnalyzerError::Failed("analysis service unavailable".to_string()))
}

#[async_trait]
impl Analyzer for UnavailableAnalyzer {
    async fn analyze_structure(&self, _source: &str) -> AnalyzerResult<StructureAnalysis> {
        unavailable()
    }

    async fn generate_source(
        &self,
        _analysis: &StructureAnalysis,
        _requested: RequestedKind,
        _include_details: bool,
    ) -> AnalyzerResult<String> {
        unavailable()
    }

    async fn inspect(&self, _source: &str, _depth: AnalysisDepth) -> AnalyzerResult<Inspection> {
        unavailable()
    }

    async fn suggest_improvements(
        &self,
        _source: &str,
        _context: Option<&str>,
        _audience: Audience,
    ) -> AnalyzerResult<Vec<Improvement>> {
        unavailable()
    }

    async fn synthesize_workflow(
        &self,
        _description: &str,
        _workflow_type: WorkflowType,
        _include_decisions: bool,
        _format: WorkflowFormat,
    ) -> AnalyzerResult<String> {
        unavailable()
    }

    async fn validate(&self, _source: &str, _strict: bool) -> AnalyzerResult<Validation> {
        unavailable()
    }
}

fn text(response: &ToolResponse) -> &str {
    assert_eq!(response.content.len(), 1, "exactly one content block");
    response.first_text().expect("text block")
}

/// Minimal valid arguments for each tool.
fn required_only(tool: &str) -> Value {
    match tool {
        "generate_diagram_from_code" => json!({ "code": "fn main() {\n    run();\n}\n" }),
        "create_workflow_diagram" => {
            json!({ "workflow_description": "Ship a release", "workflow_type": "git" })
        }
        "export_diagram_formats" => json!({ "diagram_code": "graph TD\nA-->B", "format": "html" }),
        _ => json!({ "diagram_code": "flowchart TD\n    A[Start] --> B[End]" }),
    }
}

// ==========================================================================
// Catalog
// ==========================================================================

#[test]
fn test_schemas_declare_every_parameter() {
    for tool in ToolRegistry::standard().tools() {
        let schema = &tool.input_schema;
        let properties = schema["properties"].as_object().expect("properties");
        let required = schema["required"].as_array().expect("required");
        assert!(!required.is_empty(), "{} has no required args", tool.name);
        for name in required {
            let name = name.as_str().expect("string");
            assert!(properties.contains_key(name), "{}: {name} undeclared", tool.name);
        }
        for (name, prop) in properties {
            assert!(prop["type"].is_string(), "{}.{name} untyped", tool.name);
            assert!(prop["description"].is_string(), "{}.{name} undescribed", tool.name);
        }
    }
}

#[test]
fn test_declared_defaults() {
    let registry = ToolRegistry::standard();
    let schema = |tool: &str| {
        registry
            .find(tool)
            .expect("registered")
            .input_schema()
    };
    assert_eq!(
        schema("generate_diagram_from_code")["properties"]["diagram_type"]["default"],
        "auto"
    );
    assert_eq!(
        schema("analyze_diagram_structure")["properties"]["analysis_type"]["default"],
        "full"
    );
    assert_eq!(
        schema("suggest_diagram_improvements")["properties"]["audience"]["default"],
        "general"
    );
    assert_eq!(
        schema("create_workflow_diagram")["properties"]["format"]["default"],
        "flowchart"
    );
    assert_eq!(
        schema("validate_diagram_syntax")["properties"]["provide_suggestions"]["default"],
        true
    );
}

/// Run a handler directly so the arguments it reads can be inspected.
async fn run_handler(name: ToolName, args: &ToolArgs<'_>) -> ToolResult<String> {
    let analyzer = HeuristicAnalyzer::new();
    match name {
        ToolName::GenerateDiagramFromCode => {
            tools::generate_diagram_from_code(&analyzer, args).await
        }
        ToolName::AnalyzeDiagramStructure => {
            tools::analyze_diagram_structure(&analyzer, args).await
        }
        ToolName::SuggestDiagramImprovements => {
            tools::suggest_diagram_improvements(&analyzer, args).await
        }
        ToolName::CreateWorkflowDiagram => tools::create_workflow_diagram(&analyzer, args).await,
        ToolName::ExportDiagramFormats => {
            tools::export_diagram_formats(&ExportPipeline::new(), args).await
        }
        ToolName::ValidateDiagramSyntax => tools::validate_diagram_syntax(&analyzer, args).await,
    }
}

#[tokio::test]
async fn test_handlers_read_exactly_the_declared_parameters() {
    for descriptor in ToolRegistry::standard().list() {
        let name = descriptor.name.as_str();
        let raw = required_only(name);
        let args = ToolArgs::bind(descriptor, &raw).expect("bind");
        run_handler(descriptor.name, &args)
            .await
            .unwrap_or_else(|e| panic!("{name}: {e}"));

        let mut expected: Vec<&str> = descriptor.params.iter().map(|p| p.name).collect();
        let mut read = args.consulted();
        read.sort_unstable();
        expected.sort_unstable();
        assert_eq!(read, expected, "{name} reads a different set than it lists");
    }
}

// ==========================================================================
// Dispatch
// ==========================================================================

#[tokio::test]
async fn test_every_tool_accepts_required_arguments_only() {
    let server = MermaidMcpServer::new();
    for tool in ToolRegistry::standard().list() {
        let name = tool.name.as_str();
        let response = server.call_tool(name, &required_only(name)).await;
        assert!(!response.is_error, "{name}: {}", text(&response));
        assert!(!text(&response).is_empty());
    }
}

#[tokio::test]
async fn test_missing_required_argument() {
    let server = MermaidMcpServer::new();
    let response = server
        .call_tool("create_workflow_diagram", &json!({ "workflow_description": "x" }))
        .await;
    assert!(response.is_error);
    assert_eq!(
        text(&response),
        "Error executing create_workflow_diagram: Invalid arguments: missing required argument `workflow_type`"
    );
}

#[tokio::test]
async fn test_analyzer_failure_is_reported_as_text() {
    let server = MermaidMcpServer::new().with_analyzer(Arc::new(UnavailableAnalyzer));
    let response = server
        .call_tool(
            "analyze_diagram_structure",
            &json!({ "diagram_code": "graph TD\nA-->B" }),
        )
        .await;
    assert!(response.is_error);
    assert_eq!(
        text(&response),
        "Error executing analyze_diagram_structure: Analyzer failed: analysis service unavailable"
    );
}

#[tokio::test]
async fn test_export_does_not_need_the_analyzer() {
    let server = MermaidMcpServer::new().with_analyzer(Arc::new(UnavailableAnalyzer));
    let response = server
        .call_tool("export_diagram_formats", &required_only("export_diagram_formats"))
        .await;
    assert!(!response.is_error, "{}", text(&response));
}

#[tokio::test]
async fn test_tools_call_over_json_rpc() {
    let server = MermaidMcpServer::new();
    let request: JsonRpcRequest = serde_json::from_value(json!({
        "jsonrpc": "2.0",
        "id": "abc",
        "method": "tools/call",
        "params": {
            "name": "validate_diagram_syntax",
            "arguments": { "diagram_code": "", "strict_mode": true }
        }
    }))
    .expect("request");

    let response = server.handle_request(request).await.expect("response");
    assert_eq!(response.id, json!("abc"));
    let result = response.result.expect("result");
    assert!(result.get("isError").is_none());
    let report = result["content"][0]["text"].as_str().expect("text");
    assert!(report.contains("**Status:** Invalid"));
}

// ==========================================================================
// Workflow and export scenarios
// ==========================================================================

#[tokio::test]
async fn test_cicd_gantt_workflow() {
    let server = MermaidMcpServer::new();
    let response = server
        .call_tool(
            "create_workflow_diagram",
            &json!({
                "workflow_description": "Build and ship the service",
                "workflow_type": "cicd",
                "format": "gantt"
            }),
        )
        .await;
    let report = text(&response);
    assert!(report.contains("## CI/CD Workflow Diagram"));
    assert!(report.contains("```mermaid\ngantt"));
    assert!(report.contains("dateFormat"));
}

#[tokio::test]
async fn test_unknown_workflow_format_falls_back_to_flowchart() {
    let server = MermaidMcpServer::new();
    let response = server
        .call_tool(
            "create_workflow_diagram",
            &json!({
                "workflow_description": "Deploy",
                "workflow_type": "deployment",
                "format": "mindmap"
            }),
        )
        .await;
    assert!(text(&response).contains("```mermaid\nflowchart TD"));
}

#[tokio::test]
async fn test_dark_svg_export_inline() {
    let server = MermaidMcpServer::new();
    let response = server
        .call_tool(
            "export_diagram_formats",
            &json!({ "diagram_code": "flowchart TD\nA-->B", "format": "svg", "theme": "dark" }),
        )
        .await;
    let report = text(&response);
    assert!(!response.is_error);

    let json_block = report
        .split("```json\n")
        .nth(1)
        .and_then(|rest| rest.split("\n```").next())
        .expect("json block");
    let result: Value = serde_json::from_str(json_block).expect("export result");
    assert_eq!(result["success"], true);
    assert!(result.get("outputPath").is_none());
    assert!(result["size"].as_str().expect("size").ends_with("KB"));

    let svg = STANDARD
        .decode(result["base64Data"].as_str().expect("base64Data"))
        .expect("base64");
    let svg = String::from_utf8(svg).expect("utf8");
    assert!(svg.contains("<svg"));
    assert!(svg.contains("#81B1DB"));
}

#[tokio::test]
async fn test_export_to_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("out").join("diagram.pdf");
    let server = MermaidMcpServer::new();
    let response = server
        .call_tool(
            "export_diagram_formats",
            &json!({
                "diagram_code": "graph LR\nA-->B",
                "format": "pdf",
                "output_path": path.to_string_lossy()
            }),
        )
        .await;
    let report = text(&response);
    assert!(report.contains("**Saved to:**"));
    assert!(report.contains("~120KB (estimated)"));
    assert!(path.exists());
}

#[tokio::test]
async fn test_export_rejects_unknown_format() {
    let server = MermaidMcpServer::new();
    let response = server
        .call_tool(
            "export_diagram_formats",
            &json!({ "diagram_code": "graph TD", "format": "bmp" }),
        )
        .await;
    assert!(response.is_error);
    assert!(text(&response)
        .starts_with("Error executing export_diagram_formats: Unsupported export format: bmp"));
}

#[tokio::test]
async fn test_export_rejects_zero_width() {
    let server = MermaidMcpServer::new();
    let response = server
        .call_tool(
            "export_diagram_formats",
            &json!({ "diagram_code": "graph TD", "format": "png", "width": 0 }),
        )
        .await;
    assert!(response.is_error);
    assert!(text(&response).contains("`width` must be a positive integer"));
}
