//! Integration tests for the stdio and HTTP transports (mermaid-server).

use axum::body::Body;
use axum::http::{Request, StatusCode};
use mermaid_mcp::MermaidMcpServer;
use mermaid_server::{http, stdio, AppState, ServerConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn run_stdio(input: &str) -> Vec<Value> {
    let server = MermaidMcpServer::new();
    let mut output = Vec::new();
    stdio::serve(&server, input.as_bytes(), &mut output)
        .await
        .expect("stdio loop");
    String::from_utf8(output)
        .expect("utf8")
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect()
}

async fn post_mcp(body: impl Into<Body>) -> (StatusCode, Vec<u8>) {
    let app = http::router(AppState::new(MermaidMcpServer::new()));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mcp")
                .header("content-type", "application/json")
                .body(body.into())
                .expect("request"),
        )
        .await
        .expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, bytes.to_vec())
}

// ==========================================================================
// stdio
// ==========================================================================

#[tokio::test]
async fn test_stdio_session() {
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "\n\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        "\n",
    );
    let responses = run_stdio(input).await;

    assert_eq!(responses.len(), 2, "notification and blank line get no reply");
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(responses[1]["id"], 2);
    assert_eq!(
        responses[1]["result"]["tools"]
            .as_array()
            .expect("tools")
            .len(),
        6
    );
}

#[tokio::test]
async fn test_stdio_parse_error_keeps_going() {
    let input = concat!(
        "{not json\n",
        r#"{"jsonrpc":"2.0","id":7,"method":"ping"}"#,
        "\n",
    );
    let responses = run_stdio(input).await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], Value::Null);
    assert_eq!(responses[0]["error"]["code"], -32700);
    assert_eq!(responses[1]["id"], 7);
    assert_eq!(responses[1]["result"], json!({}));
}

#[tokio::test]
async fn test_stdio_tool_call_writes_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("diagram.svg");
    let request = json!({
        "jsonrpc": "2.0",
        "id": 3,
        "method": "tools/call",
        "params": {
            "name": "export_diagram_formats",
            "arguments": {
                "diagram_code": "flowchart TD\nA-->B",
                "format": "svg",
                "output_path": path.to_string_lossy()
            }
        }
    });
    let responses = run_stdio(&format!("{request}\n")).await;

    assert_eq!(responses.len(), 1);
    assert!(responses[0]["result"].get("isError").is_none());
    let svg = std::fs::read_to_string(&path).expect("written");
    assert!(svg.starts_with("<svg"));
}

#[tokio::test]
async fn test_stdio_empty_input() {
    assert!(run_stdio("").await.is_empty());
}

// ==========================================================================
// HTTP
// ==========================================================================

#[tokio::test]
async fn test_http_tools_call() {
    let body = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": { "name": "no_such_tool", "arguments": {} }
    })
    .to_string();
    let (status, bytes) = post_mcp(body).await;

    assert_eq!(status, StatusCode::OK);
    let response: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(response["result"]["isError"], true);
    assert_eq!(
        response["result"]["content"][0]["text"],
        "Error executing no_such_tool: Unknown tool: no_such_tool"
    );
}

#[tokio::test]
async fn test_http_parse_error() {
    let (status, bytes) = post_mcp("{oops").await;
    assert_eq!(status, StatusCode::OK);
    let response: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(response["error"]["code"], -32700);
}

#[tokio::test]
async fn test_http_notification_accepted() {
    let body = json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }).to_string();
    let (status, bytes) = post_mcp(body).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_http_unknown_method() {
    let body = json!({ "jsonrpc": "2.0", "id": 9, "method": "prompts/list" }).to_string();
    let (_, bytes) = post_mcp(body).await;
    let response: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(response["error"]["code"], -32601);
    assert_eq!(response["id"], 9);
}

#[tokio::test]
async fn test_health() {
    let state = AppState::new(ServerConfig::default().mcp_server());
    let response = http::router(state)
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let health: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["tools"], 6);
    assert_eq!(health["raster"], "placeholder");
    assert!(health["version"].is_string());
}
