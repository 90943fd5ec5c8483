//! Line-delimited JSON-RPC over a byte stream.
//!
//! One message per line in, one response per line out. Messages are handled
//! in arrival order; the loop ends at end of input.

use std::io;

use mermaid_mcp::{JsonRpcRequest, JsonRpcResponse, MermaidMcpServer};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Serve `server` over `reader`/`writer` until `reader` is exhausted.
///
/// # Errors
///
/// Returns an error if reading or writing the stream fails.
pub async fn serve<R, W>(server: &MermaidMcpServer, reader: R, mut writer: W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut handled = 0_u64;

    while let Some(raw) = lines.next_line().await? {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => server.handle_request(request).await,
            Err(e) => {
                tracing::warn!(error = %e, "Unparseable message on stdin");
                Some(JsonRpcResponse::parse_error(e))
            }
        };
        handled += 1;

        if let Some(response) = response {
            let mut bytes = serde_json::to_vec(&response).map_err(io::Error::other)?;
            bytes.push(b'\n');
            writer.write_all(&bytes).await?;
            writer.flush().await?;
        }
    }

    tracing::info!(messages = handled, "Input closed, stdio transport stopping");
    Ok(())
}
