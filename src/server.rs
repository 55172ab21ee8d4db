use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::config::ServerConfig;
use crate::handlers::{self, load_graph, ServerState};
use crate::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};

/// MCP server that communicates over stdio using newline-delimited JSON-RPC 2.0.
pub struct McpServer {
    state: ServerState,
    initialized: bool,
}

impl McpServer {
    pub fn new(config: ServerConfig) -> Self {
        Self::with_state(ServerState::new(config))
    }

    pub fn with_state(state: ServerState) -> Self {
        Self {
            state,
            initialized: false,
        }
    }

    pub fn state(&self) -> &ServerState {
        &self.state
    }

    /// Load every configured `GRAPH_PRELOAD` entry into the cache.
    pub fn preload(&self) -> Result<(), String> {
        for entry in &self.state.config.preload {
            let path = load_graph::resolve_path(self.state.config.data_root.as_deref(), &entry.path);
            load_graph::load_into_cache(&path, &entry.alias, &self.state.cache).map_err(|e| {
                format!("cannot preload '{}' from {}: {}", entry.alias, path.display(), e.error.message)
            })?;
        }
        Ok(())
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        tracing::info!(cached_graphs = self.state.cache.len(), "serving MCP over stdio");
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await?;
        tracing::info!("stdin closed, shutting down");
        Ok(())
    }

    /// Answer newline-delimited requests from `reader` on `writer` until EOF.
    pub async fn serve<R, W>(
        &mut self,
        mut reader: R,
        mut writer: W,
    ) -> Result<(), Box<dyn std::error::Error>>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut raw = Vec::new();
        loop {
            raw.clear();
            if reader.read_until(b'\n', &mut raw).await? == 0 {
                return Ok(());
            }
            if let Some(resp) = self.handle_line(&raw).await {
                write_response(&mut writer, &resp).await?;
            }
        }
    }

    async fn handle_line(&mut self, raw: &[u8]) -> Option<JsonRpcResponse> {
        let limit = self.state.config.max_message_bytes;
        if raw.len() > limit {
            tracing::warn!("Message too large: {} bytes (limit {limit})", raw.len());
            return Some(JsonRpcResponse::error(None, JsonRpcError::parse_error()));
        }

        let Ok(text) = std::str::from_utf8(raw) else {
            tracing::warn!("Message is not valid UTF-8");
            return Some(JsonRpcResponse::error(None, JsonRpcError::parse_error()));
        };
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let req: JsonRpcRequest = match serde_json::from_str(text) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Parse error: {e}");
                return Some(JsonRpcResponse::error(None, JsonRpcError::parse_error()));
            }
        };

        if req.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(req.id, JsonRpcError::invalid_request()));
        }

        // Only `initialize` passes before the handshake; notifications are dropped.
        if !self.initialized && req.method != "initialize" {
            return req.id.map(|id| {
                JsonRpcResponse::error(
                    Some(id),
                    JsonRpcError::invalid_request_with("Server not initialized"),
                )
            });
        }

        tracing::debug!(method = %req.method, "handling request");
        let resp = handlers::dispatch(&req, &self.state).await;
        if req.method == "initialize" {
            self.initialized = true;
        }
        resp
    }
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    resp: &JsonRpcResponse,
) -> Result<(), Box<dyn std::error::Error>> {
    let out = serde_json::to_string(resp)?;
    writer.write_all(out.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
