use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::cache::GraphCache;
use crate::graph::{AliasRef, MaterializedGraph};
use crate::protocol::{LoadGraphParams, McpErrorCode, McpErrorResponse, ToolResult};

use super::{run_bounded, ServerState};

/// Result of caching a graph file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadedGraph {
    pub status: &'static str,
    pub alias: String,
    pub uri: String,
}

/// Handle a `load_graph_from_file` tool call.
pub async fn handle(params: LoadGraphParams, state: &ServerState) -> ToolResult {
    let cache = state.cache.clone();
    let path = resolve_path(state.config.data_root.as_deref(), Path::new(&params.path));
    run_bounded(state.config.tool_timeout, move || {
        load_into_cache(&path, &params.alias, &cache)
    })
    .await
}

/// Read a node-link JSON file, check that it materializes, and cache the
/// raw description under `alias`.
pub fn load_into_cache(
    path: &Path,
    alias: &str,
    cache: &GraphCache,
) -> Result<LoadedGraph, McpErrorResponse> {
    if !path.exists() {
        return Err(McpErrorResponse::new(
            McpErrorCode::IoError,
            format!("File not found: {}", path.display()),
        ));
    }
    if !path.is_file() {
        return Err(McpErrorResponse::new(
            McpErrorCode::IoError,
            format!("Path is not a file: {}", path.display()),
        ));
    }

    let text = std::fs::read_to_string(path).map_err(|e| {
        tracing::warn!("Cannot read graph file {}: {e}", path.display());
        McpErrorResponse::new(
            McpErrorCode::IoError,
            format!("Cannot read {}: {e}", path.display()),
        )
    })?;

    let description: Value = serde_json::from_str(&text).map_err(|e| {
        McpErrorResponse::new(McpErrorCode::InvalidGraph, format!("Invalid JSON: {e}"))
    })?;

    let graph = MaterializedGraph::from_value(description.clone())?;
    cache.put(alias, description);

    tracing::info!(
        alias,
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "cached graph"
    );

    Ok(LoadedGraph {
        status: "loaded",
        alias: alias.to_string(),
        uri: AliasRef::uri(alias),
    })
}

/// Relative paths are taken from `data_root` when one is configured.
pub fn resolve_path(data_root: Option<&Path>, path: &Path) -> PathBuf {
    match data_root {
        Some(root) if path.is_relative() => root.join(path),
        _ => path.to_path_buf(),
    }
}
