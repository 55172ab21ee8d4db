use serde::Serialize;

use crate::graph::{self, NodeId};
use crate::protocol::{McpErrorResponse, ShortestPathParams, ToolResult};

use super::{resolve_graph, run_bounded, ServerState};

#[derive(Debug, Serialize)]
struct PathResponse {
    path: Vec<NodeId>,
}

/// Handle a `shortest_path` tool call.
pub async fn handle(params: ShortestPathParams, state: &ServerState) -> ToolResult {
    let cache = state.cache.clone();
    run_bounded(state.config.tool_timeout, move || {
        let g = resolve_graph(params.graph, &cache)?;
        let path = graph::shortest_path(&g, &params.source, &params.target)?;
        Ok::<_, McpErrorResponse>(PathResponse { path })
    })
    .await
}
