use std::collections::BTreeSet;

use serde::Serialize;

use crate::graph::{self, AttributeScope};
use crate::protocol::{AttributeMatchParams, McpErrorResponse, ToolResult};

use super::{resolve_graph, run_bounded, ServerState};

#[derive(Debug, Serialize)]
struct AttributeMatches {
    matching_attributes: BTreeSet<String>,
}

/// Handle a `find_best_matching_attribute` tool call, scanning the elements
/// named by `kind`.
pub async fn handle(params: AttributeMatchParams, state: &ServerState) -> ToolResult {
    let scope = params.kind;
    discover(params, scope, state).await
}

/// `find_best_matching_node_attribute`: node attributes only.
pub async fn handle_nodes(params: AttributeMatchParams, state: &ServerState) -> ToolResult {
    discover(params, AttributeScope::Node, state).await
}

/// `find_best_matching_edge_attribute`: edge attributes only.
pub async fn handle_edges(params: AttributeMatchParams, state: &ServerState) -> ToolResult {
    discover(params, AttributeScope::Edge, state).await
}

async fn discover(
    params: AttributeMatchParams,
    scope: AttributeScope,
    state: &ServerState,
) -> ToolResult {
    let cache = state.cache.clone();
    run_bounded(state.config.tool_timeout, move || {
        let g = resolve_graph(params.graph, &cache)?;
        let matching_attributes = graph::matching_attributes(&g, &params.attribute, scope);
        Ok::<_, McpErrorResponse>(AttributeMatches { matching_attributes })
    })
    .await
}
