use serde::Serialize;

use crate::graph::{self, NodeId, Operator, QueryValue};
use crate::protocol::{AttributeFilterParams, McpErrorResponse, ToolResult};

use super::{resolve_graph, run_bounded, ServerState};

#[derive(Debug, Serialize)]
struct NodeMatches {
    matches: Vec<NodeId>,
}

/// Handle a `find_nodes_by_attribute` tool call.
///
/// The operator and value are checked before the graph is resolved.
pub async fn handle(params: AttributeFilterParams, state: &ServerState) -> ToolResult {
    let op: Operator = match params.operator.parse() {
        Ok(op) => op,
        Err(err) => return McpErrorResponse::from(err).into(),
    };
    let value = match QueryValue::coerce(params.value.as_ref()) {
        Ok(v) => v,
        Err(err) => return McpErrorResponse::from(err).into(),
    };

    let cache = state.cache.clone();
    run_bounded(state.config.tool_timeout, move || {
        let g = resolve_graph(params.graph, &cache)?;
        let matches = graph::nodes_by_attribute(&g, &params.attribute, value.as_ref(), op)?;
        Ok::<_, McpErrorResponse>(NodeMatches { matches })
    })
    .await
}
