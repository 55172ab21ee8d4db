use serde::Serialize;

use crate::graph::{self, EdgeId, Operator, QueryValue};
use crate::protocol::{AttributeFilterParams, McpErrorResponse, ToolResult};

use super::{resolve_graph, run_bounded, ServerState};

#[derive(Debug, Serialize)]
struct EdgeMatches {
    directed: bool,
    /// Tells the caller whether each match is `[u, v, key]` or `[u, v]`.
    multigraph: bool,
    matches: Vec<EdgeId>,
}

/// Handle a `find_edges_by_attribute` tool call.
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
        let matches = graph::edges_by_attribute(&g, &params.attribute, value.as_ref(), op)?;
        Ok::<_, McpErrorResponse>(EdgeMatches {
            directed: g.is_directed(),
            multigraph: g.is_multigraph(),
            matches,
        })
    })
    .await
}
