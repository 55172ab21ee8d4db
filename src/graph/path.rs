use super::materialize::MaterializedGraph;
use super::{GraphError, NodeId, Result};

/// Unweighted shortest path from `source` to `target`, inclusive of both.
///
/// Endpoints are matched as string ids first, then by their numeric reading.
pub fn shortest_path(graph: &MaterializedGraph, source: &str, target: &str) -> Result<Vec<NodeId>> {
    let from = graph
        .find_node(source)
        .ok_or_else(|| GraphError::NodeNotFound(source.to_string()))?;
    let to = graph
        .find_node(target)
        .ok_or_else(|| GraphError::NodeNotFound(target.to_string()))?;

    if from == to {
        return Ok(graph.id_at(from).cloned().into_iter().collect());
    }

    let indices = graph.unweighted_path(from, to).ok_or_else(|| GraphError::NoPath {
        from: source.to_string(),
        to: target.to_string(),
    })?;

    Ok(indices
        .into_iter()
        .filter_map(|idx| graph.id_at(idx).cloned())
        .collect())
}
