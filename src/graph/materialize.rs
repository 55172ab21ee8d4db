use std::collections::HashMap;

use petgraph::graph::{DiGraph, EdgeIndex, Graph, NodeIndex, UnGraph};
use petgraph::EdgeType;
use serde::Serialize;
use serde_json::{Map, Value};

use super::description::{EdgeKey, EdgeRecord, GraphDescription, Identifier, NodeId};
use super::{GraphError, Result};

/// Identity of an edge as reported back to callers.
///
/// Serializes as `[u, v]` or `[u, v, key]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum EdgeId {
    Simple(NodeId, NodeId),
    Multi(NodeId, NodeId, EdgeKey),
}

impl EdgeId {
    pub fn source(&self) -> &NodeId {
        match self {
            Self::Simple(u, _) | Self::Multi(u, _, _) => u,
        }
    }

    pub fn target(&self) -> &NodeId {
        match self {
            Self::Simple(_, v) | Self::Multi(_, v, _) => v,
        }
    }
}

/// Node weight: id plus attribute map.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    pub id: NodeId,
    pub attributes: Map<String, Value>,
}

/// Edge weight: caller-facing identity plus attribute map.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeData {
    pub id: EdgeId,
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone)]
enum Topology {
    Directed(DiGraph<NodeData, EdgeData>),
    Undirected(UnGraph<NodeData, EdgeData>),
}

/// In-memory graph built from a [`GraphDescription`].
///
/// Never mutated after construction. Nodes and edges iterate in declaration
/// order.
#[derive(Debug, Clone)]
pub struct MaterializedGraph {
    topology: Topology,
    multigraph: bool,
    index: HashMap<NodeId, NodeIndex>,
}

impl MaterializedGraph {
    /// Build a graph from a parsed description.
    ///
    /// Every edge endpoint must be a declared node; a dangling endpoint is a
    /// [`GraphError::Structural`].
    pub fn from_description(desc: &GraphDescription) -> Result<Self> {
        let (topology, index) = if desc.directed {
            let (g, index) = build::<petgraph::Directed>(desc)?;
            (Topology::Directed(g), index)
        } else {
            let (g, index) = build::<petgraph::Undirected>(desc)?;
            (Topology::Undirected(g), index)
        };

        Ok(Self {
            topology,
            multigraph: desc.multigraph,
            index,
        })
    }

    /// Parse and build in one step.
    pub fn from_value(value: Value) -> Result<Self> {
        let desc = GraphDescription::from_value(value)?;
        Self::from_description(&desc)
    }

    pub fn is_directed(&self) -> bool {
        matches!(self.topology, Topology::Directed(_))
    }

    pub fn is_multigraph(&self) -> bool {
        self.multigraph
    }

    pub fn node_count(&self) -> usize {
        match &self.topology {
            Topology::Directed(g) => g.node_count(),
            Topology::Undirected(g) => g.node_count(),
        }
    }

    pub fn edge_count(&self) -> usize {
        match &self.topology {
            Topology::Directed(g) => g.edge_count(),
            Topology::Undirected(g) => g.edge_count(),
        }
    }

    pub fn nodes(&self) -> Box<dyn Iterator<Item = &NodeData> + '_> {
        match &self.topology {
            Topology::Directed(g) => Box::new(g.node_weights()),
            Topology::Undirected(g) => Box::new(g.node_weights()),
        }
    }

    pub fn edges(&self) -> Box<dyn Iterator<Item = &EdgeData> + '_> {
        match &self.topology {
            Topology::Directed(g) => Box::new(g.edge_weights()),
            Topology::Undirected(g) => Box::new(g.edge_weights()),
        }
    }

    /// Find a node from a textual endpoint, trying the string id before its
    /// numeric reading.
    pub fn find_node(&self, text: &str) -> Option<NodeIndex> {
        Identifier::candidates(text)
            .iter()
            .find_map(|id| self.index.get(id).copied())
    }

    pub(crate) fn id_at(&self, idx: NodeIndex) -> Option<&NodeId> {
        let node = match &self.topology {
            Topology::Directed(g) => g.node_weight(idx),
            Topology::Undirected(g) => g.node_weight(idx),
        };
        node.map(|n| &n.id)
    }

    /// Unit-cost A* from `from` to `to`, following edge direction when the
    /// graph is directed.
    pub(crate) fn unweighted_path(&self, from: NodeIndex, to: NodeIndex) -> Option<Vec<NodeIndex>> {
        let found = match &self.topology {
            Topology::Directed(g) => {
                petgraph::algo::astar(g, from, |n| n == to, |_| 1u32, |_| 0)
            }
            Topology::Undirected(g) => {
                petgraph::algo::astar(g, from, |n| n == to, |_| 1u32, |_| 0)
            }
        };
        found.map(|(_cost, path)| path)
    }
}

fn build<Ty: EdgeType>(
    desc: &GraphDescription,
) -> Result<(Graph<NodeData, EdgeData, Ty>, HashMap<NodeId, NodeIndex>)> {
    let mut graph = Graph::<NodeData, EdgeData, Ty>::with_capacity(desc.nodes.len(), desc.links.len());
    let mut index: HashMap<NodeId, NodeIndex> = HashMap::with_capacity(desc.nodes.len());

    for record in &desc.nodes {
        match index.get(&record.id) {
            // Repeated declarations merge into the first one.
            Some(&idx) => graph[idx].attributes.extend(record.attributes.clone()),
            None => {
                let idx = graph.add_node(NodeData {
                    id: record.id.clone(),
                    attributes: record.attributes.clone(),
                });
                index.insert(record.id.clone(), idx);
            }
        }
    }

    // Edges already placed between each endpoint pair, with their keys.
    let mut by_pair: HashMap<(NodeIndex, NodeIndex), Vec<(Option<EdgeKey>, EdgeIndex)>> =
        HashMap::new();

    for (position, record) in desc.links.iter().enumerate() {
        let u = lookup(&index, &record.source, position, "source")?;
        let v = lookup(&index, &record.target, position, "target")?;
        let pair = if Ty::is_directed() || u <= v { (u, v) } else { (v, u) };
        let existing = by_pair.entry(pair).or_default();

        if !desc.multigraph {
            let attributes = simple_edge_attributes(record);
            if let Some(&(_, e)) = existing.first() {
                graph[e].attributes.extend(attributes);
                continue;
            }
            let e = graph.add_edge(
                u,
                v,
                EdgeData {
                    id: EdgeId::Simple(record.source.clone(), record.target.clone()),
                    attributes,
                },
            );
            existing.push((None, e));
            continue;
        }

        let key = match &record.key {
            Some(k) => {
                if let Some(&(_, e)) = existing.iter().find(|(used, _)| used.as_ref() == Some(k)) {
                    graph[e].attributes.extend(record.attributes.clone());
                    continue;
                }
                k.clone()
            }
            None => next_free_key(existing),
        };

        let e = graph.add_edge(
            u,
            v,
            EdgeData {
                id: EdgeId::Multi(record.source.clone(), record.target.clone(), key.clone()),
                attributes: record.attributes.clone(),
            },
        );
        existing.push((Some(key), e));
    }

    Ok((graph, index))
}

/// Simple graphs have no edge keys, so a `key` field is plain data.
fn simple_edge_attributes(record: &EdgeRecord) -> Map<String, Value> {
    let mut attributes = record.attributes.clone();
    if let Some(key) = &record.key {
        attributes.insert("key".to_string(), key.to_value());
    }
    attributes
}

fn lookup(
    index: &HashMap<NodeId, NodeIndex>,
    id: &NodeId,
    position: usize,
    end: &str,
) -> Result<NodeIndex> {
    index.get(id).copied().ok_or_else(|| {
        GraphError::Structural(format!(
            "edge {position} references undeclared {end} node {id}"
        ))
    })
}

/// Lowest integer key, counting up from the number of parallel edges
/// already present, that is not taken.
fn next_free_key(existing: &[(Option<EdgeKey>, EdgeIndex)]) -> EdgeKey {
    let mut candidate = existing.len() as i64;
    loop {
        let key = Identifier::Int(candidate);
        if !existing.iter().any(|(used, _)| used.as_ref() == Some(&key)) {
            return key;
        }
        candidate += 1;
    }
}
