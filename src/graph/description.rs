use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{GraphError, Result};

/// Node or edge-key identifier in a node-link description.
///
/// Keeps its JSON type: `"0"`, `0` and `0.5` are distinct identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Int(i64),
    Float(FloatId),
    Str(String),
}

pub type NodeId = Identifier;

/// Disambiguator for parallel edges in a multigraph.
pub type EdgeKey = Identifier;

/// Non-integer numeric identifier, totally ordered by `f64::total_cmp`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FloatId(pub f64);

impl PartialEq for FloatId {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatId {}

impl PartialOrd for FloatId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for FloatId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl Identifier {
    /// Candidate ids for an endpoint given as free text: the string itself,
    /// then its numeric reading if it has one.
    pub fn candidates(text: &str) -> Vec<Identifier> {
        let mut out = vec![Identifier::Str(text.to_string())];
        let trimmed = text.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            out.push(Identifier::Int(n));
        } else if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                out.push(Identifier::Float(FloatId(f)));
            }
        }
        out
    }

    /// The identifier as the JSON value it was read from.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(n) => Value::from(*n),
            Self::Float(f) => Value::from(f.0),
            Self::Str(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{}", x.0),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<i64> for Identifier {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

/// `{id, ...attributes}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// `{source, target, key?, ...attributes}`
///
/// `key` is split out here; simple graphs put it back as an ordinary
/// attribute when the graph is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<EdgeKey>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Node-link graph description, as sent by clients and stored in the cache.
///
/// `directed` and `multigraph` default to `true`. The edge list is accepted
/// under `links` or `edges`; when both are present `links` is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDescription")]
pub struct GraphDescription {
    pub directed: bool,
    pub multigraph: bool,
    pub graph: Map<String, Value>,
    pub nodes: Vec<NodeRecord>,
    pub links: Vec<EdgeRecord>,
}

#[derive(Deserialize)]
struct RawDescription {
    #[serde(default = "default_true")]
    directed: bool,
    #[serde(default = "default_true")]
    multigraph: bool,
    #[serde(default)]
    graph: Map<String, Value>,
    nodes: Vec<NodeRecord>,
    #[serde(default)]
    links: Option<Vec<EdgeRecord>>,
    #[serde(default)]
    edges: Option<Vec<EdgeRecord>>,
}

fn default_true() -> bool {
    true
}

impl TryFrom<RawDescription> for GraphDescription {
    type Error = String;

    fn try_from(raw: RawDescription) -> std::result::Result<Self, Self::Error> {
        let links = raw
            .links
            .or(raw.edges)
            .ok_or_else(|| "missing field `links` (or `edges`)".to_string())?;

        Ok(Self {
            directed: raw.directed,
            multigraph: raw.multigraph,
            graph: raw.graph,
            nodes: raw.nodes,
            links,
        })
    }
}

impl GraphDescription {
    /// Parse a description out of an arbitrary JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| GraphError::Schema(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_to_directed_multigraph() {
        let desc = GraphDescription::from_value(json!({
            "nodes": [{"id": "x"}],
            "links": []
        }))
        .unwrap();

        assert!(desc.directed);
        assert!(desc.multigraph);
        assert!(desc.graph.is_empty());
    }

    #[test]
    fn accepts_edges_as_links() {
        let desc = GraphDescription::from_value(json!({
            "directed": false,
            "multigraph": false,
            "nodes": [{"id": "a"}, {"id": "b"}],
            "edges": [{"source": "a", "target": "b", "capacity": 10}]
        }))
        .unwrap();

        assert_eq!(desc.links.len(), 1);
        assert_eq!(desc.links[0].attributes["capacity"], json!(10));
    }

    #[test]
    fn links_win_over_edges() {
        let desc = GraphDescription::from_value(json!({
            "nodes": [{"id": "a"}, {"id": "b"}],
            "links": [{"source": "a", "target": "b"}],
            "edges": []
        }))
        .unwrap();

        assert_eq!(desc.links.len(), 1);
    }

    #[test]
    fn missing_edge_list_is_schema_error() {
        let err = GraphDescription::from_value(json!({"nodes": []})).unwrap_err();
        assert!(matches!(err, GraphError::Schema(_)));
    }

    #[test]
    fn missing_nodes_is_schema_error() {
        let err = GraphDescription::from_value(json!({"links": []})).unwrap_err();
        assert!(matches!(err, GraphError::Schema(_)));
    }

    #[test]
    fn node_without_id_is_schema_error() {
        let err = GraphDescription::from_value(json!({
            "nodes": [{"name": "anonymous"}],
            "links": []
        }))
        .unwrap_err();
        assert!(matches!(err, GraphError::Schema(_)));
    }

    #[test]
    fn identifiers_keep_json_type() {
        let desc = GraphDescription::from_value(json!({
            "nodes": [{"id": 0}, {"id": "0"}],
            "links": []
        }))
        .unwrap();

        assert_eq!(desc.nodes[0].id, Identifier::Int(0));
        assert_eq!(desc.nodes[1].id, Identifier::Str("0".into()));
    }

    #[test]
    fn edge_key_is_split_from_attributes() {
        let desc = GraphDescription::from_value(json!({
            "nodes": [{"id": "a"}, {"id": "b"}],
            "links": [{"source": "a", "target": "b", "key": 3, "demand": 1.5}]
        }))
        .unwrap();

        let edge = &desc.links[0];
        assert_eq!(edge.key, Some(Identifier::Int(3)));
        assert!(!edge.attributes.contains_key("key"));
        assert_eq!(edge.attributes["demand"], json!(1.5));
    }

    #[test]
    fn candidates_include_integer_reading() {
        assert_eq!(
            Identifier::candidates("19"),
            vec![Identifier::Str("19".into()), Identifier::Int(19)]
        );
        assert_eq!(Identifier::candidates("pump"), vec![Identifier::Str("pump".into())]);
    }

    #[test]
    fn float_identifiers_are_accepted() {
        let desc = GraphDescription::from_value(json!({
            "nodes": [{"id": 1.5}, {"id": 1}],
            "links": [{"source": 1.5, "target": 1}]
        }))
        .unwrap();

        assert_eq!(desc.nodes[0].id, Identifier::Float(FloatId(1.5)));
        assert_eq!(desc.nodes[1].id, Identifier::Int(1));
        assert_eq!(desc.nodes[0].id.to_value(), json!(1.5));
        assert_eq!(desc.nodes[0].id.to_string(), "1.5");
    }

    #[test]
    fn candidates_include_float_reading() {
        assert_eq!(
            Identifier::candidates("1.5"),
            vec![Identifier::Str("1.5".into()), Identifier::Float(FloatId(1.5))]
        );
        assert_eq!(Identifier::candidates("NaN"), vec![Identifier::Str("NaN".into())]);
    }
}
