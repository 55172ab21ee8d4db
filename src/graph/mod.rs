//! Graph resolution and attribute-query engine.
//!
//! A graph arrives either inline as a node-link [`GraphDescription`] or as a
//! `graph://<alias>` reference into the [`GraphCache`](crate::cache::GraphCache).
//! Either way it is materialized fresh for the call and then queried by
//! attribute predicate, attribute-name search, or shortest path.

pub mod description;
pub mod materialize;
pub mod path;
pub mod query;
pub mod resolve;

pub use description::{
    EdgeKey, EdgeRecord, FloatId, GraphDescription, Identifier, NodeId, NodeRecord,
};
pub use materialize::{EdgeData, EdgeId, MaterializedGraph, NodeData};
pub use path::shortest_path;
pub use query::{
    edges_by_attribute, matching_attributes, nodes_by_attribute, AttributeScope, Operator,
    QueryValue,
};
pub use resolve::{resolve, AliasRef, GraphSource, GRAPH_URI_SCHEME};

/// Errors raised by the graph core.
///
/// Each variant maps onto one boundary error code; see
/// `protocol::McpErrorCode`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// Caller supplied an unusable combination of inputs.
    #[error("{0}")]
    Input(String),

    #[error("Graph '{alias}' not found. Load it first with load_graph_from_file.")]
    NotFound { alias: String },

    /// Graph description is missing required fields or has mistyped ones.
    #[error("Invalid graph description: {0}")]
    Schema(String),

    /// Graph description is well-formed but internally inconsistent.
    #[error("Invalid graph structure: {0}")]
    Structural(String),

    #[error("Unsupported operator '{0}'. Supported: [\"!=\", \"<\", \"<=\", \"==\", \">\", \">=\"]")]
    UnsupportedOperator(String),

    #[error("Cannot compare {attribute} ({found}) on {element} with {expected} value using '{operator}'")]
    TypeMismatch {
        element: String,
        attribute: String,
        found: &'static str,
        expected: &'static str,
        operator: &'static str,
    },

    #[error("No path found between {from} and {to}.")]
    NoPath { from: String, to: String },

    #[error("Node {0} is not in the graph.")]
    NodeNotFound(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
