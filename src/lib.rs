//! MCP server for querying attributed graphs.
//!
//! Exposes attribute filters over nodes and edges, attribute-name discovery,
//! and unweighted shortest paths as tools over JSON-RPC 2.0 stdio transport.
//! Graphs are sent inline as node-link JSON or loaded once with
//! `load_graph_from_file` and referenced afterwards as `graph://<alias>`.

pub mod cache;
pub mod config;
pub mod graph;
pub mod handlers;
pub mod protocol;
pub mod server;

pub mod schema;
