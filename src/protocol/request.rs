use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::graph::AttributeScope;

/// JSON-RPC 2.0 ID: a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(i64),
    Str(String),
}

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<RpcId>,
    pub method: String,
    pub params: Option<serde_json::Value>,
}

/// Graph selection shared by every graph-consuming tool: inline node-link
/// data or a `graph://<alias>` reference, exactly one of the two.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphArgs {
    #[serde(default)]
    pub graph_data: Option<Value>,
    #[serde(default, alias = "uri")]
    pub graph_uri: Option<String>,
}

/// Parameters for `find_nodes_by_attribute` and `find_edges_by_attribute`.
#[derive(Debug, Clone, Deserialize)]
pub struct AttributeFilterParams {
    #[serde(flatten)]
    pub graph: GraphArgs,
    pub attribute: String,
    /// `null` or absent turns the filter into an existence check.
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default = "default_operator")]
    pub operator: String,
}

fn default_operator() -> String {
    "==".to_string()
}

/// Parameters for the attribute discovery tools.
#[derive(Debug, Clone, Deserialize)]
pub struct AttributeMatchParams {
    #[serde(flatten)]
    pub graph: GraphArgs,
    /// Search string matched against attribute names.
    pub attribute: String,
    #[serde(default)]
    pub kind: AttributeScope,
}

/// Parameters for `shortest_path`.
#[derive(Debug, Clone, Deserialize)]
pub struct ShortestPathParams {
    #[serde(flatten)]
    pub graph: GraphArgs,
    pub source: String,
    pub target: String,
}

/// Parameters for `load_graph_from_file`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoadGraphParams {
    pub path: String,
    #[serde(default = "default_alias")]
    pub alias: String,
}

fn default_alias() -> String {
    "default".to_string()
}

/// Parameters for `resources/read`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadResourceParams {
    pub uri: String,
}

/// MCP `initialize` params.
#[derive(Debug, Clone, Deserialize)]
pub struct InitializeParams {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: Option<String>,
    #[serde(rename = "clientInfo")]
    pub client_info: Option<ClientInfo>,
}

/// Client information sent during `initialize`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    pub name: Option<String>,
    pub version: Option<String>,
}

/// Parameters for `tools/call`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    pub arguments: Option<serde_json::Value>,
}
