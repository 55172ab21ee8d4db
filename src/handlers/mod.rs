pub mod find_edges;
pub mod find_nodes;
pub mod health;
pub mod load_graph;
pub mod match_attributes;
pub mod resources;
pub mod shortest_path;

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::cache::GraphCache;
use crate::config::ServerConfig;
use crate::graph::{self, GraphSource, MaterializedGraph};
use crate::protocol::{
    GraphArgs, InitializeParams, JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpErrorCode,
    McpErrorResponse, ReadResourceParams, ToolCallParams, ToolResult,
};
use crate::schema;

/// Everything a request handler may touch: configuration and the graph cache.
#[derive(Debug, Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub cache: Arc<GraphCache>,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self::with_cache(config, Arc::new(GraphCache::new()))
    }

    pub fn with_cache(config: ServerConfig, cache: Arc<GraphCache>) -> Self {
        Self { config, cache }
    }
}

/// Dispatch a JSON-RPC request to the appropriate handler.
///
/// Returns `None` for notifications (no response required).
pub async fn dispatch(req: &JsonRpcRequest, state: &ServerState) -> Option<JsonRpcResponse> {
    match req.method.as_str() {
        "initialize" => {
            if let Some(params) = req
                .params
                .as_ref()
                .and_then(|v| serde_json::from_value::<InitializeParams>(v.clone()).ok())
            {
                let client = params.client_info.as_ref();
                tracing::info!(
                    protocol_version = params.protocol_version.as_deref().unwrap_or("unknown"),
                    client = client.and_then(|c| c.name.as_deref()).unwrap_or("unknown"),
                    client_version = client.and_then(|c| c.version.as_deref()).unwrap_or("unknown"),
                    "client initializing"
                );
            }
            let result = json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {},
                    "resources": {}
                },
                "serverInfo": {
                    "name": "mcp-graph-server",
                    "version": env!("CARGO_PKG_VERSION")
                }
            });
            Some(JsonRpcResponse::success(req.id.clone(), result))
        }

        "notifications/initialized" => None,

        "ping" => Some(JsonRpcResponse::success(req.id.clone(), json!({}))),

        "tools/list" => Some(JsonRpcResponse::success(
            req.id.clone(),
            json!({ "tools": tool_definitions() }),
        )),

        "tools/call" => {
            let params: ToolCallParams = match &req.params {
                Some(v) => match serde_json::from_value(v.clone()) {
                    Ok(p) => p,
                    Err(e) => {
                        return Some(JsonRpcResponse::error(
                            req.id.clone(),
                            JsonRpcError::invalid_params(format!(
                                "Invalid tools/call params: {e}"
                            )),
                        ));
                    }
                },
                None => {
                    return Some(JsonRpcResponse::error(
                        req.id.clone(),
                        JsonRpcError::invalid_params("Missing params for tools/call"),
                    ));
                }
            };

            let tool_result = dispatch_tool_call(&params, state).await;
            let result_json = serde_json::to_value(&tool_result).expect("ToolResult must serialize to JSON Value");
            Some(JsonRpcResponse::success(req.id.clone(), result_json))
        }

        "resources/list" => Some(JsonRpcResponse::success(
            req.id.clone(),
            resources::list(&state.cache),
        )),

        "resources/templates/list" => Some(JsonRpcResponse::success(
            req.id.clone(),
            resources::templates(),
        )),

        "resources/read" => {
            let params: ReadResourceParams = match req
                .params
                .as_ref()
                .map(|v| serde_json::from_value(v.clone()))
            {
                Some(Ok(p)) => p,
                Some(Err(e)) => {
                    return Some(JsonRpcResponse::error(
                        req.id.clone(),
                        JsonRpcError::invalid_params(format!("Invalid resources/read params: {e}")),
                    ));
                }
                None => {
                    return Some(JsonRpcResponse::error(
                        req.id.clone(),
                        JsonRpcError::invalid_params("Missing params for resources/read"),
                    ));
                }
            };

            Some(match resources::read(&params, &state.cache) {
                Ok(result) => JsonRpcResponse::success(req.id.clone(), result),
                Err(mcp_err) => JsonRpcResponse::error(req.id.clone(), mcp_err.into()),
            })
        }

        _ => Some(JsonRpcResponse::error(
            req.id.clone(),
            JsonRpcError::method_not_found(&req.method),
        )),
    }
}

async fn dispatch_tool_call(params: &ToolCallParams, state: &ServerState) -> ToolResult {
    let arguments = params.arguments.as_ref();

    match params.name.as_str() {
        "find_nodes_by_attribute" => match parse_arguments(&params.name, arguments) {
            Ok(args) => find_nodes::handle(args, state).await,
            Err(err) => err,
        },

        "find_edges_by_attribute" => match parse_arguments(&params.name, arguments) {
            Ok(args) => find_edges::handle(args, state).await,
            Err(err) => err,
        },

        "find_best_matching_attribute" => match parse_arguments(&params.name, arguments) {
            Ok(args) => match_attributes::handle(args, state).await,
            Err(err) => err,
        },

        "find_best_matching_node_attribute" => match parse_arguments(&params.name, arguments) {
            Ok(args) => match_attributes::handle_nodes(args, state).await,
            Err(err) => err,
        },

        "find_best_matching_edge_attribute" => match parse_arguments(&params.name, arguments) {
            Ok(args) => match_attributes::handle_edges(args, state).await,
            Err(err) => err,
        },

        "shortest_path" => match parse_arguments(&params.name, arguments) {
            Ok(args) => shortest_path::handle(args, state).await,
            Err(err) => err,
        },

        "load_graph_from_file" => match parse_arguments(&params.name, arguments) {
            Ok(args) => load_graph::handle(args, state).await,
            Err(err) => err,
        },

        "health" => health::handle().await,

        _ => ToolResult::error(format!("Unknown tool: {}", params.name)),
    }
}

/// Validate `arguments` against the tool's advertised input schema, then
/// deserialize them. Absent arguments are treated as `{}`.
fn parse_arguments<T: DeserializeOwned>(
    tool: &str,
    arguments: Option<&Value>,
) -> Result<T, ToolResult> {
    let arguments = arguments.cloned().unwrap_or_else(|| json!({}));

    if let Some(schema) = input_schema(tool) {
        if let Err(e) = schema::validate_value(schema, &arguments) {
            tracing::debug!(tool, "argument validation failed: {e}");
            return Err(McpErrorResponse::new(
                McpErrorCode::InvalidInput,
                format!("Invalid arguments for {tool}: {e}"),
            )
            .into());
        }
    }

    serde_json::from_value(arguments).map_err(|e| {
        McpErrorResponse::new(
            McpErrorCode::InvalidInput,
            format!("Invalid arguments for {tool}: {e}"),
        )
        .into()
    })
}

/// Materialize the graph a tool call refers to.
pub(crate) fn resolve_graph(
    args: GraphArgs,
    cache: &GraphCache,
) -> Result<MaterializedGraph, graph::GraphError> {
    let source = GraphSource::from_parts(args.graph_data, args.graph_uri)?;
    graph::resolve(source, cache)
}

/// Run CPU-bound tool work on the blocking pool, bounded by `timeout`.
///
/// Panics and timeouts are reported as `internal_error`.
pub(crate) async fn run_bounded<T, F>(timeout: Duration, work: F) -> ToolResult
where
    T: Serialize + Send + 'static,
    F: FnOnce() -> Result<T, McpErrorResponse> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(work);

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(Ok(payload))) => ToolResult::json(&payload),
        Ok(Ok(Err(mcp_err))) => mcp_err.into(),
        Ok(Err(join_err)) => {
            tracing::warn!("Task join error: {join_err}");
            McpErrorResponse::canonical(McpErrorCode::InternalError).into()
        }
        Err(_) => {
            tracing::warn!("Operation timed out after {} seconds", timeout.as_secs());
            McpErrorResponse::canonical(McpErrorCode::InternalError).into()
        }
    }
}

fn input_schema(tool: &str) -> Option<&'static Value> {
    tool_definitions()
        .as_array()?
        .iter()
        .find(|t| t["name"] == tool)
        .map(|t| &t["inputSchema"])
}

/// Tool catalogue advertised by `tools/list`; the `inputSchema`s double as
/// argument validators.
pub fn tool_definitions() -> &'static Value {
    static TOOLS: OnceLock<Value> = OnceLock::new();
    TOOLS.get_or_init(build_tool_definitions)
}

fn graph_properties() -> serde_json::Map<String, Value> {
    let props = json!({
        "graph_data": {
            "type": ["object", "null"],
            "description": "Inline node-link graph: {directed, multigraph, nodes, links|edges}. Mutually exclusive with graph_uri."
        },
        "graph_uri": {
            "type": ["string", "null"],
            "description": "Cached graph reference like 'graph://default'. Mutually exclusive with graph_data."
        },
        "uri": {
            "type": ["string", "null"],
            "description": "Synonym for graph_uri."
        }
    });
    match props {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

fn object_schema(required: &[&str], extra: Value, with_graph: bool) -> Value {
    let mut properties = if with_graph {
        graph_properties()
    } else {
        serde_json::Map::new()
    };
    if let Value::Object(extra) = extra {
        properties.extend(extra);
    }
    json!({
        "type": "object",
        "required": required,
        "properties": properties
    })
}

fn build_tool_definitions() -> Value {
    let filter_properties = json!({
        "attribute": {
            "type": "string",
            "description": "Attribute key to test"
        },
        "value": {
            "type": ["number", "string", "boolean", "null"],
            "description": "Value to compare against. Numeric strings compare as numbers. Null or absent checks that the attribute exists and is not null."
        },
        "operator": {
            "type": "string",
            "default": "==",
            "description": "Comparison operator: one of ==, !=, <, <=, >, >="
        }
    });

    let search_property = json!({
        "attribute": {
            "type": "string",
            "description": "Search string, matched case-insensitively as a substring of attribute names"
        }
    });

    let mut scoped_search = search_property.clone();
    if let Value::Object(map) = &mut scoped_search {
        map.insert(
            "kind".into(),
            json!({
                "type": "string",
                "enum": ["node", "edge", "both", "all"],
                "default": "both",
                "description": "Which elements to scan for attribute names"
            }),
        );
    }

    json!([
        {
            "name": "find_nodes_by_attribute",
            "description": "Filter nodes by a node attribute using a comparison operator. Nodes lacking the attribute are never returned, even for '!='. Output: {matches: [node_id, ...]}",
            "inputSchema": object_schema(&["attribute"], filter_properties.clone(), true)
        },
        {
            "name": "find_edges_by_attribute",
            "description": "Filter edges by an edge attribute using a comparison operator. Output: {directed, multigraph, matches}; each match is [u, v, key] for multigraphs and [u, v] otherwise",
            "inputSchema": object_schema(&["attribute"], filter_properties, true)
        },
        {
            "name": "find_best_matching_attribute",
            "description": "Discover node and/or edge attribute names containing a search string (case-insensitive). Output: {matching_attributes: [...]}",
            "inputSchema": object_schema(&["attribute"], scoped_search, true)
        },
        {
            "name": "find_best_matching_node_attribute",
            "description": "Discover node attribute names containing a search string (case-insensitive). Output: {matching_attributes: [...]}",
            "inputSchema": object_schema(&["attribute"], search_property.clone(), true)
        },
        {
            "name": "find_best_matching_edge_attribute",
            "description": "Discover edge attribute names containing a search string (case-insensitive). Output: {matching_attributes: [...]}",
            "inputSchema": object_schema(&["attribute"], search_property, true)
        },
        {
            "name": "shortest_path",
            "description": "Compute an unweighted shortest path between two nodes, respecting edge direction in directed graphs. Output: {path: [node_id, ...]}",
            "inputSchema": object_schema(&["source", "target"], json!({
                "source": {"type": "string", "description": "Start node id"},
                "target": {"type": "string", "description": "End node id"}
            }), true)
        },
        {
            "name": "load_graph_from_file",
            "description": "Load a node-link graph from a JSON file and cache it under an alias. Later calls can pass graph_uri 'graph://<alias>' instead of the full graph",
            "inputSchema": object_schema(&["path"], json!({
                "path": {"type": "string", "description": "Path of the graph JSON file"},
                "alias": {"type": "string", "default": "default", "description": "Alias for the cached graph"}
            }), false)
        },
        {
            "name": "health",
            "description": "Liveness check. Output: {status: 'ok'}",
            "inputSchema": object_schema(&[], json!({}), false)
        }
    ])
}
