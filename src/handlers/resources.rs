use serde_json::{json, Value};

use crate::cache::GraphCache;
use crate::graph::{AliasRef, GraphError, GRAPH_URI_SCHEME};
use crate::protocol::{McpErrorCode, McpErrorResponse, ReadResourceParams};

const MIME_JSON: &str = "application/json";

/// `resources/list`: one resource per cached alias.
pub fn list(cache: &GraphCache) -> Value {
    let resources: Vec<Value> = cache
        .aliases()
        .into_iter()
        .map(|alias| {
            json!({
                "uri": AliasRef::uri(&alias),
                "name": alias,
                "mimeType": MIME_JSON
            })
        })
        .collect();
    json!({ "resources": resources })
}

/// `resources/templates/list`: the `graph://{alias}` template.
pub fn templates() -> Value {
    json!({
        "resourceTemplates": [{
            "uriTemplate": format!("{GRAPH_URI_SCHEME}{{alias}}"),
            "name": "cached-graph",
            "description": "Node-link description of a graph cached with load_graph_from_file",
            "mimeType": MIME_JSON
        }]
    })
}

/// `resources/read`: return the cached description exactly as stored.
pub fn read(params: &ReadResourceParams, cache: &GraphCache) -> Result<Value, McpErrorResponse> {
    let reference = AliasRef::parse(&params.uri)?;
    let description = cache.get(reference.alias()).ok_or_else(|| GraphError::NotFound {
        alias: reference.alias().to_string(),
    })?;

    let text = serde_json::to_string(&*description).map_err(|e| {
        tracing::warn!("Serialization failed: {e}");
        McpErrorResponse::canonical(McpErrorCode::InternalError)
    })?;

    Ok(json!({
        "contents": [{
            "uri": params.uri,
            "mimeType": MIME_JSON,
            "text": text
        }]
    }))
}
