//! Determinism checks: cached graphs read back byte-for-byte, and repeated
//! queries produce identical tool output.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use mcp_graph_server::config::ServerConfig;
use mcp_graph_server::handlers::{self, ServerState};
use mcp_graph_server::protocol::{JsonRpcRequest, RpcId};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn sha256(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

async fn result_of(state: &ServerState, method: &str, params: Value) -> Value {
    let req = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: Some(RpcId::Str("det".to_string())),
        method: method.to_string(),
        params: Some(params),
    };
    handlers::dispatch(&req, state)
        .await
        .and_then(|resp| resp.result)
        .expect("request must succeed")
}

#[tokio::test]
async fn cached_graph_reads_back_byte_identical() {
    let state = ServerState::new(ServerConfig::default());
    let path = fixture("sample_graph_attr.json");

    result_of(
        &state,
        "tools/call",
        json!({
            "name": "load_graph_from_file",
            "arguments": { "path": path.to_str().unwrap(), "alias": "plant" }
        }),
    )
    .await;

    let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let expected = sha256(&serde_json::to_string(&on_disk).unwrap());

    for _ in 0..3 {
        let read = result_of(&state, "resources/read", json!({ "uri": "graph://plant" })).await;
        let text = read["contents"][0]["text"].as_str().unwrap();
        assert_eq!(sha256(text), expected, "cached graph changed on read");
    }
}

#[tokio::test]
async fn repeated_queries_are_byte_identical() {
    let state = ServerState::new(ServerConfig::default());
    let graph: Value =
        serde_json::from_str(&std::fs::read_to_string(fixture("sample_graph_attr.json")).unwrap())
            .unwrap();
    let call = json!({
        "name": "find_edges_by_attribute",
        "arguments": {
            "graph_data": graph,
            "attribute": "capacity",
            "value": 0,
            "operator": ">"
        }
    });

    let first = result_of(&state, "tools/call", call.clone()).await;
    let first_hash = sha256(first["content"][0]["text"].as_str().unwrap());

    for _ in 0..5 {
        let again = result_of(&state, "tools/call", call.clone()).await;
        assert_eq!(sha256(again["content"][0]["text"].as_str().unwrap()), first_hash);
    }
}
