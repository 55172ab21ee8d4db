use serde_json::Value;

use super::materialize::MaterializedGraph;
use super::{GraphError, Result};
use crate::cache::GraphCache;

/// Scheme prefix of an alias reference.
pub const GRAPH_URI_SCHEME: &str = "graph://";

/// A parsed `graph://<alias>` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasRef {
    alias: String,
}

impl AliasRef {
    /// Parse a reference. Everything after the scheme, including an empty
    /// string, is the alias.
    pub fn parse(uri: &str) -> Result<Self> {
        uri.strip_prefix(GRAPH_URI_SCHEME)
            .map(|alias| Self {
                alias: alias.to_string(),
            })
            .ok_or_else(|| {
                GraphError::Input(format!(
                    "Invalid graph URI '{uri}'. Expected '{GRAPH_URI_SCHEME}<alias>'."
                ))
            })
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn uri(alias: &str) -> String {
        format!("{GRAPH_URI_SCHEME}{alias}")
    }
}

/// Where a graph for one call comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphSource {
    Inline(Value),
    Alias(AliasRef),
}

impl GraphSource {
    /// Pick the source from the two optional call arguments. Exactly one must
    /// be present.
    pub fn from_parts(inline: Option<Value>, uri: Option<String>) -> Result<Self> {
        match (inline, uri) {
            (Some(_), Some(_)) => Err(GraphError::Input(
                "Provide either graph_data or graph_uri, not both.".into(),
            )),
            (None, None) => Err(GraphError::Input(
                "No graph data provided. Please provide either graph_data or graph_uri.".into(),
            )),
            (Some(data), None) => Ok(Self::Inline(data)),
            (None, Some(uri)) => AliasRef::parse(&uri).map(Self::Alias),
        }
    }
}

/// Materialize a fresh graph for `source`, consulting `cache` for aliases.
pub fn resolve(source: GraphSource, cache: &GraphCache) -> Result<MaterializedGraph> {
    match source {
        GraphSource::Inline(data) => MaterializedGraph::from_value(data),
        GraphSource::Alias(reference) => {
            let stored = cache.get(reference.alias()).ok_or_else(|| GraphError::NotFound {
                alias: reference.alias().to_string(),
            })?;
            tracing::debug!(alias = reference.alias(), "materializing cached graph");
            MaterializedGraph::from_value(Value::clone(&stored))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "nodes": [{"id": "a", "holdup_max": 50.0}, {"id": "b"}],
            "links": [{"source": "a", "target": "b"}]
        })
    }

    #[test]
    fn parses_alias_reference() {
        assert_eq!(AliasRef::parse("graph://default").unwrap().alias(), "default");
        assert_eq!(AliasRef::parse("graph://").unwrap().alias(), "");
        assert_eq!(AliasRef::parse("graph://a/b").unwrap().alias(), "a/b");
    }

    #[test]
    fn rejects_other_schemes() {
        for uri in ["invalid://test", "default", "", "GRAPH://x"] {
            let err = AliasRef::parse(uri).unwrap_err();
            match err {
                GraphError::Input(msg) => assert!(msg.contains("Invalid graph URI")),
                other => panic!("expected input error for {uri:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn both_sources_is_input_error() {
        let err = GraphSource::from_parts(Some(sample()), Some("graph://x".into())).unwrap_err();
        assert!(matches!(err, GraphError::Input(_)));
    }

    #[test]
    fn neither_source_is_input_error() {
        let err = GraphSource::from_parts(None, None).unwrap_err();
        assert!(matches!(err, GraphError::Input(_)));
    }

    #[test]
    fn resolves_inline_data() {
        let cache = GraphCache::new();
        let source = GraphSource::from_parts(Some(sample()), None).unwrap();
        let g = resolve(source, &cache).unwrap();
        assert_eq!(g.node_count(), 2);
    }

    #[test]
    fn resolves_cached_alias() {
        let cache = GraphCache::new();
        cache.put("test", sample());
        let source = GraphSource::from_parts(None, Some("graph://test".into())).unwrap();
        let g = resolve(source, &cache).unwrap();
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn unknown_alias_is_not_found() {
        let cache = GraphCache::new();
        let source = GraphSource::from_parts(None, Some("graph://nonexistent".into())).unwrap();
        let err = resolve(source, &cache).unwrap_err();
        assert_eq!(
            err,
            GraphError::NotFound {
                alias: "nonexistent".into()
            }
        );
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn invalid_cached_description_fails_on_resolution() {
        let cache = GraphCache::new();
        cache.put("broken", json!({"nodes": "nope"}));
        let source = GraphSource::from_parts(None, Some("graph://broken".into())).unwrap();
        assert!(matches!(resolve(source, &cache), Err(GraphError::Schema(_))));
    }

    #[test]
    fn each_resolution_is_independent() {
        let cache = GraphCache::new();
        cache.put("g1", sample());
        cache.put("g2", json!({"nodes": [{"id": "x"}], "links": []}));

        let g1 = resolve(GraphSource::Alias(AliasRef::parse("graph://g1").unwrap()), &cache).unwrap();
        let g2 = resolve(GraphSource::Alias(AliasRef::parse("graph://g2").unwrap()), &cache).unwrap();
        let g1_again =
            resolve(GraphSource::Alias(AliasRef::parse("graph://g1").unwrap()), &cache).unwrap();

        assert_eq!(g1.node_count(), 2);
        assert_eq!(g2.node_count(), 1);
        assert!(!std::ptr::eq(&g1, &g1_again));
    }
}
