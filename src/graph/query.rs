//! Attribute predicates over nodes and edges, and attribute-name discovery.
//!
//! Every element whose attribute is missing or `null` is excluded from
//! predicate results, whatever the operator. A missing value is
//! incomparable, not unequal.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::materialize::{EdgeId, MaterializedGraph};
use super::{GraphError, NodeId, Result};

/// Comparison operator for attribute predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    fn is_equality(self) -> bool {
        matches!(self, Self::Eq | Self::Ne)
    }

    fn holds(self, ordering: Option<Ordering>) -> bool {
        match (self, ordering) {
            // NaN: only `!=` holds
            (Self::Ne, None) => true,
            (_, None) => false,
            (Self::Eq, Some(o)) => o == Ordering::Equal,
            (Self::Ne, Some(o)) => o != Ordering::Equal,
            (Self::Lt, Some(o)) => o == Ordering::Less,
            (Self::Le, Some(o)) => o != Ordering::Greater,
            (Self::Gt, Some(o)) => o == Ordering::Greater,
            (Self::Ge, Some(o)) => o != Ordering::Less,
        }
    }
}

impl FromStr for Operator {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "==" => Ok(Self::Eq),
            "!=" => Ok(Self::Ne),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Le),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Ge),
            other => Err(GraphError::UnsupportedOperator(other.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Query value after coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Number(f64),
    Text(String),
}

impl QueryValue {
    /// Coerce a raw argument. `None` (or JSON `null`) means "no value", i.e.
    /// an existence predicate.
    ///
    /// Strings that parse as `f64` become numbers, so `"6.0"` compares
    /// numerically. Booleans count as `1.0`/`0.0`.
    pub fn coerce(raw: Option<&Value>) -> Result<Option<Self>> {
        match raw {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(|f| Some(Self::Number(f)))
                .ok_or_else(|| GraphError::Input(format!("value {n} is not representable as a number"))),
            Some(Value::String(s)) => Ok(Some(match s.trim().parse::<f64>() {
                Ok(f) => Self::Number(f),
                Err(_) => Self::Text(s.clone()),
            })),
            Some(Value::Bool(b)) => Ok(Some(Self::Number(if *b { 1.0 } else { 0.0 }))),
            Some(other) => Err(GraphError::Input(format!(
                "value must be a number, string, or null; got {}",
                json_type(other)
            ))),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Text(_) => "string",
        }
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// Which elements attribute discovery scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeScope {
    Node,
    Edge,
    #[default]
    #[serde(alias = "all")]
    Both,
}

/// Node ids whose `attribute` satisfies the predicate, in declaration order.
pub fn nodes_by_attribute(
    graph: &MaterializedGraph,
    attribute: &str,
    value: Option<&QueryValue>,
    op: Operator,
) -> Result<Vec<NodeId>> {
    tracing::debug!(attribute, value = ?value, operator = %op, "filtering nodes");

    let mut matches = Vec::new();
    for node in graph.nodes() {
        if satisfies(&node.attributes, attribute, value, op, || node.id.to_string())? {
            matches.push(node.id.clone());
        }
    }
    Ok(matches)
}

/// Edge identities whose `attribute` satisfies the predicate, in declaration
/// order. Identities are `[u, v, key]` for multigraphs and `[u, v]`
/// otherwise.
pub fn edges_by_attribute(
    graph: &MaterializedGraph,
    attribute: &str,
    value: Option<&QueryValue>,
    op: Operator,
) -> Result<Vec<EdgeId>> {
    tracing::debug!(
        attribute,
        value = ?value,
        operator = %op,
        multigraph = graph.is_multigraph(),
        "filtering edges"
    );

    let mut matches = Vec::new();
    for edge in graph.edges() {
        let describe = || format!("edge ({}, {})", edge.id.source(), edge.id.target());
        if satisfies(&edge.attributes, attribute, value, op, describe)? {
            matches.push(edge.id.clone());
        }
    }
    Ok(matches)
}

/// Attribute keys present on elements in `scope` that contain `search`,
/// ignoring case.
pub fn matching_attributes(
    graph: &MaterializedGraph,
    search: &str,
    scope: AttributeScope,
) -> BTreeSet<String> {
    let needle = search.to_lowercase();
    let mut keys: BTreeSet<&str> = BTreeSet::new();

    if matches!(scope, AttributeScope::Node | AttributeScope::Both) {
        keys.extend(graph.nodes().flat_map(|n| n.attributes.keys().map(String::as_str)));
    }
    if matches!(scope, AttributeScope::Edge | AttributeScope::Both) {
        keys.extend(graph.edges().flat_map(|e| e.attributes.keys().map(String::as_str)));
    }

    keys.into_iter()
        .filter(|key| key.to_lowercase().contains(&needle))
        .map(str::to_string)
        .collect()
}

fn satisfies(
    attributes: &Map<String, Value>,
    attribute: &str,
    value: Option<&QueryValue>,
    op: Operator,
    element: impl FnOnce() -> String,
) -> Result<bool> {
    let found = match attributes.get(attribute) {
        None | Some(Value::Null) => return Ok(false),
        Some(v) => v,
    };

    let Some(query) = value else {
        return Ok(true);
    };

    match compare(found, query) {
        Some(ordering) => Ok(op.holds(ordering)),
        // Mismatched types are never equal; ordering them is an error.
        None if op.is_equality() => Ok(op == Operator::Ne),
        None => Err(GraphError::TypeMismatch {
            element: element(),
            attribute: attribute.to_string(),
            found: json_type(found),
            expected: query.type_name(),
            operator: op.symbol(),
        }),
    }
}

/// `None` when the types are not comparable; `Some(None)` for NaN.
fn compare(found: &Value, query: &QueryValue) -> Option<Option<Ordering>> {
    match (found, query) {
        (Value::Number(n), QueryValue::Number(q)) => n.as_f64().map(|f| f.partial_cmp(q)),
        (Value::Bool(b), QueryValue::Number(q)) => {
            let f: f64 = if *b { 1.0 } else { 0.0 };
            Some(f.partial_cmp(q))
        }
        (Value::String(s), QueryValue::Text(q)) => Some(Some(s.as_str().cmp(q.as_str()))),
        _ => None,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
