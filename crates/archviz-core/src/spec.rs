//! Diagram spec data model and validation.
//!
//! A [`DiagramSpec`] can only be obtained through [`validate`], which turns an
//! untyped JSON value into a bounded, normalized description:
//!
//! - title and direction are defaulted (an unknown direction becomes `LR`),
//! - node and edge counts are checked against [`Limits`] before anything else,
//! - node ids are unique and every edge endpoint names a declared node,
//! - node and edge labels are cut to [`MAX_LABEL_CHARS`] characters.
//!
//! Unknown fields are ignored at every level.
//!
//! # Example
//!
//! ```
//! # use archviz_core::spec::{Direction, Limits, validate};
//! let raw = serde_json::json!({
//!     "direction": "TB",
//!     "nodes": [
//!         {"id": "web", "icon": "diagrams.azure.web.AppServices"},
//!         {"id": "db", "icon": "diagrams.azure.database.SQLDatabases"}
//!     ],
//!     "edges": [{"source": "web", "target": "db", "label": "queries"}]
//! });
//!
//! let spec = validate(&raw, &Limits::default()).unwrap();
//! assert_eq!(spec.direction(), Direction::TB);
//! assert_eq!(spec.nodes().len(), 2);
//! assert_eq!(spec.nodes()[0].label(), "web");
//! ```

use std::{collections::HashSet, fmt, str::FromStr};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Limit, SpecError};

/// Title used when a spec does not carry one.
pub const DEFAULT_TITLE: &str = "Architecture Diagram";

/// Maximum number of characters kept in a node or edge label.
pub const MAX_LABEL_CHARS: usize = 120;

/// Layout direction of the rendered graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Left to right.
    #[default]
    LR,
    /// Top to bottom.
    TB,
    /// Right to left.
    RL,
    /// Bottom to top.
    BT,
}

impl Direction {
    /// Returns the direction as its two-letter code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::LR => "LR",
            Direction::TB => "TB",
            Direction::RL => "RL",
            Direction::BT => "BT",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LR" => Ok(Direction::LR),
            "TB" => Ok(Direction::TB),
            "RL" => Ok(Direction::RL),
            "BT" => Ok(Direction::BT),
            other => Err(format!("unknown direction `{other}`")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper bounds on the size of an accepted spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Limits {
    max_nodes: usize,
    max_edges: usize,
}

impl Limits {
    /// Creates limits with the given maximum node and edge counts.
    pub fn new(max_nodes: usize, max_edges: usize) -> Self {
        Self {
            max_nodes,
            max_edges,
        }
    }

    /// Maximum number of nodes.
    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    /// Maximum number of edges.
    pub fn max_edges(&self) -> usize {
        self.max_edges
    }

    /// Replaces the maximum node count.
    pub fn set_max_nodes(&mut self, max_nodes: usize) -> &mut Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Replaces the maximum edge count.
    pub fn set_max_edges(&mut self, max_edges: usize) -> &mut Self {
        self.max_edges = max_edges;
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new(60, 120)
    }
}

/// A named visual grouping of nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    id: String,
    label: String,
}

impl Cluster {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display label; the id when none was given.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A drawable node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    id: String,
    label: String,
    icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cluster: Option<String>,
}

impl Node {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display label, truncated; the id when none was given.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Qualified icon identifier as requested by the spec.
    pub fn icon(&self) -> &str {
        &self.icon
    }

    /// Cluster id this node belongs to, if any.
    ///
    /// This is a weak reference: the cluster does not have to be declared.
    pub fn cluster(&self) -> Option<&str> {
        self.cluster.as_deref()
    }
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    source: String,
    target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

impl Edge {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// A validated diagram description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagramSpec {
    title: String,
    direction: Direction,
    clusters: Vec<Cluster>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl DiagramSpec {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Declared clusters, in declaration order.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Looks up a declared cluster by id.
    pub fn cluster(&self, id: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|cluster| cluster.id == id)
    }
}

#[derive(Deserialize)]
struct RawCluster {
    id: String,
    #[serde(default)]
    label: Option<String>,
}

#[derive(Deserialize)]
struct RawNode {
    id: String,
    #[serde(default)]
    label: Option<String>,
    icon: String,
    #[serde(default)]
    cluster: Option<String>,
}

#[derive(Deserialize)]
struct RawEdge {
    source: String,
    target: String,
    #[serde(default)]
    label: Option<String>,
}

/// Validates and normalizes a raw diagram spec.
///
/// # Errors
///
/// - [`SpecError::Invalid`] when the value is not an object, a list field is
///   not an array, or an item is missing a required field.
/// - [`SpecError::LimitExceeded`] when there are more nodes or edges than
///   `limits` allows. This is checked before any item is parsed.
/// - [`SpecError::DuplicateNode`] when a node id repeats.
/// - [`SpecError::DanglingEdge`] when an edge names an undeclared node.
pub fn validate(raw: &Value, limits: &Limits) -> Result<DiagramSpec, SpecError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| SpecError::Invalid("expected a JSON object".to_string()))?;

    let title = obj
        .get("title")
        .and_then(Value::as_str)
        .filter(|title| !title.is_empty())
        .unwrap_or(DEFAULT_TITLE)
        .to_string();
    let direction = read_direction(obj.get("direction"));

    let raw_clusters = list_field(obj, "clusters")?;
    let raw_nodes = list_field(obj, "nodes")?;
    let raw_edges = list_field(obj, "edges")?;

    if raw_nodes.len() > limits.max_nodes {
        return Err(SpecError::LimitExceeded {
            limit: Limit::MaxNodes,
            max: limits.max_nodes,
            actual: raw_nodes.len(),
        });
    }
    if raw_edges.len() > limits.max_edges {
        return Err(SpecError::LimitExceeded {
            limit: Limit::MaxEdges,
            max: limits.max_edges,
            actual: raw_edges.len(),
        });
    }

    let mut clusters: Vec<Cluster> = Vec::with_capacity(raw_clusters.len());
    for (index, item) in raw_clusters.iter().enumerate() {
        let raw = parse_item::<RawCluster>(item, "cluster", index)?;
        if clusters.iter().any(|cluster| cluster.id == raw.id) {
            warn!(cluster_id = raw.id; "Ignoring repeated cluster declaration");
            continue;
        }
        let label = non_empty(raw.label).unwrap_or_else(|| raw.id.clone());
        clusters.push(Cluster { id: raw.id, label });
    }

    let mut ids = HashSet::with_capacity(raw_nodes.len());
    let mut nodes = Vec::with_capacity(raw_nodes.len());
    for (index, item) in raw_nodes.iter().enumerate() {
        let raw = parse_item::<RawNode>(item, "node", index)?;
        if !ids.insert(raw.id.clone()) {
            return Err(SpecError::DuplicateNode(raw.id));
        }
        let label = non_empty(raw.label)
            .map(|label| truncate_label(&label))
            .unwrap_or_else(|| raw.id.clone());
        nodes.push(Node {
            id: raw.id,
            label,
            icon: raw.icon,
            cluster: non_empty(raw.cluster),
        });
    }

    let mut edges = Vec::with_capacity(raw_edges.len());
    for (index, item) in raw_edges.iter().enumerate() {
        let raw = parse_item::<RawEdge>(item, "edge", index)?;
        let missing = [&raw.source, &raw.target]
            .into_iter()
            .find(|endpoint| !ids.contains(endpoint.as_str()));
        if let Some(missing) = missing {
            return Err(SpecError::DanglingEdge {
                missing: missing.clone(),
                from: raw.source,
                to: raw.target,
            });
        }
        edges.push(Edge {
            source: raw.source,
            target: raw.target,
            label: non_empty(raw.label).map(|label| truncate_label(&label)),
        });
    }

    debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        clusters = clusters.len();
        "Spec validated"
    );

    Ok(DiagramSpec {
        title,
        direction,
        clusters,
        nodes,
        edges,
    })
}

/// Cuts a label to at most [`MAX_LABEL_CHARS`] characters.
pub fn truncate_label(label: &str) -> String {
    label.chars().take(MAX_LABEL_CHARS).collect()
}

fn read_direction(value: Option<&Value>) -> Direction {
    match value {
        None | Some(Value::Null) => Direction::default(),
        Some(Value::String(s)) if s.is_empty() => Direction::default(),
        Some(Value::String(s)) => s.parse().unwrap_or_else(|_| {
            debug!(direction = s.as_str(); "Unknown direction, using LR");
            Direction::default()
        }),
        Some(other) => {
            debug!(direction:% = other; "Non-string direction, using LR");
            Direction::default()
        }
    }
}

fn list_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a [Value], SpecError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(SpecError::Invalid(format!("`{key}` must be an array"))),
    }
}

fn parse_item<'a, T: Deserialize<'a>>(
    item: &'a Value,
    kind: &str,
    index: usize,
) -> Result<T, SpecError> {
    T::deserialize(item).map_err(|err| SpecError::Invalid(format!("{kind} #{index}: {err}")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn node(id: &str) -> Value {
        json!({"id": id, "icon": "diagrams.azure.web.AppServices"})
    }

    #[test]
    fn test_defaults_applied() {
        let spec = validate(&json!({"nodes": [], "edges": []}), &Limits::default()).unwrap();
        assert_eq!(spec.title(), DEFAULT_TITLE);
        assert_eq!(spec.direction(), Direction::LR);
        assert!(spec.clusters().is_empty());
    }

    #[test]
    fn test_missing_lists_are_empty() {
        let spec = validate(&json!({"title": "Empty"}), &Limits::default()).unwrap();
        assert_eq!(spec.title(), "Empty");
        assert!(spec.nodes().is_empty());
        assert!(spec.edges().is_empty());
    }

    #[test]
    fn test_unknown_direction_coerced() {
        for direction in [json!("XY"), json!(42), json!("lr")] {
            let spec = validate(&json!({"direction": direction}), &Limits::default()).unwrap();
            assert_eq!(spec.direction(), Direction::LR);
        }
    }

    #[test]
    fn test_known_directions_kept() {
        for (raw, expected) in [
            ("TB", Direction::TB),
            ("RL", Direction::RL),
            ("BT", Direction::BT),
        ] {
            let spec = validate(&json!({"direction": raw}), &Limits::default()).unwrap();
            assert_eq!(spec.direction(), expected);
        }
    }

    #[test]
    fn test_non_object_rejected() {
        let err = validate(&json!([1, 2]), &Limits::default()).unwrap_err();
        assert!(matches!(err, SpecError::Invalid(_)));
    }

    #[test]
    fn test_non_array_nodes_rejected() {
        let err = validate(&json!({"nodes": "web"}), &Limits::default()).unwrap_err();
        assert_eq!(err, SpecError::Invalid("`nodes` must be an array".to_string()));
    }

    #[test]
    fn test_missing_icon_rejected() {
        let raw = json!({"nodes": [node("a"), {"id": "b"}]});
        let err = validate(&raw, &Limits::default()).unwrap_err();
        match err {
            SpecError::Invalid(msg) => {
                assert!(msg.starts_with("node #1:"), "{msg}");
                assert!(msg.contains("icon"), "{msg}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_node_limit_checked_before_items() {
        // The items are malformed, but the limit is reported first.
        let raw = json!({"nodes": [{}, {}, {}]});
        let err = validate(&raw, &Limits::new(2, 10)).unwrap_err();
        assert_eq!(
            err,
            SpecError::LimitExceeded {
                limit: Limit::MaxNodes,
                max: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_edge_limit() {
        let raw = json!({
            "nodes": [node("a"), node("b")],
            "edges": [
                {"source": "a", "target": "b"},
                {"source": "b", "target": "a"}
            ]
        });
        let err = validate(&raw, &Limits::new(10, 1)).unwrap_err();
        assert!(matches!(
            err,
            SpecError::LimitExceeded {
                limit: Limit::MaxEdges,
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_node_named() {
        let raw = json!({"nodes": [node("a"), node("b"), node("a")]});
        let err = validate(&raw, &Limits::default()).unwrap_err();
        assert_eq!(err, SpecError::DuplicateNode("a".to_string()));
    }

    #[test]
    fn test_dangling_edge_named() {
        let raw = json!({
            "nodes": [node("a")],
            "edges": [{"source": "a", "target": "ghost"}]
        });
        let err = validate(&raw, &Limits::default()).unwrap_err();
        assert_eq!(
            err,
            SpecError::DanglingEdge {
                from: "a".to_string(),
                to: "ghost".to_string(),
                missing: "ghost".to_string(),
            }
        );
    }

    #[test]
    fn test_edge_may_reference_later_node() {
        let raw = json!({
            "nodes": [node("a"), node("b")],
            "edges": [{"source": "b", "target": "a"}]
        });
        assert!(validate(&raw, &Limits::default()).is_ok());
    }

    #[test]
    fn test_labels_truncated() {
        let long = "x".repeat(200);
        let raw = json!({
            "nodes": [
                {"id": "a", "icon": "i", "label": long},
                {"id": "b", "icon": "i"}
            ],
            "edges": [{"source": "a", "target": "b", "label": "y".repeat(130)}]
        });
        let spec = validate(&raw, &Limits::default()).unwrap();
        assert_eq!(spec.nodes()[0].label().chars().count(), 120);
        assert_eq!(spec.edges()[0].label().unwrap().chars().count(), 120);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let label = "é".repeat(150);
        let truncated = truncate_label(&label);
        assert_eq!(truncated.chars().count(), MAX_LABEL_CHARS);
        assert_eq!(truncated.len(), MAX_LABEL_CHARS * 2);
    }

    #[test]
    fn test_empty_labels_default() {
        let raw = json!({
            "nodes": [{"id": "a", "icon": "i", "label": "", "cluster": ""}],
            "edges": [{"source": "a", "target": "a", "label": ""}]
        });
        let spec = validate(&raw, &Limits::default()).unwrap();
        assert_eq!(spec.nodes()[0].label(), "a");
        assert_eq!(spec.nodes()[0].cluster(), None);
        assert_eq!(spec.edges()[0].label(), None);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let raw = json!({
            "title": "T",
            "theme": "dark",
            "clusters": [{"id": "c", "color": "red"}],
            "nodes": [{"id": "a", "icon": "i", "cluster": "c", "size": 3}],
            "edges": [{"source": "a", "target": "a", "weight": 2}]
        });
        let spec = validate(&raw, &Limits::default()).unwrap();
        assert_eq!(spec.clusters()[0].label(), "c");
        assert_eq!(spec.nodes()[0].cluster(), Some("c"));
    }

    #[test]
    fn test_repeated_cluster_first_wins() {
        let raw = json!({
            "clusters": [
                {"id": "c", "label": "First"},
                {"id": "c", "label": "Second"}
            ]
        });
        let spec = validate(&raw, &Limits::default()).unwrap();
        assert_eq!(spec.clusters().len(), 1);
        assert_eq!(spec.cluster("c").unwrap().label(), "First");
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("BT".parse::<Direction>(), Ok(Direction::BT));
        assert!("bt".parse::<Direction>().is_err());
        assert_eq!(Direction::RL.to_string(), "RL");
    }
}
