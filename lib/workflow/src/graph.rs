//! Flow graph model.
//!
//! A `GraphModel` is the canvas-independent flow definition persisted as
//! `flow_data`:
//!
//! ```json
//! {"nodes": {"node_1": {"type": "manual_trigger", "config": {}, "position": {"x": 50, "y": 100}}},
//!  "edges": [{"from": "node_1", "to": "node_2"}]}
//! ```
//!
//! The model stores what it is given. Edges may reference missing nodes and
//! nodes may use block types no catalog knows; `validate` reports both and
//! the canvas adapter skips them. petgraph is used for analysis over the
//! resolvable part of the graph.

use crate::catalog::BlockCatalog;
use crate::edge::Edge;
use crate::error::GraphError;
use crate::node::{Node, NodeId};
use crate::port::PortDirection;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;

/// A flow graph: uniquely identified nodes in insertion order plus an
/// ordered list of directed edges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphModel {
    nodes: Vec<Node>,
    /// Map from NodeId to position in `nodes` for O(1) lookup.
    index: HashMap<NodeId, usize>,
    edges: Vec<Edge>,
}

/// An advisory finding from `GraphModel::validate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphIssue {
    /// The node's block type is not in the catalog.
    UnknownBlockType { node_id: NodeId, block_type: String },
    /// An edge endpoint names a node that does not exist.
    DanglingEdge { edge: Edge, missing: NodeId },
    /// A node has edges on a side where its block has no ports.
    PortOverflow {
        node_id: NodeId,
        direction: PortDirection,
        edges: usize,
        ports: u32,
    },
    /// These nodes form a cycle.
    Cycle { nodes: Vec<NodeId> },
}

impl fmt::Display for GraphIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownBlockType {
                node_id,
                block_type,
            } => {
                write!(f, "node {node_id} has unknown block type '{block_type}'")
            }
            Self::DanglingEdge { edge, missing } => {
                write!(
                    f,
                    "edge {} -> {} references missing node {missing}",
                    edge.from, edge.to
                )
            }
            Self::PortOverflow {
                node_id,
                direction,
                edges,
                ports,
            } => {
                write!(
                    f,
                    "node {node_id} has {edges} {direction} edge(s) but {ports} {direction} port(s)"
                )
            }
            Self::Cycle { nodes } => {
                let names: Vec<&str> = nodes.iter().map(NodeId::as_str).collect();
                write!(f, "cycle through {}", names.join(", "))
            }
        }
    }
}

impl GraphModel {
    /// Creates a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node.
    ///
    /// A node with the same id is replaced in place and returned; its edges
    /// are kept.
    pub fn add_node(&mut self, node: Node) -> Option<Node> {
        if let Some(&slot) = self.index.get(&node.id) {
            return Some(std::mem::replace(&mut self.nodes[slot], node));
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        None
    }

    /// Adds a node, builder style.
    #[must_use]
    pub fn with_node(mut self, node: Node) -> Self {
        self.add_node(node);
        self
    }

    /// Removes a node and every edge touching it.
    pub fn remove_node(&mut self, node_id: &NodeId) -> Option<Node> {
        let slot = self.index.remove(node_id)?;
        let node = self.nodes.remove(slot);
        for later in &self.nodes[slot..] {
            if let Some(i) = self.index.get_mut(&later.id) {
                *i -= 1;
            }
        }
        self.edges.retain(|e| !e.touches(node_id));
        Some(node)
    }

    /// Appends an edge. Endpoints are not checked.
    pub fn connect(&mut self, from: impl Into<NodeId>, to: impl Into<NodeId>) {
        self.edges.push(Edge::new(from, to));
    }

    /// Adds an edge, builder style.
    #[must_use]
    pub fn with_edge(mut self, from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        self.connect(from, to);
        self
    }

    /// Removes the first edge from `from` to `to`. Returns whether one was found.
    pub fn disconnect(&mut self, from: &NodeId, to: &NodeId) -> bool {
        match self.edges.iter().position(|e| &e.from == from && &e.to == to) {
            Some(i) => {
                self.edges.remove(i);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.index.get(node_id).map(|&i| &self.nodes[i])
    }

    pub fn node_mut(&mut self, node_id: &str) -> Option<&mut Node> {
        self.index.get(node_id).map(|&i| &mut self.nodes[i])
    }

    /// Like `node_mut`, but an error when the node is missing.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::NodeNotFound` if no node has this id.
    pub fn require_node_mut(&mut self, node_id: &NodeId) -> Result<&mut Node, Report<GraphError>> {
        match self.index.get(node_id) {
            Some(&i) => Ok(&mut self.nodes[i]),
            None => Err(GraphError::NodeNotFound {
                node_id: node_id.clone(),
            }
            .into()),
        }
    }

    #[must_use]
    pub fn contains(&self, node_id: &str) -> bool {
        self.index.contains_key(node_id)
    }

    /// Returns all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Returns all edges in order, including dangling ones.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Returns the downstream nodes of a node, one entry per edge.
    pub fn successors(&self, node_id: &NodeId) -> Vec<&Node> {
        self.edges
            .iter()
            .filter(|e| &e.from == node_id)
            .filter_map(|e| self.node(e.to.as_str()))
            .collect()
    }

    /// Returns the upstream nodes of a node, one entry per edge.
    pub fn predecessors(&self, node_id: &NodeId) -> Vec<&Node> {
        self.edges
            .iter()
            .filter(|e| &e.to == node_id)
            .filter_map(|e| self.node(e.from.as_str()))
            .collect()
    }

    /// Returns nodes without incoming edges from existing nodes.
    pub fn entry_nodes(&self) -> Vec<&Node> {
        let (graph, _) = self.digraph();
        graph
            .node_indices()
            .filter(|&idx| graph.neighbors_directed(idx, Direction::Incoming).next().is_none())
            .map(|idx| graph[idx])
            .collect()
    }

    /// Returns nodes without outgoing edges to existing nodes.
    pub fn terminal_nodes(&self) -> Vec<&Node> {
        let (graph, _) = self.digraph();
        graph
            .node_indices()
            .filter(|&idx| graph.neighbors_directed(idx, Direction::Outgoing).next().is_none())
            .map(|idx| graph[idx])
            .collect()
    }

    /// Returns the order in which the flow service runs the nodes.
    ///
    /// Kahn's algorithm over edges whose endpoints exist, ties broken by
    /// insertion order. Nodes on or downstream of a cycle never reach zero
    /// in-degree and are left out.
    #[must_use]
    pub fn execution_order(&self) -> Vec<NodeId> {
        let (graph, _) = self.digraph();
        let mut in_degree: Vec<usize> = graph
            .node_indices()
            .map(|idx| graph.edges_directed(idx, Direction::Incoming).count())
            .collect();

        let mut queue: VecDeque<NodeIndex> = graph
            .node_indices()
            .filter(|idx| in_degree[idx.index()] == 0)
            .collect();
        let mut order = Vec::with_capacity(graph.node_count());

        while let Some(idx) = queue.pop_front() {
            order.push(graph[idx].id.clone());
            let mut ready: Vec<NodeIndex> = Vec::new();
            for edge in graph.edges_directed(idx, Direction::Outgoing) {
                let target = edge.target();
                in_degree[target.index()] -= 1;
                if in_degree[target.index()] == 0 {
                    ready.push(target);
                }
            }
            ready.sort();
            queue.extend(ready);
        }
        order
    }

    /// Reports every problem with the graph against a catalog.
    ///
    /// Nothing here prevents import, save or run; the findings are advisory.
    #[must_use]
    pub fn validate(&self, catalog: &BlockCatalog) -> Vec<GraphIssue> {
        let mut issues = Vec::new();

        for node in &self.nodes {
            if !catalog.contains(&node.block_type) {
                issues.push(GraphIssue::UnknownBlockType {
                    node_id: node.id.clone(),
                    block_type: node.block_type.clone(),
                });
            }
        }

        for edge in &self.edges {
            for endpoint in [&edge.from, &edge.to] {
                if !self.contains(endpoint.as_str()) {
                    issues.push(GraphIssue::DanglingEdge {
                        edge: edge.clone(),
                        missing: endpoint.clone(),
                    });
                    break;
                }
            }
        }

        let (graph, _) = self.digraph();
        for idx in graph.node_indices() {
            let node = graph[idx];
            let Some(block) = catalog.get(&node.block_type) else {
                continue;
            };
            for (direction, ports) in [
                (PortDirection::Input, block.inputs),
                (PortDirection::Output, block.outputs),
            ] {
                let petgraph_direction = match direction {
                    PortDirection::Input => Direction::Incoming,
                    PortDirection::Output => Direction::Outgoing,
                };
                let edges = graph.edges_directed(idx, petgraph_direction).count();
                if edges > 0 && ports == 0 {
                    issues.push(GraphIssue::PortOverflow {
                        node_id: node.id.clone(),
                        direction,
                        edges,
                        ports,
                    });
                }
            }
        }

        if petgraph::algo::is_cyclic_directed(&graph) {
            for component in petgraph::algo::tarjan_scc(&graph) {
                let is_cycle = component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&idx| graph.contains_edge(idx, idx));
                if is_cycle {
                    let mut members = component;
                    members.sort();
                    issues.push(GraphIssue::Cycle {
                        nodes: members.into_iter().map(|idx| graph[idx].id.clone()).collect(),
                    });
                }
            }
        }

        issues
    }

    /// Serializes the graph as `flow_data` JSON.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::Serialization` if a config value cannot be
    /// written.
    pub fn to_json(&self) -> flowdeck_core::Result<String, GraphError> {
        serde_json::to_string(self).map_err(|e| {
            GraphError::Serialization {
                details: e.to_string(),
            }
            .into()
        })
    }

    /// Parses `flow_data` JSON.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::InvalidJson` if the text is not JSON or not a
    /// graph-shaped object.
    pub fn from_json(json: &str) -> flowdeck_core::Result<Self, GraphError> {
        serde_json::from_str(json).map_err(|e| {
            GraphError::InvalidJson {
                details: e.to_string(),
            }
            .into()
        })
    }

    /// Builds a petgraph view over the nodes and resolvable edges.
    ///
    /// Node indices follow insertion order.
    fn digraph(&self) -> (DiGraph<&Node, ()>, HashMap<&str, NodeIndex>) {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.edges.len());
        let mut indices = HashMap::with_capacity(self.nodes.len());
        for node in &self.nodes {
            indices.insert(node.id.as_str(), graph.add_node(node));
        }
        for edge in &self.edges {
            if let (Some(&from), Some(&to)) =
                (indices.get(edge.from.as_str()), indices.get(edge.to.as_str()))
            {
                graph.add_edge(from, to, ());
            }
        }
        (graph, indices)
    }
}

/// Custom serde for the `{nodes: {id: node}, edges: [...]}` wire shape.
///
/// Deserialization is tolerant: `nodes` may be an object keyed by id (the
/// key wins over any nested `id`) or an array of nodes carrying `id`, and
/// edge entries without usable endpoints are dropped.
mod graph_serde {
    use super::*;
    use crate::node::{ConfigRecord, Position};
    use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
    use serde::ser::{SerializeMap, SerializeStruct};
    use serde_json::Value as JsonValue;

    #[derive(Serialize)]
    struct NodeBody<'a> {
        #[serde(rename = "type")]
        block_type: &'a str,
        config: &'a ConfigRecord,
        position: &'a Position,
    }

    struct NodesById<'a>(&'a [Node]);

    impl Serialize for NodesById<'_> {
        fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.0.len()))?;
            for node in self.0 {
                map.serialize_entry(
                    node.id.as_str(),
                    &NodeBody {
                        block_type: &node.block_type,
                        config: &node.config,
                        position: &node.position,
                    },
                )?;
            }
            map.end()
        }
    }

    impl Serialize for GraphModel {
        fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut state = serializer.serialize_struct("GraphModel", 2)?;
            state.serialize_field("nodes", &NodesById(&self.nodes))?;
            state.serialize_field("edges", &self.edges)?;
            state.end()
        }
    }

    #[derive(Deserialize)]
    struct RawPosition {
        x: Option<f64>,
        y: Option<f64>,
    }

    #[derive(Deserialize)]
    struct RawNode {
        #[serde(default)]
        id: Option<JsonValue>,
        #[serde(rename = "type", default)]
        block_type: Option<String>,
        #[serde(default)]
        config: Option<JsonValue>,
        #[serde(default)]
        position: Option<RawPosition>,
    }

    impl RawNode {
        fn into_node(self, id: NodeId) -> Node {
            let config = match self.config {
                Some(JsonValue::Object(record)) => record,
                _ => ConfigRecord::new(),
            };
            let position = self.position.map_or(Position::IMPORT_DEFAULT, |p| {
                Position::new(
                    p.x.unwrap_or(Position::IMPORT_DEFAULT.x),
                    p.y.unwrap_or(Position::IMPORT_DEFAULT.y),
                )
            });
            Node {
                id,
                block_type: self.block_type.unwrap_or_default(),
                config,
                position,
            }
        }
    }

    /// Ids may arrive as strings or numbers.
    fn id_from(value: &JsonValue) -> Option<NodeId> {
        match value {
            JsonValue::String(s) if !s.is_empty() => Some(NodeId::new(s.as_str())),
            JsonValue::Number(n) => Some(NodeId::new(n.to_string())),
            _ => None,
        }
    }

    struct Nodes(Vec<Node>);

    impl<'de> Deserialize<'de> for Nodes {
        fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            struct NodesVisitor;

            impl<'de> Visitor<'de> for NodesVisitor {
                type Value = Nodes;

                fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                    formatter.write_str("a map of node id to node, or a list of nodes")
                }

                fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                    Ok(Nodes(Vec::new()))
                }

                fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
                    let mut nodes = Vec::new();
                    while let Some(key) = map.next_key::<String>()? {
                        let raw: RawNode = map.next_value()?;
                        nodes.push(raw.into_node(NodeId::new(key)));
                    }
                    Ok(Nodes(nodes))
                }

                fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                    let mut nodes = Vec::new();
                    while let Some(raw) = seq.next_element::<RawNode>()? {
                        if let Some(id) = raw.id.as_ref().and_then(id_from) {
                            nodes.push(raw.into_node(id));
                        }
                    }
                    Ok(Nodes(nodes))
                }
            }

            deserializer.deserialize_any(NodesVisitor)
        }
    }

    fn edges_from(values: Vec<JsonValue>) -> Vec<Edge> {
        values
            .iter()
            .filter_map(|value| {
                let from = value.get("from").and_then(id_from)?;
                let to = value.get("to").and_then(id_from)?;
                Some(Edge { from, to })
            })
            .collect()
    }

    impl<'de> Deserialize<'de> for GraphModel {
        fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            struct GraphVisitor;

            impl<'de> Visitor<'de> for GraphVisitor {
                type Value = GraphModel;

                fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                    formatter.write_str("a flow graph with nodes and edges")
                }

                fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
                    let mut nodes: Option<Nodes> = None;
                    let mut edges: Option<Option<Vec<JsonValue>>> = None;

                    while let Some(key) = map.next_key::<String>()? {
                        match key.as_str() {
                            "nodes" => nodes = Some(map.next_value()?),
                            "edges" => edges = Some(map.next_value()?),
                            _ => {
                                let _ = map.next_value::<IgnoredAny>()?;
                            }
                        }
                    }

                    let mut graph = GraphModel::new();
                    for node in nodes.map(|n| n.0).unwrap_or_default() {
                        graph.add_node(node);
                    }
                    graph.edges = edges_from(edges.flatten().unwrap_or_default());
                    Ok(graph)
                }
            }

            deserializer.deserialize_map(GraphVisitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Position;
    use serde_json::json;

    fn linear() -> GraphModel {
        GraphModel::new()
            .with_node(Node::new("a", "manual_trigger"))
            .with_node(Node::new("b", "ai_prompt"))
            .with_node(Node::new("c", "output"))
            .with_edge("a", "b")
            .with_edge("b", "c")
    }

    #[test]
    fn add_and_get_node() {
        let graph = linear();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.node("b").map(|n| n.block_type.as_str()), Some("ai_prompt"));
        assert!(graph.node("z").is_none());
    }

    #[test]
    fn add_node_replaces_same_id_in_place() {
        let mut graph = linear();
        let old = graph.add_node(Node::new("a", "schedule_trigger"));
        assert_eq!(old.map(|n| n.block_type), Some("manual_trigger".to_string()));

        let ids: Vec<&str> = graph.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn remove_node_drops_incident_edges() {
        let mut graph = linear();
        let removed = graph.remove_node(&NodeId::new("b"));
        assert!(removed.is_some());
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.node("c").map(|n| n.id.as_str()), Some("c"));
    }

    #[test]
    fn disconnect_removes_first_match_only() {
        let mut graph = linear().with_edge("a", "b");
        assert!(graph.disconnect(&NodeId::new("a"), &NodeId::new("b")));
        assert_eq!(graph.edge_count(), 2);
        assert!(!graph.disconnect(&NodeId::new("c"), &NodeId::new("a")));
    }

    #[test]
    fn require_node_mut_reports_missing_node() {
        let mut graph = linear();
        let err = graph.require_node_mut(&NodeId::new("nope")).unwrap_err();
        assert!(err.to_string().contains("node not found: nope"));
    }

    #[test]
    fn entry_and_terminal_nodes_ignore_dangling_edges() {
        let graph = linear().with_edge("ghost", "a").with_edge("c", "ghost");
        let entries: Vec<&str> = graph.entry_nodes().iter().map(|n| n.id.as_str()).collect();
        let terminals: Vec<&str> = graph.terminal_nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(entries, vec!["a"]);
        assert_eq!(terminals, vec!["c"]);
    }

    #[test]
    fn successors_and_predecessors() {
        let graph = linear();
        let next: Vec<&str> = graph.successors(&NodeId::new("a")).iter().map(|n| n.id.as_str()).collect();
        let prev: Vec<&str> = graph.predecessors(&NodeId::new("c")).iter().map(|n| n.id.as_str()).collect();
        assert_eq!(next, vec!["b"]);
        assert_eq!(prev, vec!["b"]);
    }

    #[test]
    fn execution_order_is_topological_with_insertion_ties() {
        let graph = GraphModel::new()
            .with_node(Node::new("out", "output"))
            .with_node(Node::new("t2", "manual_trigger"))
            .with_node(Node::new("t1", "manual_trigger"))
            .with_edge("t1", "out")
            .with_edge("t2", "out");

        let order: Vec<String> = graph.execution_order().into_iter().map(NodeId::into_inner).collect();
        assert_eq!(order, vec!["t2", "t1", "out"]);
    }

    #[test]
    fn execution_order_omits_cycles() {
        let graph = linear().with_edge("c", "b");
        let order: Vec<String> = graph.execution_order().into_iter().map(NodeId::into_inner).collect();
        assert_eq!(order, vec!["a"]);
    }

    #[test]
    fn validate_clean_graph() {
        assert!(linear().validate(&BlockCatalog::builtin()).is_empty());
    }

    #[test]
    fn validate_reports_unknown_type_and_dangling_edge() {
        let graph = linear()
            .with_node(Node::new("x", "teleport"))
            .with_edge("c", "missing");
        let issues = graph.validate(&BlockCatalog::builtin());

        assert!(issues.contains(&GraphIssue::UnknownBlockType {
            node_id: NodeId::new("x"),
            block_type: "teleport".to_string(),
        }));
        assert!(issues.contains(&GraphIssue::DanglingEdge {
            edge: Edge::new("c", "missing"),
            missing: NodeId::new("missing"),
        }));
    }

    #[test]
    fn validate_reports_port_overflow() {
        let graph = linear().with_edge("c", "a");
        let issues = graph.validate(&BlockCatalog::builtin());
        assert!(issues.iter().any(|i| matches!(
            i,
            GraphIssue::PortOverflow { node_id, direction: PortDirection::Output, .. } if node_id.as_str() == "c"
        )));
        assert!(issues.iter().any(|i| matches!(
            i,
            GraphIssue::PortOverflow { node_id, direction: PortDirection::Input, .. } if node_id.as_str() == "a"
        )));
    }

    #[test]
    fn validate_reports_cycle_members() {
        let graph = linear().with_edge("c", "b");
        let issues = graph.validate(&BlockCatalog::builtin());
        let cycle = issues
            .iter()
            .find_map(|i| match i {
                GraphIssue::Cycle { nodes } => Some(nodes.clone()),
                _ => None,
            })
            .expect("cycle issue");
        assert_eq!(cycle, vec![NodeId::new("b"), NodeId::new("c")]);
    }

    #[test]
    fn serializes_nodes_keyed_by_id() {
        let graph = GraphModel::new()
            .with_node(
                Node::new("node_1", "delay")
                    .with_field("seconds", 5)
                    .with_position(Position::new(50.0, 80.0)),
            )
            .with_edge("node_1", "node_2");

        let json: serde_json::Value =
            serde_json::from_str(&graph.to_json().expect("serialize")).expect("valid json");
        assert_eq!(
            json,
            json!({
                "nodes": {"node_1": {"type": "delay", "config": {"seconds": 5}, "position": {"x": 50.0, "y": 80.0}}},
                "edges": [{"from": "node_1", "to": "node_2"}]
            })
        );
    }

    #[test]
    fn parse_preserves_node_order_and_key_ids() {
        let graph = GraphModel::from_json(
            r#"{"nodes": {"z": {"id": "ignored", "type": "output"}, "a": {"type": "manual_trigger"}}, "edges": []}"#,
        )
        .expect("parse");
        let ids: Vec<&str> = graph.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a"]);
    }

    #[test]
    fn parse_fills_missing_parts() {
        let graph = GraphModel::from_json(r#"{"nodes": {"n": {"type": "output"}}}"#).expect("parse");
        let node = graph.node("n").expect("node");
        assert!(node.config.is_empty());
        assert_eq!(node.position, Position::IMPORT_DEFAULT);
        assert_eq!(graph.edge_count(), 0);

        let empty = GraphModel::from_json("{}").expect("parse");
        assert!(empty.is_empty());
    }

    #[test]
    fn parse_tolerates_node_lists_and_bad_edges() {
        let graph = GraphModel::from_json(
            r#"{"nodes": [{"id": "a", "type": "manual_trigger"}, {"type": "no_id"}],
                "edges": [{"from": "a", "to": "b"}, {"from": "a"}, "junk", {"from": 1, "to": 2}]}"#,
        )
        .expect("parse");
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edges(), &[Edge::new("a", "b"), Edge::new("1", "2")]);
    }

    #[test]
    fn parse_keeps_dangling_edges() {
        let graph = GraphModel::from_json(
            r#"{"nodes": {"a": {"type": "output"}}, "edges": [{"from": "a", "to": "ghost"}]}"#,
        )
        .expect("parse");
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn parse_rejects_non_graph_json() {
        let err = GraphModel::from_json("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("invalid flow graph JSON"));
        assert!(GraphModel::from_json("not json").is_err());
    }

    #[test]
    fn json_roundtrip_keeps_everything() {
        let graph = linear().with_edge("a", "ghost");
        let parsed = GraphModel::from_json(&graph.to_json().expect("serialize")).expect("parse");
        assert_eq!(parsed, graph);
    }
}
