//! Flow graph edges.
//!
//! An edge is a directed link between two node ids. It carries no port
//! information; the canvas adapter maps every edge to the first output and
//! first input port.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// A directed edge between two nodes of a flow graph.
///
/// Endpoints are not guaranteed to exist; see `GraphModel::validate`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// The upstream node.
    pub from: NodeId,
    /// The downstream node.
    pub to: NodeId,
}

impl Edge {
    /// Creates a new edge.
    #[must_use]
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Returns true if either endpoint is the given node.
    #[must_use]
    pub fn touches(&self, node_id: &NodeId) -> bool {
        &self.from == node_id || &self.to == node_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_serializes_from_and_to() {
        let edge = Edge::new("node_1", "node_2");
        let json = serde_json::to_value(&edge).expect("serialize");
        assert_eq!(json, serde_json::json!({"from": "node_1", "to": "node_2"}));
    }

    #[test]
    fn touches_either_endpoint() {
        let edge = Edge::new("a", "b");
        assert!(edge.touches(&NodeId::new("a")));
        assert!(edge.touches(&NodeId::new("b")));
        assert!(!edge.touches(&NodeId::new("c")));
    }
}
