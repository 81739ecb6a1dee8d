//! Canvas adapter: best-effort translation between a `GraphModel` and a
//! `Canvas`.
//!
//! Export never fails. Import skips what the canvas cannot hold (unknown
//! block types, edges to skipped or missing nodes, connections the canvas
//! rejects) and reports it instead of failing.

use crate::canvas::{Canvas, CanvasNode, CanvasNodeId, CanvasNodeSpec};
use crate::catalog::BlockCatalog;
use crate::edge::Edge;
use crate::error::CanvasError;
use crate::graph::GraphModel;
use crate::node::{Node, NodeId};
use crate::port::PortName;
use crate::registry::ConfigRegistry;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::debug;

/// Block type recorded for canvas nodes that carry none.
pub const UNKNOWN_BLOCK_TYPE: &str = "unknown";

/// Stable id given to a canvas node without a name.
#[must_use]
pub fn fallback_node_id(canvas_id: CanvasNodeId) -> NodeId {
    NodeId::new(format!("node_{canvas_id}"))
}

/// Reads the current canvas contents as a graph.
///
/// Each canvas node becomes a node keyed by its name (or `node_<canvas id>`
/// when unnamed or when an earlier node has the same name, suffixed until
/// unused), typed by its class (else its data's `type`, else
/// `unknown`), with its data record as config. Each outgoing connection
/// becomes one edge, whatever ports it uses.
#[must_use]
pub fn export_graph<C: Canvas + ?Sized>(canvas: &C) -> GraphModel {
    let snapshots: Vec<_> = canvas
        .node_ids()
        .into_iter()
        .filter_map(|id| canvas.node(id))
        .collect();

    let stable_ids = stable_ids(&snapshots);
    let stable = |id: CanvasNodeId| {
        stable_ids
            .get(&id)
            .cloned()
            .unwrap_or_else(|| fallback_node_id(id))
    };

    let mut graph = GraphModel::new();
    for snapshot in &snapshots {
        let block_type = if !snapshot.block_type.is_empty() {
            snapshot.block_type.clone()
        } else {
            snapshot
                .data
                .get("type")
                .and_then(JsonValue::as_str)
                .filter(|t| !t.is_empty())
                .unwrap_or(UNKNOWN_BLOCK_TYPE)
                .to_string()
        };
        graph.add_node(Node {
            id: stable(snapshot.id),
            block_type,
            config: snapshot.data.clone(),
            position: snapshot.position,
        });
    }
    for snapshot in &snapshots {
        for connection in &snapshot.connections {
            graph.connect(stable(snapshot.id), stable(connection.target));
        }
    }
    graph
}

/// Assigns every canvas node a distinct stable id.
///
/// The first holder of a name keeps it. Unnamed nodes and later holders of
/// a repeated name (native exports name nodes by block type) get
/// `node_<canvas id>`, suffixed with `_2`, `_3`, ... while that is taken.
fn stable_ids(snapshots: &[CanvasNode]) -> HashMap<CanvasNodeId, NodeId> {
    let mut taken: HashSet<&str> = HashSet::with_capacity(snapshots.len());
    let mut ids = HashMap::with_capacity(snapshots.len());
    for node in snapshots {
        if !node.name.is_empty() && taken.insert(node.name.as_str()) {
            ids.insert(node.id, NodeId::new(node.name.as_str()));
        }
    }

    let mut minted: HashSet<String> = HashSet::new();
    for node in snapshots {
        if ids.contains_key(&node.id) {
            continue;
        }
        let base = fallback_node_id(node.id).into_inner();
        let mut candidate = base.clone();
        let mut suffix = 2u32;
        while taken.contains(candidate.as_str()) || minted.contains(&candidate) {
            candidate = format!("{base}_{suffix}");
            suffix = suffix.saturating_add(1);
        }
        minted.insert(candidate.clone());
        ids.insert(node.id, NodeId::new(candidate));
    }
    ids
}

/// Why an edge did not make it onto the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// The endpoint is not in the graph, or was skipped during import.
    MissingEndpoint { node_id: NodeId },
    /// The canvas refused the connection.
    Rejected(CanvasError),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEndpoint { node_id } => write!(f, "endpoint {node_id} not on canvas"),
            Self::Rejected(e) => write!(f, "rejected by canvas: {e}"),
        }
    }
}

/// An edge left out of an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedEdge {
    pub edge: Edge,
    pub reason: DropReason,
}

/// A node left out of an import because its block type is unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedNode {
    pub node_id: NodeId,
    pub block_type: String,
}

/// What an import placed and what it left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Number of nodes placed on the canvas.
    pub imported: usize,
    pub skipped_nodes: Vec<SkippedNode>,
    pub dropped_edges: Vec<DroppedEdge>,
    /// Stable id to canvas id for every placed node.
    pub translation: HashMap<NodeId, CanvasNodeId>,
}

impl ImportReport {
    /// Returns true if nothing was left out.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped_nodes.is_empty() && self.dropped_edges.is_empty()
    }

    /// The canvas id a stable id was placed under.
    #[must_use]
    pub fn canvas_id(&self, node_id: &str) -> Option<CanvasNodeId> {
        self.translation.get(node_id).copied()
    }
}

/// Places a graph on a canvas.
///
/// Nodes are placed in graph order with their block's port counts and
/// configuration form; every edge is then replayed from `output_1` to
/// `input_1`. Anything that cannot be placed is recorded in the report.
pub fn import_graph<C: Canvas + ?Sized>(
    graph: &GraphModel,
    catalog: &BlockCatalog,
    registry: &ConfigRegistry,
    canvas: &mut C,
) -> ImportReport {
    let mut report = ImportReport::default();

    for node in graph.nodes() {
        let Some(block) = catalog.get(&node.block_type) else {
            debug!(node_id = %node.id, block_type = %node.block_type, "skipping node of unknown block type");
            report.skipped_nodes.push(SkippedNode {
                node_id: node.id.clone(),
                block_type: node.block_type.clone(),
            });
            continue;
        };
        let canvas_id = canvas.add_node(CanvasNodeSpec {
            name: node.id.to_string(),
            block_type: node.block_type.clone(),
            inputs: block.inputs,
            outputs: block.outputs,
            position: node.position,
            data: node.config.clone(),
            form: registry.form_for(&node.block_type),
        });
        report.translation.insert(node.id.clone(), canvas_id);
        report.imported += 1;
    }

    for edge in graph.edges() {
        let endpoints = (report.canvas_id(edge.from.as_str()), report.canvas_id(edge.to.as_str()));
        let (from, to) = match endpoints {
            (Some(from), Some(to)) => (from, to),
            (None, _) => {
                report.drop_edge(edge, DropReason::MissingEndpoint { node_id: edge.from.clone() });
                continue;
            }
            (_, None) => {
                report.drop_edge(edge, DropReason::MissingEndpoint { node_id: edge.to.clone() });
                continue;
            }
        };
        if let Err(e) = canvas.add_connection(from, to, PortName::first_output(), PortName::first_input()) {
            report.drop_edge(edge, DropReason::Rejected(e));
        }
    }

    report
}

impl ImportReport {
    fn drop_edge(&mut self, edge: &Edge, reason: DropReason) {
        debug!(from = %edge.from, to = %edge.to, reason = %reason, "dropping edge on import");
        self.dropped_edges.push(DroppedEdge {
            edge: edge.clone(),
            reason,
        });
    }
}
