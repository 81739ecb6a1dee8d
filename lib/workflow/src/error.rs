//! Error types for the workflow crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `GraphError`: Graph model operations and flow_data (de)serialization
//! - `CanvasError`: Rejections from the editing canvas
//!
//! Referential problems inside a stored graph (dangling edges, unknown block
//! types) are not errors; they are reported by `GraphModel::validate` and
//! tolerated by the canvas adapter.

use crate::canvas::CanvasNodeId;
use crate::node::NodeId;
use std::fmt;

/// Errors from graph model operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Node with the given ID was not found in the graph.
    NodeNotFound { node_id: NodeId },
    /// The serialized graph could not be parsed.
    InvalidJson { details: String },
    /// The graph could not be serialized.
    Serialization { details: String },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound { node_id } => {
                write!(f, "node not found: {node_id}")
            }
            Self::InvalidJson { details } => {
                write!(f, "invalid flow graph JSON: {details}")
            }
            Self::Serialization { details } => {
                write!(f, "failed to serialize flow graph: {details}")
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// Errors raised by a canvas when an edit is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    /// No canvas node with this id.
    NodeNotFound { canvas_id: CanvasNodeId },
    /// The node has no port with this name.
    PortNotFound { canvas_id: CanvasNodeId, port: String },
    /// The identical connection already exists.
    DuplicateConnection {
        from: CanvasNodeId,
        to: CanvasNodeId,
        output_port: String,
        input_port: String,
    },
    /// The connection to remove does not exist.
    ConnectionNotFound { from: CanvasNodeId, to: CanvasNodeId },
    /// A native canvas document could not be parsed.
    InvalidDocument { details: String },
}

impl fmt::Display for CanvasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound { canvas_id } => {
                write!(f, "canvas node not found: {canvas_id}")
            }
            Self::PortNotFound { canvas_id, port } => {
                write!(f, "port '{port}' not found on canvas node {canvas_id}")
            }
            Self::DuplicateConnection {
                from,
                to,
                output_port,
                input_port,
            } => {
                write!(
                    f,
                    "connection already exists: {from}:{output_port} -> {to}:{input_port}"
                )
            }
            Self::ConnectionNotFound { from, to } => {
                write!(f, "no connection from canvas node {from} to {to}")
            }
            Self::InvalidDocument { details } => {
                write!(f, "invalid canvas document: {details}")
            }
        }
    }
}

impl std::error::Error for CanvasError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_error_display() {
        let err = GraphError::NodeNotFound {
            node_id: NodeId::new("node_7"),
        };
        assert!(err.to_string().contains("node not found: node_7"));
    }

    #[test]
    fn canvas_error_port_not_found() {
        let err = CanvasError::PortNotFound {
            canvas_id: CanvasNodeId::new(3),
            port: "output_2".to_string(),
        };
        assert!(err.to_string().contains("port 'output_2' not found"));
    }

    #[test]
    fn canvas_error_duplicate_connection() {
        let err = CanvasError::DuplicateConnection {
            from: CanvasNodeId::new(1),
            to: CanvasNodeId::new(2),
            output_port: "output_1".to_string(),
            input_port: "input_1".to_string(),
        };
        assert!(err.to_string().contains("1:output_1 -> 2:input_1"));
    }
}
