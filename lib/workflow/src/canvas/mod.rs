//! The canvas seam.
//!
//! A canvas is the interactive widget the user edits flows on. It has its
//! own transient integer node ids and numbered ports, and it enforces its
//! own connection rules. `Canvas` is the boundary the rest of the crate
//! talks to; `MemoryCanvas` implements it with Drawflow's rules and can read
//! and write Drawflow's native export format.

mod drawflow;
mod memory;

pub use drawflow::{DrawflowDocument, DrawflowModule, DrawflowNode, DrawflowPort, InputConnection, OutputConnection};
pub use memory::MemoryCanvas;

use crate::error::CanvasError;
use crate::node::{ConfigRecord, Position};
use crate::port::PortName;
use crate::registry::ConfigForm;
use std::fmt;

/// A canvas's own node id. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanvasNodeId(u32);

impl CanvasNodeId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CanvasNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything needed to place a node on a canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasNodeSpec {
    /// Stable external id of the node.
    pub name: String,
    /// Block type; Drawflow calls this the node's class.
    pub block_type: String,
    pub inputs: u32,
    pub outputs: u32,
    pub position: Position,
    /// The node's data record, bound to its form fields.
    pub data: ConfigRecord,
    /// The editor fragment shown inside the node.
    pub form: ConfigForm,
}

/// A connection leaving a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutgoingConnection {
    pub output: PortName,
    pub target: CanvasNodeId,
    pub input: PortName,
}

/// A snapshot of one node as the canvas currently holds it.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasNode {
    pub id: CanvasNodeId,
    pub name: String,
    pub block_type: String,
    pub data: ConfigRecord,
    pub position: Position,
    pub inputs: u32,
    pub outputs: u32,
    /// Rendered editor fragment.
    pub html: String,
    pub connections: Vec<OutgoingConnection>,
}

/// An interactive flow editing surface.
pub trait Canvas: Send {
    /// Places a node and returns its canvas id.
    fn add_node(&mut self, spec: CanvasNodeSpec) -> CanvasNodeId;

    /// Removes a node and every connection touching it.
    ///
    /// # Errors
    ///
    /// Returns `CanvasError::NodeNotFound` if the node does not exist.
    fn remove_node(&mut self, id: CanvasNodeId) -> Result<(), CanvasError>;

    /// Connects an output port of one node to an input port of another.
    ///
    /// # Errors
    ///
    /// Returns an error if either node or port does not exist, or if the
    /// identical connection already exists.
    fn add_connection(
        &mut self,
        from: CanvasNodeId,
        to: CanvasNodeId,
        output: PortName,
        input: PortName,
    ) -> Result<(), CanvasError>;

    /// Removes one connection.
    ///
    /// # Errors
    ///
    /// Returns `CanvasError::ConnectionNotFound` if there is no such connection.
    fn remove_connection(
        &mut self,
        from: CanvasNodeId,
        to: CanvasNodeId,
        output: PortName,
        input: PortName,
    ) -> Result<(), CanvasError>;

    /// Moves a node.
    ///
    /// # Errors
    ///
    /// Returns `CanvasError::NodeNotFound` if the node does not exist.
    fn move_node(&mut self, id: CanvasNodeId, position: Position) -> Result<(), CanvasError>;

    /// Replaces a node's data record.
    ///
    /// # Errors
    ///
    /// Returns `CanvasError::NodeNotFound` if the node does not exist.
    fn set_node_data(&mut self, id: CanvasNodeId, data: ConfigRecord) -> Result<(), CanvasError>;

    /// Returns a snapshot of a node.
    fn node(&self, id: CanvasNodeId) -> Option<CanvasNode>;

    /// Returns every node id in ascending order.
    fn node_ids(&self) -> Vec<CanvasNodeId>;

    /// Removes every node.
    fn clear(&mut self);

    /// Finds the node whose stable name is `name`.
    fn find_by_name(&self, name: &str) -> Option<CanvasNodeId> {
        self.node_ids()
            .into_iter()
            .find(|&id| self.node(id).is_some_and(|n| n.name == name))
    }
}
