//! In-memory canvas with Drawflow's editing rules.

use super::drawflow::{DrawflowDocument, DrawflowModule, DrawflowNode, DrawflowPort, InputConnection, OutputConnection};
use super::{Canvas, CanvasNode, CanvasNodeId, CanvasNodeSpec, OutgoingConnection};
use crate::error::CanvasError;
use crate::node::{ConfigRecord, Position};
use crate::port::{PortDirection, PortName};
use std::collections::BTreeMap;
use tracing::debug;

/// A canvas held entirely in memory.
///
/// Node ids are assigned from 1 upward and restart at 1 after `clear`.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryCanvas {
    nodes: BTreeMap<CanvasNodeId, CanvasNode>,
    next_id: u32,
}

impl MemoryCanvas {
    /// Creates an empty canvas.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_id: 1,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node_ref(&self, id: CanvasNodeId) -> Result<&CanvasNode, CanvasError> {
        self.nodes
            .get(&id)
            .ok_or(CanvasError::NodeNotFound { canvas_id: id })
    }

    fn node_entry(&mut self, id: CanvasNodeId) -> Result<&mut CanvasNode, CanvasError> {
        self.nodes
            .get_mut(&id)
            .ok_or(CanvasError::NodeNotFound { canvas_id: id })
    }

    /// Writes the canvas in Drawflow's export format.
    #[must_use]
    pub fn to_document(&self) -> DrawflowDocument {
        let mut data = BTreeMap::new();
        for node in self.nodes.values() {
            let mut inputs: BTreeMap<String, DrawflowPort<InputConnection>> =
                PortName::all(PortDirection::Input, node.inputs)
                    .map(|port| (port.to_string(), DrawflowPort { connections: Vec::new() }))
                    .collect();
            for source in self.nodes.values() {
                for conn in source.connections.iter().filter(|c| c.target == node.id) {
                    if let Some(port) = inputs.get_mut(&conn.input.to_string()) {
                        port.connections.push(InputConnection {
                            node: source.id.to_string(),
                            input: conn.output.to_string(),
                        });
                    }
                }
            }

            let mut outputs: BTreeMap<String, DrawflowPort<OutputConnection>> =
                PortName::all(PortDirection::Output, node.outputs)
                    .map(|port| (port.to_string(), DrawflowPort { connections: Vec::new() }))
                    .collect();
            for conn in &node.connections {
                if let Some(port) = outputs.get_mut(&conn.output.to_string()) {
                    port.connections.push(OutputConnection {
                        node: conn.target.to_string(),
                        output: conn.input.to_string(),
                    });
                }
            }

            data.insert(
                node.id.to_string(),
                DrawflowNode {
                    id: node.id.to_string(),
                    name: node.name.clone(),
                    class: node.block_type.clone(),
                    html: node.html.clone(),
                    typenode: serde_json::Value::Bool(false),
                    data: node.data.clone(),
                    inputs,
                    outputs,
                    pos_x: node.position.x,
                    pos_y: node.position.y,
                },
            );
        }
        DrawflowDocument::with_home(DrawflowModule { data })
    }

    /// Loads a Drawflow export, keeping its node ids.
    ///
    /// Port counts come from the port names present on each node.
    /// Connections that name missing nodes or ports, and repeats of an
    /// existing connection, are dropped.
    ///
    /// # Errors
    ///
    /// Returns `CanvasError::InvalidDocument` if the document has no `Home`
    /// module or a node id is not a positive integer.
    pub fn from_document(document: &DrawflowDocument) -> Result<Self, CanvasError> {
        let home = document.home().ok_or_else(|| CanvasError::InvalidDocument {
            details: "missing Home module".to_string(),
        })?;

        let mut canvas = Self::new();
        for (key, raw) in &home.data {
            let id = parse_canvas_id(key).or_else(|| parse_canvas_id(&raw.id)).ok_or_else(|| {
                CanvasError::InvalidDocument {
                    details: format!("node id '{key}' is not a positive integer"),
                }
            })?;
            canvas.nodes.insert(
                id,
                CanvasNode {
                    id,
                    name: raw.name.clone(),
                    block_type: raw.class.clone(),
                    data: raw.data.clone(),
                    position: Position::new(raw.pos_x, raw.pos_y),
                    inputs: port_count(raw.inputs.keys(), PortDirection::Input),
                    outputs: port_count(raw.outputs.keys(), PortDirection::Output),
                    html: raw.html.clone(),
                    connections: Vec::new(),
                },
            );
            let after = id.get().checked_add(1).ok_or_else(|| CanvasError::InvalidDocument {
                details: format!("node id '{key}' is out of range"),
            })?;
            canvas.next_id = canvas.next_id.max(after);
        }

        for (key, raw) in &home.data {
            let Some(from) = parse_canvas_id(key).or_else(|| parse_canvas_id(&raw.id)) else {
                continue;
            };
            for (port, entries) in &raw.outputs {
                let Ok(output) = port.parse::<PortName>() else {
                    continue;
                };
                for entry in &entries.connections {
                    let target = parse_canvas_id(&entry.node);
                    let input = entry.output.parse::<PortName>().ok();
                    let (Some(target), Some(input)) = (target, input) else {
                        debug!(from = %from, node = %entry.node, "dropping unreadable connection");
                        continue;
                    };
                    if let Err(e) = canvas.add_connection(from, target, output, input) {
                        debug!(error = %e, "dropping connection from canvas document");
                    }
                }
            }
        }

        Ok(canvas)
    }
}

impl Default for MemoryCanvas {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_canvas_id(raw: &str) -> Option<CanvasNodeId> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|&id| id > 0)
        .map(CanvasNodeId::new)
}

fn port_count<'a>(names: impl Iterator<Item = &'a String>, direction: PortDirection) -> u32 {
    names
        .filter_map(|name| name.parse::<PortName>().ok())
        .filter(|port| port.direction() == direction)
        .map(|port| port.index())
        .max()
        .unwrap_or(0)
}

impl Canvas for MemoryCanvas {
    fn add_node(&mut self, spec: CanvasNodeSpec) -> CanvasNodeId {
        let id = CanvasNodeId::new(self.next_id);
        // Saturates at u32::MAX; a canvas never holds that many nodes.
        self.next_id = self.next_id.saturating_add(1);
        self.nodes.insert(
            id,
            CanvasNode {
                id,
                name: spec.name,
                block_type: spec.block_type,
                data: spec.data,
                position: spec.position,
                inputs: spec.inputs,
                outputs: spec.outputs,
                html: spec.form.render_html(),
                connections: Vec::new(),
            },
        );
        id
    }

    fn remove_node(&mut self, id: CanvasNodeId) -> Result<(), CanvasError> {
        self.nodes
            .remove(&id)
            .ok_or(CanvasError::NodeNotFound { canvas_id: id })?;
        for node in self.nodes.values_mut() {
            node.connections.retain(|c| c.target != id);
        }
        Ok(())
    }

    fn add_connection(
        &mut self,
        from: CanvasNodeId,
        to: CanvasNodeId,
        output: PortName,
        input: PortName,
    ) -> Result<(), CanvasError> {
        let source = self.node_ref(from)?;
        let target = self.node_ref(to)?;

        if output.direction() != PortDirection::Output || !output.exists_within(source.outputs) {
            return Err(CanvasError::PortNotFound {
                canvas_id: from,
                port: output.to_string(),
            });
        }
        if input.direction() != PortDirection::Input || !input.exists_within(target.inputs) {
            return Err(CanvasError::PortNotFound {
                canvas_id: to,
                port: input.to_string(),
            });
        }

        let connection = OutgoingConnection {
            output,
            target: to,
            input,
        };
        if source.connections.contains(&connection) {
            return Err(CanvasError::DuplicateConnection {
                from,
                to,
                output_port: output.to_string(),
                input_port: input.to_string(),
            });
        }

        self.node_entry(from)?.connections.push(connection);
        Ok(())
    }

    fn remove_connection(
        &mut self,
        from: CanvasNodeId,
        to: CanvasNodeId,
        output: PortName,
        input: PortName,
    ) -> Result<(), CanvasError> {
        let source = self.node_entry(from)?;
        let wanted = OutgoingConnection {
            output,
            target: to,
            input,
        };
        let position = source
            .connections
            .iter()
            .position(|c| *c == wanted)
            .ok_or(CanvasError::ConnectionNotFound { from, to })?;
        source.connections.remove(position);
        Ok(())
    }

    fn move_node(&mut self, id: CanvasNodeId, position: Position) -> Result<(), CanvasError> {
        self.node_entry(id)?.position = position;
        Ok(())
    }

    fn set_node_data(&mut self, id: CanvasNodeId, data: ConfigRecord) -> Result<(), CanvasError> {
        self.node_entry(id)?.data = data;
        Ok(())
    }

    fn node(&self, id: CanvasNodeId) -> Option<CanvasNode> {
        self.nodes.get(&id).cloned()
    }

    fn node_ids(&self) -> Vec<CanvasNodeId> {
        self.nodes.keys().copied().collect()
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.next_id = 1;
    }
}
