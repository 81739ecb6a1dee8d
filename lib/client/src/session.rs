//! Editor session: one flow open on a canvas.
//!
//! A session is created when a flow is opened in the editor and dropped
//! when the editor closes. It exclusively owns its canvas; every edit goes
//! to the canvas, and the graph model is only derived (by export) when the
//! flow is saved or inspected. Closing without saving discards the edits.

use crate::error::{SessionError, StoreError};
use crate::execution::RunResult;
use crate::store::{Flow, FlowStore};
use flowdeck_core::{FlowId, NodeId, SessionId};
use flowdeck_workflow::node::ConfigRecord;
use flowdeck_workflow::{
    BlockCatalog, Canvas, CanvasNodeId, CanvasNodeSpec, ConfigRegistry, GraphIssue, GraphModel,
    ImportReport, MemoryCanvas, PortName, Position, export_graph, import_graph,
};
use rootcause::prelude::Report;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, info};

/// Name a flow is saved under when its name is blank.
pub const UNTITLED_FLOW: &str = "Untitled Flow";

/// An open flow.
pub struct EditorSession<C: Canvas = MemoryCanvas> {
    id: SessionId,
    store: FlowStore,
    flow_id: FlowId,
    name: String,
    description: String,
    canvas: C,
    catalog: Arc<BlockCatalog>,
    registry: Arc<ConfigRegistry>,
    /// Suffix of the next `node_N` id handed out by `add_block`.
    next_node: u32,
    import_report: ImportReport,
}

impl EditorSession<MemoryCanvas> {
    /// Fetches a flow and opens it on a fresh in-memory canvas.
    ///
    /// # Errors
    ///
    /// Returns an error if the flow cannot be fetched or its `flow_data` is
    /// missing or unreadable.
    pub async fn open(
        store: FlowStore,
        catalog: Arc<BlockCatalog>,
        registry: Arc<ConfigRegistry>,
        flow_id: &FlowId,
    ) -> Result<Self, Report<StoreError>> {
        Self::open_on(store, catalog, registry, flow_id, MemoryCanvas::new()).await
    }
}

impl<C: Canvas> EditorSession<C> {
    /// Fetches a flow and opens it on `canvas`.
    ///
    /// # Errors
    ///
    /// Returns an error if the flow cannot be fetched or its `flow_data` is
    /// missing or unreadable.
    pub async fn open_on(
        store: FlowStore,
        catalog: Arc<BlockCatalog>,
        registry: Arc<ConfigRegistry>,
        flow_id: &FlowId,
        canvas: C,
    ) -> Result<Self, Report<StoreError>> {
        let flow = store.get(flow_id).await?;
        let graph = store.load_graph(&flow)?;
        Ok(Self::with_graph(store, catalog, registry, &flow, &graph, canvas))
    }

    /// Opens an already fetched flow on `canvas`.
    ///
    /// The canvas is cleared and the graph imported best-effort; see
    /// `import_report` for what was left out.
    #[must_use]
    pub fn with_graph(
        store: FlowStore,
        catalog: Arc<BlockCatalog>,
        registry: Arc<ConfigRegistry>,
        flow: &Flow,
        graph: &GraphModel,
        mut canvas: C,
    ) -> Self {
        canvas.clear();
        let mut import_report = import_graph(graph, &catalog, &registry, &mut canvas);
        // Edits rename and remove nodes; ids are resolved by name on the canvas.
        import_report.translation.clear();
        let id = SessionId::new();
        info!(
            session_id = %id,
            flow_id = %flow.id,
            imported = import_report.imported,
            skipped = import_report.skipped_nodes.len(),
            dropped_edges = import_report.dropped_edges.len(),
            "Opened flow in editor"
        );

        let next_node = u32::try_from(import_report.imported)
            .unwrap_or(u32::MAX - 1)
            .saturating_add(1);
        Self {
            id,
            store,
            flow_id: flow.id.clone(),
            name: flow.name.clone(),
            description: flow.description.clone(),
            canvas,
            catalog,
            registry,
            next_node,
            import_report,
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn flow_id(&self) -> &FlowId {
        &self.flow_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    #[must_use]
    pub fn catalog(&self) -> &BlockCatalog {
        &self.catalog
    }

    /// What the opening import placed and left out.
    ///
    /// The stable id translation is not kept; its `canvas_id` always
    /// returns `None`.
    #[must_use]
    pub fn import_report(&self) -> &ImportReport {
        &self.import_report
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Places a new block and returns its id.
    ///
    /// Returns `None`, changing nothing, if the block type is not in the
    /// catalog. Without a position the block is placed at a fixed offset
    /// that depends on how many nodes are already on the canvas.
    pub fn add_block(&mut self, block_type: &str, position: Option<Position>) -> Option<NodeId> {
        let Some(block) = self.catalog.get(block_type) else {
            debug!(block_type, "ignoring unknown block type");
            return None;
        };
        let (inputs, outputs) = (block.inputs, block.outputs);

        let node_id = self.next_node_id();
        let position = position.unwrap_or_else(|| default_position(self.canvas.node_ids().len()));
        let mut data = ConfigRecord::new();
        data.insert("type".to_string(), JsonValue::from(block_type));
        data.extend(self.registry.defaults_for(block_type));

        self.canvas.add_node(CanvasNodeSpec {
            name: node_id.to_string(),
            block_type: block_type.to_string(),
            inputs,
            outputs,
            position,
            data,
            form: self.registry.form_for(block_type),
        });
        debug!(node_id = %node_id, block_type, "added block");
        Some(node_id)
    }

    /// The next `node_N` id not already on the canvas.
    fn next_node_id(&mut self) -> NodeId {
        loop {
            let candidate = format!("node_{}", self.next_node);
            self.next_node = self.next_node.saturating_add(1);
            if self.canvas.find_by_name(&candidate).is_none() {
                return NodeId::new(candidate);
            }
        }
    }

    fn canvas_id(&self, node_id: &NodeId) -> Result<CanvasNodeId, Report<SessionError>> {
        self.canvas.find_by_name(node_id.as_str()).ok_or_else(|| {
            SessionError::NodeNotFound {
                node_id: node_id.clone(),
            }
            .into()
        })
    }

    fn rejected(e: impl std::fmt::Display) -> SessionError {
        SessionError::CanvasRejected {
            details: e.to_string(),
        }
    }

    /// Moves a node.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NodeNotFound` if the node is not on the canvas.
    pub fn move_node(&mut self, node_id: &NodeId, position: Position) -> Result<(), Report<SessionError>> {
        let id = self.canvas_id(node_id)?;
        self.canvas.move_node(id, position).map_err(Self::rejected)?;
        Ok(())
    }

    /// Connects `from`'s first output to `to`'s first input.
    ///
    /// # Errors
    ///
    /// Returns an error if either node is not on the canvas or the canvas
    /// refuses the connection.
    pub fn connect(&mut self, from: &NodeId, to: &NodeId) -> Result<(), Report<SessionError>> {
        let (source, target) = (self.canvas_id(from)?, self.canvas_id(to)?);
        self.canvas
            .add_connection(source, target, PortName::first_output(), PortName::first_input())
            .map_err(Self::rejected)?;
        Ok(())
    }

    /// Removes the connection made by `connect`.
    ///
    /// # Errors
    ///
    /// Returns an error if either node is not on the canvas or they are not
    /// connected.
    pub fn disconnect(&mut self, from: &NodeId, to: &NodeId) -> Result<(), Report<SessionError>> {
        let (source, target) = (self.canvas_id(from)?, self.canvas_id(to)?);
        self.canvas
            .remove_connection(source, target, PortName::first_output(), PortName::first_input())
            .map_err(Self::rejected)?;
        Ok(())
    }

    /// Merges `changes` into a node's configuration.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NodeNotFound` if the node is not on the canvas.
    pub fn edit_config(&mut self, node_id: &NodeId, changes: ConfigRecord) -> Result<(), Report<SessionError>> {
        let id = self.canvas_id(node_id)?;
        let mut data = self
            .canvas
            .node(id)
            .map(|node| node.data)
            .unwrap_or_default();
        data.extend(changes);
        self.canvas.set_node_data(id, data).map_err(Self::rejected)?;
        Ok(())
    }

    /// Removes a node and its connections.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NodeNotFound` if the node is not on the canvas.
    pub fn remove_node(&mut self, node_id: &NodeId) -> Result<(), Report<SessionError>> {
        let id = self.canvas_id(node_id)?;
        self.canvas.remove_node(id).map_err(Self::rejected)?;
        Ok(())
    }

    /// The current canvas contents as a graph.
    #[must_use]
    pub fn graph(&self) -> GraphModel {
        export_graph(&self.canvas)
    }

    /// Advisory problems with the current graph.
    #[must_use]
    pub fn issues(&self) -> Vec<GraphIssue> {
        self.graph().validate(&self.catalog)
    }

    /// Writes the current graph, name and description to the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects or cannot be reached.
    pub async fn save(&self) -> Result<(), Report<StoreError>> {
        let name = if self.name.trim().is_empty() {
            UNTITLED_FLOW
        } else {
            self.name.as_str()
        };
        self.store
            .save_graph(&self.flow_id, name, &self.description, &self.graph())
            .await
    }

    /// Saves, then runs the saved flow.
    ///
    /// # Errors
    ///
    /// Returns the save error if saving fails (the run is not attempted),
    /// else any run error.
    pub async fn run(&self) -> Result<RunResult, Report<StoreError>> {
        self.save().await?;
        self.store.run(&self.flow_id).await
    }

    /// Closes the editor, discarding unsaved edits.
    pub fn close(self) {
        info!(session_id = %self.id, flow_id = %self.flow_id, "Closed editor");
    }
}

fn default_position(existing: usize) -> Position {
    let column = (existing % 5) as f64;
    let row = (existing / 5 % 5) as f64;
    Position::new(50.0 + 60.0 * column, 50.0 + 40.0 * row)
}
