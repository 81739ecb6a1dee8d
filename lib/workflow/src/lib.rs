//! Flow graph model for flowdeck.
//!
//! This crate holds everything about a flow that does not need the network:
//!
//! - **Block Catalog**: the block types a flow may use and their port counts
//! - **Configuration**: the closed per-type config shapes and the registry
//!   that builds editor forms for them
//! - **Graph Model**: the canvas-independent `{nodes, edges}` definition that
//!   is persisted as `flow_data`
//! - **Canvas**: the seam to the interactive editing widget, with an
//!   in-memory implementation following Drawflow's rules
//! - **Adapter**: best-effort import/export between the two

pub mod adapter;
pub mod canvas;
pub mod catalog;
pub mod config;
pub mod edge;
pub mod error;
pub mod graph;
pub mod node;
pub mod port;
pub mod registry;

pub use adapter::{DropReason, DroppedEdge, ImportReport, SkippedNode, export_graph, import_graph};
pub use canvas::{Canvas, CanvasNode, CanvasNodeId, CanvasNodeSpec, MemoryCanvas, OutgoingConnection};
pub use catalog::{BlockCatalog, BlockDescriptor};
pub use config::{AiModel, BlockConfig, ConditionOperator, HttpMethod, Timezone};
pub use edge::Edge;
pub use error::{CanvasError, GraphError};
pub use graph::{GraphIssue, GraphModel};
pub use node::{Node, NodeId, Position};
pub use port::{PortDirection, PortName};
pub use registry::{ConfigForm, ConfigIssue, ConfigRegistry, ConfigSchema, FieldKind, FieldSpec};
