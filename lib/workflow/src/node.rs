//! Flow graph nodes.
//!
//! A node is one placed block: a stable id, the block type it instantiates,
//! the block's configuration record, and where it sits on the canvas.

use crate::config::BlockConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

pub use flowdeck_core::NodeId;

/// A node's configuration record, keyed by config field name.
pub type ConfigRecord = Map<String, JsonValue>;

/// A 2D canvas position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Where nodes without a stored position are placed on import.
    pub const IMPORT_DEFAULT: Self = Self { x: 100.0, y: 100.0 };

    /// Creates a position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::IMPORT_DEFAULT
    }
}

/// A block instance in a flow graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Stable external id, unique within the graph.
    pub id: NodeId,
    /// Block type, normally a key of the block catalog.
    pub block_type: String,
    /// Type-specific configuration.
    pub config: ConfigRecord,
    /// Canvas position.
    pub position: Position,
}

impl Node {
    /// Creates a node with an empty config at the default position.
    #[must_use]
    pub fn new(id: impl Into<NodeId>, block_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            block_type: block_type.into(),
            config: ConfigRecord::new(),
            position: Position::default(),
        }
    }

    /// Sets the configuration record.
    #[must_use]
    pub fn with_config(mut self, config: ConfigRecord) -> Self {
        self.config = config;
        self
    }

    /// Sets a single config field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Sets the position.
    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Returns a config field as a string, if it is one.
    #[must_use]
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(JsonValue::as_str)
    }

    /// The typed view of this node's configuration.
    #[must_use]
    pub fn block_config(&self) -> BlockConfig {
        BlockConfig::from_node(&self.block_type, &self.config)
    }
}
