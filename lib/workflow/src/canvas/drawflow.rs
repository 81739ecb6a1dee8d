//! Drawflow's native export format.
//!
//! ```json
//! {"drawflow": {"Home": {"data": {"1": {
//!     "id": 1, "name": "manual_trigger", "class": "manual_trigger", "html": "...",
//!     "typenode": false, "data": {},
//!     "inputs": {},
//!     "outputs": {"output_1": {"connections": [{"node": "2", "output": "input_1"}]}},
//!     "pos_x": 50, "pos_y": 100}}}}}
//! ```
//!
//! Connection entries name the *other* node and the *other* side's port:
//! an output's connections carry the target's input port under `output`,
//! and an input's connections carry the source's output port under `input`.

use crate::error::CanvasError;
use crate::node::ConfigRecord;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// A whole Drawflow export: modules keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawflowDocument {
    pub drawflow: BTreeMap<String, DrawflowModule>,
}

/// One Drawflow module (tab). Flows live in `Home`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawflowModule {
    #[serde(default)]
    pub data: BTreeMap<String, DrawflowNode>,
}

/// One exported node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawflowNode {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub html: String,
    #[serde(default = "default_typenode")]
    pub typenode: JsonValue,
    #[serde(default, deserialize_with = "record_or_empty")]
    pub data: ConfigRecord,
    #[serde(default)]
    pub inputs: BTreeMap<String, DrawflowPort<InputConnection>>,
    #[serde(default)]
    pub outputs: BTreeMap<String, DrawflowPort<OutputConnection>>,
    #[serde(default)]
    pub pos_x: f64,
    #[serde(default)]
    pub pos_y: f64,
}

/// The connections attached to one port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawflowPort<C> {
    #[serde(default = "Vec::new")]
    pub connections: Vec<C>,
}

/// An entry under an input port: the source node and its output port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConnection {
    #[serde(deserialize_with = "id_string")]
    pub node: String,
    pub input: String,
}

/// An entry under an output port: the target node and its input port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConnection {
    #[serde(deserialize_with = "id_string")]
    pub node: String,
    pub output: String,
}

impl DrawflowDocument {
    /// The module flows are kept in.
    pub const HOME: &'static str = "Home";

    /// Returns true if `value` looks like a Drawflow export.
    #[must_use]
    pub fn detect(value: &JsonValue) -> bool {
        value.get("drawflow").is_some_and(JsonValue::is_object)
    }

    /// Parses a Drawflow export.
    ///
    /// # Errors
    ///
    /// Returns `CanvasError::InvalidDocument` if the value does not have the
    /// export's shape.
    pub fn from_value(value: JsonValue) -> Result<Self, CanvasError> {
        serde_json::from_value(value).map_err(|e| CanvasError::InvalidDocument {
            details: e.to_string(),
        })
    }

    /// The `Home` module, if present.
    #[must_use]
    pub fn home(&self) -> Option<&DrawflowModule> {
        self.drawflow.get(Self::HOME)
    }

    /// Creates a document holding only a `Home` module.
    #[must_use]
    pub fn with_home(home: DrawflowModule) -> Self {
        let mut drawflow = BTreeMap::new();
        drawflow.insert(Self::HOME.to_string(), home);
        Self { drawflow }
    }
}

fn default_typenode() -> JsonValue {
    JsonValue::Bool(false)
}

fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match JsonValue::deserialize(deserializer)? {
        JsonValue::String(s) => Ok(s),
        JsonValue::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected node id, got {other}"))),
    }
}

fn record_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ConfigRecord, D::Error> {
    match JsonValue::deserialize(deserializer)? {
        JsonValue::Object(record) => Ok(record),
        _ => Ok(ConfigRecord::new()),
    }
}
