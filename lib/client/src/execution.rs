//! Flow run results.
//!
//! A run happens entirely on the flow service; the client only triggers it
//! and reads back the aggregate outcome. `FlowStore::run` performs a quick
//! run of the stored flow; `EditorSession::run` saves first.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Outcome of one node during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLogEntry {
    pub node_id: String,
    #[serde(rename = "type", default)]
    pub block_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunLogEntry {
    #[must_use]
    pub fn failed(&self) -> bool {
        self.error.is_some() || self.status == "error"
    }
}

/// Aggregate result of a flow run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub elapsed_seconds: f64,
    /// Per-node outputs keyed by node id.
    #[serde(default)]
    pub results: JsonValue,
    #[serde(default)]
    pub log: Vec<RunLogEntry>,
}

impl RunResult {
    /// Length the quick-run summary truncates results to.
    pub const SUMMARY_CHARS: usize = 500;

    /// Log entries of nodes that failed.
    pub fn failures(&self) -> impl Iterator<Item = &RunLogEntry> {
        self.log.iter().filter(|entry| entry.failed())
    }

    /// Renders "Flow completed in Ns" followed by the pretty-printed results
    /// cut to `max_chars` characters.
    #[must_use]
    pub fn summary(&self, max_chars: usize) -> String {
        let results = serde_json::to_string_pretty(&self.results).unwrap_or_default();
        let truncated: String = results.chars().take(max_chars).collect();
        format!("Flow completed in {}s\n\n{truncated}", self.elapsed_seconds)
    }
}
