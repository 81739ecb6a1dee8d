//! Block catalog.
//!
//! The catalog lists the block types a flow may use. It is normally fetched
//! from the flow service once per session; `BlockCatalog::builtin` carries
//! the standard set for offline use.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Description of one block type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDescriptor {
    /// Type key referenced by `Node::block_type`.
    #[serde(rename = "type")]
    pub block_type: String,
    /// Human-readable name.
    pub label: String,
    /// Palette grouping. Older services omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Icon identifier.
    #[serde(default)]
    pub icon: String,
    /// CSS color.
    #[serde(default)]
    pub color: String,
    /// Number of input ports.
    #[serde(default)]
    pub inputs: u32,
    /// Number of output ports.
    #[serde(default)]
    pub outputs: u32,
}

impl BlockDescriptor {
    /// Creates a descriptor with no category, icon or color.
    #[must_use]
    pub fn new(block_type: impl Into<String>, label: impl Into<String>, inputs: u32, outputs: u32) -> Self {
        Self {
            block_type: block_type.into(),
            label: label.into(),
            category: None,
            icon: String::new(),
            color: String::new(),
            inputs,
            outputs,
        }
    }

    /// Sets the palette category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the icon and color.
    #[must_use]
    pub fn with_style(mut self, icon: impl Into<String>, color: impl Into<String>) -> Self {
        self.icon = icon.into();
        self.color = color.into();
        self
    }
}

/// An ordered, immutable set of block descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockCatalog {
    blocks: Vec<BlockDescriptor>,
}

impl BlockCatalog {
    /// Creates a catalog from descriptors. Later duplicates of a type are ignored.
    #[must_use]
    pub fn new(blocks: Vec<BlockDescriptor>) -> Self {
        let mut unique: Vec<BlockDescriptor> = Vec::with_capacity(blocks.len());
        for block in blocks {
            if !unique.iter().any(|b| b.block_type == block.block_type) {
                unique.push(block);
            }
        }
        Self { blocks: unique }
    }

    /// An empty catalog. Every node type is unknown to it.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard block set.
    #[must_use]
    pub fn builtin() -> Self {
        const TRIGGER: &str = "#3b82f6";
        const AI: &str = "#8b5cf6";
        const TOOL: &str = "#10b981";
        const LOGIC: &str = "#f59e0b";
        const OUT: &str = "#ef4444";

        let block = |ty: &str, label: &str, category: &str, color: &str, icon: &str, i: u32, o: u32| {
            BlockDescriptor::new(ty, label, i, o)
                .with_category(category)
                .with_style(icon, color)
        };

        Self::new(vec![
            block("manual_trigger", "Manual Trigger", "Triggers", TRIGGER, "fa-play", 0, 1),
            block("schedule_trigger", "Schedule Trigger", "Triggers", TRIGGER, "fa-clock", 0, 1),
            block("ai_prompt", "AI Prompt", "AI", AI, "fa-brain", 1, 1),
            block("terminal_command", "Run Command", "Tools", TOOL, "fa-terminal", 1, 1),
            block("web_search", "Web Search", "Tools", TOOL, "fa-search", 1, 1),
            block("http_request", "HTTP Request", "Tools", TOOL, "fa-globe", 1, 1),
            block("screenshot", "Screenshot", "Tools", TOOL, "fa-camera", 1, 1),
            block("condition", "IF Condition", "Logic", LOGIC, "fa-code-branch", 1, 2),
            block("delay", "Wait / Delay", "Logic", LOGIC, "fa-hourglass-half", 1, 1),
            block("output", "Output", "Outputs", OUT, "fa-flag-checkered", 1, 0),
            block("send_email", "Send Email", "Outputs", OUT, "fa-envelope", 1, 0),
            block("send_telegram", "Send Telegram", "Outputs", TRIGGER, "fa-paper-plane", 1, 0),
            block("simulate_gui", "GUI Macro Step", "Tools", TOOL, "fa-mouse-pointer", 1, 1),
        ])
    }

    /// Looks up a block type.
    #[must_use]
    pub fn get(&self, block_type: &str) -> Option<&BlockDescriptor> {
        self.blocks.iter().find(|b| b.block_type == block_type)
    }

    #[must_use]
    pub fn contains(&self, block_type: &str) -> bool {
        self.get(block_type).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockDescriptor> {
        self.blocks.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Groups descriptors by category, keeping catalog order within each
    /// group. Uncategorized blocks are grouped under "Other".
    #[must_use]
    pub fn by_category(&self) -> BTreeMap<&str, Vec<&BlockDescriptor>> {
        let mut groups: BTreeMap<&str, Vec<&BlockDescriptor>> = BTreeMap::new();
        for block in &self.blocks {
            let category = block.category.as_deref().unwrap_or("Other");
            groups.entry(category).or_default().push(block);
        }
        groups
    }
}

impl<'a> IntoIterator for &'a BlockCatalog {
    type Item = &'a BlockDescriptor;
    type IntoIter = std::slice::Iter<'a, BlockDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_standard_blocks() {
        let catalog = BlockCatalog::builtin();
        assert_eq!(catalog.len(), 13);

        let condition = catalog.get("condition").expect("condition block");
        assert_eq!(condition.label, "IF Condition");
        assert_eq!(condition.inputs, 1);
        assert_eq!(condition.outputs, 2);

        let trigger = catalog.get("manual_trigger").expect("manual trigger");
        assert_eq!(trigger.inputs, 0);
        assert_eq!(trigger.icon, "fa-play");
    }

    #[test]
    fn duplicate_types_keep_first() {
        let catalog = BlockCatalog::new(vec![
            BlockDescriptor::new("output", "Output", 1, 0),
            BlockDescriptor::new("output", "Other Output", 1, 1),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("output").map(|b| b.label.as_str()), Some("Output"));
    }

    #[test]
    fn by_category_groups_in_order() {
        let catalog = BlockCatalog::builtin();
        let groups = catalog.by_category();
        let triggers: Vec<&str> = groups["Triggers"].iter().map(|b| b.block_type.as_str()).collect();
        assert_eq!(triggers, vec!["manual_trigger", "schedule_trigger"]);
        assert_eq!(groups["Logic"].len(), 2);
    }

    #[test]
    fn uncategorized_blocks_group_under_other() {
        let catalog = BlockCatalog::new(vec![BlockDescriptor::new("x", "X", 1, 1)]);
        assert_eq!(catalog.by_category()["Other"].len(), 1);
    }

    #[test]
    fn descriptor_parses_wire_format_without_category() {
        let json = serde_json::json!({
            "type": "delay",
            "label": "Wait / Delay",
            "color": "#f59e0b",
            "icon": "fa-hourglass-half",
            "inputs": 1,
            "outputs": 1
        });
        let block: BlockDescriptor = serde_json::from_value(json).expect("deserialize");
        assert_eq!(block.block_type, "delay");
        assert!(block.category.is_none());
    }

    #[test]
    fn empty_catalog_knows_nothing() {
        let catalog = BlockCatalog::empty();
        assert!(catalog.is_empty());
        assert!(!catalog.contains("output"));
    }
}
