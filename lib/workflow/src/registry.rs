//! Configuration schemas and the form registry.
//!
//! Each configurable block type has a `ConfigSchema` (its ordered fields)
//! and a form builder that turns the schema into the `ConfigForm` the
//! canvas shows inside the node. Types without an entry get the opaque
//! "No config needed" form.

use crate::config::{AiModel, ConditionOperator, DEFAULT_DELAY_SECONDS, HttpMethod, Timezone, number, number_value};
use crate::graph::GraphModel;
use crate::node::{ConfigRecord, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;

/// One option of a select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
}

/// The widget used for a config field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "widget", content = "options", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    TextArea,
    Number,
    Choice(Vec<ChoiceOption>),
}

/// One field of a block's configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Key in the node's config record.
    pub name: String,
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Value put into the record of a freshly added block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,
}

impl FieldSpec {
    /// A single-line text field.
    #[must_use]
    pub fn text(name: &str, placeholder: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Text,
            placeholder: Some(placeholder.to_string()),
            default: None,
        }
    }

    /// A multi-line text field.
    #[must_use]
    pub fn text_area(name: &str, placeholder: &str) -> Self {
        Self {
            kind: FieldKind::TextArea,
            ..Self::text(name, placeholder)
        }
    }

    /// A numeric field with a default.
    #[must_use]
    pub fn number(name: &str, placeholder: &str, default: f64) -> Self {
        Self {
            kind: FieldKind::Number,
            default: Some(number_value(default)),
            ..Self::text(name, placeholder)
        }
    }

    /// A select field. The first option is the default.
    #[must_use]
    pub fn choice<T: Copy>(
        name: &str,
        options: &[T],
        value: fn(T) -> &'static str,
        label: fn(T) -> &'static str,
    ) -> Self {
        let options: Vec<ChoiceOption> = options
            .iter()
            .map(|&o| ChoiceOption {
                value: value(o).to_string(),
                label: label(o).to_string(),
            })
            .collect();
        let default = options.first().map(|o| JsonValue::from(o.value.clone()));
        Self {
            name: name.to_string(),
            kind: FieldKind::Choice(options),
            placeholder: None,
            default,
        }
    }
}

/// An advisory problem with one field of a config record.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigIssue {
    /// A select field holds a value that is not one of its options.
    UnknownOption { field: String, value: JsonValue },
    /// A numeric field holds something that is not a number.
    NotANumber { field: String, value: JsonValue },
    /// A text field holds an object or array.
    NotText { field: String },
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOption { field, value } => {
                write!(f, "field '{field}' has unknown option {value}")
            }
            Self::NotANumber { field, value } => {
                write!(f, "field '{field}' is not a number: {value}")
            }
            Self::NotText { field } => write!(f, "field '{field}' is not text"),
        }
    }
}

/// The ordered fields of one block type's configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSchema {
    pub block_type: String,
    pub fields: Vec<FieldSpec>,
}

impl ConfigSchema {
    #[must_use]
    pub fn new(block_type: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            block_type: block_type.into(),
            fields,
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The record of a freshly added block: every field with a default.
    #[must_use]
    pub fn defaults(&self) -> ConfigRecord {
        self.fields
            .iter()
            .filter_map(|f| Some((f.name.clone(), f.default.clone()?)))
            .collect()
    }

    /// Checks the fields present in `record`.
    ///
    /// Missing fields are fine (they take defaults) and unknown keys are
    /// ignored.
    #[must_use]
    pub fn validate(&self, record: &ConfigRecord) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        for field in &self.fields {
            let Some(value) = record.get(&field.name) else {
                continue;
            };
            match &field.kind {
                FieldKind::Choice(options) => {
                    let known = value
                        .as_str()
                        .is_some_and(|v| options.iter().any(|o| o.value == v));
                    if !known {
                        issues.push(ConfigIssue::UnknownOption {
                            field: field.name.clone(),
                            value: value.clone(),
                        });
                    }
                }
                FieldKind::Number => {
                    if number(record, &field.name).is_none() {
                        issues.push(ConfigIssue::NotANumber {
                            field: field.name.clone(),
                            value: value.clone(),
                        });
                    }
                }
                FieldKind::Text | FieldKind::TextArea => {
                    if value.is_object() || value.is_array() {
                        issues.push(ConfigIssue::NotText {
                            field: field.name.clone(),
                        });
                    }
                }
            }
        }
        issues
    }
}

/// The editor fragment shown inside a canvas node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigForm {
    pub block_type: String,
    pub fields: Vec<FieldSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ConfigForm {
    /// The form of a block with nothing to configure.
    #[must_use]
    pub fn opaque(block_type: impl Into<String>) -> Self {
        Self {
            block_type: block_type.into(),
            fields: Vec::new(),
            note: Some("No config needed".to_string()),
        }
    }

    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.fields.is_empty()
    }

    /// Renders the form as the HTML fragment of a Drawflow node.
    ///
    /// Inputs carry `df-<field>` attributes so the canvas binds them to the
    /// node's data record.
    #[must_use]
    pub fn render_html(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(self.fields.len() + 1);
        for field in &self.fields {
            let name = escape(&field.name);
            let placeholder = escape(field.placeholder.as_deref().unwrap_or_default());
            parts.push(match &field.kind {
                FieldKind::Text => format!(
                    r#"<input type="text" class="df-input" df-{name} placeholder="{placeholder}">"#
                ),
                FieldKind::TextArea => format!(
                    r#"<textarea class="df-input" df-{name} placeholder="{placeholder}" rows="2"></textarea>"#
                ),
                FieldKind::Number => {
                    let value = field.default.as_ref().map(ToString::to_string).unwrap_or_default();
                    format!(
                        r#"<input type="number" class="df-input" df-{name} placeholder="{placeholder}" value="{}">"#,
                        escape(&value)
                    )
                }
                FieldKind::Choice(options) => {
                    let options: String = options
                        .iter()
                        .map(|o| format!(r#"<option value="{}">{}</option>"#, escape(&o.value), escape(&o.label)))
                        .collect();
                    format!(r#"<select class="df-input" df-{name}>{options}</select>"#)
                }
            });
        }
        if let Some(note) = &self.note {
            parts.push(format!("<small>{}</small>", escape(note)));
        }
        parts.join("\n")
    }
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Builds a block's editor form from its schema.
pub type FormBuilder = fn(&ConfigSchema) -> ConfigForm;

/// Lists every schema field with no extra text.
#[must_use]
pub fn standard_form(schema: &ConfigSchema) -> ConfigForm {
    ConfigForm {
        block_type: schema.block_type.clone(),
        fields: schema.fields.clone(),
        note: None,
    }
}

fn trigger_form(schema: &ConfigSchema) -> ConfigForm {
    ConfigForm {
        note: Some("Injects Timezone ctx".to_string()),
        ..standard_form(schema)
    }
}

#[derive(Debug, Clone)]
struct RegistryEntry {
    schema: ConfigSchema,
    build_form: FormBuilder,
}

/// Maps block types to their schema and form builder.
#[derive(Debug, Clone, Default)]
pub struct ConfigRegistry {
    entries: HashMap<String, RegistryEntry>,
}

impl ConfigRegistry {
    /// A registry with no entries; every block is opaque.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The configuration shapes of the standard blocks.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new()
            .with_schema(ConfigSchema::new(
                "ai_prompt",
                vec![
                    FieldSpec::choice("model", AiModel::ALL, AiModel::as_str, AiModel::label),
                    FieldSpec::text_area("prompt", "Enter prompt..."),
                ],
            ))
            .with_schema(ConfigSchema::new(
                "terminal_command",
                vec![FieldSpec::text("command", "ls -la or dir")],
            ))
            .with_schema(ConfigSchema::new(
                "web_search",
                vec![FieldSpec::text("query", "Search query...")],
            ))
            .with_schema(ConfigSchema::new(
                "http_request",
                vec![
                    FieldSpec::choice("method", HttpMethod::ALL, HttpMethod::as_str, HttpMethod::label),
                    FieldSpec::text("url", "https://api.example.com"),
                ],
            ))
            .with_schema(ConfigSchema::new(
                "condition",
                vec![
                    FieldSpec::text("field", "Field name"),
                    FieldSpec::choice(
                        "operator",
                        ConditionOperator::ALL,
                        ConditionOperator::as_str,
                        ConditionOperator::label,
                    ),
                    FieldSpec::text("value", "Value"),
                ],
            ))
            .with_schema(ConfigSchema::new(
                "output",
                vec![FieldSpec::text("message", "Output message template")],
            ))
            .with_schema(ConfigSchema::new(
                "send_email",
                vec![
                    FieldSpec::text("to", "To (e.g., user@email.com)"),
                    FieldSpec::text("subject", "Subject"),
                ],
            ))
            .with_schema(ConfigSchema::new(
                "send_telegram",
                vec![
                    FieldSpec::text("chat_id", "Target Chat ID"),
                    FieldSpec::text("message", "Message text"),
                ],
            ))
            .with_schema(ConfigSchema::new(
                "delay",
                vec![FieldSpec::number("seconds", "Seconds", DEFAULT_DELAY_SECONDS)],
            ))
            .with_schema(ConfigSchema::new(
                "schedule_trigger",
                vec![FieldSpec::text("cron", "*/5 * * * * (cron)")],
            ))
            .with_entry(
                ConfigSchema::new(
                    "manual_trigger",
                    vec![FieldSpec::choice("timezone", Timezone::ALL, Timezone::as_str, Timezone::label)],
                ),
                trigger_form,
            )
    }

    /// Registers a schema rendered with the standard form.
    #[must_use]
    pub fn with_schema(self, schema: ConfigSchema) -> Self {
        self.with_entry(schema, standard_form)
    }

    /// Registers a schema with a custom form builder, replacing any entry
    /// for the same block type.
    #[must_use]
    pub fn with_entry(mut self, schema: ConfigSchema, build_form: FormBuilder) -> Self {
        self.entries.insert(
            schema.block_type.clone(),
            RegistryEntry { schema, build_form },
        );
        self
    }

    #[must_use]
    pub fn schema(&self, block_type: &str) -> Option<&ConfigSchema> {
        self.entries.get(block_type).map(|e| &e.schema)
    }

    /// The editor form for a block type.
    #[must_use]
    pub fn form_for(&self, block_type: &str) -> ConfigForm {
        match self.entries.get(block_type) {
            Some(entry) => (entry.build_form)(&entry.schema),
            None => ConfigForm::opaque(block_type),
        }
    }

    /// The default record for a freshly added block. Empty for opaque blocks.
    #[must_use]
    pub fn defaults_for(&self, block_type: &str) -> ConfigRecord {
        self.schema(block_type)
            .map(ConfigSchema::defaults)
            .unwrap_or_default()
    }

    /// Checks a record against its block type's schema. Opaque blocks accept anything.
    #[must_use]
    pub fn validate(&self, block_type: &str, record: &ConfigRecord) -> Vec<ConfigIssue> {
        self.schema(block_type)
            .map(|s| s.validate(record))
            .unwrap_or_default()
    }

    /// Checks every node of a graph, in node order.
    #[must_use]
    pub fn validate_graph(&self, graph: &GraphModel) -> Vec<(NodeId, ConfigIssue)> {
        graph
            .nodes()
            .flat_map(|node| {
                self.validate(&node.block_type, &node.config)
                    .into_iter()
                    .map(|issue| (node.id.clone(), issue))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlockConfig;
    use crate::node::Node;
    use serde_json::json;

    fn record(value: JsonValue) -> ConfigRecord {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn delay_defaults_to_five_seconds() {
        let registry = ConfigRegistry::builtin();
        assert_eq!(JsonValue::Object(registry.defaults_for("delay")), json!({"seconds": 5}));
    }

    #[test]
    fn choice_defaults_to_first_option() {
        let registry = ConfigRegistry::builtin();
        let defaults = registry.defaults_for("ai_prompt");
        assert_eq!(defaults.get("model"), Some(&json!("gpt-4o")));
        assert!(!defaults.contains_key("prompt"));
    }

    #[test]
    fn builtin_defaults_parse_as_their_block() {
        let registry = ConfigRegistry::builtin();
        for block_type in registry.entries.keys() {
            let config = BlockConfig::from_node(block_type, &registry.defaults_for(block_type));
            assert_eq!(config.block_type(), block_type.as_str());
            assert!(!config.is_opaque(), "{block_type} should be typed");
        }
    }

    #[test]
    fn unknown_type_gets_opaque_form() {
        let form = ConfigRegistry::builtin().form_for("screenshot");
        assert!(form.is_opaque());
        assert_eq!(form.note.as_deref(), Some("No config needed"));
        assert!(ConfigRegistry::builtin().defaults_for("screenshot").is_empty());
    }

    #[test]
    fn manual_trigger_form_has_note() {
        let form = ConfigRegistry::builtin().form_for("manual_trigger");
        assert_eq!(form.fields.len(), 1);
        assert_eq!(form.note.as_deref(), Some("Injects Timezone ctx"));
    }

    #[test]
    fn form_keeps_field_order_and_placeholders() {
        let form = ConfigRegistry::builtin().form_for("send_email");
        let names: Vec<&str> = form.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["to", "subject"]);
        assert_eq!(form.fields[0].placeholder.as_deref(), Some("To (e.g., user@email.com)"));
    }

    #[test]
    fn validate_reports_unknown_option() {
        let registry = ConfigRegistry::builtin();
        let issues = registry.validate("http_request", &record(json!({"method": "PATCH", "url": "x"})));
        assert_eq!(issues.len(), 1);
        assert!(issues[0].to_string().contains("unknown option \"PATCH\""));
    }

    #[test]
    fn validate_accepts_numeric_strings() {
        let registry = ConfigRegistry::builtin();
        assert!(registry.validate("delay", &record(json!({"seconds": "10"}))).is_empty());

        let issues = registry.validate("delay", &record(json!({"seconds": "soon"})));
        assert!(matches!(issues[0], ConfigIssue::NotANumber { .. }));
    }

    #[test]
    fn validate_ignores_missing_and_extra_fields() {
        let registry = ConfigRegistry::builtin();
        assert!(registry.validate("condition", &record(json!({"label": "x"}))).is_empty());
        assert!(registry.validate("unknown_block", &record(json!({"a": [1]}))).is_empty());
    }

    #[test]
    fn validate_graph_tags_issues_with_node_ids() {
        let mut graph = GraphModel::new();
        graph.add_node(Node::new("a", "output").with_field("message", json!({"nested": true})));
        graph.add_node(Node::new("b", "output").with_field("message", "fine"));

        let issues = ConfigRegistry::builtin().validate_graph(&graph);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].0.as_str(), "a");
    }

    #[test]
    fn render_html_binds_fields() {
        let html = ConfigRegistry::builtin().form_for("delay").render_html();
        assert!(html.contains("df-seconds"));
        assert!(html.contains(r#"value="5""#));

        let html = ConfigRegistry::builtin().form_for("condition").render_html();
        assert!(html.contains(r#"<option value="&lt;">&lt;</option>"#));
    }
}
