//! Flow generators.
//!
//! Both generators produce a brand-new stored flow; neither touches an
//! existing one. The magic wand asks the flow service to draft a graph from
//! a natural-language goal. The template importer copies a canned flow,
//! converting native canvas exports into a graph model on the way.

use crate::error::StoreError;
use crate::store::{Flow, FlowStore};
use flowdeck_core::TemplateId;
use flowdeck_workflow::canvas::DrawflowDocument;
use flowdeck_workflow::{GraphModel, MemoryCanvas, export_graph};
use rootcause::prelude::Report;
use serde_json::Value as JsonValue;
use tracing::instrument;

/// Name given to imported templates whose own name is unusable.
pub const DEFAULT_TEMPLATE_NAME: &str = "Template Flow";

/// Names a generated flow after the first four words of its goal.
///
/// `"send me a daily digest of news"` becomes `"Send me a daily Flow"`.
#[must_use]
pub fn magic_flow_name(goal: &str) -> String {
    let words: Vec<&str> = goal.trim().split(' ').take(4).collect();
    let name = format!("{} Flow", words.join(" "));
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => name,
    }
}

/// Drafts a graph for `goal` on the flow service and stores it as a new flow.
///
/// # Errors
///
/// Returns `StoreError::InvalidInput` for an empty goal, the service's own
/// rejection if drafting fails, and `StoreError::MalformedResponse` if the
/// draft has no `nodes`.
#[instrument(skip(store))]
pub async fn magic_wand(store: &FlowStore, goal: &str) -> Result<Flow, Report<StoreError>> {
    let goal = goal.trim();
    if goal.is_empty() {
        return Err(StoreError::InvalidInput {
            details: "describe the automation to generate".to_string(),
        }
        .into());
    }

    let draft = store.service().magic(goal).await?;
    if !draft.get("nodes").is_some_and(|nodes| nodes.is_object() || nodes.is_array()) {
        return Err(StoreError::MalformedResponse {
            details: "generated flow has no nodes".to_string(),
        }
        .into());
    }
    let graph: GraphModel = serde_json::from_value(draft).map_err(|e| StoreError::MalformedResponse {
        details: format!("generated flow is not a graph: {e}"),
    })?;

    store.create_flow(&magic_flow_name(goal), goal, &graph).await
}

/// Reads a template's `flow_data` as a graph model.
///
/// Accepts a graph model, a native canvas export, or either of those
/// serialized into a string.
///
/// # Errors
///
/// Returns `StoreError::MalformedResponse` if the data is neither.
pub fn template_graph(flow_data: &JsonValue) -> Result<GraphModel, Report<StoreError>> {
    let malformed = |details: String| StoreError::MalformedResponse {
        details: format!("template flow_data: {details}"),
    };

    let value = match flow_data {
        JsonValue::String(raw) => {
            serde_json::from_str::<JsonValue>(raw).map_err(|e| malformed(e.to_string()))?
        }
        other => other.clone(),
    };

    if DrawflowDocument::detect(&value) {
        let document = DrawflowDocument::from_value(value).map_err(|e| malformed(e.to_string()))?;
        let canvas = MemoryCanvas::from_document(&document).map_err(|e| malformed(e.to_string()))?;
        return Ok(export_graph(&canvas));
    }

    if !value.is_object() {
        return Err(malformed(format!("expected an object, got {value}")).into());
    }
    serde_json::from_value(value).map_err(|e| malformed(e.to_string()).into())
}

/// Copies a canned flow into a new stored flow.
///
/// # Errors
///
/// Returns `StoreError::MalformedResponse` if the template has no
/// `flow_data` (the service answers unknown ids that way) or the data is
/// unreadable, and any service error.
#[instrument(skip(store), fields(template_id = %id))]
pub async fn import_template(store: &FlowStore, id: &TemplateId) -> Result<Flow, Report<StoreError>> {
    let template = store.service().template(id).await?;
    let Some(flow_data) = template.flow_data.as_ref().filter(|data| !data.is_null()) else {
        return Err(StoreError::MalformedResponse {
            details: format!(
                "template {id} has no flow_data: {}",
                template.error.as_deref().unwrap_or("empty template")
            ),
        }
        .into());
    };

    let graph = template_graph(flow_data)?;
    let name = template
        .name
        .trim_start_matches(|c: char| !(c.is_alphanumeric() || c == '_'))
        .trim();
    let name = if name.is_empty() { DEFAULT_TEMPLATE_NAME } else { name };

    store.create_flow(name, &template.description, &graph).await
}
