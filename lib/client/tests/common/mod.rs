//! In-memory `FlowService` that records every call.

#![allow(dead_code)]

use async_trait::async_trait;
use flowdeck_client::{
    Flow, FlowDraft, FlowService, FlowSummary, RunResult, StoreError, Template, TemplateSummary,
};
use flowdeck_core::{FlowId, TemplateId};
use flowdeck_workflow::BlockCatalog;
use rootcause::prelude::Report;
use serde_json::{Value as JsonValue, json};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// One call made against the service.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List,
    Create(String),
    Get(FlowId),
    Update(FlowId),
    Delete(FlowId),
    Run(FlowId),
    Blocks,
    Magic(String),
    Templates,
    Template(TemplateId),
}

#[derive(Default)]
struct State {
    flows: BTreeMap<FlowId, Flow>,
    templates: BTreeMap<TemplateId, Template>,
    next_id: u32,
    calls: Vec<Call>,
    magic: Option<JsonValue>,
    blocks_failures: usize,
}

#[derive(Default)]
pub struct RecordingService {
    state: Mutex<State>,
}

fn rejected<T>(status: u16, detail: &str) -> Result<T, Report<StoreError>> {
    Err(StoreError::Rejected {
        status,
        detail: detail.to_string(),
    }
    .into())
}

impl RecordingService {
    pub fn new() -> Self {
        Self::default()
    }

    /// What `magic` answers with.
    pub fn with_magic(self, draft: JsonValue) -> Self {
        self.state.lock().expect("lock").magic = Some(draft);
        self
    }

    pub fn with_template(self, id: &str, template: Template) -> Self {
        self.state
            .lock()
            .expect("lock")
            .templates
            .insert(TemplateId::new(id), template);
        self
    }

    /// Makes the next `n` catalog fetches fail.
    pub fn failing_blocks(self, n: usize) -> Self {
        self.state.lock().expect("lock").blocks_failures = n;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().expect("lock").calls.clone()
    }

    pub fn stored(&self, id: &FlowId) -> Option<Flow> {
        self.state.lock().expect("lock").flows.get(id).cloned()
    }

    fn record(&self, call: Call) -> std::sync::MutexGuard<'_, State> {
        let mut state = self.state.lock().expect("lock");
        state.calls.push(call);
        state
    }
}

#[async_trait]
impl FlowService for RecordingService {
    async fn list(&self) -> Result<Vec<FlowSummary>, Report<StoreError>> {
        let state = self.record(Call::List);
        Ok(state
            .flows
            .values()
            .map(|flow| FlowSummary {
                id: flow.id.clone(),
                name: flow.name.clone(),
                description: flow.description.clone(),
                updated_at: None,
            })
            .collect())
    }

    async fn create(&self, draft: &FlowDraft) -> Result<Flow, Report<StoreError>> {
        let mut state = self.record(Call::Create(draft.name.clone()));
        state.next_id += 1;
        let flow = Flow {
            id: FlowId::new(format!("flow-{}", state.next_id)),
            name: draft.name.clone(),
            description: draft.description.clone(),
            flow_data: Some(JsonValue::String(draft.flow_data.clone())),
            updated_at: None,
        };
        state.flows.insert(flow.id.clone(), flow.clone());
        Ok(flow)
    }

    async fn get(&self, id: &FlowId) -> Result<Flow, Report<StoreError>> {
        let state = self.record(Call::Get(id.clone()));
        match state.flows.get(id) {
            Some(flow) => Ok(flow.clone()),
            None => rejected(404, "Flow not found"),
        }
    }

    async fn update(&self, id: &FlowId, draft: &FlowDraft) -> Result<(), Report<StoreError>> {
        let mut state = self.record(Call::Update(id.clone()));
        let Some(flow) = state.flows.get_mut(id) else {
            return rejected(404, "Flow not found");
        };
        flow.name = draft.name.clone();
        flow.description = draft.description.clone();
        flow.flow_data = Some(JsonValue::String(draft.flow_data.clone()));
        Ok(())
    }

    async fn delete(&self, id: &FlowId) -> Result<(), Report<StoreError>> {
        let mut state = self.record(Call::Delete(id.clone()));
        match state.flows.remove(id) {
            Some(_) => Ok(()),
            None => rejected(404, "Flow not found"),
        }
    }

    async fn run(&self, id: &FlowId) -> Result<RunResult, Report<StoreError>> {
        let state = self.record(Call::Run(id.clone()));
        if !state.flows.contains_key(id) {
            return rejected(404, "Flow not found");
        }
        Ok(RunResult {
            status: Some("success".to_string()),
            elapsed_seconds: 0.5,
            results: json!({}),
            log: Vec::new(),
        })
    }

    async fn blocks(&self) -> Result<BlockCatalog, Report<StoreError>> {
        let mut state = self.record(Call::Blocks);
        if state.blocks_failures > 0 {
            state.blocks_failures -= 1;
            return Err(StoreError::Transport {
                details: "connection refused".to_string(),
            }
            .into());
        }
        Ok(BlockCatalog::builtin())
    }

    async fn magic(&self, prompt: &str) -> Result<JsonValue, Report<StoreError>> {
        let state = self.record(Call::Magic(prompt.to_string()));
        match &state.magic {
            Some(draft) => Ok(draft.clone()),
            None => rejected(500, "Magic generation failed"),
        }
    }

    async fn templates(&self) -> Result<Vec<TemplateSummary>, Report<StoreError>> {
        let state = self.record(Call::Templates);
        Ok(state
            .templates
            .iter()
            .map(|(id, template)| TemplateSummary {
                id: id.clone(),
                name: template.name.clone(),
                description: template.description.clone(),
                category: template.category.clone(),
            })
            .collect())
    }

    async fn template(&self, id: &TemplateId) -> Result<Template, Report<StoreError>> {
        let state = self.record(Call::Template(id.clone()));
        Ok(state.templates.get(id).cloned().unwrap_or_else(|| Template {
            id: None,
            name: String::new(),
            description: String::new(),
            category: None,
            flow_data: None,
            error: Some("Template not found".to_string()),
        }))
    }
}
