//! Flow store client.
//!
//! `FlowService` is the seam to the flow service: plain CRUD on named flows
//! plus the run, catalog, generator and template endpoints.
//! `HttpFlowService` implements it over HTTP. `FlowStore` wraps any service
//! with graph-level helpers so callers deal in `GraphModel`s rather than
//! serialized `flow_data`.

use crate::config::ClientConfig;
use crate::error::StoreError;
use crate::execution::RunResult;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use flowdeck_core::{FlowId, TemplateId};
use flowdeck_workflow::{BlockCatalog, BlockDescriptor, GraphModel};
use reqwest::{Method, RequestBuilder};
use rootcause::prelude::Report;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

/// A stored flow as listed, without its graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowSummary {
    pub id: FlowId,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl FlowSummary {
    /// The last modification time, if the service sent a readable one.
    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at.as_deref().and_then(parse_timestamp)
    }
}

/// A stored flow including its serialized graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub id: FlowId,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub description: String,
    /// The graph as the service returned it: normally a JSON string, though
    /// an embedded object is accepted too.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_data: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Flow {
    /// The last modification time, if the service sent a readable one.
    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at.as_deref().and_then(parse_timestamp)
    }

    /// Parses the stored graph.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::MalformedResponse` if `flow_data` is missing or
    /// is not a graph.
    pub fn graph(&self) -> Result<GraphModel, Report<StoreError>> {
        let malformed = |details: String| StoreError::MalformedResponse {
            details: format!("flow {}: {details}", self.id),
        };
        match &self.flow_data {
            Some(JsonValue::String(raw)) => {
                GraphModel::from_json(raw).map_err(|e| malformed(e.to_string()).into())
            }
            Some(value @ JsonValue::Object(_)) => serde_json::from_value(value.clone())
                .map_err(|e| malformed(format!("invalid flow graph: {e}")).into()),
            Some(JsonValue::Null) | None => Err(malformed("missing flow_data".to_string()).into()),
            Some(other) => Err(malformed(format!("flow_data is not a graph: {other}")).into()),
        }
    }
}

/// The body of a create or update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowDraft {
    pub name: String,
    pub description: String,
    /// The serialized graph. Always a JSON string on the wire.
    pub flow_data: String,
}

impl FlowDraft {
    /// Builds a draft from a graph.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Encode` if the graph cannot be serialized.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        graph: &GraphModel,
    ) -> Result<Self, Report<StoreError>> {
        let flow_data = graph.to_json().map_err(|e| StoreError::Encode {
            details: e.to_string(),
        })?;
        Ok(Self {
            name: name.into(),
            description: description.into(),
            flow_data,
        })
    }
}

/// A canned flow as listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: TemplateId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// A canned flow with its graph.
///
/// The service answers unknown ids with a body holding only `error`, so
/// every field is optional here and callers check `flow_data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TemplateId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// A graph model or a native canvas export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_data: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The flow service.
#[async_trait]
pub trait FlowService: Send + Sync {
    /// Lists stored flows.
    async fn list(&self) -> Result<Vec<FlowSummary>, Report<StoreError>>;

    /// Stores a new flow and returns it with its assigned id.
    async fn create(&self, draft: &FlowDraft) -> Result<Flow, Report<StoreError>>;

    /// Fetches one flow with its graph.
    async fn get(&self, id: &FlowId) -> Result<Flow, Report<StoreError>>;

    /// Overwrites a flow. There is no conflict detection: the last write wins.
    async fn update(&self, id: &FlowId, draft: &FlowDraft) -> Result<(), Report<StoreError>>;

    /// Deletes a flow.
    async fn delete(&self, id: &FlowId) -> Result<(), Report<StoreError>>;

    /// Runs the stored flow and waits for it to finish.
    async fn run(&self, id: &FlowId) -> Result<RunResult, Report<StoreError>>;

    /// Fetches the block catalog.
    async fn blocks(&self) -> Result<BlockCatalog, Report<StoreError>>;

    /// Asks the service to draft a graph from a natural-language goal.
    async fn magic(&self, prompt: &str) -> Result<JsonValue, Report<StoreError>>;

    /// Lists canned flows.
    async fn templates(&self) -> Result<Vec<TemplateSummary>, Report<StoreError>>;

    /// Fetches one canned flow.
    async fn template(&self, id: &TemplateId) -> Result<Template, Report<StoreError>>;
}

#[derive(Deserialize)]
struct FlowList {
    #[serde(default)]
    flows: Vec<FlowSummary>,
}

#[derive(Deserialize)]
struct BlockList {
    #[serde(default)]
    blocks: Vec<BlockDescriptor>,
}

#[derive(Deserialize)]
struct TemplateList {
    #[serde(default)]
    templates: Vec<TemplateSummary>,
}

#[derive(Serialize)]
struct MagicRequest<'a> {
    prompt: &'a str,
}

/// `FlowService` over HTTP.
///
/// The client has a connect timeout but no request timeout: a run blocks
/// until the service answers.
#[derive(Clone)]
pub struct HttpFlowService {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl fmt::Debug for HttpFlowService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpFlowService")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl HttpFlowService {
    /// Creates a service client.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, Report<StoreError>> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| StoreError::Transport {
                details: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{path}", self.base_url));
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, Report<StoreError>> {
        let response = builder.send().await.map_err(|e| StoreError::Transport {
            details: e.to_string(),
        })?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| StoreError::Transport {
            details: e.to_string(),
        })?;
        debug!(status = status.as_u16(), bytes = body.len(), "flow service response");

        if !status.is_success() {
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                detail: rejection_detail(&body, status.canonical_reason()),
            }
            .into());
        }

        serde_json::from_slice(&body).map_err(|e| {
            StoreError::MalformedResponse {
                details: e.to_string(),
            }
            .into()
        })
    }
}

/// The service's `detail` field, else the raw body, else the status reason.
fn rejection_detail(body: &[u8], reason: Option<&str>) -> String {
    if let Ok(value) = serde_json::from_slice::<JsonValue>(body) {
        match value.get("detail") {
            Some(JsonValue::String(detail)) => return detail.clone(),
            Some(other) => return other.to_string(),
            None => {}
        }
    }
    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        reason.unwrap_or("request failed").to_string()
    } else {
        text
    }
}

#[async_trait]
impl FlowService for HttpFlowService {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<FlowSummary>, Report<StoreError>> {
        let list: FlowList = self.send(self.request(Method::GET, "/flows")).await?;
        Ok(list.flows)
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    async fn create(&self, draft: &FlowDraft) -> Result<Flow, Report<StoreError>> {
        self.send(self.request(Method::POST, "/flows").json(draft)).await
    }

    #[instrument(skip(self), fields(flow_id = %id))]
    async fn get(&self, id: &FlowId) -> Result<Flow, Report<StoreError>> {
        self.send(self.request(Method::GET, &format!("/flows/{id}"))).await
    }

    #[instrument(skip(self, draft), fields(flow_id = %id))]
    async fn update(&self, id: &FlowId, draft: &FlowDraft) -> Result<(), Report<StoreError>> {
        let _ack: JsonValue = self
            .send(self.request(Method::PUT, &format!("/flows/{id}")).json(draft))
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(flow_id = %id))]
    async fn delete(&self, id: &FlowId) -> Result<(), Report<StoreError>> {
        let _ack: JsonValue = self
            .send(self.request(Method::DELETE, &format!("/flows/{id}")))
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(flow_id = %id))]
    async fn run(&self, id: &FlowId) -> Result<RunResult, Report<StoreError>> {
        self.send(self.request(Method::POST, &format!("/flows/{id}/run")))
            .await
    }

    #[instrument(skip(self))]
    async fn blocks(&self) -> Result<BlockCatalog, Report<StoreError>> {
        let list: BlockList = self.send(self.request(Method::GET, "/flows/blocks")).await?;
        Ok(BlockCatalog::new(list.blocks))
    }

    #[instrument(skip(self, prompt))]
    async fn magic(&self, prompt: &str) -> Result<JsonValue, Report<StoreError>> {
        self.send(
            self.request(Method::POST, "/flows/magic")
                .json(&MagicRequest { prompt }),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn templates(&self) -> Result<Vec<TemplateSummary>, Report<StoreError>> {
        let list: TemplateList = self
            .send(self.request(Method::GET, "/flow-templates"))
            .await?;
        Ok(list.templates)
    }

    #[instrument(skip(self), fields(template_id = %id))]
    async fn template(&self, id: &TemplateId) -> Result<Template, Report<StoreError>> {
        self.send(self.request(Method::GET, &format!("/flow-templates/{id}")))
            .await
    }
}

/// Graph-level access to a flow service.
#[derive(Clone)]
pub struct FlowStore {
    service: Arc<dyn FlowService>,
}

impl fmt::Debug for FlowStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowStore").finish_non_exhaustive()
    }
}

impl FlowStore {
    #[must_use]
    pub fn new(service: Arc<dyn FlowService>) -> Self {
        Self { service }
    }

    /// The underlying service.
    #[must_use]
    pub fn service(&self) -> &dyn FlowService {
        self.service.as_ref()
    }

    /// Stores a new flow holding `graph`.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph cannot be encoded or the service fails.
    pub async fn create_flow(
        &self,
        name: &str,
        description: &str,
        graph: &GraphModel,
    ) -> Result<Flow, Report<StoreError>> {
        let draft = FlowDraft::new(name, description, graph)?;
        let flow = self.service.create(&draft).await?;
        tracing::info!(flow_id = %flow.id, name = %name, nodes = graph.node_count(), "Created flow");
        Ok(flow)
    }

    /// Parses a fetched flow's graph.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::MalformedResponse` if `flow_data` is missing or
    /// not a graph.
    pub fn load_graph(&self, flow: &Flow) -> Result<GraphModel, Report<StoreError>> {
        flow.graph()
    }

    /// Overwrites a flow with `graph`.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph cannot be encoded or the service fails.
    pub async fn save_graph(
        &self,
        id: &FlowId,
        name: &str,
        description: &str,
        graph: &GraphModel,
    ) -> Result<(), Report<StoreError>> {
        let draft = FlowDraft::new(name, description, graph)?;
        self.service.update(id, &draft).await?;
        tracing::info!(flow_id = %id, nodes = graph.node_count(), edges = graph.edge_count(), "Saved flow");
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<FlowSummary>, Report<StoreError>> {
        self.service.list().await
    }

    pub async fn get(&self, id: &FlowId) -> Result<Flow, Report<StoreError>> {
        self.service.get(id).await
    }

    pub async fn delete(&self, id: &FlowId) -> Result<(), Report<StoreError>> {
        self.service.delete(id).await?;
        tracing::info!(flow_id = %id, "Deleted flow");
        Ok(())
    }

    /// Runs the stored flow as it is, without saving anything first.
    pub async fn run(&self, id: &FlowId) -> Result<RunResult, Report<StoreError>> {
        let result = self.service.run(id).await?;
        tracing::info!(flow_id = %id, elapsed_seconds = result.elapsed_seconds, "Flow run finished");
        Ok(result)
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

fn string_or_null<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
