//! The flows panel.
//!
//! `Workbench` lists, creates, deletes and quick-runs stored flows and
//! opens them in editor sessions. It owns the block catalog cache, so the
//! catalog is fetched once per workbench rather than once per session.

use crate::catalog::CatalogCache;
use crate::error::StoreError;
use crate::execution::RunResult;
use crate::generate;
use crate::session::{EditorSession, UNTITLED_FLOW};
use crate::store::{FlowService, FlowStore, FlowSummary, TemplateSummary};
use flowdeck_core::{FlowId, TemplateId};
use flowdeck_workflow::{BlockCatalog, ConfigRegistry, GraphModel};
use rootcause::prelude::Report;
use std::sync::Arc;
use tracing::{info, instrument};

/// Prompt shown before a flow is deleted.
pub const DELETE_PROMPT: &str = "Delete this flow?";

/// Asks the user a yes/no question.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

pub struct Workbench {
    store: FlowStore,
    catalog: CatalogCache,
    registry: Arc<ConfigRegistry>,
}

impl Workbench {
    #[must_use]
    pub fn new(service: Arc<dyn FlowService>) -> Self {
        Self {
            store: FlowStore::new(Arc::clone(&service)),
            catalog: CatalogCache::new(service),
            registry: Arc::new(ConfigRegistry::builtin()),
        }
    }

    /// Replaces the built-in config registry.
    #[must_use]
    pub fn with_registry(mut self, registry: ConfigRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    #[must_use]
    pub fn store(&self) -> &FlowStore {
        &self.store
    }

    #[must_use]
    pub fn registry(&self) -> &ConfigRegistry {
        &self.registry
    }

    pub async fn list(&self) -> Result<Vec<FlowSummary>, Report<StoreError>> {
        self.store.list().await
    }

    /// The block catalog, fetched on first use.
    pub async fn blocks(&mut self) -> Arc<BlockCatalog> {
        self.catalog.blocks().await
    }

    /// Fetches the block catalog again; sessions opened later see the result.
    pub async fn reload_blocks(&mut self) -> Arc<BlockCatalog> {
        self.catalog.reload().await
    }

    pub async fn templates(&self) -> Result<Vec<TemplateSummary>, Report<StoreError>> {
        self.store.service().templates().await
    }

    /// Opens a stored flow in a new editor session.
    ///
    /// # Errors
    ///
    /// Returns an error if the flow cannot be fetched or read.
    #[instrument(skip(self), fields(flow_id = %id))]
    pub async fn open(&mut self, id: &FlowId) -> Result<EditorSession, Report<StoreError>> {
        let catalog = self.catalog.blocks().await;
        EditorSession::open(self.store.clone(), catalog, Arc::clone(&self.registry), id).await
    }

    /// Stores a new empty flow and opens it.
    ///
    /// A blank name is stored as "Untitled Flow".
    ///
    /// # Errors
    ///
    /// Returns an error if the flow cannot be created or reopened.
    pub async fn create_empty(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<EditorSession, Report<StoreError>> {
        let name = if name.trim().is_empty() {
            UNTITLED_FLOW
        } else {
            name.trim()
        };
        let flow = self
            .store
            .create_flow(name, description, &GraphModel::new())
            .await?;
        self.open(&flow.id).await
    }

    /// Runs a stored flow as it is, without opening it.
    pub async fn quick_run(&self, id: &FlowId) -> Result<RunResult, Report<StoreError>> {
        self.store.run(id).await
    }

    /// Deletes a flow after asking `confirm`.
    ///
    /// Returns `Ok(false)` without contacting the service if the user
    /// declines.
    ///
    /// # Errors
    ///
    /// Returns an error if the service fails the delete.
    pub async fn delete(&self, id: &FlowId, confirm: &dyn Confirm) -> Result<bool, Report<StoreError>> {
        if !confirm.confirm(DELETE_PROMPT) {
            info!(flow_id = %id, "Delete declined");
            return Ok(false);
        }
        self.store.delete(id).await?;
        Ok(true)
    }

    /// Generates a flow from a goal, stores it and opens it.
    ///
    /// # Errors
    ///
    /// Returns an error if the goal is blank, generation fails, or the flow
    /// cannot be stored.
    pub async fn magic(&mut self, goal: &str) -> Result<EditorSession, Report<StoreError>> {
        let flow = generate::magic_wand(&self.store, goal).await?;
        self.open(&flow.id).await
    }

    /// Copies a template into a new stored flow and opens it.
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be fetched or has no graph,
    /// or the flow cannot be stored.
    pub async fn import_template(&mut self, id: &TemplateId) -> Result<EditorSession, Report<StoreError>> {
        let flow = generate::import_template(&self.store, id).await?;
        self.open(&flow.id).await
    }
}
