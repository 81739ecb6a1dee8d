//! Block catalog cache.
//!
//! The catalog is fetched from the flow service the first time it is needed
//! and kept until `reload`. A failed fetch yields an empty catalog that is
//! not kept, so the next call tries again.

use crate::store::FlowService;
use flowdeck_workflow::BlockCatalog;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Fetch-once holder of the block catalog.
pub struct CatalogCache {
    service: Arc<dyn FlowService>,
    cached: Option<Arc<BlockCatalog>>,
}

impl fmt::Debug for CatalogCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogCache")
            .field("cached", &self.cached.as_ref().map(|c| c.len()))
            .finish_non_exhaustive()
    }
}

impl CatalogCache {
    #[must_use]
    pub fn new(service: Arc<dyn FlowService>) -> Self {
        Self {
            service,
            cached: None,
        }
    }

    /// Returns the catalog, fetching it on first use.
    ///
    /// Never fails: if the service cannot be reached the result is an empty
    /// catalog, and every block type is then unknown.
    pub async fn blocks(&mut self) -> Arc<BlockCatalog> {
        if let Some(catalog) = &self.cached {
            return Arc::clone(catalog);
        }
        match self.service.blocks().await {
            Ok(catalog) => {
                tracing::info!(blocks = catalog.len(), "Loaded block catalog");
                let catalog = Arc::new(catalog);
                self.cached = Some(Arc::clone(&catalog));
                catalog
            }
            Err(e) => {
                warn!(error = %e, "Failed to load block catalog");
                Arc::new(BlockCatalog::empty())
            }
        }
    }

    /// Drops the cached catalog and fetches it again.
    pub async fn reload(&mut self) -> Arc<BlockCatalog> {
        self.cached = None;
        self.blocks().await
    }
}
