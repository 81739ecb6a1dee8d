//! Client side of flowdeck.
//!
//! Talks to the flow service that stores and runs flows, and holds the
//! editor state of one open flow:
//!
//! - `store`: the `FlowService` seam, its HTTP implementation and the
//!   model-level `FlowStore`
//! - `execution`: run results
//! - `catalog`: the once-per-session block catalog cache
//! - `generate`: the magic wand and the template importer
//! - `session`: one open flow on a canvas
//! - `workbench`: the flows panel that opens sessions

pub mod catalog;
pub mod config;
pub mod error;
pub mod execution;
pub mod generate;
pub mod session;
pub mod store;
pub mod workbench;

pub use catalog::CatalogCache;
pub use config::ClientConfig;
pub use error::{ConfigError, SessionError, StoreError};
pub use execution::{RunLogEntry, RunResult};
pub use session::EditorSession;
pub use store::{
    Flow, FlowDraft, FlowService, FlowStore, FlowSummary, HttpFlowService, Template, TemplateSummary,
};
pub use workbench::{Confirm, Workbench};
