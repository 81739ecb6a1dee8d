//! Core types shared across the flowdeck workspace.
//!
//! This crate provides the strongly-typed identifiers and the `Result`
//! alias used by the workflow model, the collaborator client and the CLI.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{FlowId, NodeId, ParseIdError, SessionId, TemplateId};
