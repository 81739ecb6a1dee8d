//! Error types for the client crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `StoreError`: Anything that goes wrong talking to the flow service
//! - `SessionError`: Edits an editor session cannot apply
//! - `ConfigError`: Client configuration that cannot be loaded

use flowdeck_core::NodeId;
use std::fmt;

/// Errors from flow service operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The request never produced a response.
    Transport { details: String },
    /// The response arrived but is not what the operation needs.
    MalformedResponse { details: String },
    /// The service answered with a non-success status.
    Rejected { status: u16, detail: String },
    /// The request was refused before being sent.
    InvalidInput { details: String },
    /// A graph could not be serialized for sending.
    Encode { details: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { details } => {
                write!(f, "could not reach the flow service: {details}")
            }
            Self::MalformedResponse { details } => {
                write!(f, "malformed response from the flow service: {details}")
            }
            Self::Rejected { status, detail } => {
                write!(f, "flow service rejected the request ({status}): {detail}")
            }
            Self::InvalidInput { details } => write!(f, "invalid request: {details}"),
            Self::Encode { details } => write!(f, "failed to encode flow: {details}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Errors from editor session edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No node on the canvas has this id.
    NodeNotFound { node_id: NodeId },
    /// The canvas refused the edit.
    CanvasRejected { details: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound { node_id } => write!(f, "node not on canvas: {node_id}"),
            Self::CanvasRejected { details } => write!(f, "canvas rejected the edit: {details}"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Errors loading client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A source could not be read or a value has the wrong type.
    Load { details: String },
    /// A value parsed but is not usable.
    Invalid { field: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load { details } => write!(f, "failed to load configuration: {details}"),
            Self::Invalid { field, reason } => write!(f, "invalid configuration {field}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_surfaces_detail_verbatim() {
        let err = StoreError::Rejected {
            status: 404,
            detail: "Flow not found".to_string(),
        };
        assert!(err.to_string().contains("(404): Flow not found"));
    }

    #[test]
    fn transport_error_display() {
        let err = StoreError::Transport {
            details: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("could not reach"));
    }

    #[test]
    fn session_error_display() {
        let err = SessionError::NodeNotFound {
            node_id: NodeId::new("node_4"),
        };
        assert!(err.to_string().contains("node_4"));
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::Invalid {
            field: "base_url",
            reason: "empty".to_string(),
        };
        assert!(err.to_string().contains("invalid configuration base_url"));
    }
}
