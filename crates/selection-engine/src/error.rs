//! Error types for the selection engine
//!
//! None of these cross the engine's public entry points: they are logged and
//! turned into reduced output at the smallest scope that can absorb them.

use scene_graph::HostError;
use thiserror::Error;

use crate::assembler::Stage;

/// Result type alias using EngineError
pub type Result<T> = std::result::Result<T, EngineError>;

/// Failure of a single facet or node extraction
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The node does not expose the facet
    #[error("Facet '{facet}' not exposed by node '{node_id}'")]
    Missing { facet: String, node_id: String },

    /// The facet value had an unexpected shape
    #[error("Malformed '{facet}' on node '{node_id}': {reason}")]
    Malformed {
        facet: String,
        node_id: String,
        reason: String,
    },

    /// The host threw while reading
    #[error(transparent)]
    Host(#[from] HostError),
}

impl ExtractError {
    pub fn missing(facet: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self::Missing {
            facet: facet.into(),
            node_id: node_id.into(),
        }
    }

    pub fn malformed(
        facet: impl Into<String>,
        node_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Malformed {
            facet: facet.into(),
            node_id: node_id.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of a whole assembler stage
#[derive(Debug, Error)]
#[error("Stage {stage} failed on node '{node_id}': {source}")]
pub struct StageError {
    pub stage: Stage,
    pub node_id: String,
    #[source]
    pub source: ExtractError,
}

/// Failure of the structural encode pass
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("Structural encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors reported by document-level engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Node '{0}' skipped: larger than the maximum dimension")]
    Oversized(String),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Serialization error: {0}")]
    Guard(#[from] GuardError),
}
