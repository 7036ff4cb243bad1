//! Error types for the plugin host

use generation::GenerationError;
use scene_graph::HostError;
use selection_engine::{EngineError, GuardError};
use thiserror::Error;

/// Result type alias using PluginError
pub type Result<T> = std::result::Result<T, PluginError>;

/// Errors surfaced across the plugin/UI boundary
#[derive(Debug, Error)]
pub enum PluginError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Document error: {0}")]
    Host(#[from] HostError),

    #[error("Serialization error: {0}")]
    Guard(#[from] GuardError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Generation is not configured")]
    GenerationUnavailable,
}

impl PluginError {
    pub fn parse(what: &'static str, source: serde_json::Error) -> Self {
        Self::Parse { what, source }
    }
}
