//! Error types for host document access

use thiserror::Error;

/// Result type alias using HostError
pub type Result<T> = std::result::Result<T, HostError>;

/// Errors raised by the host while reading the document
#[derive(Debug, Clone, Error)]
pub enum HostError {
    /// Reading a property threw inside the host
    #[error("Property '{property}' unreadable on node '{node_id}': {reason}")]
    PropertyAccess {
        node_id: String,
        property: String,
        reason: String,
    },

    /// A node id could not be resolved
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Raster export failed
    #[error("Export failed for node '{node_id}': {reason}")]
    Export { node_id: String, reason: String },

    /// Local style enumeration failed
    #[error("Style enumeration failed: {0}")]
    Styles(String),

    /// The document snapshot could not be decoded
    #[error("Invalid document snapshot: {0}")]
    Snapshot(String),
}

impl HostError {
    /// Create a property access error
    pub fn property(
        node_id: impl Into<String>,
        property: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::PropertyAccess {
            node_id: node_id.into(),
            property: property.into(),
            reason: reason.into(),
        }
    }

    /// Create an export error
    pub fn export(node_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Export {
            node_id: node_id.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for HostError {
    fn from(err: serde_json::Error) -> Self {
        Self::Snapshot(err.to_string())
    }
}
