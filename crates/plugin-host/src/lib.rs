//! Plugin host for Atelier
//!
//! The plugin logic answers messages from the UI. This crate holds the
//! message protocol, the dispatcher that routes each request to the
//! selection engine or the generation client, the request bridge that
//! correlates replies and falls back after a fixed delay, and the JSON
//! configuration file.

pub mod bridge;
pub mod config;
pub mod error;
pub mod handler;
pub mod protocol;

// Re-exports for convenience
pub use bridge::RequestBridge;
pub use config::PluginConfig;
pub use error::{PluginError, Result};
pub use handler::{MessageHandler, PluginChannel};
pub use protocol::{PluginRequest, PluginResponse, RequestEnvelope};
