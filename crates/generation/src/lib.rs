//! Generation client for Atelier
//!
//! Thin OpenAI-compatible chat-completions client. It takes the sanitized
//! selection produced by `selection-engine`, a prompt and optional
//! screenshots, and turns the model's reply into something insertable:
//! SVG or HTML markup, a raster image, or a research report.
//!
//! # Example
//!
//! ```rust,ignore
//! use generation::{GenerationClient, GenerationConfig, GenerationInput};
//!
//! let client = GenerationClient::new(GenerationConfig::default())?;
//! let output = client
//!     .generate(&GenerationInput {
//!         prompt: "Turn this into a pricing page".into(),
//!         selection,
//!         ..Default::default()
//!     })
//!     .await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod markup;
pub mod types;

// Re-exports for convenience
pub use client::{
    BatchItem, BatchOutcome, ChatTransport, GenerationClient, GenerationInput, HttpTransport,
    ResearchReport,
};
pub use config::GenerationConfig;
pub use error::{GenerationError, Result};
pub use markup::{extract_output, GeneratedOutput};
pub use types::{ChatMessage, ChatRequest, ChatResponse, ContentPart, ReplyContent};
