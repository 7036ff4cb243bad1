//! Selection serialization engine for Atelier
//!
//! Turns the designer's selection into a bounded, serialization-safe JSON
//! description that can be handed to a generative model:
//! - **Classifier / extractors**: capability-probed facets reduced to plain
//!   records (fills, text, layout, component binding, detailed styles)
//! - **Tree walker**: hierarchy with fan-out and depth limits
//! - **Filter**: drops oversized nodes and reports each one
//! - **Exporter**: host raster export as data URIs, failures isolated
//! - **Guard**: strips non-serializable host values
//! - **Assembler**: the staged pipeline with its fallback ladder
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use selection_engine::{SelectionConfig, SelectionEngine, SelectionRequest, TemplateType};
//!
//! let engine = SelectionEngine::new(Arc::new(host), SelectionConfig::default());
//! let outcome = engine
//!     .get_selection_info(&SelectionRequest {
//!         include_children: true,
//!         template_type: TemplateType::Coding,
//!         ..Default::default()
//!     })
//!     .await;
//!
//! println!("{}", outcome.selection);
//! ```

pub mod assembler;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod document;
pub mod engine;
pub mod error;
pub mod export;
pub mod extract;
pub mod facets;
pub mod filter;
pub mod guard;
pub mod text_content;
pub mod walker;

// Re-exports for convenience
pub use assembler::{
    AssemblyOutcome, ImageMode, SelectionAssembler, SelectionInfo, SelectionRequest, Stage,
    StageFailure, TemplateType,
};
pub use classifier::{classify, Facet, FacetSet};
pub use config::SelectionConfig;
pub use document::{DesignTokens, ExportedElement, LayerEntry, PageData};
pub use engine::SelectionEngine;
pub use error::{EngineError, ExtractError, GuardError, Result, StageError};
pub use export::{find_image_nodes_in_layer, ExportedImage, ImageExporter};
pub use extract::{Extractor, FacetRegistry};
pub use facets::{ExtractedFacets, FacetValue, NodeSummary};
pub use filter::{filter_oversized, filter_selection, FilterOutcome, SkipReason, SkippedNode};
pub use guard::sanitize;
pub use text_content::{collect_text_tree, TextTree};
pub use walker::{HierarchyNode, StyleDetail, TreeWalker, WalkOptions};
