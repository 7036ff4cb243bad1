//! Scene Graph - host document abstraction for Atelier
//!
//! The design tool owns the document. This crate describes the read-only
//! surface the plugin logic is allowed to see:
//!
//! - `SceneNode`: one element of the scene graph. Optional attribute groups
//!   ("facets") are exposed as probes that return `None` when the node does
//!   not carry the capability at all and `Some(Err(..))` when the host throws
//!   on access.
//! - `SceneHost`: document-wide access (selection, lookup, styles, raster
//!   export, user notifications).
//! - `HostValue`: loosely typed property values as the host hands them out,
//!   including the non-serializable `Mixed` symbol.
//!
//! `MemoryHost` is a JSON-backed implementation used by tests and by the
//! offline plugin binary.
//!
//! # Example
//!
//! ```rust,ignore
//! use scene_graph::{MemoryHost, SceneHost};
//!
//! let host = MemoryHost::with_selection(serde_json::json!([
//!     { "id": "1:2", "name": "Card", "type": "RECTANGLE", "width": 50, "height": 50 }
//! ]))?;
//!
//! for node in host.selection() {
//!     println!("{} ({})", node.name(), node.node_type());
//! }
//! ```

pub mod error;
pub mod host;
pub mod memory;
pub mod node;
pub mod value;

pub use error::{HostError, Result};
pub use host::{EffectStyle, ExportSettings, ImageFormat, PaintStyle, SceneHost, TextStyle};
pub use memory::{DocumentSnapshot, MemoryHost, MemoryNode};
pub use node::{
    AppearanceProps, InstanceProps, LayoutProps, NodeRef, NodeType, Probe, Rect, SceneNode, Size,
    StrokeProps, TextProps, VectorProps,
};
pub use value::{HostValue, SYMBOL_MARKER};
