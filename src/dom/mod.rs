//! Scene graph: Root, Box, Text and VirtualText elements plus `#text`
//! leaves, mirrored into a [`LayoutTree`](crate::layout::tree::LayoutTree)
//! as they are mutated.
//!
//! ```text
//! Root ─┬─ Box ── Text ─┬─ #text
//!       │               └─ VirtualText ── #text
//!       └─ Box (internal_static)
//! ```

mod node;
mod scene;
mod squash;

pub use node::{
    Accessibility, AccessibilityState, AttributeValue, Element, ElementName, Node, NodeId,
    NodeKind, Role, Transform,
};
pub use scene::{STATIC_ATTRIBUTE, Scene};
