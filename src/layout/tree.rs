//! The layout engine interface.
//!
//! The scene talks to the engine through integer node ids. The engine never
//! measures anything itself: text nodes get a fixed size pushed in with
//! [`LayoutTree::set_text_dimensions`] before each compute.

use crate::error::Result;

use super::types::{ComputedLayout, LayoutStyle};

/// Flexbox engine operated by id.
pub trait LayoutTree {
    /// Create a detached node and return its id.
    fn create_node(&mut self, style: &LayoutStyle) -> Result<u32>;

    /// Insert `child` under `parent` at `index`.
    fn insert_child(&mut self, parent: u32, child: u32, index: usize) -> Result<()>;

    fn remove_child(&mut self, parent: u32, child: u32) -> Result<()>;

    /// Release a node. Its id is never reused.
    fn remove_node(&mut self, node: u32) -> Result<()>;

    /// Replace the node's style. Unset fields fall back to engine defaults.
    fn set_style(&mut self, node: u32, style: &LayoutStyle) -> Result<()>;

    /// Fix the intrinsic size of a text node and mark it dirty.
    fn set_text_dimensions(&mut self, node: u32, width: f32, height: f32) -> Result<()>;

    fn mark_dirty(&mut self, node: u32) -> Result<()>;

    fn set_display_none(&mut self, node: u32) -> Result<()>;

    fn set_display_flex(&mut self, node: u32) -> Result<()>;

    /// Lay out the tree under `root`. `height: None` sizes to content.
    fn compute_layout(&mut self, root: u32, width: f32, height: Option<f32>) -> Result<()>;

    fn get_layout(&self, node: u32) -> Result<ComputedLayout>;

    fn get_child_count(&self, node: u32) -> Result<usize>;
}
