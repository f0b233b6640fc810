//! Engine double for tests: a real taffy tree behind a shared handle that
//! also records every mutation as `"op arg arg"`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Result;

use super::taffy_tree::TaffyLayoutTree;
use super::tree::LayoutTree;
use super::types::{ComputedLayout, LayoutStyle};

#[derive(Default)]
struct Inner {
    tree: TaffyLayoutTree,
    calls: Vec<String>,
}

/// Clones share one engine and one call log.
#[derive(Clone, Default)]
pub(crate) struct RecordingLayoutTree {
    inner: Rc<RefCell<Inner>>,
}

impl RecordingLayoutTree {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Calls recorded since the last take.
    pub(crate) fn take_calls(&self) -> Vec<String> {
        std::mem::take(&mut self.inner.borrow_mut().calls)
    }

    fn call<T>(&self, entry: String, f: impl FnOnce(&mut TaffyLayoutTree) -> Result<T>) -> Result<T> {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(entry);
        f(&mut inner.tree)
    }
}

impl LayoutTree for RecordingLayoutTree {
    fn create_node(&mut self, style: &LayoutStyle) -> Result<u32> {
        self.call("createNode".to_string(), |t| t.create_node(style))
    }

    fn insert_child(&mut self, parent: u32, child: u32, index: usize) -> Result<()> {
        self.call(format!("insertChild {parent} {child} {index}"), |t| {
            t.insert_child(parent, child, index)
        })
    }

    fn remove_child(&mut self, parent: u32, child: u32) -> Result<()> {
        self.call(format!("removeChild {parent} {child}"), |t| t.remove_child(parent, child))
    }

    fn remove_node(&mut self, node: u32) -> Result<()> {
        self.call(format!("removeNode {node}"), |t| t.remove_node(node))
    }

    fn set_style(&mut self, node: u32, style: &LayoutStyle) -> Result<()> {
        self.call(format!("setStyle {node}"), |t| t.set_style(node, style))
    }

    fn set_text_dimensions(&mut self, node: u32, width: f32, height: f32) -> Result<()> {
        self.call(format!("setTextDims {node} {width} {height}"), |t| {
            t.set_text_dimensions(node, width, height)
        })
    }

    fn mark_dirty(&mut self, node: u32) -> Result<()> {
        self.call(format!("markDirty {node}"), |t| t.mark_dirty(node))
    }

    fn set_display_none(&mut self, node: u32) -> Result<()> {
        self.call(format!("setDisplayNone {node}"), |t| t.set_display_none(node))
    }

    fn set_display_flex(&mut self, node: u32) -> Result<()> {
        self.call(format!("setDisplayFlex {node}"), |t| t.set_display_flex(node))
    }

    fn compute_layout(&mut self, root: u32, width: f32, height: Option<f32>) -> Result<()> {
        self.call(format!("computeLayout {root} {width}"), |t| {
            t.compute_layout(root, width, height)
        })
    }

    fn get_layout(&self, node: u32) -> Result<ComputedLayout> {
        self.inner.borrow().tree.get_layout(node)
    }

    fn get_child_count(&self, node: u32) -> Result<usize> {
        self.inner.borrow().tree.get_child_count(node)
    }
}
