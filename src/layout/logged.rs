//! Tracing decorator for any [`LayoutTree`].

use std::time::Instant;

use serde_json::json;

use crate::error::Result;
use crate::trace::{Category, TraceLog};

use super::tree::LayoutTree;
use super::types::{ComputedLayout, LayoutStyle};

/// Forwards every call to the wrapped engine and records mutations in the
/// trace log. Reads and display toggles are not recorded.
#[derive(Debug)]
pub struct LoggedLayoutTree<T> {
    inner: T,
    trace: TraceLog,
}

impl<T: LayoutTree> LoggedLayoutTree<T> {
    pub fn new(inner: T, trace: TraceLog) -> Self {
        Self { inner, trace }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    fn record(&self, op: &str, fields: serde_json::Value) {
        if self.trace.enabled() {
            self.trace.log(Category::Layout, op, fields);
        }
    }
}

impl<T: LayoutTree> LayoutTree for LoggedLayoutTree<T> {
    fn create_node(&mut self, style: &LayoutStyle) -> Result<u32> {
        let id = self.inner.create_node(style)?;
        self.record("createNode", json!({ "nodeId": id }));
        Ok(id)
    }

    fn insert_child(&mut self, parent: u32, child: u32, index: usize) -> Result<()> {
        self.inner.insert_child(parent, child, index)?;
        self.record(
            "insertChild",
            json!({ "parentId": parent, "childId": child, "index": index }),
        );
        Ok(())
    }

    fn remove_child(&mut self, parent: u32, child: u32) -> Result<()> {
        self.inner.remove_child(parent, child)?;
        self.record("removeChild", json!({ "parentId": parent, "childId": child }));
        Ok(())
    }

    fn remove_node(&mut self, node: u32) -> Result<()> {
        self.inner.remove_node(node)?;
        self.record("removeNode", json!({ "nodeId": node }));
        Ok(())
    }

    fn set_style(&mut self, node: u32, style: &LayoutStyle) -> Result<()> {
        self.inner.set_style(node, style)?;
        self.record("setStyle", json!({ "nodeId": node }));
        Ok(())
    }

    fn set_text_dimensions(&mut self, node: u32, width: f32, height: f32) -> Result<()> {
        self.inner.set_text_dimensions(node, width, height)?;
        self.record(
            "setTextDims",
            json!({ "nodeId": node, "width": width, "height": height }),
        );
        Ok(())
    }

    fn mark_dirty(&mut self, node: u32) -> Result<()> {
        self.inner.mark_dirty(node)?;
        self.record("markDirty", json!({ "nodeId": node }));
        Ok(())
    }

    fn set_display_none(&mut self, node: u32) -> Result<()> {
        self.inner.set_display_none(node)
    }

    fn set_display_flex(&mut self, node: u32) -> Result<()> {
        self.inner.set_display_flex(node)
    }

    fn compute_layout(&mut self, root: u32, width: f32, height: Option<f32>) -> Result<()> {
        let started = Instant::now();
        self.inner.compute_layout(root, width, height)?;
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        tracing::trace!(root, width, duration_ms, "layout computed");
        self.record(
            "computeLayout",
            json!({
                "rootId": root,
                "width": width,
                "height": height,
                "durationMs": duration_ms,
            }),
        );
        Ok(())
    }

    fn get_layout(&self, node: u32) -> Result<ComputedLayout> {
        self.inner.get_layout(node)
    }

    fn get_child_count(&self, node: u32) -> Result<usize> {
        self.inner.get_child_count(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::taffy_tree::TaffyLayoutTree;

    #[test]
    fn mutations_are_recorded_in_order() {
        let trace = TraceLog::memory();
        let mut tree = LoggedLayoutTree::new(TaffyLayoutTree::new(), trace.clone());

        let root = tree.create_node(&LayoutStyle::default()).unwrap();
        let text = tree.create_node(&LayoutStyle::default()).unwrap();
        tree.insert_child(root, text, 0).unwrap();
        tree.set_text_dimensions(text, 5.0, 1.0).unwrap();
        tree.set_display_none(text).unwrap();
        tree.compute_layout(root, 80.0, None).unwrap();

        let ops: Vec<String> = trace
            .records()
            .iter()
            .filter(|r| r["cat"] == "layout")
            .map(|r| r["op"].as_str().unwrap_or_default().to_string())
            .collect();
        assert_eq!(
            ops,
            ["createNode", "createNode", "insertChild", "setTextDims", "computeLayout"]
        );

        let compute = &trace.find("layout", "computeLayout")[0];
        assert_eq!(compute["rootId"], 0);
        assert!(compute["durationMs"].as_f64().is_some());
        assert!(compute["height"].is_null());
    }

    #[test]
    fn failed_calls_are_not_recorded() {
        let trace = TraceLog::memory();
        let mut tree = LoggedLayoutTree::new(TaffyLayoutTree::new(), trace.clone());
        assert!(tree.mark_dirty(42).is_err());
        assert!(trace.find("layout", "markDirty").is_empty());
    }
}
