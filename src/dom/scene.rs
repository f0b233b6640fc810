//! The retained scene graph.
//!
//! Nodes live in a slotmap arena owned by the [`Scene`]. Ownership runs
//! parent → children through `children` lists; `parent` links are plain ids
//! used for navigation. Every structural change is mirrored into the layout
//! engine in the same call.

use serde_json::json;
use slotmap::{Key, SlotMap};

use crate::error::{Error, Result};
use crate::layout::taffy_tree::TaffyLayoutTree;
use crate::layout::text_measure::TextMeasurer;
use crate::layout::tree::LayoutTree;
use crate::layout::types::LayoutStyle;
use crate::style::{Styles, to_layout_style};
use crate::trace::{Category, TraceLog};
use crate::types::Display;

use super::node::{
    Accessibility, AttributeValue, ElementName, Node, NodeId, NodeKind, Transform,
};

/// Attribute that marks a node as the static (append-only) subtree.
pub const STATIC_ATTRIBUTE: &str = "internal_static";

/// A tree of box and text nodes, optionally bound to a layout engine.
pub struct Scene<L = TaffyLayoutTree> {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
    layout: Option<L>,
    static_node: Option<NodeId>,
    static_dirty: bool,
    measurer: TextMeasurer,
    trace: TraceLog,
}

fn key(id: NodeId) -> u64 {
    id.data().as_ffi()
}

impl<L: LayoutTree> Scene<L> {
    /// A scene bound to `layout`. Every Root, Box and Text node gets an
    /// engine node at creation.
    pub fn new(mut layout: L, trace: TraceLog) -> Result<Self> {
        let root_layout = layout.create_node(&LayoutStyle::default())?;
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::element(ElementName::Root, Some(root_layout)));
        Ok(Self::assemble(nodes, root, Some(layout), trace))
    }

    /// A logical-only scene: no node ever gets a layout id.
    pub fn unbound(trace: TraceLog) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::element(ElementName::Root, None));
        Self::assemble(nodes, root, None, trace)
    }

    fn assemble(
        nodes: SlotMap<NodeId, Node>,
        root: NodeId,
        layout: Option<L>,
        trace: TraceLog,
    ) -> Self {
        Self {
            nodes,
            root,
            layout,
            static_node: None,
            static_dirty: false,
            measurer: TextMeasurer::new(trace.clone()),
            trace,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of `id`; empty for leaves and unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.nodes.get(id) {
            Some(node) => node.children(),
            None => &[],
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    pub fn layout_id(&self, id: NodeId) -> Option<u32> {
        self.nodes.get(id)?.layout_id
    }

    pub fn is_bound(&self) -> bool {
        self.layout.is_some()
    }

    pub fn layout(&self) -> Option<&L> {
        self.layout.as_ref()
    }

    pub fn layout_mut(&mut self) -> Option<&mut L> {
        self.layout.as_mut()
    }

    pub fn measurer(&self) -> &TextMeasurer {
        &self.measurer
    }

    pub fn trace(&self) -> &TraceLog {
        &self.trace
    }

    /// Root of the static subtree, if one was designated.
    pub fn static_node(&self) -> Option<NodeId> {
        self.static_node
    }

    pub fn is_static_dirty(&self) -> bool {
        self.static_dirty
    }

    pub(crate) fn set_static_dirty(&mut self, dirty: bool) {
        self.static_dirty = dirty;
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(Error::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id).ok_or(Error::UnknownNode(id))
    }

    fn element_name(&self, id: NodeId) -> Result<ElementName> {
        self.node(id)?.name().ok_or(Error::NotAnElement(id))
    }

    fn record(&self, op: &str, fields: serde_json::Value) {
        if self.trace.enabled() {
            self.trace.log(Category::Dom, op, fields);
        }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Create a detached element.
    pub fn create_node(&mut self, name: ElementName) -> Result<NodeId> {
        let layout_id = match self.layout.as_mut() {
            Some(layout) if name.has_layout() => Some(layout.create_node(&LayoutStyle::default())?),
            _ => None,
        };
        let id = self.nodes.insert(Node::element(name, layout_id));
        self.record(
            "createNode",
            json!({ "node": key(id), "name": format!("{name:?}"), "layoutId": layout_id }),
        );
        Ok(id)
    }

    /// Create a detached `#text` leaf.
    pub fn create_text_node(&mut self, text: &str) -> NodeId {
        let id = self.nodes.insert(Node::text(text.to_string()));
        self.record("createTextNode", json!({ "node": key(id), "len": text.len() }));
        id
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Move `child` to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_insert(parent, child)?;
        self.detach(child)?;
        let index = self.children(parent).len();
        self.attach(parent, child, index)?;
        self.record("appendChild", json!({ "parent": key(parent), "child": key(child) }));
        Ok(())
    }

    /// Move `child` before `before` among `parent`'s children. Appends when
    /// `before` is not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, before: NodeId) -> Result<()> {
        self.check_insert(parent, child)?;
        self.detach(child)?;
        let siblings = self.children(parent);
        let index = siblings
            .iter()
            .position(|&c| c == before)
            .unwrap_or(siblings.len());
        self.attach(parent, child, index)?;
        self.record(
            "insertBefore",
            json!({ "parent": key(parent), "child": key(child), "before": key(before) }),
        );
        Ok(())
    }

    /// Detach `child` from `parent`. A child that is not under `parent` is
    /// left alone.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_layout = self.node(parent)?.layout_id;
        let child_node = self.node(child)?;
        let child_layout = child_node.layout_id;
        if child_node.parent != Some(parent) {
            tracing::debug!(?parent, ?child, "remove_child: not a child, ignoring");
            return Ok(());
        }

        if let (Some(layout), Some(p), Some(c)) = (self.layout.as_mut(), parent_layout, child_layout)
        {
            layout.remove_child(p, c)?;
        }

        self.node_mut(child)?.parent = None;
        if let Some(children) = self.node_mut(parent)?.children_mut() {
            if let Some(pos) = children.iter().position(|&c| c == child) {
                children.remove(pos);
            }
        }

        self.mark_text_parent_dirty(parent)?;
        self.touch_static(parent);
        self.record("removeChild", json!({ "parent": key(parent), "child": key(child) }));
        Ok(())
    }

    /// Detach `id` and release it and its whole subtree, engine slots
    /// included. Destroying the root empties it instead.
    pub fn destroy(&mut self, id: NodeId) -> Result<()> {
        self.node(id)?;
        if id == self.root {
            for child in self.children(id).to_vec() {
                self.destroy(child)?;
            }
            return Ok(());
        }

        if let Some(parent) = self.parent(id) {
            self.remove_child(parent, id)?;
        }

        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            order.push(next);
            stack.extend_from_slice(self.children(next));
        }

        // Children before parents.
        for next in order.into_iter().rev() {
            let Some(node) = self.nodes.remove(next) else {
                continue;
            };
            if let (Some(layout), Some(layout_id)) = (self.layout.as_mut(), node.layout_id) {
                layout.remove_node(layout_id)?;
            }
            if self.static_node == Some(next) {
                self.static_node = None;
                self.static_dirty = false;
            }
        }

        self.record("destroy", json!({ "node": key(id) }));
        Ok(())
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_name = self.element_name(parent)?;
        let child_node = self.node(child)?;
        if parent_name.is_text() && child_node.name() == Some(ElementName::Box) {
            return Err(Error::BoxInsideText { parent, child });
        }
        if child == self.root {
            return Err(Error::Cycle { parent, child });
        }

        let mut current = Some(parent);
        while let Some(id) = current {
            if id == child {
                return Err(Error::Cycle { parent, child });
            }
            current = self.parent(id);
        }
        Ok(())
    }

    fn detach(&mut self, child: NodeId) -> Result<()> {
        match self.parent(child) {
            Some(old) => self.remove_child(old, child),
            None => Ok(()),
        }
    }

    /// Splice a detached `child` in at `index` and mirror it into the engine.
    fn attach(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<()> {
        let parent_layout = self.node(parent)?.layout_id;
        let child_layout = self.node(child)?.layout_id;

        // Engine position: siblings ahead of `index` that own engine nodes.
        let layout_index = self.children(parent)[..index]
            .iter()
            .filter(|&&c| self.layout_id(c).is_some())
            .count();

        if let Some(children) = self.node_mut(parent)?.children_mut() {
            children.insert(index, child);
        }
        self.node_mut(child)?.parent = Some(parent);

        if let (Some(layout), Some(p), Some(c)) = (self.layout.as_mut(), parent_layout, child_layout)
        {
            layout.insert_child(p, c, layout_index)?;
        }

        self.touch_static(parent);
        self.mark_text_parent_dirty(parent)
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Set an attribute. `internal_static` designates the static subtree.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<()> {
        let value = value.into();
        let truthy = value.is_truthy();
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element(el) => {
                el.attributes.insert(name.to_string(), value);
            }
            NodeKind::Text(_) => return Err(Error::NotAnElement(id)),
        }

        if name == STATIC_ATTRIBUTE {
            if truthy {
                self.static_node = Some(id);
                self.static_dirty = true;
            } else if self.static_node == Some(id) {
                self.static_node = None;
            }
        }
        self.record("setAttribute", json!({ "node": key(id), "name": name }));
        Ok(())
    }

    /// Replace the node's style and push the layout part to the engine.
    pub fn set_style(&mut self, id: NodeId, style: Styles) -> Result<()> {
        self.replace_style(id, style)?;
        self.touch_static(id);
        self.record("setStyle", json!({ "node": key(id) }));
        Ok(())
    }

    /// Store `style` and push it to the engine, leaving static state alone.
    pub(crate) fn replace_style(&mut self, id: NodeId, style: Styles) -> Result<()> {
        let node = self.node_mut(id)?;
        let layout_id = node.layout_id;
        let layout_style = to_layout_style(&style);
        node.style = style;

        if let (Some(layout), Some(layout_id)) = (self.layout.as_mut(), layout_id) {
            layout.set_style(layout_id, &layout_style)?;
        }
        Ok(())
    }

    /// Replace a text leaf's value and dirty its nearest engine owner.
    pub fn set_text_value(&mut self, id: NodeId, text: &str) -> Result<()> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Text(value) => {
                value.clear();
                value.push_str(text);
            }
            NodeKind::Element(_) => return Err(Error::NotATextNode(id)),
        }
        self.mark_dirty(id)?;
        self.touch_static(id);
        self.record("setTextValue", json!({ "node": key(id), "len": text.len() }));
        Ok(())
    }

    pub fn set_accessibility(&mut self, id: NodeId, accessibility: Accessibility) -> Result<()> {
        self.node_mut(id)?.accessibility = accessibility;
        Ok(())
    }

    /// Install (or clear) the paint-time text transformer.
    pub fn set_transform(&mut self, id: NodeId, transform: Option<Transform>) -> Result<()> {
        self.node_mut(id)?.transform = transform;
        Ok(())
    }

    /// Hide a node and its subtree.
    pub fn set_display_none(&mut self, id: NodeId) -> Result<()> {
        self.set_display(id, Display::None)
    }

    pub fn set_display_flex(&mut self, id: NodeId) -> Result<()> {
        self.set_display(id, Display::Flex)
    }

    fn set_display(&mut self, id: NodeId, display: Display) -> Result<()> {
        let node = self.node_mut(id)?;
        node.style.display = Some(display);
        let layout_id = node.layout_id;

        if let (Some(layout), Some(layout_id)) = (self.layout.as_mut(), layout_id) {
            match display {
                Display::None => layout.set_display_none(layout_id)?,
                Display::Flex => layout.set_display_flex(layout_id)?,
            }
        }
        Ok(())
    }

    // =========================================================================
    // Dirtiness
    // =========================================================================

    /// Engine id of the closest node, starting at `id` and walking up, that
    /// owns one. Detached nodes have none.
    pub fn find_nearest_layout_owner(&self, id: NodeId) -> Option<u32> {
        let mut current = id;
        loop {
            let node = self.nodes.get(current)?;
            let parent = node.parent?;
            if let Some(layout_id) = node.layout_id {
                return Some(layout_id);
            }
            current = parent;
        }
    }

    /// Mark the nearest engine owner of `id` dirty.
    pub fn mark_dirty(&mut self, id: NodeId) -> Result<()> {
        let Some(layout_id) = self.find_nearest_layout_owner(id) else {
            return Ok(());
        };
        if let Some(layout) = self.layout.as_mut() {
            layout.mark_dirty(layout_id)?;
        }
        Ok(())
    }

    /// Flag the static subtree for repaint when `id` lies inside it.
    fn touch_static(&mut self, id: NodeId) {
        let Some(static_node) = self.static_node else {
            return;
        };
        let mut current = Some(id);
        while let Some(next) = current {
            if next == static_node {
                self.static_dirty = true;
                return;
            }
            current = self.parent(next);
        }
    }

    fn mark_text_parent_dirty(&mut self, parent: NodeId) -> Result<()> {
        if self.element_name(parent)?.is_text() {
            self.mark_dirty(parent)?;
        }
        Ok(())
    }
}

impl<L> std::fmt::Debug for Scene<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("nodes", &self.nodes.len())
            .field("root", &self.root)
            .field("bound", &self.layout.is_some())
            .field("static_node", &self.static_node)
            .field("static_dirty", &self.static_dirty)
            .finish()
    }
}
