//! Taffy-backed [`LayoutTree`].
//!
//! Converts [`LayoutStyle`] records into Taffy styles, keeps a stable
//! `u32 -> NodeId` map, and answers text measurement from the fixed size
//! stored on each text node.

use std::collections::HashMap;

use taffy::{
    AlignContent as TaffyAlignContent, AlignItems as TaffyAlignItems, AvailableSpace,
    Dimension as TaffyDimension, Display as TaffyDisplay, FlexDirection as TaffyFlexDirection,
    FlexWrap as TaffyFlexWrap, JustifyContent as TaffyJustifyContent, Layout, LengthPercentage,
    LengthPercentageAuto, NodeId, Overflow as TaffyOverflow, Point, Position as TaffyPosition,
    Rect, Size, Style, TaffyTree,
};

use crate::error::{Error, Result};
use crate::types::{
    AlignContent, AlignItems, AlignSelf, Display, FlexDirection, FlexWrap, JustifyContent,
    Overflow, Position,
};

use super::tree::LayoutTree;
use super::types::{ComputedLayout, DimensionUnit, Edges, LayoutDimension, LayoutStyle};

/// Fixed intrinsic size of a text node.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextContext {
    pub width: f32,
    pub height: f32,
}

// =============================================================================
// DIMENSION CONVERSION
// =============================================================================

fn to_taffy_dimension(dim: LayoutDimension) -> TaffyDimension {
    match dim.unit {
        DimensionUnit::Px => TaffyDimension::Length(dim.value),
        DimensionUnit::Percent => TaffyDimension::Percent(dim.value / 100.0),
        DimensionUnit::Auto => TaffyDimension::Auto,
    }
}

fn to_taffy_margin(edges: Edges) -> Rect<LengthPercentageAuto> {
    Rect {
        top: LengthPercentageAuto::Length(edges.top),
        right: LengthPercentageAuto::Length(edges.right),
        bottom: LengthPercentageAuto::Length(edges.bottom),
        left: LengthPercentageAuto::Length(edges.left),
    }
}

/// Padding and border have no `auto`.
fn to_taffy_inset(edges: Edges) -> Rect<LengthPercentage> {
    Rect {
        top: LengthPercentage::Length(edges.top),
        right: LengthPercentage::Length(edges.right),
        bottom: LengthPercentage::Length(edges.bottom),
        left: LengthPercentage::Length(edges.left),
    }
}

// =============================================================================
// ENUM CONVERSIONS
// =============================================================================

fn to_taffy_flex_direction(dir: FlexDirection) -> TaffyFlexDirection {
    match dir {
        FlexDirection::Row => TaffyFlexDirection::Row,
        FlexDirection::Column => TaffyFlexDirection::Column,
        FlexDirection::RowReverse => TaffyFlexDirection::RowReverse,
        FlexDirection::ColumnReverse => TaffyFlexDirection::ColumnReverse,
    }
}

fn to_taffy_flex_wrap(wrap: FlexWrap) -> TaffyFlexWrap {
    match wrap {
        FlexWrap::NoWrap => TaffyFlexWrap::NoWrap,
        FlexWrap::Wrap => TaffyFlexWrap::Wrap,
        FlexWrap::WrapReverse => TaffyFlexWrap::WrapReverse,
    }
}

fn to_taffy_justify_content(justify: JustifyContent) -> TaffyJustifyContent {
    match justify {
        JustifyContent::FlexStart => TaffyJustifyContent::FlexStart,
        JustifyContent::Center => TaffyJustifyContent::Center,
        JustifyContent::FlexEnd => TaffyJustifyContent::FlexEnd,
        JustifyContent::SpaceBetween => TaffyJustifyContent::SpaceBetween,
        JustifyContent::SpaceAround => TaffyJustifyContent::SpaceAround,
        JustifyContent::SpaceEvenly => TaffyJustifyContent::SpaceEvenly,
    }
}

fn to_taffy_align_items(align: AlignItems) -> TaffyAlignItems {
    match align {
        AlignItems::Stretch => TaffyAlignItems::Stretch,
        AlignItems::FlexStart => TaffyAlignItems::FlexStart,
        AlignItems::Center => TaffyAlignItems::Center,
        AlignItems::FlexEnd => TaffyAlignItems::FlexEnd,
        AlignItems::Baseline => TaffyAlignItems::Baseline,
    }
}

fn to_taffy_align_self(align: AlignSelf) -> Option<TaffyAlignItems> {
    match align {
        AlignSelf::Auto => None,
        AlignSelf::Stretch => Some(TaffyAlignItems::Stretch),
        AlignSelf::FlexStart => Some(TaffyAlignItems::FlexStart),
        AlignSelf::Center => Some(TaffyAlignItems::Center),
        AlignSelf::FlexEnd => Some(TaffyAlignItems::FlexEnd),
        AlignSelf::Baseline => Some(TaffyAlignItems::Baseline),
    }
}

fn to_taffy_align_content(align: AlignContent) -> TaffyAlignContent {
    match align {
        AlignContent::Stretch => TaffyAlignContent::Stretch,
        AlignContent::FlexStart => TaffyAlignContent::FlexStart,
        AlignContent::Center => TaffyAlignContent::Center,
        AlignContent::FlexEnd => TaffyAlignContent::FlexEnd,
        AlignContent::SpaceBetween => TaffyAlignContent::SpaceBetween,
        AlignContent::SpaceAround => TaffyAlignContent::SpaceAround,
        AlignContent::SpaceEvenly => TaffyAlignContent::SpaceEvenly,
    }
}

fn to_taffy_overflow(overflow: Overflow) -> TaffyOverflow {
    match overflow {
        Overflow::Visible => TaffyOverflow::Visible,
        Overflow::Hidden => TaffyOverflow::Hidden,
    }
}

fn to_taffy_display(display: Display) -> TaffyDisplay {
    match display {
        Display::Flex => TaffyDisplay::Flex,
        Display::None => TaffyDisplay::None,
    }
}

fn to_taffy_position(position: Position) -> TaffyPosition {
    match position {
        Position::Relative => TaffyPosition::Relative,
        Position::Absolute => TaffyPosition::Absolute,
    }
}

// =============================================================================
// STYLE BUILDING
// =============================================================================

/// Build a Taffy style. Unset fields keep `Style::default()`.
pub fn to_taffy_style(layout: &LayoutStyle) -> Style {
    let mut style = Style::default();

    if let Some(position) = layout.position {
        style.position = to_taffy_position(position);
    }
    if let Some(display) = layout.display {
        style.display = to_taffy_display(display);
    }
    if let Some(overflow) = layout.overflow {
        let overflow = to_taffy_overflow(overflow);
        style.overflow = Point {
            x: overflow,
            y: overflow,
        };
    }

    if let Some(dim) = layout.width {
        style.size.width = to_taffy_dimension(dim);
    }
    if let Some(dim) = layout.height {
        style.size.height = to_taffy_dimension(dim);
    }
    if let Some(dim) = layout.min_width {
        style.min_size.width = to_taffy_dimension(dim);
    }
    if let Some(dim) = layout.min_height {
        style.min_size.height = to_taffy_dimension(dim);
    }
    if let Some(dim) = layout.max_width {
        style.max_size.width = to_taffy_dimension(dim);
    }
    if let Some(dim) = layout.max_height {
        style.max_size.height = to_taffy_dimension(dim);
    }

    if let Some(dir) = layout.flex_direction {
        style.flex_direction = to_taffy_flex_direction(dir);
    }
    if let Some(wrap) = layout.flex_wrap {
        style.flex_wrap = to_taffy_flex_wrap(wrap);
    }
    if let Some(grow) = layout.flex_grow {
        style.flex_grow = grow;
    }
    if let Some(shrink) = layout.flex_shrink {
        style.flex_shrink = shrink;
    }
    if let Some(basis) = layout.flex_basis {
        style.flex_basis = to_taffy_dimension(basis);
    }

    if let Some(align) = layout.align_items {
        style.align_items = Some(to_taffy_align_items(align));
    }
    if let Some(align) = layout.align_self {
        style.align_self = to_taffy_align_self(align);
    }
    if let Some(align) = layout.align_content {
        style.align_content = Some(to_taffy_align_content(align));
    }
    if let Some(justify) = layout.justify_content {
        style.justify_content = Some(to_taffy_justify_content(justify));
    }

    if let Some(edges) = layout.margin {
        style.margin = to_taffy_margin(edges);
    }
    if let Some(edges) = layout.padding {
        style.padding = to_taffy_inset(edges);
    }
    if let Some(edges) = layout.border {
        style.border = to_taffy_inset(edges);
    }

    if let Some(gap) = layout.gap {
        style.gap = Size {
            width: LengthPercentage::Length(gap),
            height: LengthPercentage::Length(gap),
        };
    }
    if let Some(gap) = layout.column_gap {
        style.gap.width = LengthPercentage::Length(gap);
    }
    if let Some(gap) = layout.row_gap {
        style.gap.height = LengthPercentage::Length(gap);
    }

    style
}

fn from_taffy_layout(layout: &Layout) -> ComputedLayout {
    ComputedLayout {
        x: layout.location.x,
        y: layout.location.y,
        width: layout.size.width,
        height: layout.size.height,
        padding: Edges {
            top: layout.padding.top,
            right: layout.padding.right,
            bottom: layout.padding.bottom,
            left: layout.padding.left,
        },
        border: Edges {
            top: layout.border.top,
            right: layout.border.right,
            bottom: layout.border.bottom,
            left: layout.border.left,
        },
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// [`LayoutTree`] over a `TaffyTree`.
pub struct TaffyLayoutTree {
    tree: TaffyTree<TextContext>,
    nodes: HashMap<u32, NodeId>,
    next_id: u32,
}

impl Default for TaffyLayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TaffyLayoutTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaffyLayoutTree")
            .field("nodes", &self.nodes.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl TaffyLayoutTree {
    pub fn new() -> Self {
        Self {
            tree: TaffyTree::new(),
            nodes: HashMap::new(),
            next_id: 0,
        }
    }

    /// Number of live engine nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn taffy_id(&self, node: u32) -> Result<NodeId> {
        self.nodes
            .get(&node)
            .copied()
            .ok_or(Error::UnknownLayoutNode(node))
    }

    fn set_display(&mut self, node: u32, display: TaffyDisplay) -> Result<()> {
        let id = self.taffy_id(node)?;
        let mut style = self.tree.style(id)?.clone();
        style.display = display;
        self.tree.set_style(id, style)?;
        Ok(())
    }
}

impl LayoutTree for TaffyLayoutTree {
    fn create_node(&mut self, style: &LayoutStyle) -> Result<u32> {
        let taffy_id = self.tree.new_leaf(to_taffy_style(style))?;
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(id, taffy_id);
        Ok(id)
    }

    fn insert_child(&mut self, parent: u32, child: u32, index: usize) -> Result<()> {
        let parent_id = self.taffy_id(parent)?;
        let child_id = self.taffy_id(child)?;
        self.tree.insert_child_at_index(parent_id, index, child_id)?;
        Ok(())
    }

    fn remove_child(&mut self, parent: u32, child: u32) -> Result<()> {
        let parent_id = self.taffy_id(parent)?;
        let child_id = self.taffy_id(child)?;
        self.tree.remove_child(parent_id, child_id)?;
        Ok(())
    }

    fn remove_node(&mut self, node: u32) -> Result<()> {
        let id = self.taffy_id(node)?;
        self.tree.remove(id)?;
        self.nodes.remove(&node);
        Ok(())
    }

    fn set_style(&mut self, node: u32, style: &LayoutStyle) -> Result<()> {
        let id = self.taffy_id(node)?;
        self.tree.set_style(id, to_taffy_style(style))?;
        Ok(())
    }

    fn set_text_dimensions(&mut self, node: u32, width: f32, height: f32) -> Result<()> {
        let id = self.taffy_id(node)?;
        self.tree
            .set_node_context(id, Some(TextContext { width, height }))?;
        self.tree.mark_dirty(id)?;
        Ok(())
    }

    fn mark_dirty(&mut self, node: u32) -> Result<()> {
        let id = self.taffy_id(node)?;
        self.tree.mark_dirty(id)?;
        Ok(())
    }

    fn set_display_none(&mut self, node: u32) -> Result<()> {
        self.set_display(node, TaffyDisplay::None)
    }

    fn set_display_flex(&mut self, node: u32) -> Result<()> {
        self.set_display(node, TaffyDisplay::Flex)
    }

    fn compute_layout(&mut self, root: u32, width: f32, height: Option<f32>) -> Result<()> {
        let root_id = self.taffy_id(root)?;
        let available = Size {
            width: AvailableSpace::Definite(width),
            height: height.map_or(AvailableSpace::MaxContent, AvailableSpace::Definite),
        };

        self.tree.compute_layout_with_measure(
            root_id,
            available,
            |_known, _available, _node_id, context: Option<&mut TextContext>, _style| {
                context.map_or(Size::ZERO, |ctx| Size {
                    width: ctx.width,
                    height: ctx.height,
                })
            },
        )?;
        Ok(())
    }

    fn get_layout(&self, node: u32) -> Result<ComputedLayout> {
        let id = self.taffy_id(node)?;
        Ok(from_taffy_layout(self.tree.layout(id)?))
    }

    fn get_child_count(&self, node: u32) -> Result<usize> {
        let id = self.taffy_id(node)?;
        Ok(self.tree.children(id)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column() -> LayoutStyle {
        LayoutStyle {
            flex_direction: Some(FlexDirection::Column),
            ..Default::default()
        }
    }

    fn column_of_width(width: f32) -> LayoutStyle {
        LayoutStyle {
            width: Some(LayoutDimension::px(width)),
            ..column()
        }
    }

    #[test]
    fn ids_are_monotonic_and_never_reused() {
        let mut tree = TaffyLayoutTree::new();
        let a = tree.create_node(&LayoutStyle::default()).unwrap();
        let b = tree.create_node(&LayoutStyle::default()).unwrap();
        tree.remove_node(a).unwrap();
        let c = tree.create_node(&LayoutStyle::default()).unwrap();
        assert_eq!((a, b, c), (0, 1, 2));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut tree = TaffyLayoutTree::new();
        assert!(matches!(
            tree.mark_dirty(7),
            Err(Error::UnknownLayoutNode(7))
        ));
        assert!(tree.get_layout(3).is_err());
    }

    #[test]
    fn text_dimensions_size_leaf_nodes() {
        let mut tree = TaffyLayoutTree::new();
        let root = tree.create_node(&column_of_width(80.0)).unwrap();
        let text = tree.create_node(&LayoutStyle::default()).unwrap();
        tree.insert_child(root, text, 0).unwrap();
        tree.set_text_dimensions(text, 11.0, 2.0).unwrap();

        tree.compute_layout(root, 80.0, None).unwrap();

        let root_layout = tree.get_layout(root).unwrap();
        assert_eq!(root_layout.width, 80.0);
        assert_eq!(root_layout.height, 2.0);
        let text_layout = tree.get_layout(text).unwrap();
        assert_eq!(text_layout.height, 2.0);
    }

    #[test]
    fn insert_child_respects_index() {
        let mut tree = TaffyLayoutTree::new();
        let root = tree.create_node(&LayoutStyle::default()).unwrap();
        let first = tree.create_node(&LayoutStyle::default()).unwrap();
        let second = tree.create_node(&LayoutStyle::default()).unwrap();
        tree.set_text_dimensions(first, 3.0, 1.0).unwrap();
        tree.set_text_dimensions(second, 5.0, 1.0).unwrap();

        tree.insert_child(root, first, 0).unwrap();
        tree.insert_child(root, second, 0).unwrap();
        tree.compute_layout(root, 20.0, None).unwrap();

        assert_eq!(tree.get_child_count(root).unwrap(), 2);
        assert_eq!(tree.get_layout(second).unwrap().x, 0.0);
        assert_eq!(tree.get_layout(first).unwrap().x, 5.0);

        tree.remove_child(root, second).unwrap();
        assert_eq!(tree.get_child_count(root).unwrap(), 1);
    }

    #[test]
    fn padding_and_border_are_reported() {
        let mut tree = TaffyLayoutTree::new();
        let style = LayoutStyle {
            width: Some(LayoutDimension::px(10.0)),
            padding: Some(Edges {
                left: 2.0,
                ..Edges::ZERO
            }),
            border: Some(Edges::all(1.0)),
            ..Default::default()
        };
        let node = tree.create_node(&style).unwrap();
        tree.compute_layout(node, 80.0, None).unwrap();

        let layout = tree.get_layout(node).unwrap();
        assert_eq!(layout.width, 10.0);
        assert_eq!(layout.height, 2.0);
        assert_eq!(layout.padding.left, 2.0);
        assert_eq!(layout.border.top, 1.0);
    }

    #[test]
    fn display_toggles_keep_the_rest_of_the_style() {
        let mut tree = TaffyLayoutTree::new();
        let root = tree.create_node(&column()).unwrap();
        let child = tree
            .create_node(&LayoutStyle {
                height: Some(LayoutDimension::px(3.0)),
                ..Default::default()
            })
            .unwrap();
        tree.insert_child(root, child, 0).unwrap();

        tree.set_display_none(child).unwrap();
        tree.compute_layout(root, 10.0, None).unwrap();
        assert_eq!(tree.get_layout(root).unwrap().height, 0.0);

        tree.set_display_flex(child).unwrap();
        tree.compute_layout(root, 10.0, None).unwrap();
        assert_eq!(tree.get_layout(root).unwrap().height, 3.0);
    }

    #[test]
    fn percent_dimensions_scale_to_parent() {
        let mut tree = TaffyLayoutTree::new();
        let root = tree
            .create_node(&LayoutStyle {
                width: Some(LayoutDimension::px(40.0)),
                ..Default::default()
            })
            .unwrap();
        let child = tree
            .create_node(&LayoutStyle {
                width: Some(LayoutDimension::percent(50.0)),
                ..Default::default()
            })
            .unwrap();
        tree.insert_child(root, child, 0).unwrap();
        tree.compute_layout(root, 80.0, None).unwrap();
        assert_eq!(tree.get_layout(child).unwrap().width, 20.0);
    }
}
