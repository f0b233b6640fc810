//! Paints a laid-out scene into an [`Output`].
//!
//! Walks the tree depth-first carrying absolute offsets, the transformer
//! chain and the nearest Box background. Boxes paint their background and
//! border, then push a clip around their children when overflow is hidden.
//! Text elements paint their squashed, fitted text.

use crate::dom::{ElementName, NodeId, Scene, Transform};
use crate::error::Result;
use crate::layout::text_measure::widest_line;
use crate::layout::tree::LayoutTree;
use crate::layout::types::ComputedLayout;
use crate::types::Color;

use super::border::{render_background, render_border};
use super::output::{Clip, Output, WriteOptions};

/// Where a node sits, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeGeometry {
    /// The engine placed the node.
    Laid(ComputedLayout),
    /// No engine node: children are painted at the parent's offsets.
    PassThrough,
}

/// Geometry of `id`. Unbound scenes and VirtualText are pass-through.
pub fn node_geometry<L: LayoutTree>(scene: &Scene<L>, id: NodeId) -> Result<NodeGeometry> {
    match (scene.layout(), scene.layout_id(id)) {
        (Some(layout), Some(layout_id)) => Ok(NodeGeometry::Laid(layout.get_layout(layout_id)?)),
        _ => Ok(NodeGeometry::PassThrough),
    }
}

#[derive(Clone, Default)]
struct Context {
    offset_x: i32,
    offset_y: i32,
    transformers: Vec<Transform>,
    background: Option<Color>,
    skip_static: bool,
}

/// Paint `id` and its subtree. With `skip_static` the static subtree is
/// left out.
pub fn paint<L: LayoutTree>(
    scene: &Scene<L>,
    id: NodeId,
    output: &mut Output,
    skip_static: bool,
) -> Result<()> {
    let context = Context {
        skip_static,
        ..Default::default()
    };
    paint_node(scene, id, output, &context)
}

fn paint_node<L: LayoutTree>(
    scene: &Scene<L>,
    id: NodeId,
    output: &mut Output,
    context: &Context,
) -> Result<()> {
    let Some(node) = scene.get(id) else {
        return Ok(());
    };
    let Some(name) = node.name() else {
        return Ok(());
    };
    if context.skip_static && scene.static_node() == Some(id) {
        return Ok(());
    }
    if node.style().is_hidden() {
        return Ok(());
    }

    let mut context = context.clone();
    if let Some(transform) = node.transform() {
        context.transformers.insert(0, transform.clone());
    }

    let layout = match node_geometry(scene, id)? {
        NodeGeometry::Laid(layout) => layout,
        NodeGeometry::PassThrough => {
            if matches!(name, ElementName::Box | ElementName::Root) {
                for &child in scene.children(id) {
                    paint_node(scene, child, output, &context)?;
                }
            }
            return Ok(());
        }
    };

    let x = context.offset_x + layout.x.round() as i32;
    let y = context.offset_y + layout.y.round() as i32;
    let style = node.style();

    match name {
        ElementName::Text => paint_text(scene, id, output, x, y, &layout, &context),
        ElementName::VirtualText => Ok(()),
        ElementName::Box | ElementName::Root => {
            let mut clipped = false;
            if name == ElementName::Box {
                render_background(output, x, y, style, &layout);
                render_border(output, x, y, style, &layout);

                let (horizontal, vertical) = (style.clips_horizontally(), style.clips_vertically());
                if horizontal || vertical {
                    let (width, height) = (layout.width.round() as i32, layout.height.round() as i32);
                    let border = layout.border;
                    // Borders wider than the box leave an empty inner area.
                    let (left, top) = (x + border.left as i32, y + border.top as i32);
                    output.clip(Clip {
                        x1: horizontal.then_some(left),
                        x2: horizontal.then(|| (x + width - border.right as i32).max(left)),
                        y1: vertical.then_some(top),
                        y2: vertical.then(|| (y + height - border.bottom as i32).max(top)),
                    });
                    clipped = true;
                }
            }

            context.offset_x = x;
            context.offset_y = y;
            context.background = style.background_color.or(context.background);
            let result = scene
                .children(id)
                .iter()
                .try_for_each(|&child| paint_node(scene, child, output, &context));

            if clipped {
                output.unclip();
            }
            result
        }
    }
}

fn paint_text<L: LayoutTree>(
    scene: &Scene<L>,
    id: NodeId,
    output: &mut Output,
    x: i32,
    y: i32,
    layout: &ComputedLayout,
    context: &Context,
) -> Result<()> {
    let Some(node) = scene.get(id) else {
        return Ok(());
    };
    let mut text = scene.squash_text(id);
    if text.is_empty() {
        return Ok(());
    }

    let max_width = layout.content_width().floor() as usize;
    if widest_line(&text) > max_width {
        text = scene.measurer().wrap(&text, max_width, node.style().text_wrap());
    }

    // Nested layout children shift the text block by their own offset.
    if let Some(&first) = scene.children(id).first() {
        if let NodeGeometry::Laid(child) = node_geometry(scene, first)? {
            text = offset_text(&text, child.x.round() as usize, child.y.round() as usize);
        }
    }

    let options = WriteOptions {
        transformers: &context.transformers,
        style: node.style().text_cell_style(context.background),
    };
    output.write(x, y, &text, &options);
    Ok(())
}

/// Prefix `dy` blank lines and indent every non-blank line by `dx`.
fn offset_text(text: &str, dx: usize, dy: usize) -> String {
    let indent = " ".repeat(dx);
    let body = text
        .split('\n')
        .map(|line| {
            if dx > 0 && !line.trim().is_empty() {
                format!("{indent}{line}")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    "\n".repeat(dy) + &body
}
