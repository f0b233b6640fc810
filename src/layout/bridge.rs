//! Layout pass over a scene: feeds text sizes and resolved units into the
//! engine, sizes the root to the terminal and reads geometry back.
//!
//! The engine has no measure callbacks, so every Text node's size is pushed
//! in before [`LayoutTree::compute_layout`] runs.

use crate::config::TerminalSize;
use crate::dom::{ElementName, NodeId, Scene};
use crate::error::Result;
use crate::style::{Styles, to_layout_style};
use crate::types::{AlignItems, Dimension, FlexDirection, ViewportUnit};

use super::text_measure::Dimensions;
use super::tree::LayoutTree;
use super::types::{ComputedLayout, LayoutDimension};

/// Run a full layout pass for `size`.
pub fn calculate_layout<L: LayoutTree>(scene: &mut Scene<L>, size: TerminalSize) -> Result<()> {
    if !scene.is_bound() {
        return Ok(());
    }
    let _span = tracing::debug_span!("layout", columns = size.columns, rows = size.rows).entered();
    let columns = f32::from(size.columns);

    resolve_viewport_units(scene, size)?;
    pre_measure(scene, columns)?;

    let root = scene.root();
    let Some(root_layout) = scene.layout_id(root) else {
        return Ok(());
    };
    let mut root_style = scene.get(root).map(|node| to_layout_style(node.style())).unwrap_or_default();
    root_style.flex_direction = Some(FlexDirection::Column);
    root_style.align_items = Some(AlignItems::Stretch);
    if root_style.width.is_none() {
        root_style.width = Some(LayoutDimension::px(columns));
    }

    if let Some(layout) = scene.layout_mut() {
        layout.set_style(root_layout, &root_style)?;
        layout.compute_layout(root_layout, columns, None)?;
    }
    tracing::trace!(columns, "layout computed");
    Ok(())
}

/// Replace every viewport-relative dimension in the tree with whole cells
/// and push the changed styles to the engine.
pub fn resolve_viewport_units<L: LayoutTree>(scene: &mut Scene<L>, size: TerminalSize) -> Result<()> {
    let mut stack = vec![scene.root()];
    while let Some(id) = stack.pop() {
        let Some(node) = scene.get(id) else {
            continue;
        };
        if node.name().is_none() {
            continue;
        }
        stack.extend(scene.children(id).iter().copied());

        let style = node.style();
        if !style.has_viewport_units() {
            continue;
        }
        let resolved = resolve_style(style, size);
        scene.replace_style(id, resolved)?;
    }
    Ok(())
}

fn resolve_style(style: &Styles, size: TerminalSize) -> Styles {
    let mut resolved = style.clone();
    for field in [
        &mut resolved.width,
        &mut resolved.height,
        &mut resolved.min_width,
        &mut resolved.min_height,
        &mut resolved.max_width,
        &mut resolved.max_height,
        &mut resolved.flex_basis,
    ] {
        if let Some(dim) = field {
            *dim = resolve_dimension(*dim, size);
        }
    }
    resolved
}

/// `floor(value / 100 * basis)` cells for viewport units, unchanged otherwise.
pub fn resolve_dimension(dim: Dimension, size: TerminalSize) -> Dimension {
    let Dimension::Viewport(value, unit) = dim else {
        return dim;
    };
    let (columns, rows) = (f32::from(size.columns), f32::from(size.rows));
    let basis = match unit {
        ViewportUnit::Vw => columns,
        ViewportUnit::Vh => rows,
        ViewportUnit::Vmin => columns.min(rows),
        ViewportUnit::Vmax => columns.max(rows),
    };
    Dimension::Cells((value / 100.0 * basis).floor())
}

/// Push the size of every Text node, wrapped or truncated to the width its
/// nearest fixed-width ancestor leaves for it.
pub fn pre_measure<L: LayoutTree>(scene: &mut Scene<L>, max_width: f32) -> Result<()> {
    let mut pending: Vec<(u32, Dimensions)> = Vec::new();
    let mut stack = vec![(scene.root(), max_width)];

    while let Some((id, available)) = stack.pop() {
        let Some(node) = scene.get(id) else {
            continue;
        };
        let Some(name) = node.name() else {
            continue;
        };
        let style = node.style();
        let effective = match style.width.and_then(|width| width.cells()) {
            Some(width) => {
                let padding = style.padding_edges().unwrap_or_default();
                let border = if style.border_style.is_some() { 2.0 } else { 0.0 };
                (width - padding.left - padding.right - border).max(0.0)
            }
            None => available,
        };

        if let (ElementName::Text, Some(layout_id)) = (name, node.layout_id()) {
            pending.push((layout_id, measure_text_node(scene, id, effective)));
        }

        for &child in scene.children(id).iter().rev() {
            if scene.get(child).is_some_and(|c| c.name().is_some()) {
                stack.push((child, effective));
            }
        }
    }

    if let Some(layout) = scene.layout_mut() {
        for (layout_id, size) in pending {
            layout.set_text_dimensions(layout_id, size.width as f32, size.height as f32)?;
        }
    }
    Ok(())
}

fn measure_text_node<L: LayoutTree>(scene: &Scene<L>, id: NodeId, max_width: f32) -> Dimensions {
    let text = scene.squash_text(id);
    let measurer = scene.measurer();
    let size = measurer.measure(&text);
    if size.width as f32 <= max_width {
        return size;
    }
    let mode = scene.get(id).map(|node| node.style().text_wrap()).unwrap_or_default();
    let fitted = measurer.wrap(&text, max_width as usize, mode);
    measurer.measure(&fitted)
}

/// Geometry of `id`, or `None` when it has no engine node.
pub fn get_computed_layout<L: LayoutTree>(scene: &Scene<L>, id: NodeId) -> Result<Option<ComputedLayout>> {
    let (Some(layout), Some(layout_id)) = (scene.layout(), scene.layout_id(id)) else {
        return Ok(None);
    };
    Ok(Some(layout.get_layout(layout_id)?))
}

/// Laid-out width and height of `id`; zero when it has no geometry.
pub fn measure_element<L: LayoutTree>(scene: &Scene<L>, id: NodeId) -> Result<Dimensions> {
    Ok(get_computed_layout(scene, id)?
        .map(|layout| Dimensions {
            width: layout.width.round() as usize,
            height: layout.height.round() as usize,
        })
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::layout::recording::RecordingLayoutTree;
    use crate::layout::taffy_tree::TaffyLayoutTree;
    use crate::trace::TraceLog;
    use crate::types::{BorderStyle, TextWrap};

    fn text<L: LayoutTree>(scene: &mut Scene<L>, parent: NodeId, value: &str) -> NodeId {
        let node = scene.create_node(ElementName::Text).unwrap();
        let leaf = scene.create_text_node(value);
        scene.append_child(node, leaf).unwrap();
        scene.append_child(parent, node).unwrap();
        node
    }

    fn boxed<L: LayoutTree>(scene: &mut Scene<L>, parent: NodeId, style: Styles) -> NodeId {
        let node = scene.create_node(ElementName::Box).unwrap();
        scene.set_style(node, style).unwrap();
        scene.append_child(parent, node).unwrap();
        node
    }

    fn size(columns: u16, rows: u16) -> TerminalSize {
        TerminalSize { columns, rows }
    }

    #[test]
    fn viewport_units_floor_against_the_terminal() {
        let s = size(81, 25);
        assert_eq!(resolve_dimension(Dimension::Viewport(50.0, ViewportUnit::Vw), s), Dimension::Cells(40.0));
        assert_eq!(resolve_dimension(Dimension::Viewport(50.0, ViewportUnit::Vh), s), Dimension::Cells(12.0));
        assert_eq!(resolve_dimension(Dimension::Viewport(10.0, ViewportUnit::Vmin), s), Dimension::Cells(2.0));
        assert_eq!(resolve_dimension(Dimension::Viewport(10.0, ViewportUnit::Vmax), s), Dimension::Cells(8.0));
        assert_eq!(resolve_dimension(Dimension::Percent(50.0), s), Dimension::Percent(50.0));
    }

    #[test]
    fn resolved_units_are_written_back() {
        let engine = RecordingLayoutTree::new();
        let mut scene = Scene::new(engine.clone(), TraceLog::disabled()).unwrap();
        let root = scene.root();
        let panel = boxed(
            &mut scene,
            root,
            Styles {
                width: Some(Dimension::Viewport(50.0, ViewportUnit::Vw)),
                ..Default::default()
            },
        );
        let layout_id = scene.layout_id(panel).unwrap();
        engine.take_calls();

        resolve_viewport_units(&mut scene, size(80, 24)).unwrap();
        assert_eq!(scene.get(panel).unwrap().style().width, Some(Dimension::Cells(40.0)));
        assert_eq!(engine.take_calls(), vec![format!("setStyle {layout_id}")]);

        resolve_viewport_units(&mut scene, size(80, 24)).unwrap();
        assert!(engine.take_calls().is_empty());
    }

    #[test]
    fn pre_measure_pushes_text_sizes() {
        let engine = RecordingLayoutTree::new();
        let mut scene = Scene::new(engine.clone(), TraceLog::disabled()).unwrap();
        let root = scene.root();
        let label = text(&mut scene, root, "hello\nwide world");
        let layout_id = scene.layout_id(label).unwrap();
        engine.take_calls();

        pre_measure(&mut scene, 80.0).unwrap();
        assert_eq!(engine.take_calls(), vec![format!("setTextDims {layout_id} 10 2")]);
    }

    #[test]
    fn fixed_width_ancestors_narrow_the_text() {
        let engine = RecordingLayoutTree::new();
        let mut scene = Scene::new(engine.clone(), TraceLog::disabled()).unwrap();
        let root = scene.root();
        let panel = boxed(
            &mut scene,
            root,
            Styles {
                width: Some(Dimension::Cells(9.0)),
                padding_x: Some(1.0),
                border_style: Some(BorderStyle::Single),
                ..Default::default()
            },
        );
        let label = text(&mut scene, panel, "aaa bbb ccc");
        let layout_id = scene.layout_id(label).unwrap();
        engine.take_calls();

        // 9 - 1 - 1 - 2 leaves 5 columns: "aaa \nbbb \nccc" keeps its spaces.
        pre_measure(&mut scene, 80.0).unwrap();
        assert_eq!(engine.take_calls(), vec![format!("setTextDims {layout_id} 4 3")]);
    }

    #[test]
    fn truncation_keeps_one_line() {
        let engine = RecordingLayoutTree::new();
        let mut scene = Scene::new(engine.clone(), TraceLog::disabled()).unwrap();
        let root = scene.root();
        let label = text(&mut scene, root, "hello world");
        scene
            .set_style(
                label,
                Styles {
                    text_wrap: Some(TextWrap::TruncateEnd),
                    ..Default::default()
                },
            )
            .unwrap();
        let layout_id = scene.layout_id(label).unwrap();
        engine.take_calls();

        pre_measure(&mut scene, 6.0).unwrap();
        assert_eq!(engine.take_calls(), vec![format!("setTextDims {layout_id} 6 1")]);
    }

    #[test]
    fn root_spans_the_terminal() {
        let mut scene = Scene::new(TaffyLayoutTree::new(), TraceLog::disabled()).unwrap();
        let root = scene.root();
        let first = text(&mut scene, root, "one");
        let second = text(&mut scene, root, "two");

        calculate_layout(&mut scene, size(40, 10)).unwrap();
        let root_layout = get_computed_layout(&scene, root).unwrap().unwrap();
        assert_eq!(root_layout.width, 40.0);
        assert_eq!(root_layout.height, 2.0);

        let second_layout = get_computed_layout(&scene, second).unwrap().unwrap();
        assert_eq!(second_layout.y, 1.0);
        assert_eq!(
            measure_element(&scene, first).unwrap(),
            Dimensions { width: 40, height: 1 }
        );
    }

    #[test]
    fn explicit_root_width_is_kept() {
        let mut scene = Scene::new(TaffyLayoutTree::new(), TraceLog::disabled()).unwrap();
        let root = scene.root();
        scene.set_style(root, Styles::default().with_width(20)).unwrap();
        text(&mut scene, root, "x");

        calculate_layout(&mut scene, size(80, 24)).unwrap();
        assert_eq!(get_computed_layout(&scene, root).unwrap().unwrap().width, 20.0);
    }

    #[test]
    fn unbound_scenes_have_no_geometry() {
        let mut scene: Scene<TaffyLayoutTree> = Scene::unbound(TraceLog::disabled());
        let root = scene.root();
        let label = text(&mut scene, root, "x");
        calculate_layout(&mut scene, size(80, 24)).unwrap();
        assert_eq!(get_computed_layout(&scene, label).unwrap(), None);
        assert_eq!(measure_element(&scene, label).unwrap(), Dimensions::default());
    }
}
