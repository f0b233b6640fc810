//! One paint of a scene: live frame plus pending static output.

use std::time::Instant;

use serde_json::json;

use crate::dom::Scene;
use crate::error::Result;
use crate::layout::tree::LayoutTree;
use crate::trace::Category;

use super::accessibility::screen_reader_text;
use super::compositor::{NodeGeometry, node_geometry, paint};
use super::output::Output;

/// What a render produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Visual,
    /// Plain announced text for screen readers.
    Accessible,
}

/// Result of [`render`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderOutput {
    /// The live frame.
    pub output: String,
    /// Lines in `output`.
    pub output_height: usize,
    /// Newly painted static content, newline-terminated, or empty.
    pub static_output: String,
}

/// Render the scene from its root.
///
/// The static subtree is left out of `output`. In visual mode it is painted
/// separately only while static-dirty, which the paint clears.
pub fn render<L: LayoutTree>(scene: &mut Scene<L>, mode: RenderMode) -> Result<RenderOutput> {
    let started = Instant::now();
    let root = scene.root();

    let NodeGeometry::Laid(root_layout) = node_geometry(scene, root)? else {
        return Ok(RenderOutput::default());
    };

    let rendered = match mode {
        RenderMode::Accessible => {
            let output = screen_reader_text(scene, root, None, true);
            let output_height = if output.is_empty() { 0 } else { output.split('\n').count() };
            let static_output = match (scene.static_node(), scene.is_static_dirty()) {
                (Some(node), true) => {
                    let text = screen_reader_text(scene, node, None, false);
                    scene.set_static_dirty(false);
                    text
                }
                _ => String::new(),
            };
            RenderOutput {
                output,
                output_height,
                static_output: terminate(static_output),
            }
        }
        RenderMode::Visual => {
            let _span = tracing::debug_span!("paint", width = root_layout.width).entered();
            let mut output = Output::new(
                root_layout.width.round() as usize,
                root_layout.height.round() as usize,
            );
            paint(scene, root, &mut output, true)?;

            let mut static_output = String::new();
            if let (Some(node), true) = (scene.static_node(), scene.is_static_dirty()) {
                if let NodeGeometry::Laid(layout) = node_geometry(scene, node)? {
                    let mut buffer = Output::new(
                        layout.width.round() as usize,
                        layout.height.round() as usize,
                    );
                    paint(scene, node, &mut buffer, false)?;
                    static_output = terminate(buffer.get().output);
                    scene.set_static_dirty(false);
                }
            }

            let frame = output.get();
            RenderOutput {
                output: frame.output,
                output_height: frame.height,
                static_output,
            }
        }
    };

    let trace = scene.trace();
    if trace.enabled() {
        trace.log(
            Category::Render,
            "render",
            json!({
                "mode": format!("{mode:?}"),
                "outputHeight": rendered.output_height,
                "staticBytes": rendered.static_output.len(),
                "durationMs": started.elapsed().as_secs_f64() * 1000.0,
            }),
        );
    }
    Ok(rendered)
}

/// Static output ends with a newline so the live frame starts below it.
fn terminate(text: String) -> String {
    if text.is_empty() { text } else { text + "\n" }
}
