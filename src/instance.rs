//! One render root: a scene, its terminal writer and the frame policy
//! that decides what reaches the stream on each render.

use std::io::Write;
use std::rc::Rc;
use std::cell::RefCell;

use crate::config::{RenderOptions, TerminalSize};
use crate::dom::Scene;
use crate::error::Result;
use crate::layout::bridge;
use crate::layout::logged::LoggedLayoutTree;
use crate::layout::taffy_tree::TaffyLayoutTree;
use crate::layout::text_measure::wrap_text;
use crate::renderer::ansi;
use crate::renderer::render::{RenderMode, render};
use crate::renderer::writer::{SharedWriter, TerminalWriter, WriterOptions};
use crate::style::Styles;
use crate::types::{AlignItems, FlexDirection};

/// Engine used by instances: taffy behind the trace decorator.
pub type InstanceLayout = LoggedLayoutTree<TaffyLayoutTree>;

/// A mounted render root.
pub struct Instance<W: Write> {
    scene: Scene<InstanceLayout>,
    writer: SharedWriter<W>,
    options: RenderOptions,
    /// Every static line written so far; replayed in debug mode and after
    /// a full clear.
    full_static_output: String,
    last_output: String,
    last_output_height: usize,
    last_terminal_width: u16,
    unmounted: bool,
}

impl<W: Write> Instance<W> {
    /// Mount on a fresh writer over `stream`.
    pub fn new(stream: W, options: RenderOptions) -> Result<Self> {
        let writer = TerminalWriter::new(
            stream,
            WriterOptions {
                incremental: options.incremental,
                show_cursor: options.show_cursor,
            },
        );
        Self::with_writer(Rc::new(RefCell::new(writer)), options)
    }

    /// Mount on a writer shared with other roots on the same stream.
    pub fn with_writer(writer: SharedWriter<W>, options: RenderOptions) -> Result<Self> {
        let trace = options.trace.clone();
        let layout = LoggedLayoutTree::new(TaffyLayoutTree::new(), trace.clone());
        let mut scene = Scene::new(layout, trace)?;

        let root = scene.root();
        scene.set_style(
            root,
            Styles {
                flex_direction: Some(FlexDirection::Column),
                align_items: Some(AlignItems::Stretch),
                ..Default::default()
            },
        )?;
        tracing::debug!(
            columns = options.terminal_size.columns,
            rows = options.terminal_size.rows,
            "instance mounted"
        );

        Ok(Self {
            scene,
            writer,
            last_terminal_width: options.terminal_size.columns,
            options,
            full_static_output: String::new(),
            last_output: String::new(),
            last_output_height: 0,
            unmounted: false,
        })
    }

    pub fn scene(&self) -> &Scene<InstanceLayout> {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene<InstanceLayout> {
        &mut self.scene
    }

    pub fn writer(&self) -> SharedWriter<W> {
        self.writer.clone()
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// The last live frame rendered.
    pub fn last_output(&self) -> &str {
        &self.last_output
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted
    }

    /// Lay the scene out for the configured terminal size.
    pub fn calculate_layout(&mut self) -> Result<()> {
        bridge::calculate_layout(&mut self.scene, self.options.terminal_size)
    }

    /// Render the scene and write whatever the current mode calls for.
    pub fn on_render(&mut self) -> Result<()> {
        if self.unmounted {
            return Ok(());
        }
        let mode = if self.options.accessibility {
            RenderMode::Accessible
        } else {
            RenderMode::Visual
        };
        let frame = render(&mut self.scene, mode)?;
        let output = frame.output;
        let static_output = frame.static_output;
        let has_static = !static_output.is_empty() && static_output != "\n";
        let mut writer = self.writer.borrow_mut();

        if self.options.debug {
            if has_static {
                self.full_static_output.push_str(&static_output);
            }
            writer.write_raw(format!("{}{output}", self.full_static_output))?;
            return Ok(());
        }

        if self.options.ci {
            if has_static {
                writer.write_raw(&static_output)?;
            }
            self.last_output = output;
            self.last_output_height = frame.output_height;
            return Ok(());
        }

        if self.options.accessibility {
            let mut buf = Vec::new();
            if has_static {
                ansi::erase_lines(&mut buf, self.last_output_height)?;
                buf.extend_from_slice(static_output.as_bytes());
                self.last_output_height = 0;
            }
            if output == self.last_output && !has_static {
                return Ok(());
            }

            let wrapped = wrap_text(&output, usize::from(self.options.terminal_size.columns));
            if !has_static {
                ansi::erase_lines(&mut buf, self.last_output_height)?;
            }
            buf.extend_from_slice(wrapped.as_bytes());
            writer.write_raw(&buf)?;

            self.last_output_height = if wrapped.is_empty() { 0 } else { wrapped.split('\n').count() };
            self.last_output = output;
            return Ok(());
        }

        if has_static {
            self.full_static_output.push_str(&static_output);
        }

        if self.last_output_height >= usize::from(self.options.terminal_size.rows) {
            tracing::debug!(height = self.last_output_height, "frame taller than terminal, redrawing");
            let mut buf = Vec::new();
            ansi::clear_terminal(&mut buf)?;
            buf.extend_from_slice(self.full_static_output.as_bytes());
            writer.write_raw(&buf)?;
            writer.sync(&output)?;
        } else if has_static {
            writer.clear()?;
            writer.write_raw(&static_output)?;
            writer.write(&output)?;
        } else if output != self.last_output {
            writer.write(&output)?;
        }

        self.last_output = output;
        self.last_output_height = frame.output_height;
        Ok(())
    }

    /// Adopt a new terminal size and render immediately. Shrinking the
    /// width drops the live frame first, since the terminal rewraps it.
    pub fn resize(&mut self, columns: u16, rows: u16) -> Result<()> {
        if columns < self.last_terminal_width {
            self.writer.borrow_mut().clear()?;
            self.last_output.clear();
        }
        self.options.terminal_size = TerminalSize { columns, rows };
        self.calculate_layout()?;
        self.on_render()?;
        self.last_terminal_width = columns;
        Ok(())
    }

    /// Render a final frame and release the stream. Later renders are
    /// ignored.
    pub fn unmount(&mut self) -> Result<()> {
        if self.unmounted {
            return Ok(());
        }
        self.calculate_layout()?;
        self.on_render()?;

        let mut writer = self.writer.borrow_mut();
        if self.options.ci {
            writer.write_raw(format!("{}\n", self.last_output))?;
        } else if !self.options.debug {
            writer.done()?;
        }
        drop(writer);

        self.unmounted = true;
        if let Err(err) = self.options.trace.flush() {
            tracing::warn!(%err, "trace log flush failed");
        }
        Ok(())
    }

    /// Write `data` above the live frame.
    pub fn write_to_stdout(&mut self, data: &str) -> Result<()> {
        if self.unmounted {
            return Ok(());
        }
        let mut writer = self.writer.borrow_mut();
        if self.options.debug {
            writer.write_raw(format!("{data}{}{}", self.full_static_output, self.last_output))?;
            return Ok(());
        }
        if self.options.ci {
            writer.write_raw(data)?;
            return Ok(());
        }
        writer.clear()?;
        writer.write_raw(data)?;
        writer.write(&self.last_output)?;
        Ok(())
    }
}

impl<W: Write> std::fmt::Debug for Instance<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("options", &self.options)
            .field("last_output_height", &self.last_output_height)
            .field("unmounted", &self.unmounted)
            .finish_non_exhaustive()
    }
}
