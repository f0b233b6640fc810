//! Renderer Module
//!
//! Turns a laid-out scene into terminal output.
//!
//! - [`compositor`] paints nodes into an [`output::Output`] cell grid
//! - [`output`] serialises the grid with minimal SGR transitions
//! - [`accessibility`] renders the plain screen-reader view
//! - [`render`] runs one paint, splitting off static output
//! - [`writer`] replaces the live frame on the terminal

pub mod accessibility;
pub mod ansi;
pub mod border;
pub mod compositor;
pub mod output;
pub mod render;
pub mod writer;

pub use output::{Clip, Output, OutputFrame};
pub use render::{RenderMode, RenderOutput, render};
pub use writer::{SharedWriter, StreamId, TerminalWriter, WriterOptions, WriterRegistry};
