//! # wolfie-core
//!
//! Retained-mode terminal rendering core.
//!
//! A [`Scene`] of box and text nodes is laid out by a flexbox engine, painted
//! into a cell grid and written to the terminal as the minimal update from
//! the previous frame.
//!
//! ## Architecture
//!
//! ```text
//! adapter ─→ Scene (dom) ─→ LayoutTree (taffy)
//!              │                 │
//!              │   calculate_layout: viewport units, text sizes, root width
//!              ▼                 ▼
//!           render ─→ compositor ─→ Output ─→ TerminalWriter ─→ stream
//!              ▲
//!        RenderScheduler (coalesces bursts of mutations)
//! ```
//!
//! ## Modules
//!
//! - [`dom`] - Scene graph and its mutation primitives
//! - [`layout`] - Engine interface, taffy engine, layout pass, text measurement
//! - [`renderer`] - Compositor, output buffer, terminal writer
//! - [`scheduler`] - Render coalescing
//! - [`instance`] - Frame policy for one render root
//! - [`trace`] - Opt-in JSON-lines trace sidecar

pub mod config;
pub mod dom;
pub mod error;
pub mod instance;
pub mod layout;
pub mod renderer;
pub mod scheduler;
pub mod style;
pub mod trace;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::{RenderOptions, TerminalSize, init_tracing};
pub use dom::{ElementName, NodeId, STATIC_ATTRIBUTE, Scene};
pub use error::{Error, Result};
pub use instance::Instance;
pub use layout::{LayoutTree, calculate_layout};
pub use layout::taffy_tree::TaffyLayoutTree;
pub use renderer::{RenderMode, RenderOutput, TerminalWriter, render};
pub use scheduler::{MicrotaskQueue, RenderScheduler, SchedulerOptions, TaskQueue};
pub use style::Styles;
pub use trace::TraceLog;
