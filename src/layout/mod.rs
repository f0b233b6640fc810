//! Layout Module
//!
//! Flexbox layout for the scene graph, computed by an engine behind the
//! [`tree::LayoutTree`] trait.
//!
//! # Architecture
//!
//! 1. The scene mirrors every structural change into the engine by id
//! 2. [`bridge::calculate_layout`] resolves viewport units and pushes text
//!    sizes (the engine has no measure callbacks)
//! 3. The engine computes geometry, read back as [`types::ComputedLayout`]
//!
//! [`taffy_tree::TaffyLayoutTree`] is the production engine.
//! [`logged::LoggedLayoutTree`] wraps any engine with trace records.
//!
//! # Example
//!
//! ```
//! use wolfie_core::config::TerminalSize;
//! use wolfie_core::dom::{ElementName, Scene};
//! use wolfie_core::layout::bridge::{calculate_layout, measure_element};
//! use wolfie_core::layout::taffy_tree::TaffyLayoutTree;
//! use wolfie_core::trace::TraceLog;
//!
//! let mut scene = Scene::new(TaffyLayoutTree::new(), TraceLog::disabled())?;
//! let root = scene.root();
//! let text = scene.create_node(ElementName::Text)?;
//! let leaf = scene.create_text_node("hello");
//! scene.append_child(text, leaf)?;
//! scene.append_child(root, text)?;
//!
//! calculate_layout(&mut scene, TerminalSize { columns: 20, rows: 5 })?;
//! assert_eq!(measure_element(&scene, root)?.width, 20);
//! # Ok::<(), wolfie_core::error::Error>(())
//! ```

pub mod bridge;
pub mod logged;
pub mod taffy_tree;
pub mod text_measure;
pub mod tree;
pub mod types;

#[cfg(test)]
pub(crate) mod recording;

pub use bridge::{calculate_layout, get_computed_layout, measure_element};
pub use tree::LayoutTree;
pub use types::{ComputedLayout, LayoutStyle};
