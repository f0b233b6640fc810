//! Error types for wolfie-core operations.

use thiserror::Error;

use crate::dom::NodeId;

/// Core error type for scene, layout and output operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A Box was placed under a Text or VirtualText node.
    #[error("<Box> can't be nested inside <Text> (node {child:?} under {parent:?})")]
    BoxInsideText {
        /// The text-kind parent.
        parent: NodeId,
        /// The offending box.
        child: NodeId,
    },

    /// The node id does not name a live node in this scene.
    #[error("unknown scene node: {0:?}")]
    UnknownNode(NodeId),

    /// Children and attributes only exist on element nodes.
    #[error("node {0:?} is a text leaf, not an element")]
    NotAnElement(NodeId),

    /// Only `#text` leaves carry a text value.
    #[error("node {0:?} is not a text leaf")]
    NotATextNode(NodeId),

    /// A node cannot become a descendant of itself.
    #[error("inserting {child:?} under {parent:?} would create a cycle")]
    Cycle {
        /// The intended parent.
        parent: NodeId,
        /// The node being attached.
        child: NodeId,
    },

    /// The layout engine has no node with this id.
    #[error("layout node {0} not found")]
    UnknownLayoutNode(u32),

    /// The layout engine rejected an operation.
    #[error("layout engine error: {0}")]
    Layout(#[from] taffy::TaffyError),

    /// An I/O error occurred while writing to a stream or the trace file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A colour string could not be parsed.
    #[error(transparent)]
    Color(#[from] ColorParseError),
}

/// Result type alias using the core Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for colour parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    /// Input string was empty.
    #[error("empty colour")]
    EmptyInput,

    /// Hex string had an invalid length.
    #[error("invalid hex length: {0} (expected 3 or 6)")]
    InvalidLength(usize),

    /// Invalid hexadecimal character or channel value.
    #[error("invalid colour component in {0:?}")]
    InvalidComponent(String),

    /// Unknown colour name.
    #[error("unknown colour name: {0}")]
    UnknownColor(String),
}
