//! Scene node records.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

use crate::style::Styles;

slotmap::new_key_type! {
    /// Handle to a node in a [`Scene`](super::Scene).
    pub struct NodeId;
}

/// Paint-time text transformer: `(line, line_index) -> line`.
pub type Transform = Rc<dyn Fn(&str, usize) -> String>;

/// Element node names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementName {
    Root,
    Box,
    Text,
    VirtualText,
}

impl ElementName {
    /// Text and VirtualText hold text, never boxes.
    #[inline]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text | Self::VirtualText)
    }

    /// Every element except VirtualText owns an engine node.
    #[inline]
    pub const fn has_layout(&self) -> bool {
        !matches!(self, Self::VirtualText)
    }
}

/// Attribute values set by adapters.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Bool(bool),
    Str(String),
    Number(f64),
}

impl AttributeValue {
    /// JS-style truthiness: `false`, `""` and `0` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Str(s) => !s.is_empty(),
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Accessibility role announced in screen-reader output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Button,
    Checkbox,
    Combobox,
    List,
    Listbox,
    Listitem,
    Menu,
    Menuitem,
    Option,
    Progressbar,
    Radio,
    Radiogroup,
    Tab,
    Tablist,
    Table,
    Textbox,
    Timer,
    Toolbar,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Checkbox => "checkbox",
            Self::Combobox => "combobox",
            Self::List => "list",
            Self::Listbox => "listbox",
            Self::Listitem => "listitem",
            Self::Menu => "menu",
            Self::Menuitem => "menuitem",
            Self::Option => "option",
            Self::Progressbar => "progressbar",
            Self::Radio => "radio",
            Self::Radiogroup => "radiogroup",
            Self::Tab => "tab",
            Self::Tablist => "tablist",
            Self::Table => "table",
            Self::Textbox => "textbox",
            Self::Timer => "timer",
            Self::Toolbar => "toolbar",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Accessibility states, in announcement order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AccessibilityState: u16 {
        const BUSY = 1 << 0;
        const CHECKED = 1 << 1;
        const DISABLED = 1 << 2;
        const EXPANDED = 1 << 3;
        const MULTILINE = 1 << 4;
        const MULTISELECTABLE = 1 << 5;
        const READONLY = 1 << 6;
        const REQUIRED = 1 << 7;
        const SELECTED = 1 << 8;
    }
}

impl AccessibilityState {
    /// Names of the set states, in declaration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.iter_names()
            .map(|(name, _)| match name {
                "BUSY" => "busy",
                "CHECKED" => "checked",
                "DISABLED" => "disabled",
                "EXPANDED" => "expanded",
                "MULTILINE" => "multiline",
                "MULTISELECTABLE" => "multiselectable",
                "READONLY" => "readonly",
                "REQUIRED" => "required",
                _ => "selected",
            })
            .collect()
    }
}

/// Role and state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Accessibility {
    pub role: Option<Role>,
    pub state: AccessibilityState,
}

/// Element payload: children and attributes.
#[derive(Debug, Clone)]
pub struct Element {
    pub name: ElementName,
    pub children: Vec<NodeId>,
    pub attributes: HashMap<String, AttributeValue>,
}

/// What a node is.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Element(Element),
    /// A `#text` leaf.
    Text(String),
}

/// A scene node.
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
    pub(crate) style: Styles,
    pub(crate) layout_id: Option<u32>,
    pub(crate) transform: Option<Transform>,
    pub(crate) accessibility: Accessibility,
}

impl Node {
    pub(crate) fn element(name: ElementName, layout_id: Option<u32>) -> Self {
        Self {
            parent: None,
            kind: NodeKind::Element(Element {
                name,
                children: Vec::new(),
                attributes: HashMap::new(),
            }),
            style: Styles::default(),
            layout_id,
            transform: None,
            accessibility: Accessibility::default(),
        }
    }

    pub(crate) fn text(value: String) -> Self {
        Self {
            parent: None,
            kind: NodeKind::Text(value),
            style: Styles::default(),
            layout_id: None,
            transform: None,
            accessibility: Accessibility::default(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn style(&self) -> &Styles {
        &self.style
    }

    pub fn layout_id(&self) -> Option<u32> {
        self.layout_id
    }

    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    pub fn accessibility(&self) -> Accessibility {
        self.accessibility
    }

    /// Element name, `None` for text leaves.
    pub fn name(&self) -> Option<ElementName> {
        match &self.kind {
            NodeKind::Element(el) => Some(el.name),
            NodeKind::Text(_) => None,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Element(el) => &el.children,
            NodeKind::Text(_) => &[],
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        match &self.kind {
            NodeKind::Element(el) => el.attributes.get(key),
            NodeKind::Text(_) => None,
        }
    }

    /// Text payload of a `#text` leaf.
    pub fn text_value(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(value) => Some(value),
            NodeKind::Element(_) => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match &mut self.kind {
            NodeKind::Element(el) => Some(&mut el.children),
            NodeKind::Text(_) => None,
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .field("layout_id", &self.layout_id)
            .field("transform", &self.transform.is_some())
            .field("accessibility", &self.accessibility)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_names_follow_declaration_order() {
        let state = AccessibilityState::SELECTED | AccessibilityState::BUSY | AccessibilityState::DISABLED;
        assert_eq!(state.names(), ["busy", "disabled", "selected"]);
    }

    #[test]
    fn attribute_truthiness() {
        assert!(AttributeValue::from(true).is_truthy());
        assert!(!AttributeValue::from(false).is_truthy());
        assert!(!AttributeValue::from("").is_truthy());
        assert!(AttributeValue::from("yes").is_truthy());
        assert!(!AttributeValue::from(0.0).is_truthy());
    }

    #[test]
    fn only_virtual_text_lacks_layout() {
        assert!(ElementName::Box.has_layout());
        assert!(ElementName::Text.has_layout());
        assert!(!ElementName::VirtualText.has_layout());
        assert!(ElementName::VirtualText.is_text());
        assert!(!ElementName::Root.is_text());
    }
}
