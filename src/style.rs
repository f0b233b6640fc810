//! Node styles and their translation into engine and cell styles.
//!
//! [`Styles`] is what adapters set on a node. Unset fields mean "not
//! specified", which matters: margin and padding shorthands only reach the
//! engine when at least one of them is set, and borders only exist when a
//! border style is.

use crate::layout::types::{Edges, LayoutDimension, LayoutStyle};
use crate::types::{
    AlignItems, AlignSelf, Attr, BorderStyle, CellStyle, Color, Dimension, Display, FlexDirection,
    FlexWrap, JustifyContent, Overflow, Position, TextWrap,
};

/// Style record of a scene node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Styles {
    pub text_wrap: Option<TextWrap>,
    pub position: Option<Position>,

    pub gap: Option<f32>,
    pub column_gap: Option<f32>,
    pub row_gap: Option<f32>,

    pub margin: Option<f32>,
    pub margin_x: Option<f32>,
    pub margin_y: Option<f32>,
    pub margin_top: Option<f32>,
    pub margin_bottom: Option<f32>,
    pub margin_left: Option<f32>,
    pub margin_right: Option<f32>,

    pub padding: Option<f32>,
    pub padding_x: Option<f32>,
    pub padding_y: Option<f32>,
    pub padding_top: Option<f32>,
    pub padding_bottom: Option<f32>,
    pub padding_left: Option<f32>,
    pub padding_right: Option<f32>,

    pub flex_grow: Option<f32>,
    pub flex_shrink: Option<f32>,
    pub flex_direction: Option<FlexDirection>,
    pub flex_basis: Option<Dimension>,
    pub flex_wrap: Option<FlexWrap>,
    pub align_items: Option<AlignItems>,
    pub align_self: Option<AlignSelf>,
    pub justify_content: Option<JustifyContent>,

    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub min_width: Option<Dimension>,
    pub min_height: Option<Dimension>,
    pub max_width: Option<Dimension>,
    pub max_height: Option<Dimension>,

    pub display: Option<Display>,

    pub border_style: Option<BorderStyle>,
    pub border_top: Option<bool>,
    pub border_bottom: Option<bool>,
    pub border_left: Option<bool>,
    pub border_right: Option<bool>,
    pub border_color: Option<Color>,
    pub border_top_color: Option<Color>,
    pub border_bottom_color: Option<Color>,
    pub border_left_color: Option<Color>,
    pub border_right_color: Option<Color>,
    pub border_dim_color: Option<bool>,
    pub border_top_dim_color: Option<bool>,
    pub border_bottom_dim_color: Option<bool>,
    pub border_left_dim_color: Option<bool>,
    pub border_right_dim_color: Option<bool>,

    pub overflow: Option<Overflow>,
    pub overflow_x: Option<Overflow>,
    pub overflow_y: Option<Overflow>,

    pub background_color: Option<Color>,

    // Text styling, read by Text and VirtualText nodes.
    pub color: Option<Color>,
    pub bold: Option<bool>,
    pub dim: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub strikethrough: Option<bool>,
    pub inverse: Option<bool>,
}

/// Colour and dimming of one border side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BorderSideStyle {
    pub visible: bool,
    pub color: Option<Color>,
    pub dim: bool,
}

impl Styles {
    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.display == Some(Display::None)
    }

    pub fn flex_direction(&self) -> FlexDirection {
        self.flex_direction.unwrap_or_default()
    }

    pub fn text_wrap(&self) -> TextWrap {
        self.text_wrap.unwrap_or_default()
    }

    /// Horizontal content is clipped by `overflow_x` or the `overflow` shorthand.
    pub fn clips_horizontally(&self) -> bool {
        self.overflow_x == Some(Overflow::Hidden) || self.overflow == Some(Overflow::Hidden)
    }

    pub fn clips_vertically(&self) -> bool {
        self.overflow_y == Some(Overflow::Hidden) || self.overflow == Some(Overflow::Hidden)
    }

    /// Resolved margins, or `None` when no margin field is set.
    pub fn margin_edges(&self) -> Option<Edges> {
        resolve_edges(
            self.margin,
            self.margin_x,
            self.margin_y,
            [self.margin_top, self.margin_right, self.margin_bottom, self.margin_left],
        )
    }

    /// Resolved padding, or `None` when no padding field is set.
    pub fn padding_edges(&self) -> Option<Edges> {
        resolve_edges(
            self.padding,
            self.padding_x,
            self.padding_y,
            [self.padding_top, self.padding_right, self.padding_bottom, self.padding_left],
        )
    }

    /// One cell per visible side when a border style is set.
    pub fn border_edges(&self) -> Option<Edges> {
        if self.border_style.is_none() {
            return None;
        }
        let side = |flag: Option<bool>| if flag == Some(false) { 0.0 } else { 1.0 };
        Some(Edges {
            top: side(self.border_top),
            right: side(self.border_right),
            bottom: side(self.border_bottom),
            left: side(self.border_left),
        })
    }

    /// Top, right, bottom and left border sides.
    pub fn border_sides(&self) -> [BorderSideStyle; 4] {
        let side = |visible: Option<bool>, color: Option<Color>, dim: Option<bool>| {
            BorderSideStyle {
                visible: visible != Some(false),
                color: color.or(self.border_color),
                dim: dim.or(self.border_dim_color).unwrap_or(false),
            }
        };
        [
            side(self.border_top, self.border_top_color, self.border_top_dim_color),
            side(self.border_right, self.border_right_color, self.border_right_dim_color),
            side(self.border_bottom, self.border_bottom_color, self.border_bottom_dim_color),
            side(self.border_left, self.border_left_color, self.border_left_dim_color),
        ]
    }

    /// Text attributes set on this node.
    pub fn text_attrs(&self) -> Attr {
        let mut attrs = Attr::NONE;
        let flags = [
            (self.bold, Attr::BOLD),
            (self.dim, Attr::DIM),
            (self.italic, Attr::ITALIC),
            (self.underline, Attr::UNDERLINE),
            (self.inverse, Attr::INVERSE),
            (self.strikethrough, Attr::STRIKETHROUGH),
        ];
        for (flag, attr) in flags {
            if flag == Some(true) {
                attrs |= attr;
            }
        }
        attrs
    }

    /// Cell style for text painted by this node. An explicit background wins
    /// over `inherited_bg`.
    pub fn text_cell_style(&self, inherited_bg: Option<Color>) -> CellStyle {
        CellStyle {
            fg: self.color,
            bg: self.background_color.or(inherited_bg),
            attrs: self.text_attrs(),
        }
    }

    /// Whether any viewport-relative length is present.
    pub fn has_viewport_units(&self) -> bool {
        self.dimensions().iter().any(|d| d.is_some_and(|d| d.is_viewport()))
    }

    fn dimensions(&self) -> [Option<Dimension>; 7] {
        [
            self.width,
            self.height,
            self.min_width,
            self.min_height,
            self.max_width,
            self.max_height,
            self.flex_basis,
        ]
    }

    /// Fluent setters for the fields tests and demos touch most.
    pub fn with_width(mut self, width: impl Into<Dimension>) -> Self {
        self.width = Some(width.into());
        self
    }

    pub fn with_height(mut self, height: impl Into<Dimension>) -> Self {
        self.height = Some(height.into());
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn with_flex_direction(mut self, direction: FlexDirection) -> Self {
        self.flex_direction = Some(direction);
        self
    }
}

fn resolve_edges(
    all: Option<f32>,
    x: Option<f32>,
    y: Option<f32>,
    [top, right, bottom, left]: [Option<f32>; 4],
) -> Option<Edges> {
    let any = [all, x, y, top, right, bottom, left].iter().any(Option::is_some);
    if !any {
        return None;
    }
    Some(Edges {
        top: top.or(y).or(all).unwrap_or(0.0),
        right: right.or(x).or(all).unwrap_or(0.0),
        bottom: bottom.or(y).or(all).unwrap_or(0.0),
        left: left.or(x).or(all).unwrap_or(0.0),
    })
}

/// Engine dimension for a style dimension. Viewport units should have been
/// resolved before this point; any left over become `auto`.
fn to_layout_dimension(dim: Option<Dimension>) -> Option<LayoutDimension> {
    dim.map(|dim| match dim {
        Dimension::Cells(n) => LayoutDimension::px(n),
        Dimension::Percent(p) => LayoutDimension::percent(p),
        Dimension::Auto | Dimension::Viewport(..) => LayoutDimension::AUTO,
    })
}

/// Translate node styles into the engine's style record.
pub fn to_layout_style(style: &Styles) -> LayoutStyle {
    LayoutStyle {
        position: style.position,
        display: style.display,
        // overflow_x / overflow_y only affect painting.
        overflow: style.overflow,

        width: to_layout_dimension(style.width),
        height: to_layout_dimension(style.height),
        min_width: to_layout_dimension(style.min_width),
        min_height: to_layout_dimension(style.min_height),
        max_width: to_layout_dimension(style.max_width),
        max_height: to_layout_dimension(style.max_height),

        flex_direction: style.flex_direction,
        flex_wrap: style.flex_wrap,
        flex_grow: style.flex_grow,
        flex_shrink: style.flex_shrink,
        flex_basis: to_layout_dimension(style.flex_basis),

        align_items: style.align_items,
        align_self: style.align_self,
        align_content: None,
        justify_content: style.justify_content,

        margin: style.margin_edges(),
        padding: style.padding_edges(),
        border: style.border_edges(),

        gap: style.gap,
        column_gap: style.column_gap,
        row_gap: style.row_gap,
    }
}
