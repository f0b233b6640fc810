//! Request and response records exchanged with the layout engine.

use crate::types::{
    AlignContent, AlignItems, AlignSelf, Display, FlexDirection, FlexWrap, JustifyContent,
    Overflow, Position,
};

/// Unit of a [`LayoutDimension`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DimensionUnit {
    Px,
    Percent,
    #[default]
    Auto,
}

/// A `(value, unit)` pair. Percentages are 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutDimension {
    pub value: f32,
    pub unit: DimensionUnit,
}

impl LayoutDimension {
    pub const AUTO: Self = Self {
        value: 0.0,
        unit: DimensionUnit::Auto,
    };

    pub const fn px(value: f32) -> Self {
        Self {
            value,
            unit: DimensionUnit::Px,
        }
    }

    pub const fn percent(value: f32) -> Self {
        Self {
            value,
            unit: DimensionUnit::Percent,
        }
    }
}

/// Four-sided lengths in cells.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub const ZERO: Self = Self::all(0.0);

    pub const fn all(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// Style pushed to the engine. Unset fields keep the engine's defaults.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutStyle {
    pub position: Option<Position>,
    pub display: Option<Display>,
    pub overflow: Option<Overflow>,

    pub width: Option<LayoutDimension>,
    pub height: Option<LayoutDimension>,
    pub min_width: Option<LayoutDimension>,
    pub min_height: Option<LayoutDimension>,
    pub max_width: Option<LayoutDimension>,
    pub max_height: Option<LayoutDimension>,

    pub flex_direction: Option<FlexDirection>,
    pub flex_wrap: Option<FlexWrap>,
    pub flex_grow: Option<f32>,
    pub flex_shrink: Option<f32>,
    pub flex_basis: Option<LayoutDimension>,

    pub align_items: Option<AlignItems>,
    pub align_self: Option<AlignSelf>,
    pub align_content: Option<AlignContent>,
    pub justify_content: Option<JustifyContent>,

    pub margin: Option<Edges>,
    pub padding: Option<Edges>,
    pub border: Option<Edges>,

    pub gap: Option<f32>,
    pub column_gap: Option<f32>,
    pub row_gap: Option<f32>,
}

/// Geometry read back from the engine.
///
/// `x`/`y` are relative to the parent's border box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComputedLayout {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub padding: Edges,
    pub border: Edges,
}

impl ComputedLayout {
    /// Width left for content once padding and border are taken off.
    pub fn content_width(&self) -> f32 {
        (self.width
            - self.padding.left
            - self.padding.right
            - self.border.left
            - self.border.right)
            .max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_width_subtracts_insets() {
        let layout = ComputedLayout {
            width: 20.0,
            padding: Edges {
                left: 2.0,
                right: 1.0,
                ..Edges::ZERO
            },
            border: Edges::all(1.0),
            ..Default::default()
        };
        assert_eq!(layout.content_width(), 15.0);
    }

    #[test]
    fn content_width_never_negative() {
        let layout = ComputedLayout {
            width: 1.0,
            border: Edges::all(1.0),
            ..Default::default()
        };
        assert_eq!(layout.content_width(), 0.0);
    }
}
