//! Core types for wolfie-core.
//!
//! Colours, cell attributes, the styled cell the output grid is made of,
//! and the small enums that describe layout and text behaviour. These flow
//! from node styles through the layout bridge into the compositor.

use std::str::FromStr;

use crate::error::ColorParseError;

// =============================================================================
// Color
// =============================================================================

/// A terminal colour.
///
/// - `Ansi(0..=15)`: the 16 palette colours (standard + bright)
/// - `Ansi256(n)`: extended 256 colour palette
/// - `Rgb`: 24-bit truecolor
///
/// Terminal default is expressed as `None` wherever a colour is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Ansi(u8),
    Ansi256(u8),
    Rgb(u8, u8, u8),
}

impl Color {
    pub const BLACK: Self = Self::Ansi(0);
    pub const RED: Self = Self::Ansi(1);
    pub const GREEN: Self = Self::Ansi(2);
    pub const YELLOW: Self = Self::Ansi(3);
    pub const BLUE: Self = Self::Ansi(4);
    pub const MAGENTA: Self = Self::Ansi(5);
    pub const CYAN: Self = Self::Ansi(6);
    pub const WHITE: Self = Self::Ansi(7);
    pub const GRAY: Self = Self::Ansi(8);

    /// Parse a `#rgb` or `#rrggbb` hex colour.
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex.trim_start_matches('#');
        let channel = |s: &str| {
            u8::from_str_radix(s, 16).map_err(|_| ColorParseError::InvalidComponent(hex.to_string()))
        };

        match digits.len() {
            3 => {
                let mut out = [0u8; 3];
                for (i, c) in digits.chars().enumerate() {
                    let v = channel(&c.to_string())?;
                    out[i] = v * 17;
                }
                Ok(Self::Rgb(out[0], out[1], out[2]))
            }
            6 => Ok(Self::Rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            n => Err(ColorParseError::InvalidLength(n)),
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        let base = |n: &str| -> Option<u8> {
            Some(match n {
                "black" => 0,
                "red" => 1,
                "green" => 2,
                "yellow" => 3,
                "blue" => 4,
                "magenta" => 5,
                "cyan" => 6,
                "white" => 7,
                _ => return None,
            })
        };

        if matches!(normalized.as_str(), "gray" | "grey") {
            return Some(Self::Ansi(8));
        }

        if let Some(stem) = normalized.strip_suffix("bright") {
            return base(stem).map(|i| Self::Ansi(i + 8));
        }
        base(&normalized).map(Self::Ansi)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Accepts palette names (`green`, `blueBright`, `gray`), hex (`#ff0000`),
    /// `rgb(r, g, b)` and `ansi256(n)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ColorParseError::EmptyInput);
        }

        if s.starts_with('#') {
            return Self::from_hex(s);
        }

        if let Some(args) = s.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
            let parts: Vec<u8> = args
                .split(',')
                .map(|p| p.trim().parse::<u8>())
                .collect::<Result<_, _>>()
                .map_err(|_| ColorParseError::InvalidComponent(s.to_string()))?;
            return match parts.as_slice() {
                [r, g, b] => Ok(Self::Rgb(*r, *g, *b)),
                _ => Err(ColorParseError::InvalidComponent(s.to_string())),
            };
        }

        if let Some(arg) = s.strip_prefix("ansi256(").and_then(|r| r.strip_suffix(')')) {
            return arg
                .trim()
                .parse::<u8>()
                .map(Self::Ansi256)
                .map_err(|_| ColorParseError::InvalidComponent(s.to_string()));
        }

        Self::from_name(s).ok_or_else(|| ColorParseError::UnknownColor(s.to_string()))
    }
}

// =============================================================================
// Cell Attributes (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Text attributes as a bitfield for cheap comparison between cells.
    ///
    /// Combine with bitwise OR: `Attr::BOLD | Attr::ITALIC`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attr: u8 {
        const NONE = 0;
        const BOLD = 1 << 0;
        const DIM = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
        const INVERSE = 1 << 4;
        const STRIKETHROUGH = 1 << 5;
    }
}

// =============================================================================
// Cell - The atomic unit of the output grid
// =============================================================================

/// Colours and attributes applied to a run of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellStyle {
    /// Foreground colour, `None` for the terminal default.
    pub fg: Option<Color>,
    /// Background colour, `None` for the terminal default.
    pub bg: Option<Color>,
    pub attrs: Attr,
}

impl CellStyle {
    /// Style carrying only a background.
    pub const fn background(color: Color) -> Self {
        Self {
            fg: None,
            bg: Some(color),
            attrs: Attr::NONE,
        }
    }

    #[inline]
    pub fn is_default(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.attrs.is_empty()
    }
}

/// A single grid cell.
///
/// Wide graphemes occupy two cells: the grapheme in the first and a
/// continuation (empty symbol, width 0) in the second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub symbol: String,
    pub width: u8,
    pub style: CellStyle,
}

impl Cell {
    pub fn new(symbol: &str, width: u8, style: CellStyle) -> Self {
        Self {
            symbol: symbol.to_string(),
            width,
            style,
        }
    }

    /// Second half of a wide grapheme.
    pub fn continuation(style: CellStyle) -> Self {
        Self {
            symbol: String::new(),
            width: 0,
            style,
        }
    }

    #[inline]
    pub fn is_continuation(&self) -> bool {
        self.width == 0
    }

    /// A space with no colour or attribute.
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.symbol == " " && self.style.is_default()
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            symbol: " ".to_string(),
            width: 1,
            style: CellStyle::default(),
        }
    }
}

// =============================================================================
// Dimension - absolute, percentage and viewport values
// =============================================================================

/// Viewport-relative unit, resolved against the terminal size before layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportUnit {
    Vw,
    Vh,
    Vmin,
    Vmax,
}

/// A style dimension.
///
/// ```
/// use wolfie_core::types::{Dimension, ViewportUnit};
///
/// let width = Dimension::Cells(50.0);
/// let height = Dimension::Percent(100.0);
/// let full = Dimension::Viewport(100.0, ViewportUnit::Vw);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    #[default]
    Auto,
    /// Absolute size in terminal cells.
    Cells(f32),
    /// Percentage of the parent (0-100).
    Percent(f32),
    /// Percentage of the terminal size.
    Viewport(f32, ViewportUnit),
}

impl Dimension {
    /// Cell count when the dimension is absolute.
    #[inline]
    pub fn cells(&self) -> Option<f32> {
        match self {
            Self::Cells(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn is_viewport(&self) -> bool {
        matches!(self, Self::Viewport(..))
    }
}

impl From<u16> for Dimension {
    fn from(value: u16) -> Self {
        Self::Cells(value as f32)
    }
}

/// Negative cell counts clamp to zero.
impl From<i32> for Dimension {
    fn from(value: i32) -> Self {
        Self::Cells(value.max(0) as f32)
    }
}

impl FromStr for Dimension {
    type Err = std::convert::Infallible;

    /// `"50%"`, `"100vw"`, `"40"`, `"auto"`. Anything unrecognised is `Auto`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let number = |digits: &str| digits.trim().parse::<f32>().ok();

        let parsed = if let Some(p) = s.strip_suffix('%') {
            number(p).map(Self::Percent)
        } else if let Some(v) = s.strip_suffix("vmin") {
            number(v).map(|n| Self::Viewport(n, ViewportUnit::Vmin))
        } else if let Some(v) = s.strip_suffix("vmax") {
            number(v).map(|n| Self::Viewport(n, ViewportUnit::Vmax))
        } else if let Some(v) = s.strip_suffix("vw") {
            number(v).map(|n| Self::Viewport(n, ViewportUnit::Vw))
        } else if let Some(v) = s.strip_suffix("vh") {
            number(v).map(|n| Self::Viewport(n, ViewportUnit::Vh))
        } else {
            number(s).map(Self::Cells)
        };

        Ok(parsed.unwrap_or(Self::Auto))
    }
}

// =============================================================================
// Border Styles
// =============================================================================

/// Glyphs for one box border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxChars {
    pub top_left: char,
    pub top: char,
    pub top_right: char,
    pub right: char,
    pub bottom_right: char,
    pub bottom: char,
    pub bottom_left: char,
    pub left: char,
}

impl BoxChars {
    const fn new(chars: [char; 8]) -> Self {
        let [top_left, top, top_right, right, bottom_right, bottom, bottom_left, left] = chars;
        Self {
            top_left,
            top,
            top_right,
            right,
            bottom_right,
            bottom,
            bottom_left,
            left,
        }
    }
}

/// Border styles available to boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    /// ┌ ─ ┐ │ ┘ └
    Single,
    /// ╔ ═ ╗ ║ ╝ ╚
    Double,
    /// ╭ ─ ╮ │ ╯ ╰
    Round,
    /// ┏ ━ ┓ ┃ ┛ ┗
    Bold,
    /// ╓ ─ ╖ ║ ╜ ╙ (single horizontal, double vertical)
    SingleDouble,
    /// ╒ ═ ╕ │ ╛ ╘ (double horizontal, single vertical)
    DoubleSingle,
    /// + - + | + +
    Classic,
    /// ↘ ↓ ↙ ← ↖ ↗
    Arrow,
    Custom(BoxChars),
}

impl BorderStyle {
    pub const fn chars(&self) -> BoxChars {
        match self {
            Self::Single => BoxChars::new(['┌', '─', '┐', '│', '┘', '─', '└', '│']),
            Self::Double => BoxChars::new(['╔', '═', '╗', '║', '╝', '═', '╚', '║']),
            Self::Round => BoxChars::new(['╭', '─', '╮', '│', '╯', '─', '╰', '│']),
            Self::Bold => BoxChars::new(['┏', '━', '┓', '┃', '┛', '━', '┗', '┃']),
            Self::SingleDouble => BoxChars::new(['╓', '─', '╖', '║', '╜', '─', '╙', '║']),
            Self::DoubleSingle => BoxChars::new(['╒', '═', '╕', '│', '╛', '═', '╘', '│']),
            Self::Classic => BoxChars::new(['+', '-', '+', '|', '+', '-', '+', '|']),
            Self::Arrow => BoxChars::new(['↘', '↓', '↙', '←', '↖', '↑', '↗', '→']),
            Self::Custom(chars) => *chars,
        }
    }
}

impl FromStr for BorderStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "single" => Self::Single,
            "double" => Self::Double,
            "round" => Self::Round,
            "bold" => Self::Bold,
            "singleDouble" => Self::SingleDouble,
            "doubleSingle" => Self::DoubleSingle,
            "classic" => Self::Classic,
            "arrow" => Self::Arrow,
            other => return Err(format!("unknown border style: {other}")),
        })
    }
}

// =============================================================================
// Flex Enums - For layout
// =============================================================================

/// Flex direction for container layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexDirection {
    #[default]
    Row,
    Column,
    RowReverse,
    ColumnReverse,
}

impl FlexDirection {
    /// Check if this is a row direction (Row or RowReverse).
    pub const fn is_row(&self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }

    /// Check if this is a reverse direction (ColumnReverse or RowReverse).
    pub const fn is_reverse(&self) -> bool {
        matches!(self, Self::ColumnReverse | Self::RowReverse)
    }
}

/// Flex wrap behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexWrap {
    #[default]
    NoWrap,
    Wrap,
    WrapReverse,
}

/// Justify content (main axis alignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JustifyContent {
    #[default]
    FlexStart,
    Center,
    FlexEnd,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Align items (cross axis alignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignItems {
    #[default]
    Stretch,
    FlexStart,
    Center,
    FlexEnd,
    Baseline,
}

/// Align self (item override for align items).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignSelf {
    #[default]
    Auto,
    Stretch,
    FlexStart,
    Center,
    FlexEnd,
    Baseline,
}

/// Align content (multi-line cross axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignContent {
    #[default]
    Stretch,
    FlexStart,
    Center,
    FlexEnd,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Overflow behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
}

/// Position type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Relative,
    Absolute,
}

/// Display type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    Flex,
    None,
}

/// How text wider than its box is fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextWrap {
    #[default]
    Wrap,
    TruncateEnd,
    TruncateMiddle,
    TruncateStart,
}

impl FromStr for TextWrap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "wrap" => Self::Wrap,
            "truncate" | "truncate-end" | "end" => Self::TruncateEnd,
            "truncate-middle" | "middle" => Self::TruncateMiddle,
            "truncate-start" => Self::TruncateStart,
            other => return Err(format!("unknown text wrap: {other}")),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_names() {
        assert_eq!("green".parse::<Color>(), Ok(Color::GREEN));
        assert_eq!("blueBright".parse::<Color>(), Ok(Color::Ansi(12)));
        assert_eq!("gray".parse::<Color>(), Ok(Color::Ansi(8)));
        assert_eq!("grey".parse::<Color>(), Ok(Color::Ansi(8)));
        assert!(matches!(
            "mauve".parse::<Color>(),
            Err(ColorParseError::UnknownColor(_))
        ));
    }

    #[test]
    fn color_hex_rgb_ansi256() {
        assert_eq!("#FF0000".parse::<Color>(), Ok(Color::Rgb(255, 0, 0)));
        assert_eq!("#0f0".parse::<Color>(), Ok(Color::Rgb(0, 255, 0)));
        assert_eq!("rgb(255, 0, 0)".parse::<Color>(), Ok(Color::Rgb(255, 0, 0)));
        assert_eq!("ansi256(9)".parse::<Color>(), Ok(Color::Ansi256(9)));
        assert_eq!("#12345".parse::<Color>(), Err(ColorParseError::InvalidLength(5)));
        assert_eq!("".parse::<Color>(), Err(ColorParseError::EmptyInput));
    }

    #[test]
    fn dimension_parse() {
        assert_eq!("50%".parse::<Dimension>(), Ok(Dimension::Percent(50.0)));
        assert_eq!(
            "100vw".parse::<Dimension>(),
            Ok(Dimension::Viewport(100.0, ViewportUnit::Vw))
        );
        assert_eq!(
            "50vmin".parse::<Dimension>(),
            Ok(Dimension::Viewport(50.0, ViewportUnit::Vmin))
        );
        assert_eq!("12".parse::<Dimension>(), Ok(Dimension::Cells(12.0)));
        assert_eq!("auto".parse::<Dimension>(), Ok(Dimension::Auto));
    }

    #[test]
    fn cell_blank() {
        assert!(Cell::default().is_blank());
        assert!(!Cell::new(" ", 1, CellStyle::background(Color::GREEN)).is_blank());
        assert!(Cell::continuation(CellStyle::default()).is_continuation());
    }

    #[test]
    fn border_chars() {
        let round = BorderStyle::Round.chars();
        assert_eq!(round.top_left, '╭');
        assert_eq!(round.bottom_right, '╯');
        assert_eq!("classic".parse::<BorderStyle>(), Ok(BorderStyle::Classic));
    }

    #[test]
    fn text_wrap_names() {
        assert_eq!("truncate".parse::<TextWrap>(), Ok(TextWrap::TruncateEnd));
        assert_eq!("truncate-start".parse::<TextWrap>(), Ok(TextWrap::TruncateStart));
        assert!("clip".parse::<TextWrap>().is_err());
    }
}
