//! The output grid the compositor paints into.
//!
//! A fixed width×height grid of [`Cell`]s with a clip stack. Writes take
//! styled text (SGR sequences included), split it into graphemes and stamp
//! cells; anything falling outside the grid or the active clip is dropped.
//! [`Output::get`] serialises the grid back into text with minimal SGR.
//!
//! # Design Decisions
//!
//! - **Flat storage**: `Vec<Cell>` with row-major indexing.
//! - **Transparent backgrounds**: a write without a background keeps the
//!   background already in the cell, so text drawn over a filled box keeps
//!   its colour.
//! - **Wide characters**: the second cell is a continuation; overwriting
//!   either half blanks the other.

use unicode_segmentation::UnicodeSegmentation;

use crate::dom::Transform;
use crate::layout::text_measure::{Token, grapheme_width, tokens};
use crate::types::{Cell, CellStyle};

use super::ansi::{apply_sgr, sgr_transition};

/// Clip request. `None` leaves that edge unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Clip {
    pub x1: Option<i32>,
    pub x2: Option<i32>,
    pub y1: Option<i32>,
    pub y2: Option<i32>,
}

/// Half-open visible ranges per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bounds {
    x: (i32, i32),
    y: (i32, i32),
}

impl Bounds {
    const UNBOUNDED: Self = Self {
        x: (i32::MIN, i32::MAX),
        y: (i32::MIN, i32::MAX),
    };

    #[inline]
    fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x.0 && x < self.x.1 && y >= self.y.0 && y < self.y.1
    }
}

/// Narrow `outer` on one axis. Inverted bounds leave the axis alone; equal
/// bounds hide it entirely.
fn narrow(outer: (i32, i32), lo: Option<i32>, hi: Option<i32>) -> (i32, i32) {
    let lo = lo.unwrap_or(i32::MIN);
    let hi = hi.unwrap_or(i32::MAX);
    if hi < lo {
        return outer;
    }
    (outer.0.max(lo), outer.1.min(hi))
}

/// Options for one [`Output::write`].
#[derive(Clone, Default)]
pub struct WriteOptions<'a> {
    /// Applied in order to each line, with the line index.
    pub transformers: &'a [Transform],
    /// Style the text starts in; SGR resets return to it.
    pub style: CellStyle,
}

impl std::fmt::Debug for WriteOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteOptions")
            .field("transformers", &self.transformers.len())
            .field("style", &self.style)
            .finish()
    }
}

/// Serialised grid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputFrame {
    pub output: String,
    pub height: usize,
}

/// A grid of styled cells.
#[derive(Debug, Clone)]
pub struct Output {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    clips: Vec<Bounds>,
}

impl Output {
    /// A grid of default cells.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
            clips: Vec::new(),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell at (x, y), if inside the grid.
    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        if x < self.width && y < self.height {
            self.cells.get(y * self.width + x)
        } else {
            None
        }
    }

    /// Depth of the clip stack.
    pub fn clip_depth(&self) -> usize {
        self.clips.len()
    }

    fn active(&self) -> Bounds {
        self.clips.last().copied().unwrap_or(Bounds::UNBOUNDED)
    }

    /// Push a clip intersected with the current one.
    pub fn clip(&mut self, clip: Clip) {
        let outer = self.active();
        self.clips.push(Bounds {
            x: narrow(outer.x, clip.x1, clip.x2),
            y: narrow(outer.y, clip.y1, clip.y2),
        });
    }

    /// Pop one clip level. No-op on an empty stack.
    pub fn unclip(&mut self) {
        self.clips.pop();
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Replace one cell, breaking any wide character it cuts through.
    fn stamp(&mut self, x: i32, y: i32, mut cell: Cell) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        let old = &self.cells[i];
        if cell.style.bg.is_none() {
            cell.style.bg = old.style.bg;
        }

        if old.is_continuation() {
            if let Some(lead) = self.index(x - 1, y) {
                self.cells[lead].symbol = " ".to_string();
                self.cells[lead].width = 1;
            }
        } else if old.width == 2 && cell.width != 2 {
            if let Some(next) = self.index(x + 1, y) {
                let style = self.cells[next].style;
                self.cells[next] = Cell::new(" ", 1, style);
            }
        }
        self.cells[i] = cell;
    }

    /// Fill a rectangle with spaces in `style`.
    pub fn fill(&mut self, x: i32, y: i32, width: i32, height: i32, style: CellStyle) {
        let clip = self.active();
        for row in y..y + height {
            for col in x..x + width {
                if clip.contains(col, row) {
                    self.stamp(col, row, Cell::new(" ", 1, style));
                }
            }
        }
    }

    /// Write `text` with its first line at (x, y).
    pub fn write(&mut self, x: i32, y: i32, text: &str, options: &WriteOptions<'_>) {
        let clip = self.active();
        let mut style = options.style;

        for (index, line) in text.split('\n').enumerate() {
            let row = y + index as i32;
            let mut transformed = line.to_string();
            for transform in options.transformers {
                transformed = transform(&transformed, index);
            }

            let mut col = x;
            for token in tokens(&transformed) {
                match token {
                    Token::Escape(seq) => {
                        apply_sgr(seq, &mut style, &options.style);
                    }
                    Token::Text(text) => {
                        for grapheme in text.graphemes(true) {
                            let width = grapheme_width(grapheme) as i32;
                            if width == 0 {
                                continue;
                            }
                            self.put(&clip, col, row, grapheme, width, style);
                            col += width;
                        }
                    }
                }
            }
        }
    }

    fn put(&mut self, clip: &Bounds, col: i32, row: i32, grapheme: &str, width: i32, style: CellStyle) {
        if width == 1 {
            if clip.contains(col, row) {
                self.stamp(col, row, Cell::new(grapheme, 1, style));
            }
            return;
        }

        let lead = clip.contains(col, row) && self.index(col, row).is_some();
        let tail = clip.contains(col + 1, row) && self.index(col + 1, row).is_some();
        if lead && tail {
            self.stamp(col, row, Cell::new(grapheme, 2, style));
            self.stamp(col + 1, row, Cell::continuation(style));
        } else {
            // Half a wide character: show blanks instead.
            for (visible, c) in [(lead, col), (tail, col + 1)] {
                if visible {
                    self.stamp(c, row, Cell::new(" ", 1, style));
                }
            }
        }
    }

    /// Serialise the grid.
    ///
    /// Each line opens only the codes that differ from the previous cell and
    /// closes whatever is still open at its end. Trailing unstyled spaces
    /// are trimmed.
    pub fn get(&self) -> OutputFrame {
        let mut lines = Vec::with_capacity(self.height);

        for row in self.cells.chunks(self.width.max(1)).take(self.height) {
            let end = row.iter().rposition(|c| !c.is_blank()).map_or(0, |i| i + 1);
            let mut line = String::new();
            let mut current = CellStyle::default();

            for cell in &row[..end] {
                if cell.is_continuation() {
                    continue;
                }
                if cell.style != current {
                    line.push_str(&sgr_transition(&current, &cell.style));
                    current = cell.style;
                }
                line.push_str(&cell.symbol);
            }
            line.push_str(&sgr_transition(&current, &CellStyle::default()));
            lines.push(line);
        }

        // A zero-width grid still has `height` (empty) lines.
        while lines.len() < self.height {
            lines.push(String::new());
        }

        OutputFrame {
            output: lines.join("\n"),
            height: self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::{Attr, Color};

    fn plain() -> WriteOptions<'static> {
        WriteOptions::default()
    }

    #[test]
    fn writes_and_trims_trailing_spaces() {
        let mut output = Output::new(10, 2);
        output.write(0, 0, "hi", &plain());
        output.write(2, 1, "there", &plain());
        assert_eq!(output.get().output, "hi\n  there");
        assert_eq!(output.get().height, 2);
    }

    #[test]
    fn styled_runs_open_and_close_once() {
        let mut output = Output::new(20, 1);
        let options = WriteOptions {
            style: CellStyle::background(Color::GREEN),
            ..plain()
        };
        output.write(0, 0, "Hello World", &options);
        assert_eq!(output.get().output, "\x1b[42mHello World\x1b[49m");
    }

    #[test]
    fn background_changes_without_reset() {
        let mut output = Output::new(20, 1);
        output.write(0, 0, "ab", &WriteOptions {
            style: CellStyle::background(Color::YELLOW),
            ..plain()
        });
        output.write(2, 0, "cd", &WriteOptions {
            style: CellStyle::background(Color::BLUE),
            ..plain()
        });
        assert_eq!(output.get().output, "\x1b[43mab\x1b[44mcd\x1b[49m");
    }

    #[test]
    fn inline_sgr_resets_to_the_write_style() {
        let mut output = Output::new(20, 1);
        let options = WriteOptions {
            style: CellStyle::background(Color::YELLOW),
            ..plain()
        };
        output.write(0, 0, "a\x1b[31;1mb\x1b[39;22mc", &options);

        assert_eq!(output.cell(0, 0).unwrap().style, CellStyle::background(Color::YELLOW));
        assert_eq!(
            output.cell(1, 0).unwrap().style,
            CellStyle {
                fg: Some(Color::RED),
                bg: Some(Color::YELLOW),
                attrs: Attr::BOLD,
            }
        );
        assert_eq!(output.cell(2, 0).unwrap().style, CellStyle::background(Color::YELLOW));
    }

    #[test]
    fn sgr_state_carries_across_lines() {
        let mut output = Output::new(5, 2);
        output.write(0, 0, "\x1b[1ma\nb\x1b[22m", &plain());
        assert!(output.cell(0, 1).unwrap().style.attrs.contains(Attr::BOLD));
    }

    #[test]
    fn out_of_grid_writes_are_dropped() {
        let mut output = Output::new(3, 1);
        output.write(-2, 0, "abcdef", &plain());
        output.write(0, 5, "zzz", &plain());
        assert_eq!(output.get().output, "cde");
    }

    #[test]
    fn clip_bounds_horizontal_writes() {
        let mut output = Output::new(20, 1);
        output.clip(Clip {
            x1: Some(0),
            x2: Some(6),
            ..Default::default()
        });
        output.write(0, 0, "Hello World", &plain());
        output.unclip();
        assert_eq!(output.get().output, "Hello");
        assert_eq!(output.clip_depth(), 0);
    }

    #[test]
    fn nested_clips_intersect() {
        let mut output = Output::new(20, 3);
        output.clip(Clip {
            x1: Some(2),
            x2: Some(10),
            ..Default::default()
        });
        output.clip(Clip {
            x1: Some(5),
            x2: Some(15),
            y1: Some(1),
            y2: Some(2),
        });
        for row in 0..3 {
            output.write(0, row, "abcdefghijklmnop", &plain());
        }
        output.unclip();
        output.unclip();
        assert_eq!(output.get().output, "\n     fghij\n");
    }

    #[test]
    fn inverted_clip_leaves_the_axis_open() {
        let mut output = Output::new(10, 1);
        output.clip(Clip {
            x1: Some(4),
            x2: Some(2),
            ..Default::default()
        });
        output.write(0, 0, "abc", &plain());
        output.unclip();
        output.unclip();
        assert_eq!(output.get().output, "abc");
    }

    #[test]
    fn empty_clip_hides_everything() {
        let mut output = Output::new(10, 2);
        output.clip(Clip {
            x1: Some(4),
            x2: Some(4),
            ..Default::default()
        });
        output.write(0, 0, "abcdef", &plain());
        output.fill(0, 1, 10, 1, CellStyle::background(Color::RED));
        output.unclip();
        assert_eq!(output.get().output, "\n");
    }

    #[test]
    fn wide_characters_take_two_cells() {
        let mut output = Output::new(6, 1);
        output.write(0, 0, "中文", &plain());
        assert_eq!(output.cell(0, 0).unwrap().width, 2);
        assert!(output.cell(1, 0).unwrap().is_continuation());
        assert_eq!(output.get().output, "中文");

        output.write(1, 0, "x", &plain());
        assert_eq!(output.get().output, " x文");
    }

    #[test]
    fn clipped_half_of_a_wide_character_is_blank() {
        let mut output = Output::new(6, 1);
        output.clip(Clip {
            x1: Some(0),
            x2: Some(1),
            ..Default::default()
        });
        output.write(0, 0, "中", &WriteOptions {
            style: CellStyle::background(Color::RED),
            ..plain()
        });
        assert_eq!(output.get().output, "\x1b[41m \x1b[49m");
    }

    #[test]
    fn transformers_run_per_line_with_index() {
        let mut output = Output::new(10, 2);
        let upper: Transform = Rc::new(|s: &str, i: usize| format!("{i}{}", s.to_uppercase()));
        let chain = [upper];
        output.write(0, 0, "ab\ncd", &WriteOptions {
            transformers: &chain,
            ..plain()
        });
        assert_eq!(output.get().output, "0AB\n1CD");
    }

    #[test]
    fn unstyled_text_keeps_the_fill_background() {
        let mut output = Output::new(4, 1);
        output.fill(0, 0, 4, 1, CellStyle::background(Color::BLUE));
        output.write(1, 0, "ab", &plain());
        assert_eq!(output.get().output, "\x1b[44m ab \x1b[49m");
    }
}
