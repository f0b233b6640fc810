//! Truncation with an ellipsis.
//!
//! Each line is cut independently. Graphemes are never split, and escape
//! sequences are always kept (they take no columns), so colours opened in a
//! dropped region are still closed.

use unicode_segmentation::UnicodeSegmentation;

use super::ansi::{Token, tokens};
use super::width::{grapheme_width, string_width};

/// The truncation marker.
pub const ELLIPSIS: &str = "…";

/// Which part of an over-long line survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncatePosition {
    /// Keep the head: `"hello w…"`.
    End,
    /// Keep both edges: `"hell…rld"`.
    Middle,
    /// Keep the tail: `"…o world"`.
    Start,
}

/// Truncate every line of `text` to at most `max_width` columns.
pub fn truncate_text(text: &str, max_width: usize, position: TruncatePosition) -> String {
    if max_width == 0 {
        return String::new();
    }

    text.split('\n')
        .map(|line| truncate_line(line, max_width, position))
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_line(line: &str, max_width: usize, position: TruncatePosition) -> String {
    let total = string_width(line);
    if total <= max_width {
        return line.to_string();
    }
    if max_width == 1 {
        return ELLIPSIS.to_string();
    }

    // Column where the ellipsis goes and the range of columns kept.
    let keep = max_width - 1;
    let (cut, keep_left, keep_right_from) = match position {
        TruncatePosition::End => (total, keep, total),
        TruncatePosition::Start => (0, 0, total - keep),
        TruncatePosition::Middle => {
            let half = max_width / 2;
            (half, half, total - (max_width - half - 1))
        }
    };

    let mut out = String::with_capacity(line.len() + ELLIPSIS.len());
    let mut column = 0;
    let mut placed = false;

    for token in tokens(line) {
        match token {
            Token::Escape(seq) => out.push_str(seq),
            Token::Text(text) => {
                for grapheme in text.graphemes(true) {
                    let width = grapheme_width(grapheme);
                    if !placed && column >= cut {
                        out.push_str(ELLIPSIS);
                        placed = true;
                    }
                    if column + width <= keep_left || column >= keep_right_from {
                        out.push_str(grapheme);
                    }
                    column += width;
                }
            }
        }
    }

    if !placed {
        out.push_str(ELLIPSIS);
    }
    out
}
