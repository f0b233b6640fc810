//! Word wrapping with hard breaks.
//!
//! Lines are split on single spaces and refilled greedily. Whitespace is
//! kept as written, so a space that ends a row stays at the end of that row.
//! Words wider than the row are broken at grapheme boundaries. Escape
//! sequences ride along with the text they precede and take no columns.

use unicode_segmentation::UnicodeSegmentation;

use super::ansi::{Token, tokens};
use super::width::{grapheme_width, string_width};

/// Wrap `text` so that no line exceeds `max_width` columns.
///
/// Existing newlines are kept. A grapheme wider than `max_width` gets a row
/// of its own. `max_width == 0` returns the text unchanged.
pub fn wrap_text(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return text.to_string();
    }

    let normalized = text.replace("\r\n", "\n");
    normalized
        .split('\n')
        .map(|line| wrap_line(line, max_width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Row under construction plus its visible width.
struct Rows {
    rows: Vec<String>,
    width: usize,
}

impl Rows {
    fn new() -> Self {
        Self {
            rows: vec![String::new()],
            width: 0,
        }
    }

    fn current(&mut self) -> &mut String {
        let last = self.rows.len() - 1;
        &mut self.rows[last]
    }

    fn push_row(&mut self) {
        self.rows.push(String::new());
        self.width = 0;
    }

    fn push_str(&mut self, s: &str, width: usize) {
        self.current().push_str(s);
        self.width += width;
    }
}

fn wrap_line(line: &str, max_width: usize) -> String {
    let mut rows = Rows::new();

    for (index, word) in line.split(' ').enumerate() {
        let word_width = string_width(word);

        if index > 0 {
            if rows.width >= max_width {
                rows.push_row();
            }
            rows.push_str(" ", 1);
        }

        if word_width > max_width {
            let remaining = max_width - rows.width;
            let breaks_this_row = 1 + (word_width - remaining - 1) / max_width;
            let breaks_next_row = (word_width - 1) / max_width;
            if breaks_next_row < breaks_this_row {
                rows.push_row();
            }
            break_word(&mut rows, word, max_width);
            continue;
        }

        if rows.width + word_width > max_width && rows.width > 0 && word_width > 0 {
            rows.push_row();
        }
        rows.push_str(word, word_width);
    }

    rows.rows.join("\n")
}

/// Lay `word` out grapheme by grapheme, starting new rows as they fill.
fn break_word(rows: &mut Rows, word: &str, max_width: usize) {
    for token in tokens(word) {
        match token {
            Token::Escape(seq) => rows.push_str(seq, 0),
            Token::Text(text) => {
                for grapheme in text.graphemes(true) {
                    let width = grapheme_width(grapheme);
                    if rows.width + width > max_width && rows.width > 0 {
                        rows.push_row();
                    }
                    rows.push_str(grapheme, width);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assert_fits(wrapped: &str, max: usize) {
        for line in wrapped.split('\n') {
            assert!(
                string_width(line) <= max,
                "line {line:?} wider than {max}"
            );
        }
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(wrap_text("hello", 10), "hello");
        assert_eq!(wrap_text("", 10), "");
    }

    #[test]
    fn breaks_between_words_keeping_spaces() {
        assert_eq!(wrap_text("hello world", 8), "hello \nworld");
        assert_eq!(wrap_text("aa bb cc", 5), "aa bb\n cc");
    }

    #[test]
    fn keeps_existing_newlines() {
        assert_eq!(wrap_text("ab\ncd ef", 3), "ab\ncd \nef");
        assert_eq!(wrap_text("a\r\nb", 3), "a\nb");
    }

    #[test]
    fn hard_breaks_long_words() {
        assert_eq!(wrap_text("abcdefghij", 4), "abcd\nefgh\nij");
        assert_eq!(wrap_text("ab cdefgh", 4), "ab \ncdef\ngh");
    }

    #[test]
    fn long_word_starts_on_current_row_when_that_saves_a_break() {
        // 3 columns left on the row: "xyz" fills it, "abcd" follows.
        assert_eq!(wrap_text("a xyzabcd", 5), "a xyz\nabcd");
    }

    #[test]
    fn wide_graphemes_never_split() {
        let wrapped = wrap_text("你好世界", 3);
        assert_eq!(wrapped, "你\n好\n世\n界");
    }

    #[test]
    fn grapheme_wider_than_the_row_overflows_on_its_own_line() {
        assert_eq!(wrap_text("你", 1), "你");
        let wrapped = wrap_text("a你b", 1);
        assert_eq!(wrapped, "a\n你\nb");
        assert_eq!(string_width("你"), 2);
    }

    #[test]
    fn escapes_take_no_columns() {
        let wrapped = wrap_text("\x1b[31mhello world\x1b[39m", 5);
        assert_eq!(wrapped, "\x1b[31mhello\n \nworld\x1b[39m");
        assert_fits(&wrapped, 5);
    }

    #[test]
    fn zero_width_leaves_text_alone() {
        assert_eq!(wrap_text("hello world", 0), "hello world");
    }

    #[test]
    fn no_line_exceeds_max_width() {
        let text = "The quick brown fox jumps over the lazy dog, then naps. Supercalifragilistic!";
        for max in 1..=20 {
            assert_fits(&wrap_text(text, max), max);
        }
    }
}
