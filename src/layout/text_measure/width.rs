//! Display width of terminal text.
//!
//! Widths are in cells: East Asian wide characters and emoji take two,
//! combining marks and escapes take none.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

use super::ansi::strip_ansi;

/// Display width of a single codepoint.
#[inline]
pub fn char_width(c: char) -> usize {
    // Terminals draw these emoji blocks two cells wide.
    match c as u32 {
        0x2600..=0x27BF => 2,
        0x1F300..=0x1F5FF => 2,
        0x1F600..=0x1F64F => 2,
        0x1F680..=0x1F6FF => 2,
        0x1F900..=0x1F9FF => 2,
        0x1FA70..=0x1FAFF => 2,
        _ => c.width().unwrap_or(0),
    }
}

/// Display width of a grapheme cluster.
///
/// Flags, ZWJ sequences, skin-tone and keycap sequences are two cells.
/// A base character with combining marks takes the base's width.
pub fn grapheme_width(grapheme: &str) -> usize {
    let mut chars = grapheme.chars();
    let Some(first) = chars.next() else {
        return 0;
    };

    if grapheme.len() == first.len_utf8() {
        return char_width(first);
    }

    if (0x1F1E6..=0x1F1FF).contains(&(first as u32)) {
        return 2;
    }

    let emoji_sequence = chars.any(|c| {
        matches!(c as u32, 0x200D | 0xFE0F | 0x1F3FB..=0x1F3FF | 0x20E3)
    });
    if emoji_sequence {
        return 2;
    }

    char_width(first)
}

/// Display width of a single-line string, ignoring ANSI escapes.
pub fn string_width(s: &str) -> usize {
    if s.is_empty() {
        return 0;
    }

    if s.is_ascii() && !s.as_bytes().contains(&0x1B) {
        return s.bytes().filter(|&b| b >= 0x20 && b != 0x7F).count();
    }

    strip_ansi(s).graphemes(true).map(grapheme_width).sum()
}

/// Width of the widest `\n`-separated line.
pub fn widest_line(s: &str) -> usize {
    s.split('\n').map(string_width).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_and_control_chars() {
        assert_eq!(char_width('a'), 1);
        assert_eq!(char_width(' '), 1);
        assert_eq!(char_width('\t'), 0);
        assert_eq!(char_width('\x7F'), 0);
    }

    #[test]
    fn wide_chars() {
        assert_eq!(char_width('你'), 2);
        assert_eq!(char_width('한'), 2);
        assert_eq!(char_width('🚀'), 2);
        assert_eq!(char_width('✨'), 2);
    }

    #[test]
    fn grapheme_clusters() {
        assert_eq!(grapheme_width(""), 0);
        assert_eq!(grapheme_width("e\u{0301}"), 1);
        assert_eq!(grapheme_width("🇺🇸"), 2);
        assert_eq!(grapheme_width("👍🏽"), 2);
        assert_eq!(grapheme_width("👨\u{200D}👩\u{200D}👧"), 2);
        assert_eq!(grapheme_width("1\u{FE0F}\u{20E3}"), 2);
    }

    #[test]
    fn strings_ignore_escapes() {
        assert_eq!(string_width(""), 0);
        assert_eq!(string_width("hello"), 5);
        assert_eq!(string_width("\x1b[31mhello\x1b[39m"), 5);
        assert_eq!(string_width("你好 ok"), 7);
    }

    #[test]
    fn widest_line_spans_newlines() {
        assert_eq!(widest_line("ab\nabcd\nabc"), 4);
        assert_eq!(widest_line(""), 0);
        assert_eq!(widest_line("\n"), 0);
    }
}
