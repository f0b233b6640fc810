//! ANSI escape sequence handling.
//!
//! Escapes never occupy cells. Measurement strips them; wrapping and
//! truncation walk them as zero-width [`Token::Escape`] pieces so styling
//! survives the cut.
//!
//! Recognised forms:
//! - CSI: `ESC [` ... final byte (0x40-0x7E)
//! - OSC: `ESC ]` ... BEL or ST (`ESC \`)
//! - DCS/PM/APC: `ESC P` / `ESC ^` / `ESC _` ... ST
//! - Two-character: `ESC` + one byte

use std::borrow::Cow;

const ESC: u8 = 0x1B;

/// Strip ANSI escape sequences from a string.
///
/// Borrows when the input holds no ESC byte.
pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.as_bytes().contains(&ESC) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    for token in tokens(s) {
        if let Token::Text(text) = token {
            result.push_str(text);
        }
    }
    Cow::Owned(result)
}

/// One piece of a styled string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Printable content, free of ESC bytes.
    Text(&'a str),
    /// A complete (or unterminated trailing) escape sequence.
    Escape(&'a str),
}

/// Split `s` into alternating text and escape tokens.
pub fn tokens(s: &str) -> Tokens<'_> {
    Tokens { s, pos: 0 }
}

/// Iterator returned by [`tokens`].
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    s: &'a str,
    pos: usize,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let bytes = self.s.as_bytes();
        let start = self.pos;
        if start >= bytes.len() {
            return None;
        }

        if bytes[start] == ESC {
            let end = skip_escape_sequence(bytes, start);
            self.pos = end;
            return Some(Token::Escape(&self.s[start..end]));
        }

        // ESC is single-byte ASCII, so slicing at it never splits a char.
        let end = bytes[start..]
            .iter()
            .position(|&b| b == ESC)
            .map_or(bytes.len(), |offset| start + offset);
        self.pos = end;
        Some(Token::Text(&self.s[start..end]))
    }
}

/// Byte index just past the escape sequence starting at `pos`.
fn skip_escape_sequence(bytes: &[u8], pos: usize) -> usize {
    let next = pos + 1;
    if next >= bytes.len() {
        return bytes.len();
    }

    match bytes[next] {
        b'[' => skip_csi(bytes, next + 1),
        b']' | b'P' | b'^' | b'_' => skip_string_terminated(bytes, next + 1),
        // Two-character sequence. Keep the boundary on a char edge.
        b if b.is_ascii() => next + 1,
        _ => next,
    }
}

/// `pos` is the byte after `[`.
fn skip_csi(bytes: &[u8], pos: usize) -> usize {
    let mut i = pos;
    while i < bytes.len() {
        let b = bytes[i];
        if (0x40..=0x7E).contains(&b) {
            return i + 1;
        }
        if !(0x20..=0x7E).contains(&b) {
            return i;
        }
        i += 1;
    }
    bytes.len()
}

/// OSC, DCS, PM and APC end with BEL or ST.
fn skip_string_terminated(bytes: &[u8], pos: usize) -> usize {
    let len = bytes.len();
    let mut i = pos;
    while i < len {
        match bytes[i] {
            0x07 => return i + 1,
            ESC if i + 1 < len && bytes[i + 1] == b'\\' => return i + 2,
            _ => i += 1,
        }
    }
    len
}
