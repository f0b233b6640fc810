//! ANSI escape sequences for terminal control and styling.
//!
//! - Cursor movement and visibility, line and screen erasure for the writer
//! - SGR codes for colours and attributes
//! - Minimal style transitions ([`sgr_transition`]) for serialising cells
//! - An SGR interpreter ([`apply_sgr`]) for styled text written into the grid

use std::io::Write;

use crate::types::{Attr, CellStyle, Color};

// =============================================================================
// Constants
// =============================================================================

/// Control Sequence Introducer.
pub const CSI: &str = "\x1b[";

// =============================================================================
// Cursor
// =============================================================================

/// Move cursor up by n rows.
#[inline]
pub fn cursor_up<W: Write>(w: &mut W, n: u16) -> std::io::Result<()> {
    if n > 0 { write!(w, "\x1b[{}A", n) } else { Ok(()) }
}

/// Move cursor to the start of the next line.
#[inline]
pub fn cursor_next_line<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[E")
}

/// Move cursor to the first column.
#[inline]
pub fn cursor_column_zero<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[G")
}

#[inline]
pub fn cursor_hide<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[?25l")
}

#[inline]
pub fn cursor_show<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[?25h")
}

// =============================================================================
// Erasure
// =============================================================================

/// Clear entire line.
#[inline]
pub fn erase_line<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[2K")
}

/// Clear from cursor to end of line.
#[inline]
pub fn erase_to_eol<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[K")
}

/// Erase `count` lines upward, starting with the cursor's line, and leave
/// the cursor in column zero of the topmost one.
pub fn erase_lines<W: Write>(w: &mut W, count: usize) -> std::io::Result<()> {
    for i in 0..count {
        erase_line(w)?;
        if i + 1 < count {
            cursor_up(w, 1)?;
        }
    }
    if count > 0 {
        cursor_column_zero(w)?;
    }
    Ok(())
}

/// Clear screen and scrollback, cursor home.
#[inline]
pub fn clear_terminal<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[2J\x1b[3J\x1b[H")
}

// =============================================================================
// Colour Codes
// =============================================================================

/// SGR parameters selecting `color` as foreground, or `39` for default.
pub fn fg_code(color: Option<Color>) -> String {
    match color {
        None => "39".to_string(),
        Some(Color::Ansi(n)) if n < 8 => (30 + n as u16).to_string(),
        Some(Color::Ansi(n)) if n < 16 => (90 + n as u16 - 8).to_string(),
        Some(Color::Ansi(n)) | Some(Color::Ansi256(n)) => format!("38;5;{n}"),
        Some(Color::Rgb(r, g, b)) => format!("38;2;{r};{g};{b}"),
    }
}

/// SGR parameters selecting `color` as background, or `49` for default.
pub fn bg_code(color: Option<Color>) -> String {
    match color {
        None => "49".to_string(),
        Some(Color::Ansi(n)) if n < 8 => (40 + n as u16).to_string(),
        Some(Color::Ansi(n)) if n < 16 => (100 + n as u16 - 8).to_string(),
        Some(Color::Ansi(n)) | Some(Color::Ansi256(n)) => format!("48;5;{n}"),
        Some(Color::Rgb(r, g, b)) => format!("48;2;{r};{g};{b}"),
    }
}

/// Attribute, its set code and its reset code.
const ATTR_CODES: [(Attr, u8, u8); 6] = [
    (Attr::BOLD, 1, 22),
    (Attr::DIM, 2, 22),
    (Attr::ITALIC, 3, 23),
    (Attr::UNDERLINE, 4, 24),
    (Attr::INVERSE, 7, 27),
    (Attr::STRIKETHROUGH, 9, 29),
];

// =============================================================================
// Transitions
// =============================================================================

/// The shortest SGR sequence that turns `from` into `to`.
///
/// Only changed colours and attributes are emitted, as one `ESC[...m` with
/// `;`-joined parameters. Empty when the styles match.
///
/// ```
/// use wolfie_core::renderer::ansi::sgr_transition;
/// use wolfie_core::types::{Attr, CellStyle, Color};
///
/// let red_bold = CellStyle { fg: Some(Color::RED), bg: None, attrs: Attr::BOLD };
/// assert_eq!(sgr_transition(&CellStyle::default(), &red_bold), "\x1b[31;1m");
/// assert_eq!(sgr_transition(&red_bold, &CellStyle::default()), "\x1b[39;22m");
/// ```
pub fn sgr_transition(from: &CellStyle, to: &CellStyle) -> String {
    let mut params: Vec<String> = Vec::new();

    if from.fg != to.fg {
        params.push(fg_code(to.fg));
    }
    if from.bg != to.bg {
        params.push(bg_code(to.bg));
    }

    let removed = from.attrs - to.attrs;
    let mut added = to.attrs - from.attrs;

    // 22 clears bold and dim together; whichever should stay is re-added.
    if removed.intersects(Attr::BOLD | Attr::DIM) {
        params.push("22".to_string());
        added |= to.attrs & (Attr::BOLD | Attr::DIM);
    }
    for (attr, _, reset) in ATTR_CODES.iter().skip(2) {
        if removed.contains(*attr) {
            params.push(reset.to_string());
        }
    }
    for (attr, set, _) in ATTR_CODES {
        if added.contains(attr) {
            params.push(set.to_string());
        }
    }

    if params.is_empty() {
        return String::new();
    }
    format!("{CSI}{}m", params.join(";"))
}

// =============================================================================
// SGR Interpretation
// =============================================================================

/// Apply an escape sequence to `style`.
///
/// Returns false (leaving `style` alone) for anything that is not an SGR
/// sequence. Resets restore `base` rather than the terminal default, so
/// closing an inline span returns to the style of the text around it.
pub fn apply_sgr(sequence: &str, style: &mut CellStyle, base: &CellStyle) -> bool {
    let Some(params) = sequence
        .strip_prefix(CSI)
        .and_then(|rest| rest.strip_suffix('m'))
    else {
        return false;
    };
    if !params.bytes().all(|b| b.is_ascii_digit() || b == b';' || b == b':') {
        return false;
    }

    let codes: Vec<u16> = if params.is_empty() {
        vec![0]
    } else {
        params
            .split([';', ':'])
            .map(|p| p.parse().unwrap_or(0))
            .collect()
    };

    let mut iter = codes.into_iter();
    while let Some(code) = iter.next() {
        match code {
            0 => *style = *base,
            22 => {
                style.attrs -= Attr::BOLD | Attr::DIM;
                style.attrs |= base.attrs & (Attr::BOLD | Attr::DIM);
            }
            23 | 24 | 27 | 29 => {
                if let Some((attr, _, _)) = ATTR_CODES.iter().find(|(_, _, r)| *r as u16 == code) {
                    style.attrs -= *attr;
                    style.attrs |= base.attrs & *attr;
                }
            }
            30..=37 => style.fg = Some(Color::Ansi((code - 30) as u8)),
            90..=97 => style.fg = Some(Color::Ansi((code - 90 + 8) as u8)),
            39 => style.fg = base.fg,
            40..=47 => style.bg = Some(Color::Ansi((code - 40) as u8)),
            100..=107 => style.bg = Some(Color::Ansi((code - 100 + 8) as u8)),
            49 => style.bg = base.bg,
            38 => style.fg = extended_color(&mut iter).or(style.fg),
            48 => style.bg = extended_color(&mut iter).or(style.bg),
            _ => {
                if let Some((attr, _, _)) = ATTR_CODES.iter().find(|(_, s, _)| *s as u16 == code) {
                    style.attrs |= *attr;
                }
            }
        }
    }
    true
}

/// `5;n` or `2;r;g;b` following a 38 or 48.
fn extended_color(iter: &mut impl Iterator<Item = u16>) -> Option<Color> {
    let channel = |v: Option<u16>| v.and_then(|v| u8::try_from(v).ok());
    match iter.next()? {
        5 => channel(iter.next()).map(Color::Ansi256),
        2 => {
            let (r, g, b) = (channel(iter.next()), channel(iter.next()), channel(iter.next()));
            Some(Color::Rgb(r?, g?, b?))
        }
        _ => None,
    }
}

// =============================================================================
// Tests
// =============================================================================
