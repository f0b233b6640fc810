//! Unicode-aware text measurement for terminal rendering.
//!
//! - **Width**: terminal cell width of any string, escapes excluded
//! - **Wrapping**: word wrap with hard breaks, whitespace preserved
//! - **Truncation**: ellipsis at the end, start or middle of each line
//!
//! [`TextMeasurer`] caches measure and wrap results. Each scene owns one.
//! Both caches are unbounded and only emptied by [`TextMeasurer::clear`].

mod ansi;
mod truncate;
mod width;
mod wrap;

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::json;

use crate::trace::{Category, TraceLog};
use crate::types::TextWrap;

pub use ansi::{Token, Tokens, strip_ansi, tokens};
pub use truncate::{ELLIPSIS, TruncatePosition, truncate_text};
pub use width::{char_width, grapheme_width, string_width, widest_line};
pub use wrap::wrap_text;

/// Size of a block of text in cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dimensions {
    pub width: usize,
    pub height: usize,
}

/// Measure `text` without caching. Empty text is 0×0.
pub fn measure_text(text: &str) -> Dimensions {
    if text.is_empty() {
        return Dimensions::default();
    }
    Dimensions {
        width: widest_line(text),
        height: text.split('\n').count(),
    }
}

/// Wrap or truncate `text` to `max_width` per `mode`.
pub fn fit_text(text: &str, max_width: usize, mode: TextWrap) -> String {
    match mode {
        TextWrap::Wrap => wrap_text(text, max_width),
        TextWrap::TruncateEnd => truncate_text(text, max_width, TruncatePosition::End),
        TextWrap::TruncateMiddle => truncate_text(text, max_width, TruncatePosition::Middle),
        TextWrap::TruncateStart => truncate_text(text, max_width, TruncatePosition::Start),
    }
}

/// Caching front end over [`measure_text`] and [`fit_text`].
#[derive(Debug, Default)]
pub struct TextMeasurer {
    sizes: RefCell<HashMap<String, Dimensions>>,
    wrapped: RefCell<HashMap<(String, usize, TextWrap), String>>,
    trace: TraceLog,
}

impl TextMeasurer {
    pub fn new(trace: TraceLog) -> Self {
        Self {
            trace,
            ..Self::default()
        }
    }

    /// Widest line and line count of `text`.
    pub fn measure(&self, text: &str) -> Dimensions {
        if let Some(size) = self.sizes.borrow().get(text).copied() {
            self.trace_measure(text, size, true);
            return size;
        }

        let size = measure_text(text);
        self.sizes.borrow_mut().insert(text.to_string(), size);
        self.trace_measure(text, size, false);
        size
    }

    /// [`fit_text`], memoised on `(text, max_width, mode)`.
    pub fn wrap(&self, text: &str, max_width: usize, mode: TextWrap) -> String {
        let key = (text.to_string(), max_width, mode);
        if let Some(hit) = self.wrapped.borrow().get(&key).cloned() {
            self.trace_wrap(max_width, mode, true);
            return hit;
        }

        let result = fit_text(text, max_width, mode);
        self.wrapped.borrow_mut().insert(key, result.clone());
        self.trace_wrap(max_width, mode, false);
        result
    }

    /// Drop both caches.
    pub fn clear(&self) {
        self.sizes.borrow_mut().clear();
        self.wrapped.borrow_mut().clear();
    }

    fn trace_measure(&self, text: &str, size: Dimensions, cached: bool) {
        if self.trace.enabled() {
            self.trace.log(
                Category::Measure,
                "measureText",
                json!({
                    "len": text.len(),
                    "width": size.width,
                    "height": size.height,
                    "cached": cached,
                }),
            );
        }
    }

    fn trace_wrap(&self, max_width: usize, mode: TextWrap, cached: bool) {
        if self.trace.enabled() {
            self.trace.log(
                Category::Measure,
                "wrapText",
                json!({
                    "maxWidth": max_width,
                    "mode": format!("{mode:?}"),
                    "cached": cached,
                }),
            );
        }
    }
}
