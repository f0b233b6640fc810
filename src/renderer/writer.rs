//! Incremental terminal writer.
//!
//! Keeps the last frame written to a stream and replaces it in place:
//!
//! - **Standard**: erase the previous frame's lines, write the new frame
//! - **Incremental**: move to the top of the previous frame and rewrite
//!   only the lines that changed, erasing surplus lines when it shrinks
//!
//! Frames are written with a trailing newline, so the cursor rests on the
//! line below. Each update is a single `write_all` on the stream.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use super::ansi;

/// Writer behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriterOptions {
    /// Rewrite only changed lines.
    pub incremental: bool,
    /// Leave the cursor visible while frames are live.
    pub show_cursor: bool,
}

/// Live-frame writer bound to one stream.
#[derive(Debug)]
pub struct TerminalWriter<W: Write> {
    stream: W,
    options: WriterOptions,
    previous_output: String,
    previous_lines: usize,
    cursor_hidden: bool,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(stream: W, options: WriterOptions) -> Self {
        Self {
            stream,
            options,
            previous_output: String::new(),
            previous_lines: 0,
            cursor_hidden: false,
        }
    }

    pub fn stream(&self) -> &W {
        &self.stream
    }

    pub fn stream_mut(&mut self) -> &mut W {
        &mut self.stream
    }

    pub fn into_inner(self) -> W {
        self.stream
    }

    pub fn options(&self) -> WriterOptions {
        self.options
    }

    /// The last frame written, newline-terminated; empty after clear/done.
    pub fn previous_output(&self) -> &str {
        &self.previous_output
    }

    /// Lines the last frame occupies, counting the cursor's line.
    pub fn previous_line_count(&self) -> usize {
        self.previous_lines
    }

    /// Replace the live frame with `frame`. Unchanged frames write nothing.
    pub fn write(&mut self, frame: &str) -> io::Result<()> {
        let output = format!("{frame}\n");
        if output == self.previous_output {
            return Ok(());
        }

        let mut buf = Vec::with_capacity(output.len() + 32);
        self.hide_cursor(&mut buf)?;

        if self.options.incremental && !self.previous_output.is_empty() && output != "\n" {
            self.diff_into(&mut buf, &output)?;
        } else {
            ansi::erase_lines(&mut buf, self.previous_lines)?;
            buf.extend_from_slice(output.as_bytes());
        }

        self.emit(&buf)?;
        self.remember(output);
        Ok(())
    }

    /// Rewrite changed lines only. The cursor starts on the line below the
    /// previous frame.
    fn diff_into(&self, buf: &mut Vec<u8>, output: &str) -> io::Result<()> {
        let previous: Vec<&str> = self.previous_output.split('\n').collect();
        let next: Vec<&str> = output.split('\n').collect();
        let visible = next.len() - 1;

        if next.len() < previous.len() {
            ansi::erase_lines(buf, previous.len() - next.len() + 1)?;
            ansi::cursor_up(buf, saturate(visible))?;
        } else {
            ansi::cursor_up(buf, saturate(previous.len() - 1))?;
        }

        for (i, line) in next.iter().take(visible).enumerate() {
            if previous.get(i) == Some(line) {
                ansi::cursor_next_line(buf)?;
                continue;
            }
            buf.extend_from_slice(line.as_bytes());
            ansi::erase_to_eol(buf)?;
            buf.push(b'\n');
        }
        Ok(())
    }

    /// Erase the live frame and forget it.
    pub fn clear(&mut self) -> io::Result<()> {
        let mut buf = Vec::new();
        ansi::erase_lines(&mut buf, self.previous_lines)?;
        self.emit(&buf)?;
        self.previous_output.clear();
        self.previous_lines = 0;
        Ok(())
    }

    /// Write `frame` as-is and adopt it as the live frame.
    pub fn sync(&mut self, frame: &str) -> io::Result<()> {
        let output = format!("{frame}\n");
        self.emit(output.as_bytes())?;
        self.remember(output);
        Ok(())
    }

    /// Leave the live frame in scrollback and restore the cursor.
    pub fn done(&mut self) -> io::Result<()> {
        self.previous_output.clear();
        self.previous_lines = 0;
        if self.cursor_hidden {
            let mut buf = Vec::new();
            ansi::cursor_show(&mut buf)?;
            self.emit(&buf)?;
            self.cursor_hidden = false;
        }
        Ok(())
    }

    /// Write bytes that are not part of the live frame.
    pub fn write_raw(&mut self, data: impl AsRef<[u8]>) -> io::Result<()> {
        self.emit(data.as_ref())
    }

    fn hide_cursor(&mut self, buf: &mut Vec<u8>) -> io::Result<()> {
        if !self.options.show_cursor && !self.cursor_hidden {
            ansi::cursor_hide(buf)?;
            self.cursor_hidden = true;
        }
        Ok(())
    }

    fn emit(&mut self, bytes: &[u8]) -> io::Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.stream.write_all(bytes)?;
        self.stream.flush()
    }

    fn remember(&mut self, output: String) {
        self.previous_lines = output.split('\n').count();
        self.previous_output = output;
    }
}

fn saturate(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Identifies an output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(pub u32);

impl StreamId {
    pub const STDOUT: Self = Self(1);
    pub const STDERR: Self = Self(2);
}

/// Shared handle to a writer.
pub type SharedWriter<W> = Rc<RefCell<TerminalWriter<W>>>;

/// One writer per stream, so every render root targeting a stream shares
/// its live-frame state.
#[derive(Debug)]
pub struct WriterRegistry<W: Write> {
    writers: HashMap<StreamId, SharedWriter<W>>,
}

impl<W: Write> Default for WriterRegistry<W> {
    fn default() -> Self {
        Self {
            writers: HashMap::new(),
        }
    }
}

impl<W: Write> WriterRegistry<W> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The writer for `id`, created from `open` on first use.
    pub fn get_or_create(
        &mut self,
        id: StreamId,
        options: WriterOptions,
        open: impl FnOnce() -> W,
    ) -> SharedWriter<W> {
        self.writers
            .entry(id)
            .or_insert_with(|| Rc::new(RefCell::new(TerminalWriter::new(open(), options))))
            .clone()
    }

    pub fn get(&self, id: StreamId) -> Option<SharedWriter<W>> {
        self.writers.get(&id).cloned()
    }

    /// Drop the registry's handle for `id`.
    pub fn remove(&mut self, id: StreamId) -> Option<SharedWriter<W>> {
        self.writers.remove(&id)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn writer(incremental: bool) -> TerminalWriter<Vec<u8>> {
        TerminalWriter::new(
            Vec::new(),
            WriterOptions {
                incremental,
                show_cursor: true,
            },
        )
    }

    /// Everything written since the last call.
    fn take(writer: &mut TerminalWriter<Vec<u8>>) -> String {
        String::from_utf8(std::mem::take(writer.stream_mut())).unwrap()
    }

    fn erase(n: usize) -> String {
        let mut buf = Vec::new();
        ansi::erase_lines(&mut buf, n).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn standard_writes_then_replaces() {
        let mut w = writer(false);
        w.write("Hello").unwrap();
        assert_eq!(take(&mut w), "Hello\n");

        w.write("World").unwrap();
        assert_eq!(take(&mut w), erase(2) + "World\n");
    }

    #[test]
    fn identical_frames_are_skipped() {
        for incremental in [false, true] {
            let mut w = writer(incremental);
            w.write("Hello").unwrap();
            take(&mut w);
            w.write("Hello").unwrap();
            assert_eq!(take(&mut w), "");
        }
    }

    #[test]
    fn incremental_rewrites_only_changed_lines() {
        let mut w = writer(true);
        w.write("Line 1\nLine 2\nLine 3").unwrap();
        take(&mut w);

        w.write("Line 1\nUpdated\nLine 3").unwrap();
        let out = take(&mut w);
        assert_eq!(out, "\x1b[3A\x1b[EUpdated\x1b[K\n\x1b[E");
        assert!(!out.contains("Line 1"));
    }

    #[test]
    fn incremental_shrink_keeps_screen_tight() {
        let mut w = writer(true);
        w.write("Line 1\nLine 2\nLine 3").unwrap();
        w.write("Line 1\nLine 2").unwrap();
        take(&mut w);

        w.write("Line 1").unwrap();
        assert_eq!(take(&mut w), erase(2) + "\x1b[1A" + "\x1b[E");
    }

    #[test]
    fn incremental_growth_appends_lines() {
        let mut w = writer(true);
        w.write("Line 1").unwrap();
        take(&mut w);

        w.write("Line 1\nLine 2\nLine 3").unwrap();
        assert_eq!(take(&mut w), "\x1b[1A\x1b[ELine 2\x1b[K\nLine 3\x1b[K\n");
    }

    #[test]
    fn empty_frame_erases_everything() {
        let mut w = writer(true);
        w.write("Line 1\nLine 2\nLine 3").unwrap();
        take(&mut w);

        w.write("").unwrap();
        assert_eq!(take(&mut w), erase(4) + "\n");
        w.write("").unwrap();
        assert_eq!(take(&mut w), "");
    }

    #[test]
    fn clear_and_done_reset_state() {
        let mut w = writer(true);
        w.write("Line 1\nLine 2\nLine 3").unwrap();
        w.clear().unwrap();
        take(&mut w);
        w.write("Line 1").unwrap();
        assert_eq!(take(&mut w), "Line 1\n");

        w.done().unwrap();
        w.write("Line 1").unwrap();
        assert_eq!(take(&mut w), "Line 1\n");
    }

    #[test]
    fn sync_adopts_the_frame_for_diffing() {
        let mut w = writer(true);
        w.sync("Line 1\nLine 2\nLine 3").unwrap();
        assert_eq!(take(&mut w), "Line 1\nLine 2\nLine 3\n");

        w.write("Line 1\nUpdated\nLine 3").unwrap();
        let out = take(&mut w);
        assert!(out.contains("Updated"));
        assert!(!out.contains("Line 3"));
    }

    #[test]
    fn cursor_is_hidden_once_and_shown_on_done() {
        let mut w = TerminalWriter::new(Vec::new(), WriterOptions::default());
        w.write("a").unwrap();
        w.write("b").unwrap();
        let out = take(&mut w);
        assert_eq!(out.matches("\x1b[?25l").count(), 1);

        w.done().unwrap();
        assert_eq!(take(&mut w), "\x1b[?25h");
    }

    #[test]
    fn registry_shares_writers_per_stream() {
        let mut registry: WriterRegistry<Vec<u8>> = WriterRegistry::new();
        let a = registry.get_or_create(StreamId::STDOUT, WriterOptions::default(), Vec::new);
        let b = registry.get_or_create(StreamId::STDOUT, WriterOptions::default(), Vec::new);
        let c = registry.get_or_create(StreamId::STDERR, WriterOptions::default(), Vec::new);
        assert!(Rc::ptr_eq(&a, &b));
        assert!(!Rc::ptr_eq(&a, &c));
        assert!(registry.get(StreamId(99)).is_none());
    }
}
