//! Render options and process-level setup.
//!
//! ```text
//! WOLFIE_TRACE          tracing filter directives (default "warn")
//! WOLFIE_LOG=1          enable the JSON-lines trace sidecar
//! WOLFIE_LOG_FILE       sidecar path (default "wolfie.log")
//! WOLFIE_SCREEN_READER  "1" renders the screen-reader view
//! CI                    set (and not "0"/"false") enables CI output
//! ```

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::trace::TraceLog;

/// Filter directives for [`init_tracing`].
pub const TRACE_ENV: &str = "WOLFIE_TRACE";
pub const SCREEN_READER_ENV: &str = "WOLFIE_SCREEN_READER";
pub const CI_ENV: &str = "CI";

/// Terminal dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalSize {
    pub columns: u16,
    pub rows: u16,
}

impl Default for TerminalSize {
    fn default() -> Self {
        Self {
            columns: 80,
            rows: 24,
        }
    }
}

impl TerminalSize {
    /// Size of the controlling terminal, or 80×24 when there is none.
    pub fn detect() -> Self {
        match crossterm::terminal::size() {
            Ok((columns, rows)) if columns > 0 && rows > 0 => Self { columns, rows },
            _ => Self::default(),
        }
    }
}

/// Options of one render root.
#[derive(Clone, Default)]
pub struct RenderOptions {
    /// Write every frame in full, below the previous one.
    pub debug: bool,
    /// Render the screen-reader view instead of the visual one.
    pub accessibility: bool,
    /// Write static output only; the last frame on unmount.
    pub ci: bool,
    /// Rewrite only changed lines.
    pub incremental: bool,
    pub show_cursor: bool,
    pub terminal_size: TerminalSize,
    pub trace: TraceLog,
}

impl std::fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderOptions")
            .field("debug", &self.debug)
            .field("accessibility", &self.accessibility)
            .field("ci", &self.ci)
            .field("incremental", &self.incremental)
            .field("show_cursor", &self.show_cursor)
            .field("terminal_size", &self.terminal_size)
            .field("trace", &self.trace.enabled())
            .finish()
    }
}

impl RenderOptions {
    /// Options from the process environment and the controlling terminal.
    pub fn from_env() -> Self {
        Self {
            terminal_size: TerminalSize::detect(),
            trace: TraceLog::from_env(),
            ..Self::from_vars(|key| std::env::var(key).ok())
        }
    }

    /// Options from an arbitrary variable lookup. The trace sidecar stays
    /// disabled and the terminal size at its default.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let ci = lookup(CI_ENV).is_some_and(|value| value != "0" && value != "false");
        Self {
            accessibility: lookup(SCREEN_READER_ENV).as_deref() == Some("1"),
            ci,
            ..Self::default()
        }
    }
}

/// Install a fmt subscriber filtered by `WOLFIE_TRACE` (default `warn`).
/// Does nothing if a global subscriber is already set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(TRACE_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let options = RenderOptions::from_vars(vars(&[]));
        assert!(!options.ci);
        assert!(!options.accessibility);
        assert!(!options.trace.enabled());
        assert_eq!(options.terminal_size, TerminalSize { columns: 80, rows: 24 });
    }

    #[test]
    fn ci_flag() {
        assert!(RenderOptions::from_vars(vars(&[("CI", "true")])).ci);
        assert!(RenderOptions::from_vars(vars(&[("CI", "1")])).ci);
        assert!(!RenderOptions::from_vars(vars(&[("CI", "false")])).ci);
        assert!(!RenderOptions::from_vars(vars(&[("CI", "0")])).ci);
    }

    #[test]
    fn screen_reader_flag() {
        assert!(RenderOptions::from_vars(vars(&[("WOLFIE_SCREEN_READER", "1")])).accessibility);
        assert!(!RenderOptions::from_vars(vars(&[("WOLFIE_SCREEN_READER", "yes")])).accessibility);
    }

    #[test]
    fn init_tracing_twice_is_harmless() {
        init_tracing();
        init_tracing();
    }
}
