//! Debug trace sidecar.
//!
//! An opt-in JSON-lines event log, one record per mutation, layout or paint
//! operation. It is purely observational: nothing reads it back.
//!
//! ```text
//! {"ts":0.0,"cat":"meta","op":"session_start","pid":4242,"unixMs":1760000000000}
//! {"ts":0.41,"cat":"layout","op":"createNode","nodeId":0}
//! {"ts":3.2,"cat":"layout","op":"computeLayout","rootId":0,"width":80.0,"durationMs":0.8}
//! ```
//!
//! A [`TraceLog`] is a cheap handle. Scenes, layout trees and schedulers each
//! hold a clone of the one owned by their instance, so two render roots in
//! one process can log to different files (or not at all).

use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::{Map, Value};

/// Environment toggle that enables the sidecar when set to `1`.
pub const LOG_ENV: &str = "WOLFIE_LOG";
/// Environment variable naming the sidecar file.
pub const LOG_FILE_ENV: &str = "WOLFIE_LOG_FILE";
/// File used when [`LOG_FILE_ENV`] is unset.
pub const DEFAULT_LOG_FILE: &str = "wolfie.log";

/// Buffered records are written out once this many accumulate.
const FLUSH_THRESHOLD: usize = 256;

/// Event category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Meta,
    Dom,
    Layout,
    Render,
    Measure,
}

#[derive(Serialize)]
struct Record<'a> {
    ts: f64,
    cat: Category,
    op: &'a str,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

enum Sink {
    File { path: PathBuf, file: File },
    Memory(Vec<Value>),
}

struct Inner {
    started: Instant,
    pending: Vec<String>,
    sink: Sink,
}

impl Inner {
    fn drain(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let lines = std::mem::take(&mut self.pending);
        match &mut self.sink {
            Sink::File { file, .. } => {
                for line in &lines {
                    file.write_all(line.as_bytes())?;
                }
                file.flush()
            }
            Sink::Memory(records) => {
                for line in &lines {
                    if let Ok(value) = serde_json::from_str(line) {
                        records.push(value);
                    }
                }
                Ok(())
            }
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Err(err) = self.drain() {
            tracing::warn!(%err, "failed to flush trace log");
        }
    }
}

/// Handle to the trace sidecar. Disabled handles make every call a no-op.
#[derive(Clone, Default)]
pub struct TraceLog {
    inner: Option<Rc<RefCell<Inner>>>,
}

impl TraceLog {
    /// A handle that records nothing.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Open (append to) `path` and write the session header immediately.
    pub fn to_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let log = Self::with_sink(Sink::File { path, file });
        log.flush()?;
        Ok(log)
    }

    /// Keep records in memory; read them back with [`TraceLog::records`].
    pub fn memory() -> Self {
        Self::with_sink(Sink::Memory(Vec::new()))
    }

    /// `WOLFIE_LOG=1` enables the sidecar, writing to `WOLFIE_LOG_FILE`
    /// (default `wolfie.log`). A file that cannot be opened disables it.
    pub fn from_env() -> Self {
        if std::env::var(LOG_ENV).as_deref() != Ok("1") {
            return Self::disabled();
        }
        let path = std::env::var(LOG_FILE_ENV).unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
        match Self::to_file(&path) {
            Ok(log) => log,
            Err(err) => {
                tracing::warn!(%err, path = %path, "trace log disabled");
                Self::disabled()
            }
        }
    }

    fn with_sink(sink: Sink) -> Self {
        let log = Self {
            inner: Some(Rc::new(RefCell::new(Inner {
                started: Instant::now(),
                pending: Vec::new(),
                sink,
            }))),
        };
        let unix_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        log.log(
            Category::Meta,
            "session_start",
            serde_json::json!({ "pid": std::process::id(), "unixMs": unix_ms }),
        );
        log
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Milliseconds since the log was opened, or 0 when disabled.
    pub fn now(&self) -> f64 {
        self.inner
            .as_ref()
            .map(|inner| inner.borrow().started.elapsed().as_secs_f64() * 1000.0)
            .unwrap_or_default()
    }

    /// Record one event. `fields` should be a JSON object; other values are
    /// stored under a `value` key.
    pub fn log(&self, cat: Category, op: &str, fields: Value) {
        let Some(inner) = &self.inner else {
            return;
        };
        let ts = self.now();
        let fields = match fields {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };

        let line = match serde_json::to_string(&Record { ts, cat, op, fields }) {
            Ok(line) => line + "\n",
            Err(err) => {
                tracing::warn!(%err, op, "unserializable trace record");
                return;
            }
        };

        let mut inner = inner.borrow_mut();
        inner.pending.push(line);
        if inner.pending.len() >= FLUSH_THRESHOLD {
            if let Err(err) = inner.drain() {
                tracing::warn!(%err, "failed to flush trace log");
            }
        }
    }

    /// Write buffered records out.
    pub fn flush(&self) -> io::Result<()> {
        match &self.inner {
            Some(inner) => inner.borrow_mut().drain(),
            None => Ok(()),
        }
    }

    /// Flushed records of a memory log. Empty for file and disabled logs.
    pub fn records(&self) -> Vec<Value> {
        let Some(inner) = &self.inner else {
            return Vec::new();
        };
        let mut inner = inner.borrow_mut();
        if inner.drain().is_err() {
            return Vec::new();
        }
        match &inner.sink {
            Sink::Memory(records) => records.clone(),
            Sink::File { .. } => Vec::new(),
        }
    }

    /// Records of a memory log matching `cat` and `op`.
    pub fn find(&self, cat: &str, op: &str) -> Vec<Value> {
        self.records()
            .into_iter()
            .filter(|r| r["cat"] == cat && r["op"] == op)
            .collect()
    }

    /// Path of a file-backed log.
    pub fn path(&self) -> Option<PathBuf> {
        let inner = self.inner.as_ref()?.borrow();
        match &inner.sink {
            Sink::File { path, .. } => Some(path.clone()),
            Sink::Memory(_) => None,
        }
    }
}

impl std::fmt::Debug for TraceLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceLog")
            .field("enabled", &self.enabled())
            .field("path", &self.path())
            .finish()
    }
}
