//! Render scheduling.
//!
//! Bursts of mutations coalesce into one paint: [`RenderScheduler::schedule_render`]
//! marks the root dirty and queues a single flush on a [`TaskQueue`]. The
//! flush paints once, and queues itself again only if the paint dirtied the
//! root.
//!
//! ```text
//! schedule ─┬─ dirty = true
//!           └─ !scheduled → scheduled = true, enqueue(flush)
//!
//! flush    ─┬─ !dirty → scheduled = false
//!           └─ dirty = false, paint
//!                └─ dirty again ? enqueue(flush) : scheduled = false
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use serde_json::json;

use crate::trace::{Category, TraceLog};

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce()>;

/// Where queued flushes run.
pub trait TaskQueue {
    fn enqueue(&self, task: Task);
}

/// Single-threaded FIFO of tasks. Clones share the queue.
#[derive(Clone, Default)]
pub struct MicrotaskQueue {
    tasks: Rc<RefCell<VecDeque<Task>>>,
}

impl MicrotaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Run tasks, including ones enqueued while running, until none are
    /// left. Returns how many ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let Some(task) = self.tasks.borrow_mut().pop_front() else {
                return ran;
            };
            task();
            ran += 1;
        }
    }
}

impl TaskQueue for MicrotaskQueue {
    fn enqueue(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
    }
}

/// Scheduler configuration.
#[derive(Clone)]
pub struct SchedulerOptions {
    /// Paint on every request instead of queueing.
    pub sync: bool,
    pub queue: Rc<dyn TaskQueue>,
    pub trace: TraceLog,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            sync: false,
            queue: Rc::new(MicrotaskQueue::new()),
            trace: TraceLog::disabled(),
        }
    }
}

struct State {
    dirty: Cell<bool>,
    scheduled: Cell<bool>,
    painting: Cell<bool>,
    paint: Rc<dyn Fn()>,
    queue: Rc<dyn TaskQueue>,
    trace: TraceLog,
}

impl State {
    fn paint(&self, reason: &str) {
        if self.trace.enabled() {
            self.trace.log(Category::Render, "flush", json!({ "reason": reason }));
        }
        self.painting.set(true);
        (self.paint)();
        self.painting.set(false);
    }

    fn enqueue_flush(self: &Rc<Self>) {
        let weak: Weak<State> = Rc::downgrade(self);
        self.queue.enqueue(Box::new(move || {
            if let Some(state) = weak.upgrade() {
                state.run_queued();
            }
        }));
    }

    fn run_queued(self: &Rc<Self>) {
        if !self.dirty.get() {
            self.scheduled.set(false);
            return;
        }
        self.dirty.set(false);
        self.paint("scheduled");

        if self.dirty.get() {
            self.enqueue_flush();
        } else {
            self.scheduled.set(false);
        }
    }
}

/// Coalesces render requests for one root.
pub struct RenderScheduler {
    state: Rc<State>,
    sync: bool,
}

impl RenderScheduler {
    pub fn new(render: impl Fn() + 'static, options: SchedulerOptions) -> Self {
        Self {
            state: Rc::new(State {
                dirty: Cell::new(false),
                scheduled: Cell::new(false),
                painting: Cell::new(false),
                paint: Rc::new(render),
                queue: options.queue,
                trace: options.trace,
            }),
            sync: options.sync,
        }
    }

    /// Request a paint. At most one flush is queued at a time.
    pub fn schedule_render(&self) {
        let state = &self.state;
        state.dirty.set(true);
        if state.trace.enabled() {
            state.trace.log(
                Category::Render,
                "schedule",
                json!({ "alreadyScheduled": state.scheduled.get(), "sync": self.sync }),
            );
        }

        if self.sync {
            self.paint_now();
            return;
        }
        if !state.scheduled.get() {
            state.scheduled.set(true);
            state.enqueue_flush();
        }
    }

    /// Paint now, dropping any pending request.
    pub fn flush(&self) {
        self.state.scheduled.set(false);
        self.paint_now();
    }

    fn paint_now(&self) {
        let state = &self.state;
        // A paint that requests another one is re-run once it returns.
        if state.painting.get() {
            state.dirty.set(true);
            return;
        }
        state.dirty.set(false);
        state.paint("forced");
        while state.dirty.replace(false) {
            state.paint("forced");
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.state.dirty.get()
    }

    pub fn is_scheduled(&self) -> bool {
        self.state.scheduled.get()
    }
}

impl std::fmt::Debug for RenderScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderScheduler")
            .field("sync", &self.sync)
            .field("dirty", &self.is_dirty())
            .field("scheduled", &self.is_scheduled())
            .finish()
    }
}
