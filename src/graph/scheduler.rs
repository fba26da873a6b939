use std::cell::Cell;

/// Ticket for a requested tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(pub u64);

/// Per-frame driver the runtime asks for its next tick.
///
/// The host owns the actual loop (an animation frame callback, a timer, a test) and calls
/// [`crate::graph::GraphRuntime::step`] when a requested tick comes due.
pub trait TickScheduler {
    fn request_tick(&self) -> TickHandle;
    fn cancel_tick(&self, handle: TickHandle);
}

/// Scheduler that only records requests; the caller drives ticks by hand.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: Cell<u64>,
    pending: Cell<Option<TickHandle>>,
    cancelled: Cell<u64>,
    last_cancelled: Cell<Option<TickHandle>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent request that was not cancelled.
    pub fn pending(&self) -> Option<TickHandle> {
        self.pending.get()
    }

    pub fn requested(&self) -> u64 {
        self.next.get()
    }

    /// Number of cancellations so far.
    pub fn cancelled(&self) -> u64 {
        self.cancelled.get()
    }

    pub fn last_cancelled(&self) -> Option<TickHandle> {
        self.last_cancelled.get()
    }
}

impl TickScheduler for ManualScheduler {
    fn request_tick(&self) -> TickHandle {
        let handle = TickHandle(self.next.get());
        self.next.set(handle.0 + 1);
        self.pending.set(Some(handle));
        handle
    }

    fn cancel_tick(&self, handle: TickHandle) {
        if self.pending.get() == Some(handle) {
            self.pending.set(None);
        }
        self.cancelled.set(self.cancelled.get() + 1);
        self.last_cancelled.set(Some(handle));
    }
}
