use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Cooperative stop flag observed by a block's background threads.
///
/// Threads check [`is_stopped`](Self::is_stopped) at the top of each loop
/// iteration and sleep through [`wait_timeout`](Self::wait_timeout), which
/// returns early as soon as the flag is raised.
#[derive(Debug, Clone)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    /// Creates a connected (signal, trigger) pair.
    pub fn new() -> (Self, StopTrigger) {
        let inner = Arc::new((Mutex::new(false), Condvar::new()));
        let signal = Self { inner: inner.clone() };
        (signal, StopTrigger { inner })
    }

    pub fn is_stopped(&self) -> bool {
        *self.inner.0.lock()
    }

    /// Sleeps for `duration` or until stopped, whichever comes first.
    ///
    /// Returns `true` if stopped, `false` if the full duration elapsed.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let mut stopped = lock.lock();
        let Some(deadline) = Instant::now().checked_add(duration) else {
            while !*stopped {
                cvar.wait(&mut stopped);
            }
            return true;
        };

        // Loop to absorb spurious wakeups.
        while !*stopped {
            if cvar.wait_until(&mut stopped, deadline).timed_out() {
                return *stopped;
            }
        }
        true
    }
}

/// Owner side of a [`StopSignal`].
#[derive(Debug)]
pub struct StopTrigger {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopTrigger {
    /// Raises the flag and wakes every sleeper.
    pub fn stop(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock() = true;
        cvar.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        *self.inner.0.lock()
    }
}

/// Counts a block's live threads so `disable` can wait for them with a bound.
#[derive(Debug, Clone)]
pub(crate) struct TaskLatch {
    inner: Arc<(Mutex<usize>, Condvar)>,
}

impl TaskLatch {
    pub(crate) fn new() -> Self {
        Self { inner: Arc::new((Mutex::new(0), Condvar::new())) }
    }

    /// Registers one live task. The task is counted out when the guard drops,
    /// including on unwind.
    pub(crate) fn enter(&self) -> LatchGuard {
        *self.inner.0.lock() += 1;
        LatchGuard { latch: self.clone() }
    }

    pub(crate) fn live(&self) -> usize {
        *self.inner.0.lock()
    }

    /// Waits until no task is live. Returns `false` on timeout.
    pub(crate) fn wait_idle(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let mut live = lock.lock();
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            while *live > 0 {
                cvar.wait(&mut live);
            }
            return true;
        };
        while *live > 0 {
            if cvar.wait_until(&mut live, deadline).timed_out() {
                return *live == 0;
            }
        }
        true
    }

    fn leave(&self) {
        let (lock, cvar) = &*self.inner;
        let mut live = lock.lock();
        *live = live.saturating_sub(1);
        if *live == 0 {
            cvar.notify_all();
        }
    }
}

pub(crate) struct LatchGuard {
    latch: TaskLatch,
}

impl Drop for LatchGuard {
    fn drop(&mut self) {
        self.latch.leave();
    }
}
