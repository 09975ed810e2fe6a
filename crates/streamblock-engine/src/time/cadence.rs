use std::time::{Duration, Instant};

/// Timing snapshot taken at the start of a loop iteration.
#[derive(Debug, Copy, Clone)]
pub struct Tick {
    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic iteration counter.
    pub index: u64,
}

/// Fixed-period pacer for background loops.
///
/// One `Cadence` per loop. Each iteration calls [`tick`](Self::tick) before
/// doing its work and then sleeps for [`until_next`](Self::until_next), so the
/// loop keeps its period regardless of how long the work took.
///
/// When an iteration overruns a whole period the schedule is rebased on the
/// current time instead of firing a burst of catch-up ticks.
#[derive(Debug, Clone)]
pub struct Cadence {
    period: Duration,
    next: Instant,
    index: u64,
}

impl Cadence {
    /// Creates a cadence whose first tick is due immediately.
    pub fn new(period: Duration) -> Self {
        Self::starting_at(period, Instant::now())
    }

    /// Creates a cadence whose first tick is due at `start`.
    pub fn starting_at(period: Duration, start: Instant) -> Self {
        debug_assert!(!period.is_zero());
        Self {
            period,
            next: start,
            index: 0,
        }
    }

    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Records an iteration starting now and schedules the next one.
    pub fn tick(&mut self) -> Tick {
        self.tick_at(Instant::now())
    }

    /// Like [`tick`](Self::tick) with an explicit timestamp.
    pub fn tick_at(&mut self, now: Instant) -> Tick {
        let scheduled = self.next + self.period;
        self.next = if scheduled <= now { now + self.period } else { scheduled };

        let t = Tick {
            now,
            index: self.index,
        };
        self.index = self.index.wrapping_add(1);
        t
    }

    /// Time left until the next iteration is due. Zero when overdue.
    #[inline]
    pub fn until_next(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }
}
