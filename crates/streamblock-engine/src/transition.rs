//! Eased transitions between anchor color states.
//!
//! States: Idle (`active == false`) → Transitioning → Idle. A new target
//! while transitioning restarts from whatever `current` holds at that moment;
//! targets never queue.

use std::time::{Duration, Instant};

use crate::anchor::{AnchorSet, Direction};
use crate::classify::RenderMode;
use crate::paint::{ease_in_out, lerp};

/// Consistent copy of what rendering needs, taken under the block's guard.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Snapshot {
    pub colors: AnchorSet,
    pub mode: RenderMode,
}

/// Per-block transition state.
///
/// Invariant: when not active, `current` equals the last fully applied
/// target.
#[derive(Debug, Clone)]
pub struct TransitionScheduler {
    current: AnchorSet,
    target: AnchorSet,
    start: Instant,
    duration: Duration,
    active: bool,
    mode: RenderMode,
    pending_mode: RenderMode,
}

impl TransitionScheduler {
    /// Idle scheduler with every anchor at neutral gray.
    pub fn new(duration: Duration) -> Self {
        Self::seeded(AnchorSet::default(), duration)
    }

    /// Idle scheduler already showing `colors`.
    pub fn seeded(colors: AnchorSet, duration: Duration) -> Self {
        Self {
            current: colors,
            target: colors,
            start: Instant::now(),
            duration,
            active: false,
            mode: RenderMode::Solid,
            pending_mode: RenderMode::Solid,
        }
    }

    #[inline]
    pub fn current(&self) -> &AnchorSet {
        &self.current
    }

    #[inline]
    pub fn target(&self) -> &AnchorSet {
        &self.target
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Mode currently rendered.
    #[inline]
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Mode that becomes current when the running transition completes.
    #[inline]
    pub fn pending_mode(&self) -> RenderMode {
        self.pending_mode
    }

    #[inline]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            colors: self.current,
            mode: self.mode,
        }
    }

    pub fn set_pending_mode(&mut self, mode: RenderMode) {
        self.pending_mode = mode;
    }

    /// Begins easing toward `targets`, abandoning any transition in flight.
    pub fn start_transition(&mut self, targets: AnchorSet, now: Instant) {
        self.target = targets;
        self.start = now;
        self.active = true;
    }

    /// Moves `current` toward `target` for time `now`.
    ///
    /// Returns whether anything rendering reads (colors or mode) changed.
    pub fn advance(&mut self, now: Instant) -> bool {
        if !self.active {
            return false;
        }

        let before = self.snapshot();
        let elapsed = now.saturating_duration_since(self.start);

        if elapsed >= self.duration {
            self.current = self.target;
            self.active = false;
            self.mode = self.pending_mode;
        } else {
            let factor = ease_in_out(elapsed.as_secs_f32() / self.duration.as_secs_f32());
            for dir in Direction::ALL {
                self.current[dir] = lerp(self.current[dir], self.target[dir], factor);
            }
        }

        self.snapshot() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Rgb;

    const SEC: Duration = Duration::from_secs(1);

    fn black_to_white() -> (TransitionScheduler, Instant) {
        let mut s = TransitionScheduler::seeded(AnchorSet::uniform(Rgb::black()), SEC);
        let t0 = Instant::now();
        s.set_pending_mode(RenderMode::Gradient);
        s.start_transition(AnchorSet::uniform(Rgb::white()), t0);
        (s, t0)
    }

    #[test]
    fn new_is_idle_gray() {
        let mut s = TransitionScheduler::new(SEC);
        assert!(!s.is_active());
        assert_eq!(*s.current(), AnchorSet::default());
        assert!(!s.advance(Instant::now()));
    }

    #[test]
    fn completion_copies_target_exactly() {
        let (mut s, t0) = black_to_white();
        assert!(s.advance(t0 + SEC));
        assert_eq!(*s.current(), *s.target());
        assert!(!s.is_active());
        assert_eq!(s.mode(), RenderMode::Gradient);
    }

    #[test]
    fn completion_after_overrun() {
        let (mut s, t0) = black_to_white();
        s.advance(t0 + 5 * SEC);
        assert_eq!(*s.current(), AnchorSet::uniform(Rgb::white()));
        assert!(!s.is_active());
    }

    #[test]
    fn mode_commits_only_on_completion() {
        let (mut s, t0) = black_to_white();
        s.advance(t0 + SEC / 2);
        assert_eq!(s.mode(), RenderMode::Solid);
        assert_eq!(s.pending_mode(), RenderMode::Gradient);
    }

    #[test]
    fn midpoint_is_strictly_between() {
        let (mut s, t0) = black_to_white();
        assert!(s.advance(t0 + SEC / 2));
        for (_, c) in s.current().iter() {
            for ch in [c.r, c.g, c.b] {
                assert!(ch > 0 && ch < 255, "channel {ch} not strictly between");
            }
        }
        assert!(s.is_active());
    }

    #[test]
    fn approach_is_monotonic_without_overshoot() {
        let (mut s, t0) = black_to_white();
        let mut prev = 0u8;
        for ms in (0..1000).step_by(33) {
            s.advance(t0 + Duration::from_millis(ms));
            let v = s.current()[Direction::Top].r;
            assert!(v >= prev, "went backwards at {ms}ms");
            prev = v;
        }
    }

    #[test]
    fn restart_keeps_interpolated_current() {
        let (mut s, t0) = black_to_white();
        s.advance(t0 + SEC / 2);
        let mid = *s.current();

        let t1 = t0 + SEC / 2;
        s.start_transition(AnchorSet::uniform(Rgb::black()), t1);
        assert_eq!(*s.current(), mid);
        assert!(s.is_active());

        // First tick of the new transition eases from `mid`, not from white.
        s.advance(t1 + SEC / 10);
        let v = s.current()[Direction::Top].r;
        assert!(v <= mid[Direction::Top].r);
        assert!(v > 0);
    }

    #[test]
    fn idle_advance_is_noop() {
        let (mut s, t0) = black_to_white();
        s.advance(t0 + SEC);
        let done = *s.current();
        assert!(!s.advance(t0 + 3 * SEC));
        assert_eq!(*s.current(), done);
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let mut s = TransitionScheduler::new(Duration::ZERO);
        let t0 = Instant::now();
        s.start_transition(AnchorSet::uniform(Rgb::white()), t0);
        assert!(s.advance(t0));
        assert!(!s.is_active());
    }
}
