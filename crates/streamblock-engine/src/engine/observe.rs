use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::anchor::Direction;
use crate::classify::RenderMode;
use crate::coords::Rect;
use crate::paint::Rgb;
use crate::sample::Sampler;
use crate::time::Cadence;
use crate::transition::TransitionScheduler;

use super::frame::BlockGeometry;
use super::{AdaptationEvent, BlockId, FrameSink, StopSignal};

/// Announces an adaptation only when its dominant color is new.
///
/// The dominant color is the `top` anchor alone, while acceptance looks at
/// all eight anchors; small shifts elsewhere transition silently.
#[derive(Debug, Default)]
pub struct DominantTracker {
    last: Option<Rgb>,
}

impl DominantTracker {
    pub fn observe(&mut self, dominant: Rgb, mode: RenderMode) -> Option<AdaptationEvent> {
        if self.last == Some(dominant) {
            return None;
        }
        let previous = self.last.replace(dominant);
        Some(AdaptationEvent { mode, dominant, previous })
    }
}

/// Body of a block's slow loop: sample, compare, classify, retarget.
pub(crate) struct Observer {
    pub(crate) id: BlockId,
    pub(crate) sampler: Sampler,
    pub(crate) gradient_threshold: u16,
    pub(crate) state: Arc<Mutex<TransitionScheduler>>,
    pub(crate) sink: Arc<dyn FrameSink>,
    pub(crate) tracker: DominantTracker,
}

impl Observer {
    pub(crate) fn run(mut self, geometry: BlockGeometry, stop: StopSignal, period: Duration) {
        log::debug!("{}: observe loop started ({period:?})", self.id);
        let mut cadence = Cadence::new(period);

        loop {
            if stop.is_stopped() {
                break;
            }
            let tick = cadence.tick();
            let Some(rect) = geometry.current() else {
                log::debug!("{}: geometry gone, observe loop exiting", self.id);
                break;
            };

            self.step(rect, tick.now);

            if stop.wait_timeout(cadence.until_next(Instant::now())) {
                break;
            }
        }
        log::debug!("{}: observe loop stopped", self.id);
    }

    /// One observation pass. Returns the pending mode when a new target was
    /// accepted.
    pub(crate) fn step(&mut self, rect: Rect, now: Instant) -> Option<RenderMode> {
        // Only this loop writes `target`, so the copy stays valid while the
        // capture runs outside the guard.
        let target = *self.state.lock().target();

        let candidate = self.sampler.sample(rect, &target)?;
        if !self.sampler.exceeds_threshold(&candidate, &target) {
            return None;
        }

        let mode = RenderMode::classify(&candidate, self.gradient_threshold);
        {
            let mut state = self.state.lock();
            state.set_pending_mode(mode);
            state.start_transition(candidate, now);
        }

        if let Some(event) = self.tracker.observe(candidate[Direction::Top], mode) {
            let from = event.previous.map_or_else(|| "-".to_string(), Rgb::to_hex);
            log::info!(
                "{}: adapting {from} -> {} ({})",
                self.id,
                event.dominant.to_hex(),
                event.mode.as_str()
            );
            self.sink.on_adaptation_event(self.id, event);
        }
        Some(mode)
    }
}
