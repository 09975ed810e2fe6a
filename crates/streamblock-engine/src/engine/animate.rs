use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::classify::RenderMode;
use crate::coords::Rect;
use crate::time::Cadence;
use crate::transition::TransitionScheduler;

use super::frame::BlockGeometry;
use super::{BlockId, Frame, FrameSink, StopSignal};

/// Body of a block's fast loop: advance the transition, redraw on change.
pub(crate) struct Animator {
    pub(crate) id: BlockId,
    pub(crate) state: Arc<Mutex<TransitionScheduler>>,
    pub(crate) sink: Arc<dyn FrameSink>,
    /// Size of the last rasterized gradient, if any.
    pub(crate) drawn_size: Option<(i32, i32)>,
}

impl Animator {
    pub(crate) fn run(mut self, geometry: BlockGeometry, stop: StopSignal, period: Duration) {
        log::debug!("{}: animate loop started ({period:?})", self.id);
        let mut cadence = Cadence::new(period);

        loop {
            if stop.is_stopped() {
                break;
            }
            let tick = cadence.tick();
            let Some(rect) = geometry.current() else {
                log::debug!("{}: geometry gone, animate loop exiting", self.id);
                break;
            };

            if let Some(frame) = self.step(rect, tick.now) {
                // Disabled while rasterizing: drop the frame.
                if stop.is_stopped() {
                    break;
                }
                self.sink.on_frame_ready(self.id, frame);
            }

            if stop.wait_timeout(cadence.until_next(Instant::now())) {
                break;
            }
        }
        log::debug!("{}: animate loop stopped", self.id);
    }

    /// Advances the transition and builds a frame if anything visible changed.
    ///
    /// The guard is held only for the advance and the snapshot copy; the
    /// frame is built after it is released.
    pub(crate) fn step(&mut self, rect: Rect, now: Instant) -> Option<Frame> {
        let (changed, snapshot) = {
            let mut state = self.state.lock();
            let changed = state.advance(now);
            (changed, state.snapshot())
        };

        let size = (rect.w, rect.h);
        let resized = snapshot.mode == RenderMode::Gradient && self.drawn_size != Some(size);
        if !changed && !resized {
            return None;
        }

        self.drawn_size = match snapshot.mode {
            RenderMode::Gradient => Some(size),
            RenderMode::Solid => None,
        };
        Some(Frame::from_snapshot(&snapshot, rect.w, rect.h))
    }
}
