use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use crate::anchor::AnchorSet;
use crate::config::EngineConfig;
use crate::layout::BlockRecord;
use crate::paint::Rgb;
use crate::sample::{Sampler, ScreenSource};
use crate::transition::TransitionScheduler;

use super::animate::Animator;
use super::frame::BlockGeometry;
use super::observe::{DominantTracker, Observer};
use super::stop::{StopTrigger, TaskLatch};
use super::{BlockId, Frame, FrameSink, GeometryProvider, StopSignal};

/// Background threads of one dynamic block.
struct BlockTasks {
    trigger: StopTrigger,
    latch: TaskLatch,
    threads: Vec<JoinHandle<()>>,
}

impl BlockTasks {
    /// Both loops are still running. A block that lost either one no longer
    /// adapts and must be restartable.
    fn is_alive(&self) -> bool {
        !self.trigger.is_stopped()
            && !self.threads.is_empty()
            && self.threads.iter().all(|t| !t.is_finished())
    }

    /// Signals both loops and waits up to `timeout` for them to exit.
    fn shutdown(self, id: BlockId, timeout: Duration) {
        self.trigger.stop();
        if !self.latch.wait_idle(timeout) {
            log::warn!(
                "{id}: {} thread(s) still running after {timeout:?}, detaching",
                self.latch.live()
            );
            return;
        }
        for handle in self.threads {
            if handle.join().is_err() {
                log::warn!("{id}: background thread panicked");
            }
        }
        log::debug!("{id}: dynamic color disabled");
    }
}

/// Runs the observe/animate thread pair for every dynamic block.
///
/// Each block owns an independent [`TransitionScheduler`] behind its own
/// mutex; blocks share nothing but the screen source and the sink. The
/// registry lock is never held across sink calls or thread shutdown, so
/// sinks may call back into the coordinator.
pub struct Coordinator {
    config: EngineConfig,
    source: Arc<dyn ScreenSource>,
    sink: Arc<dyn FrameSink>,
    blocks: Mutex<HashMap<BlockId, BlockTasks>>,
}

impl Coordinator {
    pub fn new(
        config: EngineConfig,
        source: Arc<dyn ScreenSource>,
        sink: Arc<dyn FrameSink>,
    ) -> Self {
        Self {
            config: config.sanitized(),
            source,
            sink,
            blocks: Mutex::new(HashMap::new()),
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Starts dynamic color for `id`.
    ///
    /// The block starts as a solid `initial_fill` (presented immediately) and
    /// adapts from there. Returns `false` if the block is already running or
    /// its threads could not be spawned.
    pub fn enable<G>(&self, id: BlockId, geometry: G, initial_fill: Rgb) -> bool
    where
        G: GeometryProvider + 'static,
    {
        let stale = {
            let mut blocks = self.blocks.lock();
            if blocks.get(&id).is_some_and(BlockTasks::is_alive) {
                return false;
            }
            blocks.remove(&id)
        };
        // A pair that lost a thread (geometry gone, sink panic) leaves a
        // stale entry behind.
        if let Some(stale) = stale {
            stale.shutdown(id, self.config.shutdown_timeout);
        }

        let geometry = BlockGeometry::new(
            Arc::new(geometry),
            self.source.clone(),
            self.config.limits,
        );
        let state = Arc::new(Mutex::new(TransitionScheduler::seeded(
            AnchorSet::uniform(initial_fill),
            self.config.transition_duration,
        )));
        let (stop, trigger) = StopSignal::new();
        let latch = TaskLatch::new();

        // Presented before either loop exists, so it is always the first frame.
        if geometry.current().is_some() {
            self.sink.on_frame_ready(id, Frame::solid(initial_fill));
        }

        let observer = Observer {
            id,
            sampler: Sampler::new(self.source.clone(), &self.config),
            gradient_threshold: self.config.gradient_threshold,
            state: state.clone(),
            sink: self.sink.clone(),
            tracker: DominantTracker::default(),
        };
        let animator = Animator {
            id,
            state,
            sink: self.sink.clone(),
            drawn_size: None,
        };

        let mut threads = Vec::with_capacity(2);
        let spawned = {
            let (geometry, stop, guard) = (geometry.clone(), stop.clone(), latch.enter());
            let period = self.config.sample_interval;
            thread::Builder::new()
                .name(format!("sb-observe-{}", id.0))
                .spawn(move || {
                    let _guard = guard;
                    observer.run(geometry, stop, period);
                })
        }
        .and_then(|observe| {
            threads.push(observe);
            let guard = latch.enter();
            let period = self.config.frame_interval;
            thread::Builder::new()
                .name(format!("sb-animate-{}", id.0))
                .spawn(move || {
                    let _guard = guard;
                    animator.run(geometry, stop, period);
                })
        });

        match spawned {
            Ok(animate) => threads.push(animate),
            Err(err) => {
                log::error!("{id}: failed to spawn background thread: {err}");
                BlockTasks { trigger, latch, threads }.shutdown(id, self.config.shutdown_timeout);
                return false;
            }
        }
        let tasks = BlockTasks { trigger, latch, threads };

        // Another `enable` for the same id may have won while the lock was
        // released; the loser stops its own pair.
        let (loser, replaced) = {
            let mut blocks = self.blocks.lock();
            if blocks.get(&id).is_some_and(BlockTasks::is_alive) {
                (Some(tasks), None)
            } else {
                (None, blocks.insert(id, tasks))
            }
        };
        if let Some(stale) = replaced {
            stale.shutdown(id, self.config.shutdown_timeout);
        }
        if let Some(tasks) = loser {
            tasks.shutdown(id, self.config.shutdown_timeout);
            return false;
        }

        log::debug!("{id}: dynamic color enabled (fill {})", initial_fill.to_hex());
        true
    }

    /// Enables the block described by a persisted record, if it is dynamic.
    pub fn enable_record<G>(&self, id: BlockId, record: &BlockRecord, geometry: G) -> bool
    where
        G: GeometryProvider + 'static,
    {
        if !record.is_dynamic {
            return false;
        }
        self.enable(id, geometry, record.fill())
    }

    /// Stops dynamic color for `id` and waits (bounded) for its threads.
    ///
    /// Once this returns `true` within the shutdown timeout, no thread of the
    /// block touches its state or the sink again.
    pub fn disable(&self, id: BlockId) -> bool {
        // Release the registry before waiting so other blocks are not held up.
        let Some(tasks) = self.blocks.lock().remove(&id) else {
            return false;
        };
        tasks.shutdown(id, self.config.shutdown_timeout);
        true
    }

    /// Disables every block. Returns how many were running.
    pub fn disable_all(&self) -> usize {
        let drained: Vec<_> = self.blocks.lock().drain().collect();
        let count = drained.len();
        for (_, tasks) in &drained {
            tasks.trigger.stop();
        }
        for (id, tasks) in drained {
            tasks.shutdown(id, self.config.shutdown_timeout);
        }
        count
    }

    pub fn is_enabled(&self, id: BlockId) -> bool {
        self.blocks.lock().get(&id).is_some_and(BlockTasks::is_alive)
    }

    /// Number of registered blocks.
    pub fn len(&self) -> usize {
        self.blocks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.disable_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::RenderMode;
    use crate::coords::Rect;
    use crate::engine::{ChannelSink, EngineEvent, Paint, SharedGeometry};
    use crate::sample::ImageScreen;
    use image::RgbImage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::{self, Receiver};
    use std::sync::{OnceLock, Weak};
    use std::time::Instant;

    const BLOCK: Rect = Rect::new(200, 150, 120, 60);

    fn fast_config() -> EngineConfig {
        EngineConfig {
            sample_interval: Duration::from_millis(20),
            frame_interval: Duration::from_millis(5),
            transition_duration: Duration::from_millis(60),
            ..EngineConfig::default()
        }
    }

    fn setup(desktop: [u8; 3]) -> (Coordinator, ImageScreen, Receiver<EngineEvent>) {
        let screen = ImageScreen::new(RgbImage::from_pixel(640, 480, image::Rgb(desktop)));
        let (sink, rx) = ChannelSink::new();
        let coord = Coordinator::new(fast_config(), Arc::new(screen.clone()), Arc::new(sink));
        (coord, screen, rx)
    }

    /// Drains events until `pred` matches one or the deadline passes.
    fn wait_for(rx: &Receiver<EngineEvent>, pred: impl Fn(&EngineEvent) -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Ok(ev) = rx.recv_timeout(Duration::from_millis(50)) {
                if pred(&ev) {
                    return true;
                }
            }
        }
        false
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn enable_presents_initial_fill_immediately() {
        let (coord, _screen, rx) = setup([0, 0, 0]);
        assert!(coord.enable(BlockId(1), SharedGeometry::new(BLOCK), Rgb::new(255, 0, 0)));

        match rx.recv_timeout(Duration::from_secs(1)).unwrap() {
            EngineEvent::FrameReady { id, frame } => {
                assert_eq!(id, BlockId(1));
                assert_eq!(frame.paint, Paint::Solid(Rgb::new(255, 0, 0)));
            }
            other => panic!("unexpected first event {other:?}"),
        }
        assert!(coord.disable(BlockId(1)));
    }

    #[test]
    fn enable_is_idempotent() {
        let (coord, _screen, _rx) = setup([0, 0, 0]);
        assert!(coord.enable(BlockId(1), SharedGeometry::new(BLOCK), Rgb::black()));
        assert!(!coord.enable(BlockId(1), SharedGeometry::new(BLOCK), Rgb::black()));
        assert_eq!(coord.len(), 1);
        assert!(coord.is_enabled(BlockId(1)));
        assert!(coord.disable(BlockId(1)));
        assert!(!coord.is_enabled(BlockId(1)));
    }

    #[test]
    fn disable_unknown_block_is_false() {
        let (coord, _screen, _rx) = setup([0, 0, 0]);
        assert!(!coord.disable(BlockId(42)));
    }

    #[test]
    fn non_dynamic_record_is_not_enabled() {
        let (coord, _screen, _rx) = setup([0, 0, 0]);
        let record = BlockRecord::from_rect(BLOCK, "#000000", false);
        assert!(!coord.enable_record(BlockId(1), &record, SharedGeometry::new(BLOCK)));
        assert!(coord.is_empty());
    }

    // ── adaptation ────────────────────────────────────────────────────────

    #[test]
    fn block_adapts_to_desktop_color() {
        let (coord, _screen, rx) = setup([0, 0, 250]);
        let record = BlockRecord::from_rect(BLOCK, "#ff0000", true);
        assert!(coord.enable_record(BlockId(9), &record, SharedGeometry::new(BLOCK)));

        let target = Rgb::new(0, 0, 240);
        assert!(wait_for(&rx, |ev| matches!(
            ev,
            EngineEvent::Adapted { event, .. }
                if event.dominant == target && event.mode == RenderMode::Solid
        )));
        assert!(wait_for(&rx, |ev| matches!(
            ev,
            EngineEvent::FrameReady { frame, .. } if frame.paint == Paint::Solid(target)
        )));
        coord.disable_all();
    }

    #[test]
    fn split_desktop_switches_to_gradient() {
        let (coord, screen, rx) = setup([0, 0, 0]);
        screen.update(|img| {
            for x in 260..640 {
                for y in 0..480 {
                    img.put_pixel(x, y, image::Rgb([255, 255, 255]));
                }
            }
        });
        assert!(coord.enable(BlockId(2), SharedGeometry::new(BLOCK), Rgb::black()));

        assert!(wait_for(&rx, |ev| matches!(
            ev,
            EngineEvent::FrameReady { frame, .. }
                if matches!(&frame.paint, Paint::Gradient(img) if img.dimensions() == (120, 60))
        )));
        coord.disable(BlockId(2));
    }

    // ── teardown ──────────────────────────────────────────────────────────

    #[test]
    fn no_frames_after_disable_returns() {
        let (coord, screen, rx) = setup([0, 0, 0]);
        assert!(coord.enable(BlockId(5), SharedGeometry::new(BLOCK), Rgb::white()));
        screen.replace(RgbImage::from_pixel(640, 480, image::Rgb([90, 200, 40])));
        assert!(wait_for(&rx, |ev| matches!(ev, EngineEvent::Adapted { .. })));

        assert!(coord.disable(BlockId(5)));
        while rx.try_recv().is_ok() {}

        screen.replace(RgbImage::from_pixel(640, 480, image::Rgb([255, 255, 255])));
        thread::sleep(Duration::from_millis(150));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn removed_geometry_ends_threads_and_allows_reenable() {
        let (coord, _screen, _rx) = setup([0, 0, 0]);
        let geometry = SharedGeometry::new(BLOCK);
        assert!(coord.enable(BlockId(3), geometry.clone(), Rgb::black()));

        geometry.clear();
        let deadline = Instant::now() + Duration::from_secs(5);
        while coord.is_enabled(BlockId(3)) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(!coord.is_enabled(BlockId(3)));

        assert!(coord.enable(BlockId(3), SharedGeometry::new(BLOCK), Rgb::black()));
        assert!(coord.disable(BlockId(3)));
    }

    #[test]
    fn disable_all_counts_blocks() {
        let (coord, _screen, _rx) = setup([0, 0, 0]);
        for i in 0..3 {
            assert!(coord.enable(BlockId(i), SharedGeometry::new(BLOCK), Rgb::black()));
        }
        assert_eq!(coord.disable_all(), 3);
        assert!(coord.is_empty());
    }

    // ── geometry ──────────────────────────────────────────────────────────

    #[test]
    fn oversized_block_renders_within_limits() {
        // Tall enough that the clamped block still has on-screen neighbors.
        let desktop = RgbImage::from_fn(640, 4000, |x, _| {
            if x < 350 {
                image::Rgb([0, 0, 0])
            } else {
                image::Rgb([255, 255, 255])
            }
        });
        let (sink, rx) = ChannelSink::new();
        let coord = Coordinator::new(
            fast_config(),
            Arc::new(ImageScreen::new(desktop)),
            Arc::new(sink),
        );
        let huge = SharedGeometry::new(Rect::new(250, 100, 200, 5000));
        assert!(coord.enable(BlockId(4), huge, Rgb::black()));

        let max_h = coord.config().limits.max_height as u32;
        assert!(wait_for(&rx, |ev| matches!(
            ev,
            EngineEvent::FrameReady { frame, .. }
                if matches!(&frame.paint, Paint::Gradient(img) if img.dimensions() == (200, max_h))
        )));
        coord.disable_all();
    }

    // ── sink interaction ──────────────────────────────────────────────────

    /// Sink that queries the coordinator from inside its callbacks.
    struct Reentrant {
        coord: OnceLock<Weak<Coordinator>>,
        answered: AtomicUsize,
    }

    impl FrameSink for Reentrant {
        fn on_frame_ready(&self, id: BlockId, _: Frame) {
            if let Some(coord) = self.coord.get().and_then(Weak::upgrade) {
                let _ = coord.is_enabled(id);
                let _ = coord.len();
                self.answered.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn sink_may_call_back_into_coordinator() {
        let screen = ImageScreen::new(RgbImage::from_pixel(640, 480, image::Rgb([0, 0, 0])));
        let sink = Arc::new(Reentrant {
            coord: OnceLock::new(),
            answered: AtomicUsize::new(0),
        });
        let coord = Arc::new(Coordinator::new(fast_config(), Arc::new(screen), sink.clone()));
        let _ = sink.coord.set(Arc::downgrade(&coord));

        let (tx, rx) = mpsc::channel();
        let worker = {
            let coord = coord.clone();
            thread::spawn(move || {
                let _ = tx.send(coord.enable(BlockId(8), SharedGeometry::new(BLOCK), Rgb::white()));
            })
        };
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(true));
        worker.join().unwrap();
        assert!(sink.answered.load(Ordering::SeqCst) >= 1);

        assert!(coord.disable(BlockId(8)));
    }

    /// Panics whenever a frame arrives from an animate thread.
    struct PanicsInAnimate;

    impl FrameSink for PanicsInAnimate {
        fn on_frame_ready(&self, _: BlockId, _: Frame) {
            let animate = thread::current()
                .name()
                .is_some_and(|name| name.starts_with("sb-animate"));
            if animate {
                panic!("sink failure");
            }
        }
    }

    #[test]
    fn block_with_dead_animate_thread_can_be_reenabled() {
        let screen = ImageScreen::new(RgbImage::from_pixel(640, 480, image::Rgb([0, 0, 250])));
        let coord = Coordinator::new(fast_config(), Arc::new(screen), Arc::new(PanicsInAnimate));
        assert!(coord.enable(BlockId(6), SharedGeometry::new(BLOCK), Rgb::new(255, 0, 0)));

        let deadline = Instant::now() + Duration::from_secs(5);
        while coord.is_enabled(BlockId(6)) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(!coord.is_enabled(BlockId(6)));

        assert!(coord.enable(BlockId(6), SharedGeometry::new(BLOCK), Rgb::new(255, 0, 0)));
        coord.disable_all();
    }
}
