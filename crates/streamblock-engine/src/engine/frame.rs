use std::fmt;
use std::sync::mpsc;
use std::sync::Arc;

use image::RgbImage;
use parking_lot::RwLock;

use crate::anchor::Direction;
use crate::classify::RenderMode;
use crate::coords::{BlockLimits, Rect};
use crate::gradient::render_gradient;
use crate::paint::{contrast_rgb, Rgb};
use crate::sample::ScreenSource;
use crate::transition::Snapshot;

/// Host-assigned identity of a block.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block#{}", self.0)
    }
}

/// Fill handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Rgb),
    Gradient(RgbImage),
}

/// One presentable state of a block.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub mode: RenderMode,
    pub paint: Paint,
    /// Black or white, whichever reads better over the fill.
    pub ink: Rgb,
}

impl Frame {
    pub fn solid(fill: Rgb) -> Self {
        Self {
            mode: RenderMode::Solid,
            paint: Paint::Solid(fill),
            ink: contrast_rgb(fill),
        }
    }

    /// Builds the frame for `snapshot` at the given block size.
    ///
    /// Solid mode uses the `top` anchor as the fill; gradient mode rasterizes
    /// all anchors, which is the expensive path.
    pub fn from_snapshot(snapshot: &Snapshot, width: i32, height: i32) -> Self {
        let fill = snapshot.colors[Direction::Top];
        let paint = match snapshot.mode {
            RenderMode::Solid => Paint::Solid(fill),
            RenderMode::Gradient => {
                Paint::Gradient(render_gradient(width, height, &snapshot.colors))
            }
        };
        Self {
            mode: snapshot.mode,
            paint,
            ink: contrast_rgb(fill),
        }
    }
}

/// Emitted when an observation is accepted and its dominant color is new.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AdaptationEvent {
    pub mode: RenderMode,
    pub dominant: Rgb,
    /// Dominant color of the previous announcement, if any.
    pub previous: Option<Rgb>,
}

/// Receiver of everything the engine produces for the presentation layer.
///
/// Called from background threads. Implementations that draw must forward to
/// whichever single thread owns the surface (see [`ChannelSink`]).
pub trait FrameSink: Send + Sync {
    fn on_frame_ready(&self, id: BlockId, frame: Frame);

    fn on_adaptation_event(&self, id: BlockId, event: AdaptationEvent) {
        let _ = (id, event);
    }
}

/// Messages delivered by [`ChannelSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    FrameReady { id: BlockId, frame: Frame },
    Adapted { id: BlockId, event: AdaptationEvent },
}

/// [`FrameSink`] that forwards to an mpsc channel drained by the UI thread.
///
/// Sends after the receiver is gone are dropped silently.
#[derive(Debug)]
pub struct ChannelSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::Receiver<EngineEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl FrameSink for ChannelSink {
    fn on_frame_ready(&self, id: BlockId, frame: Frame) {
        let _ = self.tx.send(EngineEvent::FrameReady { id, frame });
    }

    fn on_adaptation_event(&self, id: BlockId, event: AdaptationEvent) {
        let _ = self.tx.send(EngineEvent::Adapted { id, event });
    }
}

/// Source of a block's live geometry.
///
/// Position and size change under the engine (drag, resize). `None` means the
/// block no longer exists and its threads should exit.
pub trait GeometryProvider: Send + Sync {
    fn geometry(&self) -> Option<Rect>;
}

impl<F> GeometryProvider for F
where
    F: Fn() -> Option<Rect> + Send + Sync,
{
    fn geometry(&self) -> Option<Rect> {
        self()
    }
}

/// Shared, host-updatable geometry slot.
#[derive(Debug, Clone, Default)]
pub struct SharedGeometry {
    rect: Arc<RwLock<Option<Rect>>>,
}

impl SharedGeometry {
    pub fn new(rect: Rect) -> Self {
        Self { rect: Arc::new(RwLock::new(Some(rect))) }
    }

    pub fn set(&self, rect: Rect) {
        *self.rect.write() = Some(rect);
    }

    /// Marks the block as gone.
    pub fn clear(&self) {
        *self.rect.write() = None;
    }
}

impl GeometryProvider for SharedGeometry {
    fn geometry(&self) -> Option<Rect> {
        *self.rect.read()
    }
}

/// Host geometry as the background loops see it: clamped to the size
/// limits and pulled onto the current screen.
#[derive(Clone)]
pub(crate) struct BlockGeometry {
    provider: Arc<dyn GeometryProvider>,
    source: Arc<dyn ScreenSource>,
    limits: BlockLimits,
}

impl BlockGeometry {
    pub(crate) fn new(
        provider: Arc<dyn GeometryProvider>,
        source: Arc<dyn ScreenSource>,
        limits: BlockLimits,
    ) -> Self {
        Self { provider, source, limits }
    }

    /// `None` once the host has dropped the block.
    pub(crate) fn current(&self) -> Option<Rect> {
        let rect = self.provider.geometry()?;
        Some(rect.clamped(self.limits, self.source.bounds()))
    }
}
