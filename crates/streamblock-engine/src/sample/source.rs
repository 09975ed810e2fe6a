use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use image::RgbImage;
use parking_lot::{Mutex, RwLock};

use crate::coords::{Rect, ScreenBounds};

use super::SampleRegion;

/// Error returned by [`ScreenSource::capture`].
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureError {
    pub rect: Rect,
    pub reason: String,
}

impl CaptureError {
    pub fn new(rect: Rect, reason: impl Into<String>) -> Self {
        Self { rect, reason: reason.into() }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "screen capture failed for {}x{}+{}+{}: {}",
            self.rect.w, self.rect.h, self.rect.x, self.rect.y, self.reason
        )
    }
}

impl std::error::Error for CaptureError {}

/// Provider of desktop pixels.
///
/// Implementations are called from the observe threads of every dynamic
/// block, possibly concurrently, and may block on OS capture calls.
pub trait ScreenSource: Send + Sync {
    /// Size of the active screen. Zero-sized bounds mean "nothing to sample".
    fn bounds(&self) -> ScreenBounds;

    /// Copies the pixels under `region`.
    fn capture(&self, region: &SampleRegion) -> Result<RgbImage, CaptureError>;
}

/// A [`ScreenSource`] backed by an in-memory frame.
///
/// Cloning shares the frame, so one handle can keep repainting the "desktop"
/// while the engine samples it through another.
#[derive(Debug, Clone)]
pub struct ImageScreen {
    frame: Arc<RwLock<RgbImage>>,
}

impl ImageScreen {
    pub fn new(frame: RgbImage) -> Self {
        Self { frame: Arc::new(RwLock::new(frame)) }
    }

    /// Swaps in a whole new frame.
    pub fn replace(&self, frame: RgbImage) {
        *self.frame.write() = frame;
    }

    /// Mutates the current frame in place.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut RgbImage),
    {
        f(&mut self.frame.write());
    }

    /// Copy of the current frame.
    pub fn snapshot(&self) -> RgbImage {
        self.frame.read().clone()
    }
}

impl ScreenSource for ImageScreen {
    fn bounds(&self) -> ScreenBounds {
        let frame = self.frame.read();
        ScreenBounds::new(frame.width() as i32, frame.height() as i32)
    }

    fn capture(&self, region: &SampleRegion) -> Result<RgbImage, CaptureError> {
        crop_region(&self.frame.read(), region.rect)
    }
}

/// Copies `rect` out of a full-screen frame.
pub(crate) fn crop_region(frame: &RgbImage, rect: Rect) -> Result<RgbImage, CaptureError> {
    let inside = rect.x >= 0
        && rect.y >= 0
        && rect.w > 0
        && rect.h > 0
        && rect.right() <= frame.width() as i32
        && rect.bottom() <= frame.height() as i32;
    if !inside {
        return Err(CaptureError::new(rect, "region outside frame"));
    }

    let (x, y, w, h) = (rect.x as u32, rect.y as u32, rect.w as u32, rect.h as u32);
    Ok(image::imageops::crop_imm(frame, x, y, w, h).to_image())
}

/// Most recent full-screen grab, reused for `max_age`.
///
/// One sample pass asks for eight regions back to back; they all come out of
/// the same grab. The lock is held while grabbing so concurrent callers wait
/// for the fresh frame instead of grabbing their own.
#[cfg_attr(not(feature = "desktop"), allow(dead_code))]
pub(crate) struct FrameCache {
    max_age: Duration,
    slot: Mutex<Option<(Instant, Arc<RgbImage>)>>,
}

#[cfg_attr(not(feature = "desktop"), allow(dead_code))]
impl FrameCache {
    pub(crate) fn new(max_age: Duration) -> Self {
        Self { max_age, slot: Mutex::new(None) }
    }

    pub(crate) fn get_or_grab<F>(&self, now: Instant, grab: F) -> Result<Arc<RgbImage>, String>
    where
        F: FnOnce() -> Result<RgbImage, String>,
    {
        let mut slot = self.slot.lock();
        if let Some((taken, frame)) = slot.as_ref() {
            if now.saturating_duration_since(*taken) < self.max_age {
                return Ok(frame.clone());
            }
        }
        let frame = Arc::new(grab()?);
        *slot = Some((now, frame.clone()));
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::Direction;

    fn region(rect: Rect) -> SampleRegion {
        SampleRegion { direction: Direction::Top, rect }
    }

    #[test]
    fn capture_copies_region_pixels() {
        let mut img = RgbImage::new(40, 30);
        img.put_pixel(12, 7, image::Rgb([9, 8, 7]));
        let screen = ImageScreen::new(img);

        let out = screen.capture(&region(Rect::new(10, 5, 4, 4))).unwrap();
        assert_eq!(out.dimensions(), (4, 4));
        assert_eq!(out.get_pixel(2, 2).0, [9, 8, 7]);
    }

    #[test]
    fn capture_outside_frame_fails() {
        let screen = ImageScreen::new(RgbImage::new(40, 30));
        let err = screen.capture(&region(Rect::new(30, 20, 20, 20))).unwrap_err();
        assert_eq!(err.rect, Rect::new(30, 20, 20, 20));
        assert!(err.to_string().contains("outside frame"));
    }

    #[test]
    fn clones_share_the_frame() {
        let a = ImageScreen::new(RgbImage::new(10, 10));
        let b = a.clone();
        a.replace(RgbImage::new(64, 48));
        assert_eq!(b.bounds(), ScreenBounds::new(64, 48));
    }

    // ── FrameCache ────────────────────────────────────────────────────────

    #[test]
    fn cache_reuses_recent_frame() {
        let cache = FrameCache::new(Duration::from_millis(100));
        let t0 = Instant::now();
        let mut grabs = 0;
        for dt in [0, 10, 99] {
            let frame = cache
                .get_or_grab(t0 + Duration::from_millis(dt), || {
                    grabs += 1;
                    Ok(RgbImage::new(8, 8))
                })
                .unwrap();
            assert_eq!(frame.dimensions(), (8, 8));
        }
        assert_eq!(grabs, 1);

        cache.get_or_grab(t0 + Duration::from_millis(100), || {
            grabs += 1;
            Ok(RgbImage::new(8, 8))
        })
        .unwrap();
        assert_eq!(grabs, 2);
    }

    #[test]
    fn failed_grab_is_not_cached() {
        let cache = FrameCache::new(Duration::from_secs(10));
        let t0 = Instant::now();
        assert!(cache.get_or_grab(t0, || Err("denied".into())).is_err());
        assert!(cache.get_or_grab(t0, || Ok(RgbImage::new(2, 2))).is_ok());
    }
}
