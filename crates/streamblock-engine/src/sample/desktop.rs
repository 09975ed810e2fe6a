use std::time::{Duration, Instant};

use image::RgbImage;
use xcap::Monitor;

use crate::coords::ScreenBounds;

use super::source::{crop_region, FrameCache};
use super::{CaptureError, SampleRegion, ScreenSource};

/// [`ScreenSource`] reading the primary monitor through `xcap`.
///
/// Screen coordinates are relative to the primary monitor's origin. Grabs are
/// shared between regions for `max_age` (see [`DesktopScreen::with_max_age`]).
pub struct DesktopScreen {
    cache: FrameCache,
}

impl DesktopScreen {
    pub const DEFAULT_MAX_AGE: Duration = Duration::from_millis(100);

    pub fn new() -> Self {
        Self::with_max_age(Self::DEFAULT_MAX_AGE)
    }

    pub fn with_max_age(max_age: Duration) -> Self {
        Self { cache: FrameCache::new(max_age) }
    }
}

impl Default for DesktopScreen {
    fn default() -> Self {
        Self::new()
    }
}

fn primary_monitor() -> Result<Monitor, String> {
    let monitors = Monitor::all().map_err(|e| e.to_string())?;
    monitors
        .into_iter()
        .find(|m| m.is_primary())
        .ok_or_else(|| "no primary monitor".to_string())
}

fn grab_primary() -> Result<RgbImage, String> {
    let rgba = primary_monitor()?.capture_image().map_err(|e| e.to_string())?;
    let (w, h) = rgba.dimensions();
    let rgb: Vec<u8> = rgba
        .into_raw()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    RgbImage::from_raw(w, h, rgb).ok_or_else(|| format!("malformed {w}x{h} capture"))
}

impl ScreenSource for DesktopScreen {
    fn bounds(&self) -> ScreenBounds {
        match primary_monitor() {
            Ok(m) => ScreenBounds::new(m.width() as i32, m.height() as i32),
            Err(err) => {
                log::debug!("monitor query failed: {err}");
                ScreenBounds::default()
            }
        }
    }

    fn capture(&self, region: &SampleRegion) -> Result<RgbImage, CaptureError> {
        let frame = self
            .cache
            .get_or_grab(Instant::now(), grab_primary)
            .map_err(|reason| CaptureError::new(region.rect, reason))?;
        crop_region(&frame, region.rect)
    }
}
