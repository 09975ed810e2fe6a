use std::sync::Arc;

use image::RgbImage;

use crate::anchor::{AnchorSet, Direction};
use crate::config::EngineConfig;
use crate::coords::Rect;
use crate::paint::{distance, Rgb};

use super::{SampleRegion, ScreenSource};

/// Reads the eight anchor colors around a block.
pub struct Sampler {
    source: Arc<dyn ScreenSource>,
    margin: i32,
    size: i32,
    min_region: i32,
    quantize_step: u8,
    change_threshold: u16,
}

impl Sampler {
    pub fn new(source: Arc<dyn ScreenSource>, config: &EngineConfig) -> Self {
        Self {
            source,
            margin: config.sample_margin,
            size: config.sample_size,
            min_region: config.min_region_size,
            quantize_step: config.quantize_step,
            change_threshold: config.change_threshold,
        }
    }

    /// Samples every direction around `block`.
    ///
    /// Directions whose region is degenerate, or whose capture fails, keep
    /// their color from `prior`. Returns `None` when the screen is empty or
    /// every attempted capture failed, so the caller skips this pass.
    pub fn sample(&self, block: Rect, prior: &AnchorSet) -> Option<AnchorSet> {
        let screen = self.source.bounds();
        if !screen.is_valid() {
            log::trace!("sample pass skipped: screen has no area");
            return None;
        }

        let mut candidate = *prior;
        let mut attempted = 0usize;
        let mut failed = 0usize;

        for dir in Direction::ALL {
            let Some(region) = SampleRegion::for_direction(
                dir,
                block,
                screen,
                self.margin,
                self.size,
                self.min_region,
            ) else {
                log::trace!("{dir}: region degenerate, keeping prior color");
                continue;
            };

            attempted += 1;
            match self.read(&region) {
                Some(color) => candidate[dir] = color,
                None => failed += 1,
            }
        }

        if attempted > 0 && failed == attempted {
            log::debug!("sample pass skipped: all {attempted} captures failed");
            return None;
        }
        Some(candidate)
    }

    /// True when `candidate` differs enough from `target` to start a transition.
    #[inline]
    pub fn exceeds_threshold(&self, candidate: &AnchorSet, target: &AnchorSet) -> bool {
        exceeds_threshold(candidate, target, self.change_threshold)
    }

    fn read(&self, region: &SampleRegion) -> Option<Rgb> {
        match self.source.capture(region) {
            Ok(pixels) => {
                let color = reduce(&pixels, region, self.quantize_step);
                if color.is_none() {
                    log::trace!("{}: captured region was empty", region.direction);
                }
                color
            }
            Err(err) => {
                log::trace!("{}: {err}", region.direction);
                None
            }
        }
    }
}

/// Center pixel of a captured region, quantized to `step`.
fn reduce(pixels: &RgbImage, region: &SampleRegion, step: u8) -> Option<Rgb> {
    let (cx, cy) = region.local_center();
    // Sources may hand back less than was asked for; fall back to their center.
    let (cx, cy) = if cx < pixels.width() && cy < pixels.height() {
        (cx, cy)
    } else {
        (pixels.width() / 2, pixels.height() / 2)
    };
    pixels
        .get_pixel_checked(cx, cy)
        .map(|p| Rgb::from(*p).quantized(step))
}

/// True when any direction's distance between the two sets exceeds `threshold`.
pub fn exceeds_threshold(candidate: &AnchorSet, target: &AnchorSet, threshold: u16) -> bool {
    Direction::ALL
        .into_iter()
        .any(|d| distance(candidate[d], target[d]) > threshold)
}
