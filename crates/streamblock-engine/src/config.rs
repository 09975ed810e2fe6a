//! Engine tunables.

use std::time::Duration;

use crate::coords::BlockLimits;

/// Every tunable the adaptive color engine reads.
///
/// One instance is handed to the [`Coordinator`](crate::engine::Coordinator)
/// at construction and cloned into each block's threads.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Period of the observe (screen sampling) loop.
    pub sample_interval: Duration,
    /// Period of the animate loop.
    pub frame_interval: Duration,
    /// Length of one color transition.
    pub transition_duration: Duration,
    /// Per-direction distance a new sample must exceed to become the target.
    pub change_threshold: u16,
    /// Max pairwise anchor distance above which gradient mode is used.
    pub gradient_threshold: u16,
    /// How far outside the block each sample region is centered, in pixels.
    pub sample_margin: i32,
    /// Edge length of a sample region before clamping, in pixels.
    pub sample_size: i32,
    /// Regions narrower or shorter than this after clamping are skipped.
    pub min_region_size: i32,
    /// Channel quantization step applied to every sampled color.
    pub quantize_step: u8,
    /// How long `disable` waits for a block's threads to exit.
    pub shutdown_timeout: Duration,
    /// Size range enforced on block geometry.
    pub limits: BlockLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_secs(2),
            frame_interval: Duration::from_micros(33_333),
            transition_duration: Duration::from_secs(1),
            change_threshold: 30,
            gradient_threshold: 60,
            sample_margin: 10,
            sample_size: 20,
            min_region_size: 8,
            quantize_step: 16,
            shutdown_timeout: Duration::from_secs(1),
            limits: BlockLimits::default(),
        }
    }
}

impl EngineConfig {
    /// Replaces values the loops cannot run with by their defaults.
    ///
    /// Zero periods would spin, a non-positive sample size yields no regions.
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        if self.sample_interval.is_zero() {
            self.sample_interval = d.sample_interval;
        }
        if self.frame_interval.is_zero() {
            self.frame_interval = d.frame_interval;
        }
        if self.sample_size <= 0 {
            self.sample_size = d.sample_size;
        }
        if self.min_region_size <= 0 {
            self.min_region_size = 1;
        }
        if self.sample_margin < 0 {
            self.sample_margin = 0;
        }
        self
    }
}
