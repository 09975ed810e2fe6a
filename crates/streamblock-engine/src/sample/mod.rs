//! Screen sampling around a block.
//!
//! Each pass computes one [`SampleRegion`] per anchor direction, captures it
//! through a [`ScreenSource`] and reduces it to a single quantized color.
//! Degenerate regions and failed captures fall back to the previous color
//! for that direction only.
//!
//! Sources:
//! - [`ImageScreen`]: an in-memory frame the host repaints
//! - `DesktopScreen` (feature `desktop`): the primary monitor, via `xcap`

#[cfg(feature = "desktop")]
mod desktop;
mod region;
mod sampler;
mod source;

pub use region::SampleRegion;
pub use sampler::{exceeds_threshold, Sampler};
pub use source::{CaptureError, ImageScreen, ScreenSource};

#[cfg(feature = "desktop")]
pub use desktop::DesktopScreen;
