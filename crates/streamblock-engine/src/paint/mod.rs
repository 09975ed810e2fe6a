//! Color math shared by the sampler, scheduler and gradient synthesizer.
//!
//! Scope:
//! - 8-bit RGB representation and hex conversion
//! - interpolation, L1 distance, contrast pick
//! - easing curve for transitions
//!
//! Every malformed-input path resolves to [`NEUTRAL_GRAY`].

mod color;
mod ease;

pub use color::{
    contrast_color, contrast_rgb, distance, hex_to_rgb, lerp, rgb_to_hex, Rgb, NEUTRAL_GRAY,
};
pub use ease::ease_in_out;
