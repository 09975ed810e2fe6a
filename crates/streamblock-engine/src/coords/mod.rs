//! Screen geometry.
//!
//! Canonical space:
//! - physical screen pixels, integer
//! - origin top-left
//! - +X right, +Y down

mod bounds;
mod rect;

pub use bounds::{BlockLimits, ScreenBounds};
pub use rect::Rect;
