//! Time subsystem.
//!
//! Provides loop pacing for the observe and animate threads without coupling
//! to any particular sleep primitive. Intended usage:
//! - one `Cadence` per background loop
//! - call `tick()` at the top of each iteration, then sleep `until_next()`

mod cadence;

pub use cadence::{Cadence, Tick};
