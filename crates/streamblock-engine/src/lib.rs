//! StreamBlock engine crate.
//!
//! This crate owns the adaptive color pipeline behind StreamBlock overlay
//! rectangles: screen sampling, change detection, transitions and gradient
//! synthesis, plus the per-block threads that drive them. Presentation is
//! left to the host through [`engine::FrameSink`].

pub mod anchor;
pub mod classify;
pub mod config;
pub mod coords;
pub mod engine;
pub mod gradient;
pub mod layout;
pub mod paint;
pub mod sample;
pub mod time;
pub mod transition;

pub mod logging;
