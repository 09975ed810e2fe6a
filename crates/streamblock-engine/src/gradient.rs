//! Eight-anchor gradient synthesis.
//!
//! Two stages: a 3-point piecewise blend along the top and bottom edges
//! (driven by x), then a vertical blend between the two edge colors (driven
//! by y). The left/right anchors do not contribute; the result is a soft
//! approximation, not a bilinear fit of all eight points.

use image::RgbImage;

use crate::anchor::{AnchorSet, Direction};
use crate::paint::{lerp, Rgb, NEUTRAL_GRAY};

/// Renders a `width × height` image from `anchors`.
///
/// Non-positive sizes produce a 1×1 neutral gray placeholder.
pub fn render_gradient(width: i32, height: i32, anchors: &AnchorSet) -> RgbImage {
    if width <= 0 || height <= 0 {
        return RgbImage::from_pixel(1, 1, NEUTRAL_GRAY.into());
    }
    let (w, h) = (width as u32, height as u32);

    // Edge colors depend only on x; compute them once per column.
    let mut edges: Vec<(Rgb, Rgb)> = Vec::with_capacity(w as usize);
    for x in 0..w {
        let xn = normalized(x, w);
        let top = edge_color(
            anchors[Direction::TopLeft],
            anchors[Direction::Top],
            anchors[Direction::TopRight],
            xn,
        );
        let bottom = edge_color(
            anchors[Direction::BottomLeft],
            anchors[Direction::Bottom],
            anchors[Direction::BottomRight],
            xn,
        );
        edges.push((top, bottom));
    }

    let mut img = RgbImage::new(w, h);
    for y in 0..h {
        let yn = normalized(y, h);
        for (x, &(top, bottom)) in edges.iter().enumerate() {
            img.put_pixel(x as u32, y, lerp(top, bottom, yn).into());
        }
    }
    img
}

/// `i / (n - 1)` clamped to `[0, 1]`; a single row or column maps to 0.
#[inline]
fn normalized(i: u32, n: u32) -> f32 {
    if n <= 1 {
        0.0
    } else {
        (i as f32 / (n - 1) as f32).clamp(0.0, 1.0)
    }
}

/// Piecewise blend `start → mid → end` at position `t`.
#[inline]
fn edge_color(start: Rgb, mid: Rgb, end: Rgb, t: f32) -> Rgb {
    if t <= 0.5 {
        lerp(start, mid, t * 2.0)
    } else {
        lerp(mid, end, (t - 0.5) * 2.0)
    }
}
