/// Cubic ease-in-out on `[0, 1]`.
///
/// Input outside the range is clamped, so callers can pass raw
/// `elapsed / duration` ratios.
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}
