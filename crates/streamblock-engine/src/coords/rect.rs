use super::{BlockLimits, ScreenBounds};

/// Axis-aligned rectangle in screen pixels (top-left origin).
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    #[inline]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(self) -> i32 {
        self.x.saturating_add(self.w)
    }

    #[inline]
    pub fn bottom(self) -> i32 {
        self.y.saturating_add(self.h)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Integer midpoint of the rectangle.
    #[inline]
    pub fn center(self) -> (i32, i32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    /// Clamps size into `limits`, then position so the rect stays on `screen`.
    ///
    /// A screen smaller than the rect pins it to the origin.
    pub fn clamped(self, limits: BlockLimits, screen: ScreenBounds) -> Self {
        let w = self.w.clamp(limits.min_size, limits.max_width.max(limits.min_size));
        let h = self.h.clamp(limits.min_size, limits.max_height.max(limits.min_size));
        let x = self.x.min(screen.width - w).max(0);
        let y = self.y.min(screen.height - h).max(0);
        Self { x, y, w, h }
    }

    /// Intersection, or `None` when the overlap has no area.
    #[inline]
    pub fn intersect(self, other: Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());

        if x1 <= x0 || y1 <= y0 {
            None
        } else {
            Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> ScreenBounds {
        ScreenBounds::new(1920, 1080)
    }

    // ── clamped ───────────────────────────────────────────────────────────

    #[test]
    fn clamped_inside_is_identity() {
        let r = Rect::new(100, 100, 240, 72);
        assert_eq!(r.clamped(BlockLimits::default(), screen()), r);
    }

    #[test]
    fn clamped_enforces_min_size() {
        let r = Rect::new(10, 10, 0, -5).clamped(BlockLimits::default(), screen());
        assert_eq!((r.w, r.h), (20, 20));
    }

    #[test]
    fn clamped_enforces_max_size() {
        let big = ScreenBounds::new(5000, 5000);
        let r = Rect::new(0, 0, 9000, 9000).clamped(BlockLimits::default(), big);
        assert_eq!((r.w, r.h), (4000, 3000));
    }

    #[test]
    fn clamped_pulls_rect_back_on_screen() {
        let r = Rect::new(1900, -40, 100, 50).clamped(BlockLimits::default(), screen());
        assert_eq!((r.x, r.y), (1820, 0));
    }

    #[test]
    fn clamped_on_tiny_screen_pins_origin() {
        let tiny = ScreenBounds::new(40, 40);
        let r = Rect::new(50, 50, 100, 100).clamped(BlockLimits::default(), tiny);
        assert_eq!((r.x, r.y), (0, 0));
    }

    // ── intersect ─────────────────────────────────────────────────────────

    #[test]
    fn intersect_overlapping() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.intersect(b), Some(Rect::new(5, 5, 5, 5)));
    }

    #[test]
    fn intersect_touching_edge_returns_none() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert!(a.intersect(b).is_none());
    }

    #[test]
    fn is_empty_zero_size() {
        assert!(Rect::new(0, 0, 0, 5).is_empty());
        assert!(!Rect::new(0, 0, 1, 1).is_empty());
    }
}
