use crate::anchor::Direction;
use crate::coords::{Rect, ScreenBounds};

/// Screen area read for one anchor direction.
///
/// Always non-empty and fully inside the screen it was computed against.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SampleRegion {
    pub direction: Direction,
    pub rect: Rect,
}

impl SampleRegion {
    /// Computes the region sampled for `direction` around `block`.
    ///
    /// The region is a `size × size` square centered on the block's corner or
    /// edge midpoint, pushed `margin` pixels outward. It is clipped to the
    /// screen; a clipped region thinner than `min_size` on either axis yields
    /// `None`.
    pub fn for_direction(
        direction: Direction,
        block: Rect,
        screen: ScreenBounds,
        margin: i32,
        size: i32,
        min_size: i32,
    ) -> Option<Self> {
        if size <= 0 || !screen.is_valid() {
            return None;
        }

        let (ox, oy) = direction.outward();
        let ax = match ox {
            -1 => block.x,
            0 => block.x + block.w / 2,
            _ => block.right(),
        };
        let ay = match oy {
            -1 => block.y,
            0 => block.y + block.h / 2,
            _ => block.bottom(),
        };

        let cx = ax.saturating_add(ox * margin);
        let cy = ay.saturating_add(oy * margin);
        let square = Rect::new(cx - size / 2, cy - size / 2, size, size);

        let rect = square.intersect(screen.as_rect())?;
        if rect.w < min_size || rect.h < min_size {
            return None;
        }
        Some(Self { direction, rect })
    }

    /// Pixel offset of the region's center, relative to the region origin.
    #[inline]
    pub fn local_center(&self) -> (u32, u32) {
        ((self.rect.w / 2) as u32, (self.rect.h / 2) as u32)
    }
}
