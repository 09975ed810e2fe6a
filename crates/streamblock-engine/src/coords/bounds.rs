use super::Rect;

/// Size of the active screen in pixels.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct ScreenBounds {
    pub width: i32,
    pub height: i32,
}

impl ScreenBounds {
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    #[inline]
    pub fn as_rect(self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }
}

/// Size range a block may take.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BlockLimits {
    pub min_size: i32,
    pub max_width: i32,
    pub max_height: i32,
}

impl Default for BlockLimits {
    fn default() -> Self {
        Self {
            min_size: 20,
            max_width: 4000,
            max_height: 3000,
        }
    }
}
