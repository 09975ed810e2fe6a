//! Solid-vs-gradient decision for a set of anchor colors.

use crate::anchor::{AnchorSet, Direction};
use crate::paint::distance;

/// How a block's fill is rendered.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum RenderMode {
    /// One flat color (the `top` anchor).
    #[default]
    Solid,
    /// A raster interpolated from all eight anchors.
    Gradient,
}

impl RenderMode {
    pub fn classify(set: &AnchorSet, threshold: u16) -> Self {
        if should_use_gradient(set, threshold) {
            RenderMode::Gradient
        } else {
            RenderMode::Solid
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            RenderMode::Solid => "solid",
            RenderMode::Gradient => "gradient",
        }
    }
}

/// Largest `distance` between any two of the eight anchors.
pub fn max_spread(set: &AnchorSet) -> u16 {
    let dirs = Direction::ALL;
    let mut max = 0;
    for (i, &a) in dirs.iter().enumerate() {
        for &b in &dirs[i + 1..] {
            max = max.max(distance(set[a], set[b]));
        }
    }
    max
}

/// True when the anchors are spread widely enough to warrant a gradient.
#[inline]
pub fn should_use_gradient(set: &AnchorSet, threshold: u16) -> bool {
    max_spread(set) > threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Rgb;

    #[test]
    fn uniform_set_is_solid() {
        let set = AnchorSet::uniform(Rgb::new(40, 80, 120));
        assert_eq!(max_spread(&set), 0);
        assert!(!should_use_gradient(&set, 60));
        assert_eq!(RenderMode::classify(&set, 60), RenderMode::Solid);
    }

    #[test]
    fn single_black_among_white_is_gradient() {
        let mut set = AnchorSet::uniform(Rgb::white());
        set[Direction::Right] = Rgb::black();
        assert_eq!(max_spread(&set), 765);
        assert_eq!(RenderMode::classify(&set, 60), RenderMode::Gradient);
    }

    #[test]
    fn threshold_boundary_is_exclusive() {
        let mut set = AnchorSet::uniform(Rgb::new(100, 100, 100));
        set[Direction::BottomLeft] = Rgb::new(120, 120, 120);
        assert_eq!(max_spread(&set), 60);
        assert!(!should_use_gradient(&set, 60));
        assert!(should_use_gradient(&set, 59));
    }

    #[test]
    fn spread_ignores_anchor_order() {
        let mut a = AnchorSet::uniform(Rgb::black());
        a[Direction::TopLeft] = Rgb::new(10, 0, 0);
        a[Direction::BottomRight] = Rgb::new(0, 50, 0);
        let mut b = AnchorSet::uniform(Rgb::black());
        b[Direction::BottomRight] = Rgb::new(10, 0, 0);
        b[Direction::Top] = Rgb::new(0, 50, 0);
        assert_eq!(max_spread(&a), max_spread(&b));
    }
}
