//! The eight anchor points sampled around a block.

use std::fmt;
use std::ops::{Index, IndexMut};

use crate::paint::{hex_to_rgb, Rgb, NEUTRAL_GRAY};

/// One of the four corners or four edge midpoints of a rectangle.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Direction {
    TopLeft,
    Top,
    TopRight,
    Left,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl Direction {
    /// All directions in storage order.
    pub const ALL: [Direction; 8] = [
        Direction::TopLeft,
        Direction::Top,
        Direction::TopRight,
        Direction::Left,
        Direction::Right,
        Direction::BottomLeft,
        Direction::Bottom,
        Direction::BottomRight,
    ];

    #[inline]
    const fn slot(self) -> usize {
        self as usize
    }

    /// The snake_case key used in persisted and external data.
    pub const fn key(self) -> &'static str {
        match self {
            Direction::TopLeft => "top_left",
            Direction::Top => "top",
            Direction::TopRight => "top_right",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::BottomLeft => "bottom_left",
            Direction::Bottom => "bottom",
            Direction::BottomRight => "bottom_right",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.key() == key)
    }

    /// Unit offset pointing away from the rectangle: `(-1, -1)` for top-left,
    /// `(0, 1)` for bottom, and so on.
    pub const fn outward(self) -> (i32, i32) {
        match self {
            Direction::TopLeft => (-1, -1),
            Direction::Top => (0, -1),
            Direction::TopRight => (1, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::BottomLeft => (-1, 1),
            Direction::Bottom => (0, 1),
            Direction::BottomRight => (1, 1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A color for every [`Direction`].
///
/// Backed by a fixed array, so an `AnchorSet` is always complete and copying
/// one never allocates.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AnchorSet {
    colors: [Rgb; 8],
}

impl Default for AnchorSet {
    fn default() -> Self {
        Self::uniform(NEUTRAL_GRAY)
    }
}

impl AnchorSet {
    #[inline]
    pub const fn uniform(color: Rgb) -> Self {
        Self { colors: [color; 8] }
    }

    /// Builds a set from `(direction, color)` pairs; missing directions stay
    /// neutral gray.
    pub fn from_entries(entries: impl IntoIterator<Item = (Direction, Rgb)>) -> Self {
        let mut set = Self::default();
        for (dir, color) in entries {
            set[dir] = color;
        }
        set
    }

    /// Builds a set from string keys and hex colors.
    ///
    /// Unknown keys are ignored, malformed colors become neutral gray, and
    /// missing directions stay neutral gray.
    pub fn from_hex_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::from_entries(
            entries
                .into_iter()
                .filter_map(|(k, v)| Direction::from_key(k).map(|d| (d, hex_to_rgb(v)))),
        )
    }

    #[inline]
    pub fn get(&self, dir: Direction) -> Rgb {
        self.colors[dir.slot()]
    }

    /// Iterates `(direction, color)` in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, Rgb)> + '_ {
        Direction::ALL.into_iter().map(move |d| (d, self.get(d)))
    }

    /// Applies `f` to every color.
    pub fn map(self, mut f: impl FnMut(Direction, Rgb) -> Rgb) -> Self {
        let mut out = self;
        for dir in Direction::ALL {
            out[dir] = f(dir, self[dir]);
        }
        out
    }
}

impl Index<Direction> for AnchorSet {
    type Output = Rgb;

    #[inline]
    fn index(&self, dir: Direction) -> &Rgb {
        &self.colors[dir.slot()]
    }
}

impl IndexMut<Direction> for AnchorSet {
    #[inline]
    fn index_mut(&mut self, dir: Direction) -> &mut Rgb {
        &mut self.colors[dir.slot()]
    }
}
