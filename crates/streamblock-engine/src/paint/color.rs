/// Straight 8-bit sRGB color.
///
/// The engine never does color-accurate math: interpolation happens directly
/// on the stored bytes and `distance` is a plain L1 sum.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Fallback for every missing or malformed color in the engine.
pub const NEUTRAL_GRAY: Rgb = Rgb::new(128, 128, 128);

impl Rgb {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }

    #[inline]
    pub const fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Parses `#rrggbb` (the `#` is optional).
    ///
    /// Returns `None` for anything that is not exactly six hex digits.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.bytes().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self::new(r, g, b))
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Floors every channel to a multiple of `step`.
    ///
    /// A `step` of 0 or 1 leaves the color untouched.
    #[inline]
    pub fn quantized(self, step: u8) -> Self {
        if step <= 1 {
            return self;
        }
        let q = |c: u8| (c / step) * step;
        Self::new(q(self.r), q(self.g), q(self.b))
    }

    /// Relative luminance in `[0, 1]` using the Rec. 601 weights.
    #[inline]
    pub fn luminance(self) -> f32 {
        (0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32) / 255.0
    }
}

impl From<Rgb> for image::Rgb<u8> {
    #[inline]
    fn from(c: Rgb) -> Self {
        image::Rgb([c.r, c.g, c.b])
    }
}

impl From<image::Rgb<u8>> for Rgb {
    #[inline]
    fn from(p: image::Rgb<u8>) -> Self {
        let [r, g, b] = p.0;
        Self::new(r, g, b)
    }
}

/// Parses a 6-digit hex color, falling back to [`NEUTRAL_GRAY`].
#[inline]
pub fn hex_to_rgb(s: &str) -> Rgb {
    Rgb::parse_hex(s).unwrap_or(NEUTRAL_GRAY)
}

/// Formats channels as `#rrggbb`, clamping each to `[0, 255]` first.
pub fn rgb_to_hex(r: i32, g: i32, b: i32) -> String {
    let c = |v: i32| v.clamp(0, 255) as u8;
    Rgb::new(c(r), c(g), c(b)).to_hex()
}

/// Per-channel linear interpolation. `f` is clamped to `[0, 1]`.
pub fn lerp(from: Rgb, to: Rgb, f: f32) -> Rgb {
    // NaN fails both clamp bounds; pin it to the start color.
    let f = if f.is_nan() { 0.0 } else { f.clamp(0.0, 1.0) };
    let ch = |a: u8, b: u8| {
        let a = a as f32;
        let b = b as f32;
        (a + (b - a) * f).round().clamp(0.0, 255.0) as u8
    };
    Rgb::new(ch(from.r, to.r), ch(from.g, to.g), ch(from.b, to.b))
}

/// Sum of absolute channel differences, `0..=765`.
#[inline]
pub fn distance(a: Rgb, b: Rgb) -> u16 {
    a.r.abs_diff(b.r) as u16 + a.g.abs_diff(b.g) as u16 + a.b.abs_diff(b.b) as u16
}

/// Black or white, whichever reads better on `bg`.
#[inline]
pub fn contrast_rgb(bg: Rgb) -> Rgb {
    if bg.luminance() > 0.5 { Rgb::black() } else { Rgb::white() }
}

/// Hex-string variant of [`contrast_rgb`]. Malformed input yields white.
pub fn contrast_color(bg: &str) -> Rgb {
    match Rgb::parse_hex(bg) {
        Some(c) => contrast_rgb(c),
        None => Rgb::white(),
    }
}
