//! Block layout persistence.
//!
//! A layout file is a JSON array of [`BlockRecord`]s. Loading is lenient per
//! record: entries missing geometry are skipped with a warning, while a file
//! that is not an array at all is an error.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::coords::{BlockLimits, Rect, ScreenBounds};
use crate::paint::{hex_to_rgb, Rgb};

pub const DEFAULT_LAYOUT_FILE: &str = "streamblock_layout.json";

fn default_color() -> String {
    "#000000".to_string()
}

/// One saved block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub is_dynamic: bool,
}

impl BlockRecord {
    pub fn from_rect(rect: Rect, color: impl Into<String>, is_dynamic: bool) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.w,
            height: rect.h,
            color: color.into(),
            is_dynamic,
        }
    }

    /// Geometry of a freshly added block on `screen`.
    pub fn default_for(screen: ScreenBounds, color: impl Into<String>) -> Self {
        let (sw, sh) = (screen.width, screen.height);
        Self::from_rect(Rect::new(sw / 3, sh / 3, sw / 8, sh / 15), color, false)
    }

    /// Saved geometry, clamped to the size limits and pulled onto `screen`.
    #[inline]
    pub fn rect(&self, limits: BlockLimits, screen: ScreenBounds) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height).clamped(limits, screen)
    }

    /// Saved color; malformed hex reads as neutral gray.
    #[inline]
    pub fn fill(&self) -> Rgb {
        hex_to_rgb(&self.color)
    }
}

/// Reads a layout file, skipping records that do not parse.
pub fn load_layout(path: impl AsRef<Path>) -> Result<Vec<BlockRecord>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading layout {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parsing layout {}", path.display()))?;

    let serde_json::Value::Array(entries) = value else {
        bail!("layout {} is not a JSON array", path.display());
    };

    let mut records = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<BlockRecord>(entry) {
            Ok(record) => records.push(record),
            Err(err) => log::warn!("{}: skipping block {i}: {err}", path.display()),
        }
    }

    log::info!("loaded {} block(s) from {}", records.len(), path.display());
    Ok(records)
}

/// Writes `records` as pretty-printed JSON. An empty layout is refused.
pub fn save_layout(path: impl AsRef<Path>, records: &[BlockRecord]) -> Result<()> {
    let path = path.as_ref();
    if records.is_empty() {
        bail!("no blocks to save");
    }
    let json = serde_json::to_string_pretty(records).context("serializing layout")?;
    fs::write(path, json).with_context(|| format!("writing layout {}", path.display()))?;

    log::info!("saved {} block(s) to {}", records.len(), path.display());
    Ok(())
}
