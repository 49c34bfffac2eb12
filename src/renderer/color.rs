//! Pixel color and wall material palette

use std::collections::{BTreeMap, HashMap};

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 8-bit RGBA pixel, laid out for direct upload
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Multiply RGB by `factor` (truncating), alpha untouched
    pub fn shade(self, factor: f32) -> Self {
        let f = |c: u8| (c as f32 * factor).clamp(0.0, 255.0) as u8;
        Self::new(f(self.r), f(self.g), f(self.b), self.a)
    }

    /// Saturating additive blend on RGB
    pub fn add_rgb(self, other: Rgba) -> Self {
        Self::new(
            self.r.saturating_add(other.r),
            self.g.saturating_add(other.g),
            self.b.saturating_add(other.b),
            self.a,
        )
    }

    /// Source-over blend of `self` onto an opaque `dst`
    pub fn over(self, dst: Rgba) -> Rgba {
        match self.a {
            0 => dst,
            255 => self,
            a => {
                let a = a as u32;
                let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * (255 - a)) / 255) as u8;
                Rgba::new(mix(self.r, dst.r), mix(self.g, dst.g), mix(self.b, dst.b), 255)
            }
        }
    }
}

impl From<[u8; 3]> for Rgba {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Rgba::rgb(r, g, b)
    }
}

/// Upper half of the view
pub const CEILING_COLOR: Rgba = Rgba::rgb(30, 30, 40);
/// Lower half of the view
pub const FLOOR_COLOR: Rgba = Rgba::rgb(40, 30, 20);
/// Red wash drawn when a pursuer is near; alpha set per frame
pub const DANGER_COLOR: Rgba = Rgba::new(120, 0, 0, 0);
/// Minimap backing panel
pub const MINIMAP_PANEL: Rgba = Rgba::new(0, 0, 0, 150);
pub const MINIMAP_PLAYER: Rgba = Rgba::rgb(255, 50, 50);
pub const MINIMAP_HEADING: Rgba = Rgba::rgb(250, 250, 250);
pub const MINIMAP_COLLECTIBLE: Rgba = Rgba::rgb(240, 240, 180);
pub const MINIMAP_PURSUER: Rgba = Rgba::rgb(120, 20, 220);
/// Used for wall symbols missing from the palette
pub const FALLBACK_WALL_COLOR: Rgba = Rgba::rgb(180, 180, 180);

/// Built-in wall materials
pub const STANDARD_WALLS: [(char, Rgba); 5] = [
    ('1', Rgba::rgb(210, 210, 220)),
    ('2', Rgba::rgb(200, 150, 60)),
    ('3', Rgba::rgb(160, 80, 80)),
    ('4', Rgba::rgb(80, 120, 200)),
    ('5', Rgba::rgb(120, 200, 120)),
];

/// Tile symbol to wall color table
#[derive(Debug, Clone, PartialEq)]
pub struct WallPalette {
    colors: HashMap<char, Rgba>,
    fallback: Rgba,
}

impl Default for WallPalette {
    fn default() -> Self {
        Self::standard()
    }
}

impl WallPalette {
    /// Palette with only the fallback color
    pub fn empty() -> Self {
        Self {
            colors: HashMap::new(),
            fallback: FALLBACK_WALL_COLOR,
        }
    }

    /// The five built-in materials
    pub fn standard() -> Self {
        let mut palette = Self::empty();
        for (symbol, color) in STANDARD_WALLS {
            palette.insert(symbol, color);
        }
        palette
    }

    /// Build from a settings table keyed by single-character strings
    ///
    /// Keys that are not exactly one character are skipped.
    pub fn from_table(table: &BTreeMap<String, [u8; 3]>) -> Self {
        let mut palette = Self::empty();
        for (key, &rgb) in table {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(symbol), None) => palette.insert(symbol, rgb.into()),
                _ => log::warn!("Ignoring wall color for {:?}: key must be one character", key),
            }
        }
        palette
    }

    pub fn insert(&mut self, symbol: char, color: Rgba) {
        self.colors.insert(symbol, color);
    }

    /// Color for a wall symbol, falling back for unknown symbols
    pub fn color_for(&self, symbol: char) -> Rgba {
        self.colors.get(&symbol).copied().unwrap_or(self.fallback)
    }
}
