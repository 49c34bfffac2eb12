//! Precomputed billboard art
//!
//! Built once at startup; each frame is a pure function of its index so the
//! atlas never has to be regenerated while drawing.

use std::f32::consts::TAU;

use super::color::Rgba;
use crate::consts::PURSUER_FRAME_COUNT;

/// Pursuer frame size in pixels
pub const PURSUER_FRAME_SIZE: (u32, u32) = (56, 80);
/// Collectible frame edge in pixels
pub const COLLECTIBLE_FRAME_SIZE: u32 = 26;

/// A straight-alpha RGBA image
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteFrame {
    pub width: u32,
    pub height: u32,
    pixels: Vec<Rgba>,
}

impl SpriteFrame {
    /// Fully transparent frame
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; (width * height) as usize],
        }
    }

    /// Pixel lookup, transparent outside the frame
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize]
        } else {
            Rgba::TRANSPARENT
        }
    }

    /// Width over height
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }

    fn put(&mut self, x: i32, y: i32, color: Rgba) {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            let i = (y as u32 * self.width + x as u32) as usize;
            self.pixels[i] = color;
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgba) {
        for py in y..y + h {
            for px in x..x + w {
                self.put(px, py, color);
            }
        }
    }

    /// Axis-aligned ellipse inscribed in the given box
    fn fill_ellipse(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgba) {
        let (rx, ry) = (w as f32 / 2.0, h as f32 / 2.0);
        let (cx, cy) = (x as f32 + rx, y as f32 + ry);
        for py in y..y + h {
            for px in x..x + w {
                let dx = (px as f32 + 0.5 - cx) / rx;
                let dy = (py as f32 + 0.5 - cy) / ry;
                if dx * dx + dy * dy <= 1.0 {
                    self.put(px, py, color);
                }
            }
        }
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, color: Rgba) {
        self.fill_ellipse(cx - r, cy - r, r * 2, r * 2, color);
    }

    /// Filled triangle via edge functions
    fn fill_triangle(&mut self, a: (i32, i32), b: (i32, i32), c: (i32, i32), color: Rgba) {
        let min_x = a.0.min(b.0).min(c.0);
        let max_x = a.0.max(b.0).max(c.0);
        let min_y = a.1.min(b.1).min(c.1);
        let max_y = a.1.max(b.1).max(c.1);
        let edge = |p: (i32, i32), q: (i32, i32), x: i32, y: i32| {
            (q.0 - p.0) * (y - p.1) - (q.1 - p.1) * (x - p.0)
        };
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let e0 = edge(a, b, x, y);
                let e1 = edge(b, c, x, y);
                let e2 = edge(c, a, x, y);
                if (e0 >= 0 && e1 >= 0 && e2 >= 0) || (e0 <= 0 && e1 <= 0 && e2 <= 0) {
                    self.put(x, y, color);
                }
            }
        }
    }
}

/// All billboard art used by the compositor
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteAtlas {
    pub pursuer: Vec<SpriteFrame>,
    pub collectible: SpriteFrame,
}

impl Default for SpriteAtlas {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SpriteAtlas {
    /// Walk cycle plus the collectible glow
    pub fn builtin() -> Self {
        Self {
            pursuer: (0..PURSUER_FRAME_COUNT)
                .map(|i| pursuer_frame(i, PURSUER_FRAME_COUNT))
                .collect(),
            collectible: collectible_frame(COLLECTIBLE_FRAME_SIZE),
        }
    }

    pub fn pursuer_frame(&self, index: usize) -> Option<&SpriteFrame> {
        self.pursuer.get(index)
    }
}

/// One frame of the pursuer walk cycle
pub fn pursuer_frame(index: usize, count: usize) -> SpriteFrame {
    let (w, h) = PURSUER_FRAME_SIZE;
    let (w, h) = (w as i32, h as i32);
    let mut frame = SpriteFrame::blank(w as u32, h as u32);
    let phase = index as f32 / count.max(1) as f32;
    let cx = w / 2;

    let body = Rgba::rgb(120, 5, 5);
    let chest = Rgba::rgb(200, 60, 40);
    let outline = Rgba::rgb(30, 0, 0);
    let horn = Rgba::rgb(240, 240, 240);
    let eye = Rgba::rgb(255, 255, 80);

    frame.fill_ellipse(8, h - 18, w - 16, 12, Rgba::new(10, 0, 0, 120));

    // torso
    frame.fill_rect(cx - 14, 22, 28, 46, outline);
    frame.fill_rect(cx - 12, 24, 24, 44, body);
    frame.fill_rect(cx - 6, 32, 12, 26, chest);

    // legs alternate with the cycle
    let stride = ((phase * TAU).sin() * 3.0) as i32;
    frame.fill_rect(cx - 14, 52 + stride, 10, 20 - stride, outline);
    frame.fill_rect(cx + 4, 52 - stride, 10, 20 + stride, outline);

    // head
    frame.fill_ellipse(cx - 16, 4, 32, 28, outline);
    frame.fill_ellipse(cx - 14, 6, 28, 24, body);

    // horns sway
    let sway = ((phase * TAU).sin() * 3.0) as i32;
    frame.fill_triangle((cx - 8 - sway, 8), (cx - 20, 0), (cx - 4 - sway, 6), horn);
    frame.fill_triangle((cx + 8 + sway, 8), (cx + 20, 0), (cx + 4 + sway, 6), horn);

    // jaw opens and closes
    let jaw = 4 + (((phase + 0.25) * TAU).sin() * 3.0) as i32;
    frame.fill_rect(cx - 12, 22, 24, 8, outline);
    frame.fill_rect(cx - 10, 23, 20, jaw, Rgba::rgb(255, 230, 200));

    frame.fill_circle(cx - 6, 16, 3, eye);
    frame.fill_circle(cx + 6, 16, 3, eye);

    frame
}

/// Radial glow that brightens toward the core
pub fn collectible_frame(size: u32) -> SpriteFrame {
    let mut frame = SpriteFrame::blank(size, size);
    let center = (size / 2) as i32;
    for radius in (1..=center).rev() {
        let intensity = radius as f32 / center as f32;
        let color = Rgba::new(
            (200.0 + 55.0 * intensity) as u8,
            (200.0 + 55.0 * intensity) as u8,
            80,
            (60.0 + 195.0 * intensity) as u8,
        );
        frame.fill_circle(center, center, radius, color);
    }
    frame.fill_circle(center, center, center / 3, Rgba::rgb(255, 255, 200));
    frame
}
