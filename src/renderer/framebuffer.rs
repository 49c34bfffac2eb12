//! Software framebuffer

use std::io::{self, Write};

use glam::Vec2;

use super::atlas::{SpriteAtlas, SpriteFrame};
use super::color::{
    CEILING_COLOR, DANGER_COLOR, FLOOR_COLOR, MINIMAP_COLLECTIBLE, MINIMAP_HEADING, MINIMAP_PANEL,
    MINIMAP_PLAYER, MINIMAP_PURSUER, Rgba, WallPalette,
};
use super::raycast::WallSlice;
use super::sprites::{BillboardDraw, BillboardKind};
use crate::consts::{DANGER_MAX_ALPHA, DANGER_RADIUS, MINIMAP_OFFSET, MINIMAP_SCALE};
use crate::sim::{Cell, GameState, OPEN_TILE};

/// Minimap marker radii and heading length, in pixels
const MARKER_RADIUS: f32 = 4.0;
const COLLECTIBLE_RADIUS: f32 = 2.0;
const HEADING_LENGTH: f32 = 10.0;
const HEADING_HALF_WIDTH: f32 = 1.0;

/// Row-major RGBA pixels
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::BLACK; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y * self.width + x) as usize)
    }

    /// Ceiling over the top half, floor over the bottom half
    pub fn clear_backdrop(&mut self) {
        let half = self.height / 2;
        for (row, line) in self.pixels.chunks_mut(self.width.max(1) as usize).enumerate() {
            let color = if (row as u32) < half {
                CEILING_COLOR
            } else {
                FLOOR_COLOR
            };
            line.fill(color);
        }
    }

    /// Fill one wall column between its inclusive bounds
    pub fn draw_wall_column(&mut self, column: u32, slice: &WallSlice) {
        let start = slice.draw_start.max(0) as u32;
        let end = slice.draw_end.max(-1);
        if end < 0 {
            return;
        }
        for y in start..=end as u32 {
            if let Some(i) = self.index(column, y) {
                self.pixels[i] = slice.color;
            }
        }
    }

    /// Draw the surviving columns of a billboard
    ///
    /// Rows sample the frame relative to the unclipped top, so a billboard
    /// cut off by the screen edge keeps its proportions.
    pub fn blit_billboard(&mut self, draw: &BillboardDraw, frame: &SpriteFrame) {
        let height = draw.height.max(1);
        for slice in &draw.slices {
            for y in draw.draw_start_y..draw.draw_end_y {
                let source_y = ((y as i64 - draw.top) * frame.height as i64 / height) as u32;
                let src = frame.pixel(slice.source_x, source_y);
                if src.a == 0 {
                    continue;
                }
                let Some(i) = self.index(slice.column, y as u32) else {
                    continue;
                };
                self.pixels[i] = src.add_rgb(draw.tint).over(self.pixels[i]);
            }
        }
    }

    /// Draw a billboard using the atlas frame it names
    pub fn blit_from_atlas(&mut self, draw: &BillboardDraw, atlas: &SpriteAtlas) {
        let frame = match draw.kind {
            BillboardKind::Collectible => Some(&atlas.collectible),
            BillboardKind::Pursuer => atlas.pursuer_frame(draw.frame),
        };
        match frame {
            Some(frame) => self.blit_billboard(draw, frame),
            None => log::warn!("No atlas frame {} for {:?}", draw.frame, draw.kind),
        }
    }

    /// Red wash whose strength grows as the nearest pursuer closes in
    ///
    /// No-op at or beyond `DANGER_RADIUS`.
    pub fn danger_overlay(&mut self, distance: f32) {
        if distance.is_nan() || distance >= DANGER_RADIUS {
            return;
        }
        let intensity = ((DANGER_RADIUS - distance) / DANGER_RADIUS).clamp(0.0, 1.0);
        let wash = Rgba {
            a: (DANGER_MAX_ALPHA * intensity) as u8,
            ..DANGER_COLOR
        };
        for px in &mut self.pixels {
            *px = wash.over(*px);
        }
    }

    /// Top-down map in the top-left corner
    ///
    /// A translucent panel with opaque walls, the player and its heading,
    /// uncollected pickups, then pursuers on top.
    pub fn draw_minimap(&mut self, state: &GameState, palette: &WallPalette) {
        let grid = &state.grid;
        let scale = MINIMAP_SCALE;
        let origin = Vec2::splat(MINIMAP_OFFSET as f32);
        let to_screen = |pos: Vec2| origin + pos * scale as f32;

        self.fill_rect(
            MINIMAP_OFFSET,
            MINIMAP_OFFSET,
            grid.width() as i32 * scale,
            grid.height() as i32 * scale,
            MINIMAP_PANEL,
        );
        for y in 0..grid.height() as i32 {
            for x in 0..grid.width() as i32 {
                let tile = match grid.tile(Cell::new(x, y)) {
                    Some(tile) if tile != OPEN_TILE => tile,
                    _ => continue,
                };
                self.fill_rect(
                    MINIMAP_OFFSET + x * scale,
                    MINIMAP_OFFSET + y * scale,
                    scale,
                    scale,
                    palette.color_for(tile),
                );
            }
        }

        let player = to_screen(state.player.pos);
        self.fill_circle(player, MARKER_RADIUS, MINIMAP_PLAYER);
        self.fill_segment(
            player,
            player + state.player.dir * HEADING_LENGTH,
            HEADING_HALF_WIDTH,
            MINIMAP_HEADING,
        );
        for item in state.collectibles.iter().filter(|c| !c.collected) {
            self.fill_circle(to_screen(item.pos), COLLECTIBLE_RADIUS, MINIMAP_COLLECTIBLE);
        }
        for pursuer in &state.pursuers {
            self.fill_circle(to_screen(pursuer.pos), MARKER_RADIUS, MINIMAP_PURSUER);
        }
    }

    /// Blend `color` over the clipped rectangle
    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(width).min(self.width as i32);
        let y1 = y.saturating_add(height).min(self.height as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                let i = (py as u32 * self.width + px as u32) as usize;
                self.pixels[i] = color.over(self.pixels[i]);
            }
        }
    }

    /// Blend `color` over every pixel whose centre passes `inside`
    fn fill_where(&mut self, lo: Vec2, hi: Vec2, color: Rgba, inside: impl Fn(Vec2) -> bool) {
        let x0 = lo.x.floor().max(0.0) as u32;
        let y0 = lo.y.floor().max(0.0) as u32;
        let x1 = (hi.x.ceil().max(0.0) as u32).min(self.width);
        let y1 = (hi.y.ceil().max(0.0) as u32).min(self.height);
        for py in y0..y1 {
            for px in x0..x1 {
                if inside(Vec2::new(px as f32 + 0.5, py as f32 + 0.5)) {
                    let i = (py * self.width + px) as usize;
                    self.pixels[i] = color.over(self.pixels[i]);
                }
            }
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        let reach = Vec2::splat(radius);
        self.fill_where(center - reach, center + reach, color, |p| {
            p.distance_squared(center) <= radius * radius
        });
    }

    fn fill_segment(&mut self, a: Vec2, b: Vec2, half_width: f32, color: Rgba) {
        let reach = Vec2::splat(half_width);
        let seg = b - a;
        let len2 = seg.length_squared();
        self.fill_where(a.min(b) - reach, a.max(b) + reach, color, |p| {
            let t = if len2 > 0.0 {
                ((p - a).dot(seg) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            p.distance(a + seg * t) < half_width
        });
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Raw RGBA bytes, suitable for upload to a texture
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Binary PPM (P6), alpha dropped
    pub fn write_ppm<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        let rgb: Vec<u8> = self.pixels.iter().flat_map(|p| [p.r, p.g, p.b]).collect();
        out.write_all(&rgb)?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::raycast::Side;
    use crate::renderer::sprites::SpriteSlice;

    #[test]
    fn test_backdrop_halves() {
        let mut fb = Framebuffer::new(4, 6);
        fb.clear_backdrop();
        assert_eq!(fb.pixel(0, 0), Some(CEILING_COLOR));
        assert_eq!(fb.pixel(3, 2), Some(CEILING_COLOR));
        assert_eq!(fb.pixel(0, 3), Some(FLOOR_COLOR));
        assert_eq!(fb.pixel(4, 0), None);
    }

    #[test]
    fn test_wall_column_is_inclusive() {
        let mut fb = Framebuffer::new(3, 10);
        let slice = WallSlice {
            draw_start: 2,
            draw_end: 7,
            color: Rgba::rgb(1, 2, 3),
            side: Side::X,
            tile: '1',
            distance: 1.0,
        };
        fb.draw_wall_column(1, &slice);
        assert_eq!(fb.pixel(1, 1), Some(Rgba::BLACK));
        assert_eq!(fb.pixel(1, 2), Some(Rgba::rgb(1, 2, 3)));
        assert_eq!(fb.pixel(1, 7), Some(Rgba::rgb(1, 2, 3)));
        assert_eq!(fb.pixel(1, 8), Some(Rgba::BLACK));
        assert_eq!(fb.pixel(0, 4), Some(Rgba::BLACK));
    }

    #[test]
    fn test_blit_tints_and_skips_transparent() {
        let atlas = SpriteAtlas::builtin();
        let draw = BillboardDraw {
            kind: BillboardKind::Collectible,
            frame: 0,
            tint: Rgba::new(0, 0, 10, 0),
            depth: 1.0,
            left: 0,
            top: 0,
            width: 26,
            height: 26,
            draw_start_y: 0,
            draw_end_y: 26,
            slices: vec![
                SpriteSlice {
                    column: 0,
                    source_x: 0,
                },
                SpriteSlice {
                    column: 13,
                    source_x: 13,
                },
            ],
        };
        let mut fb = Framebuffer::new(26, 26);
        fb.blit_from_atlas(&draw, &atlas);
        // Core of the glow plus the tint
        assert_eq!(fb.pixel(13, 13), Some(Rgba::rgb(255, 255, 210)));
        // Transparent corner leaves the background
        assert_eq!(fb.pixel(0, 0), Some(Rgba::BLACK));
        // Columns not listed stay untouched
        assert_eq!(fb.pixel(12, 13), Some(Rgba::BLACK));
    }

    #[test]
    fn test_danger_overlay_scales_with_distance() {
        let mut fb = Framebuffer::new(2, 2);
        fb.danger_overlay(0.0);
        assert_eq!(fb.pixel(1, 1), Some(Rgba::rgb(75, 0, 0)));

        let mut fb = Framebuffer::new(2, 2);
        fb.danger_overlay(3.0);
        assert_eq!(fb.pixel(0, 0), Some(Rgba::rgb(37, 0, 0)));

        let mut fb = Framebuffer::new(2, 2);
        fb.danger_overlay(DANGER_RADIUS);
        fb.danger_overlay(f32::INFINITY);
        fb.danger_overlay(f32::NAN);
        assert!(fb.pixels().iter().all(|&p| p == Rgba::BLACK));
    }

    #[test]
    fn test_minimap_layers() {
        let state = GameState::new(1);
        let mut fb = Framebuffer::new(300, 300);
        fb.clear_backdrop();
        fb.draw_minimap(&state, &WallPalette::standard());

        // Corner wall tile
        assert_eq!(fb.pixel(16, 16), Some(Rgba::rgb(210, 210, 220)));
        // Open floor shows the ceiling through the panel
        assert_eq!(fb.pixel(23, 23), Some(Rgba::rgb(12, 12, 16)));
        // Player facing west, with its heading line
        assert_eq!(fb.pixel(52, 55), Some(MINIMAP_PLAYER));
        assert_eq!(fb.pixel(45, 52), Some(MINIMAP_HEADING));
        assert_eq!(fb.pixel(76, 28), Some(MINIMAP_COLLECTIBLE));
        assert_eq!(fb.pixel(196, 124), Some(MINIMAP_PURSUER));
        // Outside the panel
        assert_eq!(fb.pixel(5, 5), Some(CEILING_COLOR));
    }

    #[test]
    fn test_minimap_hides_collected_items() {
        let mut state = GameState::new(1);
        for item in &mut state.collectibles {
            item.collected = true;
        }
        let mut fb = Framebuffer::new(300, 300);
        fb.clear_backdrop();
        fb.draw_minimap(&state, &WallPalette::standard());
        assert_eq!(fb.pixel(76, 28), Some(Rgba::rgb(12, 12, 16)));
    }

    #[test]
    fn test_minimap_clips_to_small_frames() {
        let state = GameState::new(1);
        let mut fb = Framebuffer::new(20, 12);
        fb.draw_minimap(&state, &WallPalette::standard());
        assert_eq!(fb.pixel(15, 11), Some(Rgba::rgb(210, 210, 220)));
        assert_eq!(fb.pixel(9, 9), Some(Rgba::BLACK));
    }

    #[test]
    fn test_ppm_header_and_size() {
        let mut fb = Framebuffer::new(2, 3);
        fb.clear_backdrop();
        let mut out = Vec::new();
        fb.write_ppm(&mut out).unwrap();
        let header = b"P6\n2 3\n255\n";
        assert!(out.starts_with(header));
        assert_eq!(out.len(), header.len() + 2 * 3 * 3);
        assert_eq!(&out[header.len()..header.len() + 3], &[30, 30, 40]);
        assert_eq!(fb.as_bytes().len(), 2 * 3 * 4);
    }
}
