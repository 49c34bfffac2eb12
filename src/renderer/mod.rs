//! Software rendering module
//!
//! Walls come from a per-column DDA raycast that also fills a depth buffer;
//! billboards are then composited against that buffer column by column.
//! Rendering only reads the game state.

pub mod atlas;
pub mod color;
pub mod framebuffer;
pub mod raycast;
pub mod sprites;

pub use atlas::{SpriteAtlas, SpriteFrame};
pub use color::{Rgba, WallPalette};
pub use framebuffer::Framebuffer;
pub use raycast::{DepthBuffer, FrameScan, RayHit, Side, WallSlice, cast_ray, scan};
pub use sprites::{Billboard, BillboardDraw, BillboardKind, SpriteSlice, composite};

use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::sim::{GamePhase, GameState};

/// Output resolution; one ray per column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

/// Draw lists for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput {
    pub viewport: Viewport,
    pub scan: FrameScan,
    /// In draw order
    pub billboards: Vec<BillboardDraw>,
}

impl RenderOutput {
    /// Depth buffer produced by the wall pass
    pub fn depth(&self) -> &DepthBuffer {
        &self.scan.depth
    }

    /// Rasterize into `fb`: backdrop, walls, then billboards
    pub fn draw(&self, fb: &mut Framebuffer, atlas: &SpriteAtlas) {
        fb.clear_backdrop();
        for (column, slice) in self.scan.columns.iter().enumerate() {
            if let Some(slice) = slice {
                fb.draw_wall_column(column as u32, slice);
            }
        }
        for draw in &self.billboards {
            fb.blit_from_atlas(draw, atlas);
        }
    }
}

/// Build the frame's wall columns and visible billboards
///
/// The depth buffer is rebuilt from scratch every call.
pub fn render_frame(
    state: &GameState,
    viewport: Viewport,
    palette: &WallPalette,
    atlas: &SpriteAtlas,
) -> RenderOutput {
    let scan = raycast::scan(&state.grid, &state.player, viewport, palette);
    let billboards = sprites::gather(&state.collectibles, &state.pursuers, atlas);
    let billboards = sprites::composite(&state.player, &billboards, &scan.depth, viewport, atlas);
    RenderOutput {
        viewport,
        scan,
        billboards,
    }
}

/// Minimap, then the danger wash while the session is still live
pub fn draw_overlays(fb: &mut Framebuffer, state: &GameState, palette: &WallPalette) {
    fb.draw_minimap(state, palette);
    if state.phase == GamePhase::Alive {
        fb.danger_overlay(state.nearest_pursuer_distance());
    }
}

/// Render straight into a new framebuffer, overlays included
pub fn render_to_framebuffer(
    state: &GameState,
    viewport: Viewport,
    palette: &WallPalette,
    atlas: &SpriteAtlas,
) -> Framebuffer {
    let output = render_frame(state, viewport, palette, atlas);
    let mut fb = Framebuffer::new(viewport.width, viewport.height);
    output.draw(&mut fb, atlas);
    draw_overlays(&mut fb, state, palette);
    fb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::color::{CEILING_COLOR, FLOOR_COLOR};
    use crate::sim::{Player, SimTuning, TickInput, TileGrid, tick};
    use glam::Vec2;
    use std::sync::Arc;

    /// Straight corridor with one pursuer `gap` tiles ahead of the player
    fn corridor(gap: f32, pursuer_speed: f32) -> GameState {
        let grid = Arc::new(TileGrid::parse(&["11111111", "10000001", "11111111"]).unwrap());
        GameState::with_layout(
            grid,
            Player::new(Vec2::new(1.5, 1.5), Vec2::X),
            vec![Vec2::new(1.5 + gap, 1.5)],
            SimTuning {
                pursuer_speed,
                ..Default::default()
            },
            5,
        )
    }

    #[test]
    fn test_initial_frame_has_walls_and_depth() {
        let state = GameState::new(7);
        let viewport = Viewport::new(120, 80);
        let output = render_frame(&state, viewport, &WallPalette::standard(), &SpriteAtlas::builtin());
        assert_eq!(output.scan.columns.len(), 120);
        assert!(output.depth().as_slice().iter().all(|d| d.is_finite()));
        // Every billboard column survived the depth test
        for draw in &output.billboards {
            for slice in &draw.slices {
                assert!(output.depth().get(slice.column as usize) > draw.depth);
            }
        }
    }

    #[test]
    fn test_render_is_read_only() {
        let state = GameState::new(7);
        let before = state.player;
        let _ = render_to_framebuffer(
            &state,
            Viewport::new(32, 20),
            &WallPalette::standard(),
            &SpriteAtlas::builtin(),
        );
        assert_eq!(state.player, before);
    }

    #[test]
    fn test_backdrop_visible_above_and_below_far_walls() {
        let mut state = GameState::new(7);
        // Looking down the long top corridor
        state.player = Player::new(Vec2::new(1.5, 1.5), Vec2::X);
        let fb = render_to_framebuffer(
            &state,
            Viewport::new(64, 400),
            &WallPalette::standard(),
            &SpriteAtlas::builtin(),
        );
        assert_eq!(fb.pixel(32, 0), Some(CEILING_COLOR));
        assert_eq!(fb.pixel(32, 399), Some(FLOOR_COLOR));
    }

    #[test]
    fn test_pursuer_frame_advances_between_ticks() {
        let mut state = corridor(4.0, 0.0);
        let viewport = Viewport::new(64, 40);
        let palette = WallPalette::standard();
        let atlas = SpriteAtlas::builtin();
        let pursuer_frame = |state: &GameState| {
            let output = render_frame(state, viewport, &palette, &atlas);
            output
                .billboards
                .iter()
                .find(|d| d.kind == BillboardKind::Pursuer)
                .map(|d| d.frame)
        };

        assert_eq!(pursuer_frame(&state), Some(0));
        tick(&mut state, &TickInput::default(), 0.2);
        assert_eq!(pursuer_frame(&state), Some(1));
        tick(&mut state, &TickInput::default(), 0.2);
        assert_eq!(pursuer_frame(&state), Some(2));
    }

    #[test]
    fn test_danger_wash_only_while_alive() {
        let palette = WallPalette::standard();
        let overlaid = |state: &GameState| {
            let mut fb = Framebuffer::new(200, 100);
            fb.clear_backdrop();
            draw_overlays(&mut fb, state, &palette);
            // Right of the minimap
            fb.pixel(150, 0)
        };

        let mut state = corridor(2.0, 0.0);
        assert_eq!(overlaid(&state), Some(Rgba::rgb(67, 17, 23)));
        state.phase = GamePhase::Dead;
        assert_eq!(overlaid(&state), Some(CEILING_COLOR));
        state.phase = GamePhase::Won;
        assert_eq!(overlaid(&state), Some(CEILING_COLOR));
    }
}
