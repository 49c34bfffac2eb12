//! Billboard projection with depth-buffer occlusion
//!
//! Billboards are tested only against walls, column by column. They are not
//! sorted against each other; later billboards draw over earlier ones.

use glam::Vec2;

use super::Viewport;
use super::atlas::SpriteAtlas;
use super::color::Rgba;
use super::raycast::DepthBuffer;
use crate::consts::{COLLECTIBLE_SCALE, MIN_WALL_DISTANCE};
use crate::sim::{Collectible, Player, Pursuer};

/// What a billboard depicts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillboardKind {
    Collectible,
    Pursuer,
}

/// A world-space sprite ready for projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Billboard {
    pub kind: BillboardKind,
    pub pos: Vec2,
    /// Height relative to a full-height wall at the same depth
    pub scale: f32,
    /// Screen width over screen height
    pub aspect: f32,
    /// Atlas frame to sample
    pub frame: usize,
    /// Added to every opaque pixel
    pub tint: Rgba,
}

impl Billboard {
    pub fn collectible(item: &Collectible, atlas: &SpriteAtlas) -> Self {
        Self {
            kind: BillboardKind::Collectible,
            pos: item.pos,
            scale: COLLECTIBLE_SCALE,
            aspect: atlas.collectible.aspect(),
            frame: 0,
            tint: Rgba::TRANSPARENT,
        }
    }

    /// Full-height, square on screen, red glow from the pulse phase
    pub fn pursuer(pursuer: &Pursuer, atlas: &SpriteAtlas) -> Self {
        let glow = (60.0 + 120.0 * pursuer.glow()) as u8;
        Self {
            kind: BillboardKind::Pursuer,
            pos: pursuer.pos,
            scale: 1.0,
            aspect: 1.0,
            frame: pursuer.frame_index(atlas.pursuer.len()),
            tint: Rgba::new(glow, 0, 0, 0),
        }
    }
}

/// Camera-space placement of a billboard
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Lateral offset in camera space
    pub lateral: f32,
    /// Distance along the view direction
    pub depth: f32,
}

/// Transform a world point into camera space
///
/// Returns `None` for a degenerate camera (zero determinant) or a point behind
/// or closer than [`MIN_WALL_DISTANCE`] to the camera plane.
pub fn project(player: &Player, world: Vec2) -> Option<Projection> {
    let det = player.determinant();
    if det == 0.0 {
        return None;
    }
    let inv_det = 1.0 / det;
    let rel = world - player.pos;
    let lateral = inv_det * (player.dir.y * rel.x - player.dir.x * rel.y);
    let depth = inv_det * (-player.plane.y * rel.x + player.plane.x * rel.y);
    if depth.is_nan() || depth < MIN_WALL_DISTANCE {
        return None;
    }
    Some(Projection { lateral, depth })
}

/// One visible sprite column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteSlice {
    /// Screen column
    pub column: u32,
    /// Source column in the unscaled frame
    pub source_x: u32,
}

/// A projected billboard and the columns where it survives the depth test
#[derive(Debug, Clone, PartialEq)]
pub struct BillboardDraw {
    pub kind: BillboardKind,
    pub frame: usize,
    pub tint: Rgba,
    pub depth: f32,
    /// Unclipped screen rectangle (left, top, width, height)
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
    /// Clipped vertical extent, inclusive start, exclusive end
    pub draw_start_y: i32,
    pub draw_end_y: i32,
    pub slices: Vec<SpriteSlice>,
}

/// Floor division by two (matches rounding of negative half extents)
#[inline]
fn neg_half(v: i64) -> i64 {
    (-v).div_euclid(2)
}

/// Project one billboard and keep the columns nearer than the wall there
///
/// `frame_width` maps screen columns back to source columns.
pub fn composite_billboard(
    player: &Player,
    billboard: &Billboard,
    depth: &DepthBuffer,
    viewport: Viewport,
    frame_width: u32,
) -> Option<BillboardDraw> {
    let Projection {
        lateral,
        depth: sprite_depth,
    } = project(player, billboard.pos)?;

    let w = viewport.width as i64;
    let h = viewport.height as i64;

    let screen_x = ((w as f32 / 2.0) * (1.0 + lateral / sprite_depth)) as i64;
    let height = ((h as f32 / sprite_depth * billboard.scale) as i64)
        .saturating_abs()
        .max(1);
    let width = ((height as f32 * billboard.aspect) as i64).max(1);

    // Extents saturate for sprites far off to the side
    let top = neg_half(height).saturating_add(h / 2);
    let draw_start_y = top.max(0);
    let draw_end_y = (height / 2).saturating_add(h / 2).min(h - 1);
    let left = neg_half(width).saturating_add(screen_x);
    let draw_start_x = left.max(0);
    let draw_end_x = (width / 2).saturating_add(screen_x).min(w - 1);

    if draw_start_x >= draw_end_x || draw_start_y >= draw_end_y {
        return None;
    }

    let slices: Vec<SpriteSlice> = (draw_start_x..draw_end_x)
        .filter_map(|stripe| {
            let tex_x = stripe - left;
            let visible = (0..w).contains(&stripe)
                && (0..width).contains(&tex_x)
                && depth.get(stripe as usize) > sprite_depth;
            visible.then(|| SpriteSlice {
                column: stripe as u32,
                source_x: (tex_x as u64 * frame_width as u64 / width as u64) as u32,
            })
        })
        .collect();

    Some(BillboardDraw {
        kind: billboard.kind,
        frame: billboard.frame,
        tint: billboard.tint,
        depth: sprite_depth,
        left,
        top,
        width,
        height,
        draw_start_y: draw_start_y as i32,
        draw_end_y: draw_end_y as i32,
        slices,
    })
}

/// Every active billboard in draw order: collectibles, then pursuers
pub fn gather(
    collectibles: &[Collectible],
    pursuers: &[Pursuer],
    atlas: &SpriteAtlas,
) -> Vec<Billboard> {
    collectibles
        .iter()
        .filter(|c| !c.collected)
        .map(|c| Billboard::collectible(c, atlas))
        .chain(pursuers.iter().map(|p| Billboard::pursuer(p, atlas)))
        .collect()
}

/// Composite all billboards against this frame's depth buffer
pub fn composite(
    player: &Player,
    billboards: &[Billboard],
    depth: &DepthBuffer,
    viewport: Viewport,
    atlas: &SpriteAtlas,
) -> Vec<BillboardDraw> {
    if player.determinant() == 0.0 {
        return Vec::new();
    }
    billboards
        .iter()
        .filter_map(|billboard| {
            let frame_width = match billboard.kind {
                BillboardKind::Collectible => atlas.collectible.width,
                BillboardKind::Pursuer => atlas.pursuer_frame(billboard.frame)?.width,
            };
            composite_billboard(player, billboard, depth, viewport, frame_width)
        })
        .collect()
}
