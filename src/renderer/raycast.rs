//! Per-column DDA raycaster
//!
//! One ray per screen column. Each ray walks the grid one cell boundary at a
//! time until it enters a wall, then reports the perpendicular distance (no
//! fisheye) used both for the wall span and for the depth buffer.

use glam::Vec2;

use super::Viewport;
use super::color::{Rgba, WallPalette};
use crate::consts::{MIN_WALL_DISTANCE, SIDE_SHADE};
use crate::sim::{Cell, DEFAULT_WALL, OPEN_TILE, Player, TileGrid};

/// Which grid line the ray crossed last
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Stepped in X (vertical grid line)
    X,
    /// Stepped in Y (horizontal grid line); rendered darker
    Y,
}

/// A ray's first wall
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Wall cell (may lie outside the map)
    pub cell: Cell,
    /// Wall symbol; the boundary wall outside the map
    pub tile: char,
    pub side: Side,
    /// Perpendicular distance, clamped to [`MIN_WALL_DISTANCE`]
    pub distance: f32,
}

/// One rendered wall column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallSlice {
    /// First row (inclusive)
    pub draw_start: i32,
    /// Last row (inclusive)
    pub draw_end: i32,
    /// Shaded material color
    pub color: Rgba,
    pub side: Side,
    pub tile: char,
    pub distance: f32,
}

/// Nearest wall distance per screen column
///
/// Columns without a hit stay at infinity.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthBuffer {
    depths: Vec<f32>,
}

impl DepthBuffer {
    /// All columns at infinity
    pub fn new(width: usize) -> Self {
        Self {
            depths: vec![f32::INFINITY; width],
        }
    }

    pub fn from_depths(depths: Vec<f32>) -> Self {
        Self { depths }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// Depth at a column; infinity outside the buffer
    #[inline]
    pub fn get(&self, column: usize) -> f32 {
        self.depths.get(column).copied().unwrap_or(f32::INFINITY)
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.depths
    }
}

/// Everything the wall pass produced for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameScan {
    /// One entry per screen column
    pub columns: Vec<Option<WallSlice>>,
    pub depth: DepthBuffer,
}

/// Ray direction for a screen column: `dir + plane * camera_x`, camera_x in [-1, 1)
#[inline]
pub fn column_ray(player: &Player, column: u32, width: u32) -> Vec2 {
    let camera_x = 2.0 * column as f32 / width as f32 - 1.0;
    player.dir + player.plane * camera_x
}

/// Walk the grid from `origin` along `ray` until a wall
///
/// Leaving the map counts as hitting the boundary wall. Returns `None` only if
/// the step cap (width * height) runs out first.
pub fn cast_ray(grid: &TileGrid, origin: Vec2, ray: Vec2) -> Option<RayHit> {
    let mut map = Cell::containing(origin);

    // Distance along the ray to cross one full cell on each axis
    let delta = Vec2::new(inverse_abs(ray.x), inverse_abs(ray.y));

    let (step_x, mut side_x) = if ray.x < 0.0 {
        (-1, (origin.x - map.x as f32) * delta.x)
    } else {
        (1, (map.x as f32 + 1.0 - origin.x) * delta.x)
    };
    let (step_y, mut side_y) = if ray.y < 0.0 {
        (-1, (origin.y - map.y as f32) * delta.y)
    } else {
        (1, (map.y as f32 + 1.0 - origin.y) * delta.y)
    };
    // A ray parallel to an axis never reaches that axis' boundaries
    if ray.x == 0.0 {
        side_x = f32::INFINITY;
    }
    if ray.y == 0.0 {
        side_y = f32::INFINITY;
    }

    let max_steps = grid.width() * grid.height();
    for _ in 0..max_steps {
        let side = if side_x < side_y {
            side_x += delta.x;
            map.x += step_x;
            Side::X
        } else {
            side_y += delta.y;
            map.y += step_y;
            Side::Y
        };

        let tile = match grid.tile(map) {
            None => DEFAULT_WALL,
            Some(OPEN_TILE) => continue,
            Some(tile) => tile,
        };

        // Back off the last increment: distance to the boundary just crossed
        let distance = match side {
            Side::X => side_x - delta.x,
            Side::Y => side_y - delta.y,
        };
        return Some(RayHit {
            cell: map,
            tile,
            side,
            distance: distance.max(MIN_WALL_DISTANCE),
        });
    }
    None
}

#[inline]
fn inverse_abs(component: f32) -> f32 {
    if component == 0.0 {
        f32::INFINITY
    } else {
        (1.0 / component).abs()
    }
}

/// Vertical span of a wall at `distance`, centered and clipped to the screen
pub fn wall_span(distance: f32, screen_height: u32) -> (i32, i32) {
    let h = screen_height as i32;
    let line_height = (screen_height as f32 / distance) as i32;
    let start = (-line_height).div_euclid(2) + h / 2;
    let end = line_height / 2 + h / 2;
    (start.max(0), end.min(h - 1))
}

/// Cast every column of the view
pub fn scan(grid: &TileGrid, player: &Player, viewport: Viewport, palette: &WallPalette) -> FrameScan {
    let width = viewport.width as usize;
    let mut depth = DepthBuffer::new(width);
    let mut columns = Vec::with_capacity(width);

    for column in 0..viewport.width {
        let ray = column_ray(player, column, viewport.width);
        let slice = cast_ray(grid, player.pos, ray).map(|hit| {
            let (draw_start, draw_end) = wall_span(hit.distance, viewport.height);
            let base = palette.color_for(hit.tile);
            let color = match hit.side {
                Side::X => base,
                Side::Y => base.shade(SIDE_SHADE),
            };
            WallSlice {
                draw_start,
                draw_end,
                color,
                side: hit.side,
                tile: hit.tile,
                distance: hit.distance,
            }
        });
        if let Some(slice) = &slice {
            depth.depths[column as usize] = slice.distance;
        }
        columns.push(slice);
    }

    FrameScan { columns, depth }
}
