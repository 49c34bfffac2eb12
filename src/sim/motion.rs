//! Collision-aware translation and rotation
//!
//! Shared by the player and the pursuer. Axes are resolved independently so
//! an entity pushed diagonally into a wall slides along it instead of stopping.

use glam::Vec2;

use super::grid::TileGrid;
use crate::rotate_vec;

/// Attempt a displacement, X first then Y, keeping each axis only if it lands
/// on an open tile
pub fn move_entity(grid: &TileGrid, pos: Vec2, delta: Vec2) -> Vec2 {
    let mut out = pos;
    let new_x = pos.x + delta.x;
    if !grid.is_blocking(new_x, out.y) {
        out.x = new_x;
    }
    let new_y = pos.y + delta.y;
    if !grid.is_blocking(out.x, new_y) {
        out.y = new_y;
    }
    out
}

/// Rotate the view direction and camera plane together
///
/// Both vectors go through the same rotation so their lengths and the angle
/// between them (and therefore the field of view) are unchanged.
pub fn rotate(direction: Vec2, plane: Vec2, angle: f32) -> (Vec2, Vec2) {
    (rotate_vec(direction, angle), rotate_vec(plane, angle))
}

/// Anything with a position that moves through [`move_entity`]
pub trait Mobile {
    fn position(&self) -> Vec2;

    fn set_position(&mut self, pos: Vec2);

    /// Move by `delta` with wall sliding, returning the new position
    fn translate(&mut self, grid: &TileGrid, delta: Vec2) -> Vec2 {
        let next = move_entity(grid, self.position(), delta);
        self.set_position(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> TileGrid {
        TileGrid::parse(&["11111", "10001", "10001", "10001", "11111"]).unwrap()
    }

    #[test]
    fn test_free_move() {
        let grid = room();
        let p = move_entity(&grid, Vec2::new(2.5, 2.5), Vec2::new(0.3, -0.2));
        assert!((p - Vec2::new(2.8, 2.3)).length() < 1e-6);
    }

    #[test]
    fn test_blocked_axis_is_dropped() {
        let grid = room();
        let p = move_entity(&grid, Vec2::new(3.8, 2.5), Vec2::new(0.5, 0.0));
        assert_eq!(p, Vec2::new(3.8, 2.5));
    }

    #[test]
    fn test_slides_along_wall() {
        let grid = room();
        // Diagonal into the east wall: X is rejected, Y still applies
        let p = move_entity(&grid, Vec2::new(3.8, 2.5), Vec2::new(0.5, 0.4));
        assert_eq!(p.x, 3.8);
        assert!((p.y - 2.9).abs() < 1e-6);
    }

    #[test]
    fn test_corner_does_not_stick() {
        let grid = room();
        // Into the south-east corner: both axes blocked, position unchanged
        let p = move_entity(&grid, Vec2::new(3.9, 3.9), Vec2::new(0.3, 0.3));
        assert_eq!(p, Vec2::new(3.9, 3.9));
        // Then away along the wall works
        let p = move_entity(&grid, p, Vec2::new(0.3, -0.3));
        assert_eq!(p.x, 3.9);
        assert!((p.y - 3.6).abs() < 1e-6);
    }

    #[test]
    fn test_rotate_preserves_fov() {
        let dir = Vec2::new(-1.0, 0.0);
        let plane = Vec2::new(0.0, 0.66);
        let (d, p) = rotate(dir, plane, 1.234);
        assert!((d.length() - 1.0).abs() < 1e-6);
        assert!((p.length() - 0.66).abs() < 1e-6);
        assert!(d.dot(p).abs() < 1e-6);
    }

    struct Dot(Vec2);

    impl Mobile for Dot {
        fn position(&self) -> Vec2 {
            self.0
        }
        fn set_position(&mut self, pos: Vec2) {
            self.0 = pos;
        }
    }

    #[test]
    fn test_mobile_translate() {
        let grid = room();
        let mut dot = Dot(Vec2::new(1.5, 1.5));
        let p = dot.translate(&grid, Vec2::new(-1.0, 0.25));
        assert_eq!(p, Vec2::new(1.5, 1.75));
        assert_eq!(dot.0, p);
    }
}
