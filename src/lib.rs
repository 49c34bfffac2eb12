//! Labyrinth - a first-person grid raycaster with a pursuing beast
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, motion, A* pursuit, game state)
//! - `renderer`: Column raycaster, billboard compositor and software framebuffer
//! - `settings`: Data-driven tuning loaded from JSON

pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Default horizontal resolution (one ray per column)
    pub const SCREEN_WIDTH: u32 = 960;
    /// Default vertical resolution
    pub const SCREEN_HEIGHT: u32 = 600;

    /// Camera plane length relative to the direction vector (~66° FOV)
    pub const CAMERA_PLANE_SCALE: f32 = 0.66;

    /// Player translation speed (tiles/s)
    pub const PLAYER_MOVE_SPEED: f32 = 3.0;
    /// Player turn speed (radians/s)
    pub const PLAYER_ROT_SPEED: f32 = 1.8;

    /// Pursuer speed (tiles/s)
    pub const PURSUER_SPEED: f32 = 1.2;
    /// Minimum time between A* replans (seconds)
    pub const PATH_COOLDOWN: f32 = 0.4;
    /// Waypoint is considered reached within this distance on both axes
    pub const WAYPOINT_TOLERANCE: f32 = 0.1;
    /// Pulse phase advance (radians/s)
    pub const PULSE_RATE: f32 = 2.0;
    /// Animation timer wraps here to keep precision
    pub const ANIM_TIMER_WRAP: f32 = 1000.0;
    /// Pursuer animation rate (frames/s)
    pub const PURSUER_ANIM_FPS: f32 = 6.0;
    /// Number of frames in the pursuer walk cycle
    pub const PURSUER_FRAME_COUNT: usize = 4;

    /// A pursuer this close to the player ends the run
    pub const CAPTURE_RADIUS: f32 = 0.4;
    /// The player picks up collectibles within this distance
    pub const PICKUP_RADIUS: f32 = 0.35;
    /// Fraction of collectibles needed to win
    pub const WIN_FRACTION: f32 = 0.5;

    /// Lower bound for perpendicular wall distance
    pub const MIN_WALL_DISTANCE: f32 = 0.0001;
    /// Brightness multiplier for walls hit on a Y step
    pub const SIDE_SHADE: f32 = 0.65;
    /// Collectibles render at this fraction of full billboard height
    pub const COLLECTIBLE_SCALE: f32 = 0.35;

    /// Pursuers closer than this (tiles) tint the view red
    pub const DANGER_RADIUS: f32 = 6.0;
    /// Overlay alpha with a pursuer on top of the player
    pub const DANGER_MAX_ALPHA: f32 = 160.0;

    /// Minimap pixels per tile
    pub const MINIMAP_SCALE: i32 = 12;
    /// Minimap distance from the top-left corner (pixels)
    pub const MINIMAP_OFFSET: i32 = 10;
}

/// Rotate a vector by `angle` radians (counter-clockwise in math orientation)
#[inline]
pub fn rotate_vec(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}
