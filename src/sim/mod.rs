//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Explicit elapsed time per tick, no internal clock
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod grid;
pub mod motion;
pub mod path;
pub mod state;
pub mod tick;

pub use grid::{Cell, DEFAULT_WALL, MapError, OPEN_TILE, REFERENCE_LAYOUT, TileGrid};
pub use motion::{Mobile, move_entity, rotate};
pub use path::{Path, find_path};
pub use state::{
    Collectible, GameEvent, GamePhase, GameState, PLAYER_SPAWN, PURSUER_SPAWNS, Player, Pursuer,
    SimTuning, win_target,
};
pub use tick::{TickInput, collect_near, player_caught, tick, update_pursuers};
