//! Game state and core simulation types
//!
//! Everything the frame pipeline mutates lives here. The grid itself is shared
//! read-only through an `Arc`.

use std::f32::consts::TAU;
use std::sync::Arc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::grid::{Cell, TileGrid};
use super::motion::{self, Mobile};
use super::path::Path;
use crate::consts::*;
use crate::settings::Settings;

/// Player spawn in the reference map
pub const PLAYER_SPAWN: Vec2 = Vec2::new(3.5, 3.5);

/// Pursuer spawns in the reference map
pub const PURSUER_SPAWNS: [Vec2; 1] = [Vec2::new(15.5, 9.5)];

/// Session outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Player is exploring
    Alive,
    /// A pursuer reached the player
    Dead,
    /// Enough collectibles gathered
    Won,
}

impl GamePhase {
    /// Dead and Won hold until an explicit reset
    pub fn is_terminal(self) -> bool {
        !matches!(self, GamePhase::Alive)
    }
}

/// Things that happened during a tick, for audio/HUD consumers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A collectible at this position was picked up
    Collected { pos: Vec2 },
    /// Pursuer with this index caught the player
    Caught { pursuer: usize },
    /// Win target reached
    Victory,
    /// All entities reinitialized
    Reset,
}

/// The first-person camera
///
/// `plane` stays perpendicular to `dir` at a fixed length ratio; both only
/// ever change through [`Player::rotate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub dir: Vec2,
    pub plane: Vec2,
}

impl Player {
    /// Camera facing `dir` (normalized) with the standard field of view
    pub fn new(pos: Vec2, dir: Vec2) -> Self {
        let dir = dir.normalize_or(Vec2::NEG_X);
        // Plane is dir rotated -90 degrees: (-1, 0) gives (0, 0.66)
        let plane = Vec2::new(dir.y, -dir.x) * CAMERA_PLANE_SCALE;
        Self { pos, dir, plane }
    }

    /// Reference spawn facing west
    pub fn spawn() -> Self {
        Self::new(PLAYER_SPAWN, Vec2::NEG_X)
    }

    /// Turn the view; positive angles turn counter-clockwise
    pub fn rotate(&mut self, angle: f32) {
        let (dir, plane) = motion::rotate(self.dir, self.plane, angle);
        self.dir = dir;
        self.plane = plane;
    }

    /// Camera matrix determinant (`plane_x * dir_y - dir_x * plane_y`)
    #[inline]
    pub fn determinant(&self) -> f32 {
        self.plane.x * self.dir.y - self.dir.x * self.plane.y
    }

    #[inline]
    pub fn cell(&self) -> Cell {
        Cell::containing(self.pos)
    }
}

impl Mobile for Player {
    fn position(&self) -> Vec2 {
        self.pos
    }

    fn set_position(&mut self, pos: Vec2) {
        self.pos = pos;
    }
}

/// The hunting beast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pursuer {
    pub pos: Vec2,
    /// Tiles per second
    pub speed: f32,
    /// Glow phase in [0, TAU)
    pub pulse: f32,
    /// Seconds elapsed for walk-cycle animation
    pub anim_timer: f32,
    /// Cached route; first cell is where the pursuer was when planned
    pub path: Path,
    /// Seconds until a replan is allowed
    pub path_cooldown: f32,
}

impl Pursuer {
    /// Spawn with a random pulse offset drawn from the caller's generator
    pub fn spawn<R: Rng + ?Sized>(pos: Vec2, speed: f32, rng: &mut R) -> Self {
        Self {
            pos,
            speed,
            pulse: rng.random::<f32>() * TAU,
            anim_timer: 0.0,
            path: Path::empty(),
            path_cooldown: 0.0,
        }
    }

    #[inline]
    pub fn cell(&self) -> Cell {
        Cell::containing(self.pos)
    }

    /// Advance pulse, animation and cooldown clocks
    pub fn advance_timers(&mut self, dt: f32) {
        self.pulse = (self.pulse + dt * PULSE_RATE).rem_euclid(TAU);
        self.anim_timer = (self.anim_timer + dt).rem_euclid(ANIM_TIMER_WRAP);
        self.path_cooldown -= dt;
    }

    /// Whether the cached route must be recomputed for `goal`
    pub fn needs_replan(&self, goal: Cell) -> bool {
        self.path_cooldown <= 0.0
            || self.path.is_empty()
            || self.path.last() != Some(goal)
            || !self.path.contains(self.cell())
    }

    /// Point to steer toward this tick
    ///
    /// Follows the waypoint after the current cell, dropping it once reached.
    /// Falls back to the player's position when no waypoint is left.
    pub fn steer_target(&mut self, player_pos: Vec2) -> Vec2 {
        let Some(next) = self.path.next_waypoint() else {
            return player_pos;
        };
        let target = next.center();
        let offset = (self.pos - target).abs();
        if offset.x < WAYPOINT_TOLERANCE && offset.y < WAYPOINT_TOLERANCE {
            self.path.advance();
            return match self.path.next_waypoint() {
                Some(after) => after.center(),
                None => player_pos,
            };
        }
        target
    }

    /// Glow amount in [0, 1]
    #[inline]
    pub fn glow(&self) -> f32 {
        (self.pulse.sin() + 1.0) * 0.5
    }

    /// Current walk-cycle frame
    #[inline]
    pub fn frame_index(&self, frame_count: usize) -> usize {
        if frame_count == 0 {
            return 0;
        }
        (self.anim_timer * PURSUER_ANIM_FPS) as usize % frame_count
    }
}

impl Mobile for Pursuer {
    fn position(&self) -> Vec2 {
        self.pos
    }

    fn set_position(&mut self, pos: Vec2) {
        self.pos = pos;
    }
}

/// A glowing sphere to pick up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub pos: Vec2,
    /// Only ever flips false -> true
    pub collected: bool,
}

impl Collectible {
    pub fn at_cell(cell: Cell) -> Self {
        Self {
            pos: cell.center(),
            collected: false,
        }
    }

    /// Mark collected if `pos` is inside `radius`; returns true on the flip
    pub fn try_collect(&mut self, pos: Vec2, radius: f32) -> bool {
        if self.collected {
            return false;
        }
        if crate::distance(pos, self.pos) < radius {
            self.collected = true;
            return true;
        }
        false
    }
}

/// Tuning the simulation reads every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimTuning {
    pub move_speed: f32,
    pub rotation_speed: f32,
    pub pursuer_speed: f32,
    pub path_cooldown: f32,
    pub capture_radius: f32,
    pub pickup_radius: f32,
    pub win_fraction: f32,
}

impl Default for SimTuning {
    fn default() -> Self {
        Self {
            move_speed: PLAYER_MOVE_SPEED,
            rotation_speed: PLAYER_ROT_SPEED,
            pursuer_speed: PURSUER_SPEED,
            path_cooldown: PATH_COOLDOWN,
            capture_radius: CAPTURE_RADIUS,
            pickup_radius: PICKUP_RADIUS,
            win_fraction: WIN_FRACTION,
        }
    }
}

impl From<&Settings> for SimTuning {
    fn from(settings: &Settings) -> Self {
        Self {
            move_speed: settings.move_speed,
            rotation_speed: settings.rotation_speed,
            pursuer_speed: settings.pursuer_speed,
            path_cooldown: settings.path_cooldown,
            capture_radius: settings.capture_radius,
            pickup_radius: settings.pickup_radius,
            win_fraction: settings.win_fraction,
        }
    }
}

/// Win target for a number of collectibles: the fraction rounded up, at least one
pub fn win_target(total: usize, fraction: f32) -> u32 {
    ((total as f32 * fraction).ceil() as u32).max(1)
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Shared immutable map
    pub grid: Arc<TileGrid>,
    pub tuning: SimTuning,
    pub player: Player,
    pub pursuers: Vec<Pursuer>,
    pub collectibles: Vec<Collectible>,
    pub collected_count: u32,
    pub win_target: u32,
    pub phase: GamePhase,
    /// Simulated seconds since the last reset
    pub elapsed: f32,
    /// Events produced by the most recent tick
    pub events: Vec<GameEvent>,
    player_spawn: Player,
    pursuer_spawns: Vec<Vec2>,
    rng: Pcg32,
}

impl GameState {
    /// Reference labyrinth with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_layout(
            Arc::new(TileGrid::reference()),
            Player::spawn(),
            PURSUER_SPAWNS.to_vec(),
            SimTuning::default(),
            seed,
        )
    }

    /// Session on an arbitrary map
    pub fn with_layout(
        grid: Arc<TileGrid>,
        player: Player,
        pursuer_spawns: Vec<Vec2>,
        tuning: SimTuning,
        seed: u64,
    ) -> Self {
        let mut state = Self {
            seed,
            grid,
            tuning,
            player,
            pursuers: Vec::new(),
            collectibles: Vec::new(),
            collected_count: 0,
            win_target: 1,
            phase: GamePhase::Alive,
            elapsed: 0.0,
            events: Vec::new(),
            player_spawn: player,
            pursuer_spawns,
            rng: Pcg32::seed_from_u64(seed),
        };
        state.respawn();
        log::info!(
            "Session started (seed {}, {} collectibles, need {})",
            seed,
            state.collectibles.len(),
            state.win_target
        );
        state
    }

    /// Reinitialize player, pursuers, collectibles and counters
    ///
    /// Pulse offsets keep drawing from the session generator, so repeated
    /// resets stay reproducible for a given seed.
    pub fn reset(&mut self) {
        self.respawn();
        self.events.push(GameEvent::Reset);
        log::info!("Session reset");
    }

    fn respawn(&mut self) {
        self.player = self.player_spawn;
        let speed = self.tuning.pursuer_speed;
        let rng = &mut self.rng;
        self.pursuers = self
            .pursuer_spawns
            .iter()
            .map(|&pos| Pursuer::spawn(pos, speed, &mut *rng))
            .collect();
        self.collectibles = self.grid.open_cells().map(Collectible::at_cell).collect();
        self.collected_count = 0;
        self.win_target = win_target(self.collectibles.len(), self.tuning.win_fraction);
        self.phase = GamePhase::Alive;
        self.elapsed = 0.0;
    }

    /// Total collectibles in the level
    pub fn total_collectibles(&self) -> usize {
        self.collectibles.len()
    }

    /// Distance from the player to the closest pursuer (infinite with none)
    pub fn nearest_pursuer_distance(&self) -> f32 {
        self.pursuers
            .iter()
            .map(|p| crate::distance(p.pos, self.player.pos))
            .fold(f32::INFINITY, f32::min)
    }
}
