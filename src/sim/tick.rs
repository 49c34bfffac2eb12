//! Frame-stepped simulation tick
//!
//! Advances the session by an explicit elapsed time: player input, pursuer
//! replanning and movement, then capture and collection checks.

use glam::Vec2;

use super::grid::{Cell, TileGrid};
use super::motion::Mobile;
use super::path::find_path;
use super::state::{Collectible, GameEvent, GamePhase, GameState, Pursuer};

/// Steering offsets shorter than this are used unnormalized
const STEER_EPSILON: f32 = 0.001;

/// Movement intents for a single tick (already resolved from the input device)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub forward: bool,
    pub back: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    /// Counter-clockwise turn
    pub rotate_left: bool,
    /// Clockwise turn
    pub rotate_right: bool,
    /// Restart after death or victory
    pub reset: bool,
}

impl TickInput {
    /// Only the forward intent held
    pub fn forward() -> Self {
        Self {
            forward: true,
            ..Default::default()
        }
    }
}

/// Advance the game state by `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();

    if state.phase.is_terminal() {
        if input.reset {
            state.reset();
        }
        return;
    }

    state.elapsed += dt;
    apply_player_input(state, input, dt);

    let player_pos = state.player.pos;
    update_pursuers(
        &state.grid,
        &mut state.pursuers,
        player_pos,
        dt,
        state.tuning.path_cooldown,
    );

    if let Some(index) = player_caught(player_pos, &state.pursuers, state.tuning.capture_radius) {
        state.phase = GamePhase::Dead;
        state.events.push(GameEvent::Caught { pursuer: index });
        log::info!(
            "Player caught by pursuer {} after {:.2}s",
            index,
            state.elapsed
        );
    }

    for pos in collect_near(&mut state.collectibles, player_pos, state.tuning.pickup_radius) {
        state.collected_count += 1;
        state.events.push(GameEvent::Collected { pos });
    }

    // Capture wins over victory on the same tick
    if state.phase == GamePhase::Alive && state.collected_count >= state.win_target {
        state.phase = GamePhase::Won;
        state.events.push(GameEvent::Victory);
        log::info!(
            "Victory: {}/{} collected",
            state.collected_count,
            state.total_collectibles()
        );
    }
}

fn apply_player_input(state: &mut GameState, input: &TickInput, dt: f32) {
    let step = state.tuning.move_speed * dt;
    let turn = state.tuning.rotation_speed * dt;
    let grid = &state.grid;
    let player = &mut state.player;

    if input.forward {
        player.translate(grid, player.dir * step);
    }
    if input.back {
        player.translate(grid, -player.dir * step);
    }
    if input.strafe_left {
        player.translate(grid, -player.plane * step);
    }
    if input.strafe_right {
        player.translate(grid, player.plane * step);
    }
    if input.rotate_left {
        player.rotate(turn);
    }
    if input.rotate_right {
        player.rotate(-turn);
    }
}

/// Replan (throttled) and move every pursuer toward the player
pub fn update_pursuers(
    grid: &TileGrid,
    pursuers: &mut [Pursuer],
    player_pos: Vec2,
    dt: f32,
    path_cooldown: f32,
) {
    let goal = Cell::containing(player_pos);

    for pursuer in pursuers.iter_mut() {
        pursuer.advance_timers(dt);

        if pursuer.needs_replan(goal) {
            let start = pursuer.cell();
            pursuer.path = find_path(grid, start, goal);
            pursuer.path_cooldown = path_cooldown;
            log::debug!(
                "Replanned {} -> {}: {} cells",
                start,
                goal,
                pursuer.path.len()
            );
        }

        let target = pursuer.steer_target(player_pos);
        let offset = target - pursuer.pos;
        // Within a millitile the raw offset keeps the step from overshooting
        let heading = if offset.length() > STEER_EPSILON {
            offset.normalize()
        } else {
            offset
        };
        pursuer.translate(grid, heading * pursuer.speed * dt);
    }
}

/// Index of the first pursuer within `radius` of the player
pub fn player_caught(player_pos: Vec2, pursuers: &[Pursuer], radius: f32) -> Option<usize> {
    pursuers
        .iter()
        .position(|p| crate::distance(p.pos, player_pos) < radius)
}

/// Collect everything within `radius`; returns the positions picked up
pub fn collect_near(collectibles: &mut [Collectible], pos: Vec2, radius: f32) -> Vec<Vec2> {
    collectibles
        .iter_mut()
        .filter_map(|c| c.try_collect(pos, radius).then_some(c.pos))
        .collect()
}
