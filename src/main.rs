//! Labyrinth headless runner
//!
//! Plays a scripted session on the reference map at a fixed timestep, logs
//! what happened and optionally writes the final view as a PPM image.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs::File;
    use std::io::BufWriter;
    use std::path::PathBuf;
    use std::sync::Arc;

    use anyhow::{Context, Result};
    use clap::{Parser, ValueEnum};

    use labyrinth::Settings;
    use labyrinth::renderer::{Framebuffer, SpriteAtlas, draw_overlays, render_frame};
    use labyrinth::sim::{
        GameEvent, GamePhase, GameState, PURSUER_SPAWNS, Player, TickInput, TileGrid, tick,
    };

    #[derive(Parser)]
    #[command(name = "labyrinth")]
    #[command(about = "Run a headless labyrinth session")]
    struct Cli {
        /// JSON settings file (defaults apply to missing fields)
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Number of ticks to simulate
        #[arg(long, default_value_t = 3600)]
        ticks: u32,
        /// Ticks per simulated second
        #[arg(long, default_value_t = 60)]
        rate: u32,
        /// Input script
        #[arg(long, value_enum, default_value_t = Script::Wander)]
        script: Script,
        /// Write the last frame here as binary PPM
        #[arg(long)]
        out: Option<PathBuf>,
        /// Override the settings seed
        #[arg(long)]
        seed: Option<u64>,
    }

    #[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
    enum Script {
        /// Stand still at the spawn
        Idle,
        /// Hold forward
        Forward,
        /// Walk forward, turning whenever blocked
        Wander,
    }

    /// Ticks to keep turning after bumping into a wall
    const WANDER_TURN_TICKS: u32 = 25;

    struct Autopilot {
        script: Script,
        turning: u32,
    }

    impl Autopilot {
        fn new(script: Script) -> Self {
            Self { script, turning: 0 }
        }

        fn next(&mut self, moved: bool) -> TickInput {
            match self.script {
                Script::Idle => TickInput::default(),
                Script::Forward => TickInput::forward(),
                Script::Wander => {
                    if !moved && self.turning == 0 {
                        self.turning = WANDER_TURN_TICKS;
                    }
                    if self.turning > 0 {
                        self.turning -= 1;
                        TickInput {
                            rotate_left: true,
                            ..Default::default()
                        }
                    } else {
                        TickInput::forward()
                    }
                }
            }
        }
    }

    pub fn run() -> Result<()> {
        env_logger::init();
        let cli = Cli::parse();

        let mut settings = match &cli.settings {
            Some(path) => Settings::load(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => Settings::default(),
        };
        if let Some(seed) = cli.seed {
            settings.seed = seed;
        }

        let mut state = GameState::with_layout(
            Arc::new(TileGrid::reference()),
            Player::spawn(),
            PURSUER_SPAWNS.to_vec(),
            settings.tuning(),
            settings.seed,
        );

        let viewport = settings.viewport();
        let palette = settings.palette();
        let atlas = SpriteAtlas::builtin();
        let dt = 1.0 / cli.rate.max(1) as f32;

        log::info!(
            "Running {} ticks at {} Hz on a {}x{} view (seed {})",
            cli.ticks,
            cli.rate,
            viewport.width,
            viewport.height,
            state.seed
        );

        let mut pilot = Autopilot::new(cli.script);
        let mut moved = true;
        let mut ticks_run = 0;
        for _ in 0..cli.ticks {
            let before = state.player.pos;
            let input = pilot.next(moved);
            tick(&mut state, &input, dt);
            moved = state.player.pos != before;
            ticks_run += 1;

            for event in &state.events {
                if let GameEvent::Collected { pos } = event {
                    log::debug!("Collected at ({:.1}, {:.1})", pos.x, pos.y);
                }
            }
            if state.phase != GamePhase::Alive {
                break;
            }
        }

        let output = render_frame(&state, viewport, &palette, &atlas);
        log::info!(
            "Final view: {} wall columns, {} billboards",
            output.scan.columns.iter().filter(|c| c.is_some()).count(),
            output.billboards.len()
        );

        println!(
            "Seed {}: {:?} after {} ticks ({:.2}s): {}/{} collected (need {}), nearest pursuer {:.2}",
            state.seed,
            state.phase,
            ticks_run,
            state.elapsed,
            state.collected_count,
            state.total_collectibles(),
            state.win_target,
            state.nearest_pursuer_distance()
        );

        if let Some(path) = &cli.out {
            let mut fb = Framebuffer::new(viewport.width, viewport.height);
            output.draw(&mut fb, &atlas);
            draw_overlays(&mut fb, &state, &palette);
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            fb.write_ppm(BufWriter::new(file))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }

        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless runner on the web
}
