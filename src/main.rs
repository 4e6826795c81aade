//! Headless level runner.
//!
//! Loads the gameplay tuning and a level, spawns every entity and ticks the
//! simulation at a fixed step until the level succeeds, fails or the tick
//! budget runs out. With `--autopilot` the player is steered by a seeded
//! random thumbstick so task bots have something to hunt.
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --level assets/levels/level_1.json --autopilot
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use glam::Vec2;
use log::{error, info, warn};

use taskbots::level::LevelSimulation;
use taskbots::resources::animationstore::TextureAtlases;
use taskbots::resources::gameplayconfig::GameplayConfig;
use taskbots::resources::levelconfig::LevelConfiguration;
use taskbots::resources::leveloutcome::LevelPhase;

/// Seconds between two autopilot stick changes.
const AUTOPILOT_STICK_HOLD: f32 = 1.5;

/// Run one task bot level without a renderer.
#[derive(Parser)]
#[command(version, about = "Headless task bot level simulation")]
struct Cli {
    /// Level layout (JSON).
    #[arg(long, value_name = "PATH")]
    level: PathBuf,

    /// Gameplay tuning overrides (INI). Defaults are used when absent.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Texture atlas manifest (JSON). Placeholder atlases are used when absent.
    #[arg(long, value_name = "PATH")]
    atlas: Option<PathBuf>,

    /// Maximum number of ticks to run.
    #[arg(long, default_value_t = 60 * 60 * 3)]
    ticks: u32,

    /// Seconds per tick.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Seed for the autopilot.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Drive the player with a random thumbstick.
    #[arg(long)]
    autopilot: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => GameplayConfig::with_path(path),
        None => GameplayConfig::new(),
    };
    if cli.config.is_some() {
        if let Err(e) = config.load_from_file() {
            warn!("{}; using default tuning", e);
        }
    }

    let level = match LevelConfiguration::load_from_file(&cli.level) {
        Ok(level) => level,
        Err(e) => {
            error!("Failed to load level {}: {}", cli.level.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let atlases = match &cli.atlas {
        Some(path) => match TextureAtlases::load_from_file(path) {
            Ok(atlases) => atlases,
            Err(e) => {
                error!("Failed to load atlas manifest {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => TextureAtlases::placeholder(4),
    };

    let mut simulation = match LevelSimulation::new(config, level, atlases) {
        Ok(simulation) => simulation,
        Err(e) => {
            error!("Failed to build level: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut rng = fastrand::Rng::with_seed(cli.seed);
    let mut stick_timer = 0.0;
    let mut phase = simulation.phase();
    let mut ticks_run = 0;

    while ticks_run < cli.ticks && !phase.is_terminal() {
        if cli.autopilot {
            stick_timer -= cli.dt;
            if stick_timer <= 0.0 {
                stick_timer = AUTOPILOT_STICK_HOLD;
                let stick = Vec2::new(rng.f32() * 2.0 - 1.0, rng.f32() * 2.0 - 1.0);
                simulation.drive_player(stick);
            }
        }
        phase = simulation.tick(cli.dt);
        ticks_run += 1;
    }

    let outcome = simulation.outcome();
    info!(
        "Finished after {} ticks: {:?} with {} left",
        ticks_run,
        phase,
        outcome.time_remaining_string()
    );
    match phase {
        LevelPhase::Fail => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}
