/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::{GameConfig, LoadNote, TimingConfig};
use sim::outcome::Signal;
use sim::step;
use sim::world::{Phase, WorldState};
use ui::input::{InputState, KEYS_BGM, KEYS_CONFIRM, KEYS_QUIT};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// Terminal maze game: reach the goal, avoid the slimes.
#[derive(Parser, Debug)]
#[command(name = "slimemaze", version, about)]
struct Cli {
    /// Seed for maze generation and slime movement.
    #[arg(long)]
    seed: Option<u64>,

    /// Config file to use instead of searching for config.toml.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write logs to this file.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Start with background music muted.
    #[arg(long)]
    no_bgm: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, note) = GameConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?;
    if cli.seed.is_some() {
        config.general.seed = cli.seed;
    }
    if cli.log_file.is_some() {
        config.general.log_file = cli.log_file;
    }
    if cli.no_bgm {
        config.general.bgm = false;
    }
    config.validate().context("invalid configuration")?;

    init_logging(&config)?;
    match note {
        LoadNote::Loaded(path) => info!(path = %path.display(), "config loaded"),
        LoadNote::NotFound => info!("no config.toml found, using defaults"),
        LoadNote::FellBack(e) => warn!(error = %e, "config ignored, using defaults"),
    }

    let seed = config.general.seed.unwrap_or_else(rand::random);
    info!(seed, "seeding game");
    let mut world = WorldState::new(
        config.maze.clone(),
        config.slimes.clone(),
        ChaCha8Rng::seed_from_u64(seed),
    );

    let mut renderer = Renderer::new();
    renderer.init().context("terminal init failed")?;

    let mut sound = SoundEngine::new(config.general.bgm);
    if sound.is_none() {
        warn!("no audio output, playing silently");
    }

    let result = game_loop(&mut world, &mut renderer, sound.as_mut(), &config.timing);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    result.context("game loop failed")?;

    info!(
        rounds = world.round,
        goals = world.goals,
        captures = world.captures,
        "game closed"
    );
    println!();
    println!("Thanks for playing! Seed: {seed}");
    println!("Goals: {}  Caught: {}", world.goals, world.captures);
    Ok(())
}

/// Logs go to a file only; the terminal belongs to the game.
/// Without a log file, logging stays off.
fn init_logging(config: &GameConfig) -> Result<()> {
    let Some(path) = &config.general.log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("could not create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.general.log_level))
        .with_context(|| format!("bad log level `{}`", config.general.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    mut sound: Option<&mut SoundEngine>,
    timing: &TimingConfig,
) -> io::Result<()> {
    let mut kb = InputState::new();
    let slime_interval = Duration::from_millis(timing.slime_interval_ms);
    let reset_delay = Duration::from_millis(timing.reset_delay_ms);

    let mut last_slime_tick = Instant::now();
    let mut round_over_at: Option<Instant> = None;
    let mut bgm_on = sound.as_ref().map_or(false, |s| s.bgm_on());

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) {
            break;
        }
        if kb.any_pressed(KEYS_BGM) {
            if let Some(s) = sound.as_deref_mut() {
                s.toggle_bgm();
                bgm_on = s.bgm_on();
            }
        }

        match world.phase {
            Phase::Playing => {
                for dir in kb.moves() {
                    if let Some(signal) = step::attempt_move(world, dir).signal() {
                        play_signal(sound.as_deref(), signal);
                        round_over_at = Some(Instant::now());
                        break;
                    }
                }

                if world.is_playing() && last_slime_tick.elapsed() >= slime_interval {
                    last_slime_tick = Instant::now();
                    if let Some(signal) = step::advance_slimes(world).signal() {
                        play_signal(sound.as_deref(), signal);
                        round_over_at = Some(Instant::now());
                    }
                }
            }
            Phase::RoundOver(_) => {
                let confirmed = kb.any_pressed(KEYS_CONFIRM);
                if reset_due(round_over_at, Instant::now(), reset_delay, confirmed) {
                    step::reset_round(world);
                    round_over_at = None;
                    last_slime_tick = Instant::now();
                }
            }
        }

        renderer.render(world, bgm_on)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// A finished round is replaced once its message has been up for `delay`,
/// or as soon as the player dismisses it.
fn reset_due(round_over_at: Option<Instant>, now: Instant, delay: Duration, confirmed: bool) -> bool {
    confirmed || round_over_at.map_or(true, |t| now.saturating_duration_since(t) >= delay)
}

fn play_signal(sound: Option<&SoundEngine>, signal: Signal) {
    let Some(sfx) = sound else { return };
    match signal {
        Signal::Captured => sfx.play_captured(),
        Signal::Reached => sfx.play_reached(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(1200);

    #[test]
    fn reset_waits_for_delay() {
        let t0 = Instant::now();
        assert!(!reset_due(Some(t0), t0, DELAY, false));
        assert!(!reset_due(Some(t0), t0 + Duration::from_millis(1199), DELAY, false));
        assert!(reset_due(Some(t0), t0 + DELAY, DELAY, false));
    }

    #[test]
    fn confirm_skips_the_delay() {
        let t0 = Instant::now();
        assert!(reset_due(Some(t0), t0, DELAY, true));
    }

    #[test]
    fn unknown_end_time_resets_at_once() {
        assert!(reset_due(None, Instant::now(), DELAY, false));
    }

    #[test]
    fn zero_delay_resets_next_frame() {
        let t0 = Instant::now();
        assert!(reset_due(Some(t0), t0, Duration::ZERO, false));
    }
}
