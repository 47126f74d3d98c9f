/// WorldState: the complete state of a running game.
///
/// Owns the grid, the player, the slimes and the random source.
/// Only `sim::step` mutates it; the renderer reads it through `&WorldState`.
///
/// ## Round lifecycle
///
///   Playing ──(capture / goal)──▶ RoundOver(signal) ──reset_round──▶ Playing
///
/// The terminal signal and the reset are separate steps so the presentation
/// layer can show the final position before the maze is replaced.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use super::outcome::Signal;
use crate::config::{MazeConfig, SlimeConfig};
use crate::domain::entity::{Player, Slime};
use crate::domain::grid::Grid;
use crate::domain::{maze, placement};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    RoundOver(Signal),
}

pub struct WorldState<R = ChaCha8Rng> {
    // ── Board ──
    pub grid: Grid,
    pub player: Player,
    pub slimes: Vec<Slime>,

    // ── Round tracking ──
    pub phase: Phase,
    pub round: u32,
    pub captures: u32,
    pub goals: u32,

    // ── Generation ──
    pub maze_cfg: MazeConfig,
    pub slime_cfg: SlimeConfig,
    pub rng: R,
}

impl<R: Rng> WorldState<R> {
    /// A fresh game: round 1 on a newly generated maze.
    pub fn new(maze_cfg: MazeConfig, slime_cfg: SlimeConfig, mut rng: R) -> Self {
        let grid = maze::generate(&maze_cfg, &mut rng);
        let player = Player::at_start();
        let slimes = placement::place_slimes(&grid, (player.x, player.y), &slime_cfg, &mut rng);
        info!(round = 1, slimes = slimes.len(), "game started");
        Self::with_layout(grid, player, slimes, maze_cfg, slime_cfg, rng)
    }

    /// A game on a given board. Later rounds are generated from the configs.
    pub fn with_layout(
        grid: Grid,
        player: Player,
        slimes: Vec<Slime>,
        maze_cfg: MazeConfig,
        slime_cfg: SlimeConfig,
        rng: R,
    ) -> Self {
        WorldState {
            grid,
            player,
            slimes,
            phase: Phase::Playing,
            round: 1,
            captures: 0,
            goals: 0,
            maze_cfg,
            slime_cfg,
            rng,
        }
    }
}

/// Read-only queries; the renderer uses these without needing `R: Rng`.
impl<R> WorldState<R> {
    /// Is any slime on (x, y)?
    pub fn slime_at(&self, x: usize, y: usize) -> bool {
        self.slimes.iter().any(|s| s.x == x && s.y == y)
    }

    pub fn player_caught(&self) -> bool {
        self.slime_at(self.player.x, self.player.y)
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }
}
