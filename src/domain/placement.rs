/// Slime placement at round start.
///
/// Each slime draws random cells until one qualifies:
///   - tile is Open or Path
///   - not the player's cell, not Start, not Goal
///   - Manhattan distance from the player ≥ `min_distance`
///
/// The distance rule is only enforced for the first `placement_attempts`
/// draws of each slime; after that any otherwise-valid cell is accepted.
/// Slimes are not checked against each other and may share a cell.

use rand::Rng;
use tracing::{debug, warn};

use super::entity::{Direction, Slime};
use super::grid::Grid;
use crate::config::SlimeConfig;

fn manhattan(a: (usize, usize), b: (usize, usize)) -> usize {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
}

/// Valid spawn cell, ignoring distance.
fn is_candidate(grid: &Grid, player: (usize, usize), x: usize, y: usize) -> bool {
    grid.tile_at(x, y).is_spawnable()
        && (x, y) != player
        && (x, y) != grid.start()
        && (x, y) != grid.goal()
}

pub fn place_slimes<R: Rng + ?Sized>(
    grid: &Grid,
    player: (usize, usize),
    cfg: &SlimeConfig,
    rng: &mut R,
) -> Vec<Slime> {
    let (w, h) = (grid.width(), grid.height());

    // Without a single candidate the draw loop would never end.
    let any_candidate = (0..h).any(|y| (0..w).any(|x| is_candidate(grid, player, x, y)));
    if !any_candidate {
        warn!("no tile can hold a slime; round starts without slimes");
        return vec![];
    }

    let mut slimes = Vec::with_capacity(cfg.count);
    for i in 0..cfg.count {
        let mut attempts: u32 = 0;
        let (x, y) = loop {
            let x = rng.gen_range(0..w);
            let y = rng.gen_range(0..h);
            attempts += 1;

            if !is_candidate(grid, player, x, y) {
                continue;
            }
            if attempts < cfg.placement_attempts && manhattan((x, y), player) < cfg.min_distance {
                continue;
            }
            break (x, y);
        };

        let distance = manhattan((x, y), player);
        if distance < cfg.min_distance {
            warn!(slime = i, x, y, distance, attempts, "slime placed close to player");
        }

        let facing = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
        slimes.push(Slime::new(x, y, facing));
    }

    debug!(count = slimes.len(), "slimes placed");
    slimes
}
