/// Game-state operations.
///
///   - `attempt_move`  : one player input
///   - `advance_slimes`: one slime tick (external fixed cadence)
///   - `reset_round`   : replace the board after a terminal signal
///
/// Each call runs to completion; observers never see a half-applied move.
/// Terminal signals only set `Phase::RoundOver`; the board is replaced by a
/// later `reset_round` call.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use super::outcome::{MoveOutcome, Signal, TickOutcome};
use super::world::{Phase, WorldState};
use crate::domain::entity::{self, Direction, Player};
use crate::domain::tile::Tile;
use crate::domain::{maze, placement};

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

/// Facing always turns to `dir`, even when the step is blocked.
/// Capture is checked before the goal: stepping onto a slime standing on
/// the Goal is a capture.
pub fn attempt_move<R: Rng>(world: &mut WorldState<R>, dir: Direction) -> MoveOutcome {
    if world.phase != Phase::Playing {
        return MoveOutcome::Ignored;
    }

    world.player.facing = dir;

    let (tx, ty) = entity::target(world.player.x, world.player.y, dir);
    if !world.grid.can_enter(tx, ty) {
        return MoveOutcome::Blocked;
    }

    world.player.x = tx as usize;
    world.player.y = ty as usize;

    if world.player_caught() {
        end_round(world, Signal::Captured);
        return MoveOutcome::Captured;
    }
    if world.grid.tile_at(world.player.x, world.player.y) == Tile::Goal {
        end_round(world, Signal::Reached);
        return MoveOutcome::Reached;
    }
    MoveOutcome::Moved
}

// ══════════════════════════════════════════════════════════════
// Slimes
// ══════════════════════════════════════════════════════════════

/// Every slime tries the four directions in a fresh random order and takes
/// the first passable one; a boxed-in slime stays put.
/// Capture is checked once, after all slimes have moved.
pub fn advance_slimes<R: Rng>(world: &mut WorldState<R>) -> TickOutcome {
    if world.phase != Phase::Playing {
        return TickOutcome::Quiet;
    }

    let WorldState { grid, slimes, rng, .. } = world;
    for slime in slimes.iter_mut() {
        let mut dirs = Direction::ALL;
        dirs.shuffle(rng);

        let step = dirs.into_iter().find_map(|dir| {
            let (tx, ty) = entity::target(slime.x, slime.y, dir);
            grid.can_enter(tx, ty).then_some((dir, tx as usize, ty as usize))
        });
        if let Some((dir, x, y)) = step {
            slime.x = x;
            slime.y = y;
            slime.facing = dir;
        }
    }

    if world.player_caught() {
        end_round(world, Signal::Captured);
        return TickOutcome::Captured;
    }
    TickOutcome::Quiet
}

// ══════════════════════════════════════════════════════════════
// Round transitions
// ══════════════════════════════════════════════════════════════

fn end_round<R: Rng>(world: &mut WorldState<R>, signal: Signal) {
    match signal {
        Signal::Captured => world.captures += 1,
        Signal::Reached => world.goals += 1,
    }
    world.phase = Phase::RoundOver(signal);
    info!(
        round = world.round,
        ?signal,
        x = world.player.x,
        y = world.player.y,
        "round over"
    );
}

/// Fresh maze, player back on Start facing down, slimes re-placed.
pub fn reset_round<R: Rng>(world: &mut WorldState<R>) {
    world.grid = maze::generate(&world.maze_cfg, &mut world.rng);
    world.player = Player::at_start();
    world.slimes = placement::place_slimes(
        &world.grid,
        (world.player.x, world.player.y),
        &world.slime_cfg,
        &mut world.rng,
    );
    world.phase = Phase::Playing;
    world.round += 1;
    debug!(round = world.round, facing = world.player.facing.label(), "round reset");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MazeConfig, SlimeConfig};
    use crate::domain::entity::Slime;
    use crate::domain::grid::Grid;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn open_5x5() -> Grid {
        Grid::from_rows(&[
            "#####",
            "#   #",
            "#   #",
            "#   #",
            "#####",
        ])
    }

    fn world_on(grid: Grid, player: Player, slimes: Vec<Slime>) -> WorldState<ChaCha8Rng> {
        WorldState::with_layout(
            grid,
            player,
            slimes,
            MazeConfig::default(),
            SlimeConfig::default(),
            ChaCha8Rng::seed_from_u64(17),
        )
    }

    fn assert_fresh_round(w: &WorldState<ChaCha8Rng>) {
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.grid.width(), 20);
        assert_eq!(w.grid.height(), 20);
        assert_eq!(w.grid.tile_at(1, 1), Tile::Start);
        assert_eq!(w.grid.tile_at(18, 18), Tile::Goal);
        assert_eq!(w.player, Player::new(1, 1));
        assert_eq!(w.player.facing, Direction::Down);
        assert_eq!(w.slimes.len(), 5);
    }

    // ── attempt_move ──

    #[test]
    fn move_down_into_open_cell() {
        let mut w = world_on(open_5x5(), Player::new(1, 1), vec![]);
        assert_eq!(attempt_move(&mut w, Direction::Down), MoveOutcome::Moved);
        assert_eq!((w.player.x, w.player.y), (1, 2));
        assert_eq!(w.player.facing, Direction::Down);
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn blocked_move_still_turns() {
        let mut w = world_on(open_5x5(), Player::new(1, 1), vec![]);
        assert_eq!(attempt_move(&mut w, Direction::Left), MoveOutcome::Blocked);
        assert_eq!((w.player.x, w.player.y), (1, 1));
        assert_eq!(w.player.facing, Direction::Left);

        assert_eq!(attempt_move(&mut w, Direction::Up), MoveOutcome::Blocked);
        assert_eq!(w.player.facing, Direction::Up);
    }

    #[test]
    fn water_and_rock_block() {
        let grid = Grid::from_rows(&[
            "#####",
            "#  ~#",
            "# * #",
            "#   #",
            "#####",
        ]);
        let mut w = world_on(grid, Player::new(2, 1), vec![]);
        assert_eq!(attempt_move(&mut w, Direction::Right), MoveOutcome::Blocked);
        assert_eq!(attempt_move(&mut w, Direction::Down), MoveOutcome::Blocked);
        assert_eq!((w.player.x, w.player.y), (2, 1));
    }

    #[test]
    fn map_edge_blocks() {
        // Border cell opened, as the generator does next to Start.
        let grid = Grid::from_rows(&[
            "#####",
            "    #",
            "#   #",
            "#   #",
            "#####",
        ]);
        let mut w = world_on(grid, Player::new(1, 1), vec![]);
        assert_eq!(attempt_move(&mut w, Direction::Left), MoveOutcome::Moved);
        assert_eq!((w.player.x, w.player.y), (0, 1));
        assert_eq!(attempt_move(&mut w, Direction::Left), MoveOutcome::Blocked);
        assert_eq!((w.player.x, w.player.y), (0, 1));
    }

    #[test]
    fn path_start_and_goal_are_walkable() {
        let grid = Grid::from_rows(&[
            "#####",
            "#S=G#",
            "#####",
        ]);
        let mut w = world_on(grid, Player::new(1, 1), vec![]);
        assert_eq!(attempt_move(&mut w, Direction::Right), MoveOutcome::Moved);
        assert_eq!(attempt_move(&mut w, Direction::Left), MoveOutcome::Moved);
        assert_eq!((w.player.x, w.player.y), (1, 1));
    }

    #[test]
    fn stepping_onto_slime_captures_then_resets() {
        let slime = Slime::new(1, 2, Direction::Up);
        let mut w = world_on(open_5x5(), Player::new(1, 1), vec![slime]);
        let before = w.grid.clone();

        assert_eq!(attempt_move(&mut w, Direction::Down), MoveOutcome::Captured);
        // Signal first: board untouched until reset.
        assert_eq!(w.phase, Phase::RoundOver(Signal::Captured));
        assert_eq!((w.player.x, w.player.y), (1, 2));
        assert_eq!(w.grid, before);
        assert_eq!(w.captures, 1);

        reset_round(&mut w);
        assert_fresh_round(&w);
        assert_eq!(w.round, 2);
    }

    #[test]
    fn stepping_onto_goal_reaches_then_resets() {
        let grid = Grid::from_rows(&[
            "#####",
            "#S  #",
            "#   #",
            "#  G#",
            "#####",
        ]);
        let mut w = world_on(grid, Player::new(3, 2), vec![Slime::new(1, 3, Direction::Left)]);
        assert_eq!(attempt_move(&mut w, Direction::Down), MoveOutcome::Reached);
        assert_eq!(w.phase, Phase::RoundOver(Signal::Reached));
        assert_eq!(w.goals, 1);
        assert_eq!(w.captures, 0);

        reset_round(&mut w);
        assert_fresh_round(&w);
    }

    #[test]
    fn slime_on_goal_is_a_capture() {
        let grid = Grid::from_rows(&[
            "#####",
            "#S G#",
            "#####",
        ]);
        let mut w = world_on(grid, Player::new(2, 1), vec![Slime::new(3, 1, Direction::Up)]);
        assert_eq!(attempt_move(&mut w, Direction::Right), MoveOutcome::Captured);
        assert_eq!(w.goals, 0);
    }

    #[test]
    fn moves_ignored_while_round_over() {
        let mut w = world_on(open_5x5(), Player::new(1, 1), vec![Slime::new(2, 1, Direction::Up)]);
        assert_eq!(attempt_move(&mut w, Direction::Right), MoveOutcome::Captured);
        assert_eq!(attempt_move(&mut w, Direction::Down), MoveOutcome::Ignored);
        assert_eq!((w.player.x, w.player.y), (2, 1));
        assert_eq!(w.player.facing, Direction::Right);
        assert_eq!(w.captures, 1);
    }

    // ── advance_slimes ──

    #[test]
    fn boxed_in_slime_stays() {
        let grid = Grid::from_rows(&[
            "#####",
            "## ##",
            "##*##",
            "#   #",
            "#####",
        ]);
        let mut w = world_on(grid, Player::new(1, 3), vec![Slime::new(2, 1, Direction::Down)]);
        for _ in 0..10 {
            assert_eq!(advance_slimes(&mut w), TickOutcome::Quiet);
            assert_eq!((w.slimes[0].x, w.slimes[0].y), (2, 1));
            assert_eq!(w.slimes[0].facing, Direction::Down);
        }
    }

    #[test]
    fn slime_takes_only_exit() {
        let grid = Grid::from_rows(&[
            "#####",
            "#  ##",
            "#####",
        ]);
        let mut w = world_on(grid, Player::new(1, 1), vec![Slime::new(2, 1, Direction::Down)]);
        // Only exit is the player's cell.
        assert_eq!(advance_slimes(&mut w), TickOutcome::Captured);
        assert_eq!((w.slimes[0].x, w.slimes[0].y), (1, 1));
        assert_eq!(w.slimes[0].facing, Direction::Left);
        assert_eq!(w.phase, Phase::RoundOver(Signal::Captured));
    }

    #[test]
    fn quiet_tick_leaves_player_alone() {
        let mut w = world_on(open_5x5(), Player::new(1, 1), vec![Slime::new(3, 3, Direction::Up)]);
        w.player.facing = Direction::Right;
        for _ in 0..3 {
            // From (3,3) a slime needs at least 4 steps to reach (1,1).
            assert_eq!(advance_slimes(&mut w), TickOutcome::Quiet);
            let s = &w.slimes[0];
            assert!(w.grid.can_enter(s.x as i32, s.y as i32));
        }
        assert_eq!(w.player, Player { x: 1, y: 1, facing: Direction::Right });
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn every_slime_moves_before_capture_check() {
        let grid = Grid::from_rows(&[
            "#######",
            "#  ####",
            "##  ###",
            "####  #",
            "#######",
        ]);
        let slimes = vec![
            Slime::new(1, 1, Direction::Up),   // only exit: player at (2,1)
            Slime::new(5, 3, Direction::Up),   // only exit: (4,3)
        ];
        let mut w = world_on(grid, Player::new(2, 1), slimes);
        assert_eq!(advance_slimes(&mut w), TickOutcome::Captured);
        assert_eq!((w.slimes[0].x, w.slimes[0].y), (2, 1));
        assert_eq!((w.slimes[1].x, w.slimes[1].y), (4, 3));
        assert_eq!(w.slimes[1].facing, Direction::Left);
        assert_eq!(w.captures, 1);
    }

    #[test]
    fn slimes_frozen_while_round_over() {
        let mut w = world_on(open_5x5(), Player::new(1, 1), vec![Slime::new(2, 1, Direction::Up)]);
        assert_eq!(attempt_move(&mut w, Direction::Right), MoveOutcome::Captured);
        assert_eq!(advance_slimes(&mut w), TickOutcome::Quiet);
        assert_eq!((w.slimes[0].x, w.slimes[0].y), (2, 1));
    }

    #[test]
    fn slimes_may_stack() {
        let grid = Grid::from_rows(&[
            "######",
            "#  # #",
            "######",
        ]);
        let slimes = vec![Slime::new(1, 1, Direction::Up), Slime::new(1, 1, Direction::Down)];
        let mut w = world_on(grid, Player::new(4, 1), slimes);
        assert_eq!(advance_slimes(&mut w), TickOutcome::Quiet);
        assert!(w.slimes.iter().all(|s| (s.x, s.y) == (2, 1)));
    }

    // ── Whole game ──

    #[test]
    fn new_game_is_a_fresh_round() {
        let w = WorldState::new(MazeConfig::default(), SlimeConfig::default(), ChaCha8Rng::seed_from_u64(5));
        assert_fresh_round(&w);
        assert_eq!(w.round, 1);
        assert!(!w.player_caught());
    }

    #[test]
    fn same_seed_same_game() {
        let run = |seed| {
            let mut w = WorldState::new(
                MazeConfig::default(),
                SlimeConfig::default(),
                ChaCha8Rng::seed_from_u64(seed),
            );
            let dirs = [Direction::Down, Direction::Right, Direction::Right, Direction::Down];
            for (i, dir) in dirs.iter().cycle().take(40).enumerate() {
                let moved = attempt_move(&mut w, *dir).signal().is_some();
                let ticked = i % 3 == 0 && advance_slimes(&mut w).signal().is_some();
                if moved || ticked {
                    reset_round(&mut w);
                }
            }
            (w.grid.clone(), w.player.clone(), w.slimes.clone(), w.round)
        };
        assert_eq!(run(99), run(99));
    }

    #[test]
    fn reset_works_from_playing_too() {
        let mut w = world_on(open_5x5(), Player::new(2, 2), vec![]);
        reset_round(&mut w);
        assert_fresh_round(&w);
    }
}
