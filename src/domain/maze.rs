/// Maze generator.
///
/// Pipeline, in order:
///   1. Fill with Wall
///   2. Carve: randomized depth-first walk in 2-cell steps from (1,1)
///   3. Knock out a fixed number of random interior walls (adds loops)
///   4. Force Start / Goal and open their 4-neighbors
///   5. Relabel some leftover walls as Water or Rock (cosmetic)
///
/// Start and Goal are connected by construction: every odd interior cell is
/// carved into one spanning tree, and the forced neighbors of Goal touch it.
/// Steps 3-5 only ever turn Wall into something else or force cells Open,
/// so they never cut a carved passage.
///
/// The carve walk uses an explicit stack instead of recursion. Each frame
/// shuffles its step order on entry, exactly where a recursive version would,
/// so the same random sequence yields the same maze.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::grid::Grid;
use super::tile::Tile;
use crate::config::MazeConfig;

/// Two-cell carving steps, pre-shuffle order: up, right, down, left.
const CARVE_STEPS: [(i32, i32); 4] = [(0, -2), (2, 0), (0, 2), (-2, 0)];
const NEIGHBORS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

pub fn generate<R: Rng + ?Sized>(cfg: &MazeConfig, rng: &mut R) -> Grid {
    let mut grid = Grid::filled(cfg.width, cfg.height, Tile::Wall);
    carve(&mut grid, rng);
    open_extra_passages(&mut grid, cfg.extra_openings, rng);
    place_endpoints(&mut grid);
    decorate(&mut grid, cfg.decoration_chance, rng);

    debug!(
        width = cfg.width,
        height = cfg.height,
        open = grid.rows().iter().flatten().filter(|t| t.is_passable()).count(),
        "maze generated"
    );
    grid
}

// ══════════════════════════════════════════════════════════════
// Carving
// ══════════════════════════════════════════════════════════════

/// One suspended step of the depth-first walk.
struct Frame {
    x: usize,
    y: usize,
    steps: [(i32, i32); 4],
    next: usize,
}

fn enter<R: Rng + ?Sized>(
    grid: &mut Grid,
    visited: &mut [Vec<bool>],
    x: usize,
    y: usize,
    rng: &mut R,
) -> Frame {
    visited[y][x] = true;
    grid.set(x, y, Tile::Open);
    let mut steps = CARVE_STEPS;
    steps.shuffle(rng);
    Frame { x, y, steps, next: 0 }
}

fn carve<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) {
    let (w, h) = (grid.width() as i32, grid.height() as i32);
    let mut visited = vec![vec![false; grid.width()]; grid.height()];

    // Depth never exceeds the number of cells.
    let mut stack: Vec<Frame> = Vec::with_capacity(grid.width() * grid.height() / 4 + 1);
    let (sx, sy) = grid.start();
    let root = enter(grid, &mut visited, sx, sy, rng);
    stack.push(root);

    while let Some(frame) = stack.last_mut() {
        if frame.next == frame.steps.len() {
            stack.pop();
            continue;
        }
        let (dx, dy) = frame.steps[frame.next];
        frame.next += 1;

        let (x, y) = (frame.x as i32, frame.y as i32);
        let (nx, ny) = (x + dx, y + dy);
        let interior = nx > 0 && nx < w - 1 && ny > 0 && ny < h - 1;
        if !interior || visited[ny as usize][nx as usize] {
            continue;
        }

        grid.set((x + dx / 2) as usize, (y + dy / 2) as usize, Tile::Open);
        let child = enter(grid, &mut visited, nx as usize, ny as usize, rng);
        stack.push(child);
    }
}

// ══════════════════════════════════════════════════════════════
// Post-processing
// ══════════════════════════════════════════════════════════════

fn open_extra_passages<R: Rng + ?Sized>(grid: &mut Grid, count: u32, rng: &mut R) {
    let (w, h) = (grid.width(), grid.height());
    for _ in 0..count {
        let x = rng.gen_range(1..w - 1);
        let y = rng.gen_range(1..h - 1);
        if grid.tile_at(x, y) == Tile::Wall {
            grid.set(x, y, Tile::Open);
        }
    }
}

fn place_endpoints(grid: &mut Grid) {
    let start = grid.start();
    let goal = grid.goal();
    grid.set(start.0, start.1, Tile::Start);
    grid.set(goal.0, goal.1, Tile::Goal);

    for (cx, cy) in [start, goal] {
        for (dx, dy) in NEIGHBORS {
            let (nx, ny) = (cx as i32 + dx, cy as i32 + dy);
            if grid.in_bounds(nx, ny) {
                grid.set(nx as usize, ny as usize, Tile::Open);
            }
        }
    }
}

/// Chebyshev distance ≤ 1 from Start or Goal: never decorated.
fn is_protected(grid: &Grid, x: usize, y: usize) -> bool {
    let near = |(cx, cy): (usize, usize)| x.abs_diff(cx) <= 1 && y.abs_diff(cy) <= 1;
    near(grid.start()) || near(grid.goal())
}

fn decorate<R: Rng + ?Sized>(grid: &mut Grid, chance: f64, rng: &mut R) {
    for y in 1..grid.height() - 1 {
        for x in 1..grid.width() - 1 {
            if is_protected(grid, x, y) || grid.tile_at(x, y) != Tile::Wall {
                continue;
            }
            if rng.gen_bool(chance) {
                let tile = if rng.gen_bool(0.5) { Tile::Water } else { Tile::Rock };
                grid.set(x, y, tile);
            }
        }
    }
}
