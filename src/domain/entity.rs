/// Entities: Player and Slime.
/// Both are a cell position plus the direction they last tried to move.

/// One of the four orthogonal unit moves. Also serves as facing.
/// Restricting moves to this type keeps non-unit vectors out of the core.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Candidate order before shuffling.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub x: usize,
    pub y: usize,
    pub facing: Direction,
}

impl Player {
    pub fn new(x: usize, y: usize) -> Self {
        Player { x, y, facing: Direction::Down }
    }

    /// Player as placed at the start of every round.
    pub fn at_start() -> Self {
        Player::new(1, 1)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slime {
    pub x: usize,
    pub y: usize,
    pub facing: Direction,
}

impl Slime {
    pub fn new(x: usize, y: usize, facing: Direction) -> Self {
        Slime { x, y, facing }
    }
}

/// Cell one step from (x, y) in `dir`, in signed coordinates.
/// The caller decides whether the result is inside the grid.
pub fn target(x: usize, y: usize, dir: Direction) -> (i32, i32) {
    let (dx, dy) = dir.delta();
    (x as i32 + dx, y as i32 + dy)
}
