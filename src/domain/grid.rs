/// Grid: a fixed `height × width` array of tiles.
///
/// Coordinates are `(x, y)` with `(0, 0)` at the top-left.
/// Start and Goal sit at fixed cells derived from the dimensions:
/// `(1, 1)` and `(width - 2, height - 2)`.

use super::tile::Tile;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    rows: Vec<Vec<Tile>>,
}

impl Grid {
    /// A grid with every cell set to `fill`.
    pub fn filled(width: usize, height: usize, fill: Tile) -> Self {
        Grid {
            width,
            height,
            rows: vec![vec![fill; width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Tile at (x, y). Out of bounds reads as Wall.
    #[inline]
    pub fn tile_at(&self, x: usize, y: usize) -> Tile {
        if x < self.width && y < self.height {
            self.rows[y][x]
        } else {
            Tile::Wall
        }
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, tile: Tile) {
        if x < self.width && y < self.height {
            self.rows[y][x] = tile;
        }
    }

    /// Can an entity step onto (x, y)? In bounds and passable.
    pub fn can_enter(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && !self.tile_at(x as usize, y as usize).is_blocking()
    }

    pub fn start(&self) -> (usize, usize) {
        (1, 1)
    }

    pub fn goal(&self) -> (usize, usize) {
        (self.width.saturating_sub(2), self.height.saturating_sub(2))
    }

    pub fn rows(&self) -> &[Vec<Tile>] {
        &self.rows
    }

    /// Build a grid from an ASCII diagram.
    /// Legend: '#'=Wall  '~'=Water  '*'=Rock  '='=Path
    ///         'S'=Start 'G'=Goal   anything else = Open
    #[cfg(test)]
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        let mut grid = Grid::filled(width, height, Tile::Open);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let tile = match ch {
                    '#' => Tile::Wall,
                    '~' => Tile::Water,
                    '*' => Tile::Rock,
                    '=' => Tile::Path,
                    'S' => Tile::Start,
                    'G' => Tile::Goal,
                    _ => Tile::Open,
                };
                grid.set(x, y, tile);
            }
        }
        grid
    }
}
