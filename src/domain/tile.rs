/// Tile kinds and their properties.
/// Passability is queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Open,  // Grass
    Wall,  // Tree
    Water,
    #[allow(dead_code)]
    Path,  // Dirt road; the generator never lays it
    Rock,
    Start,
    Goal,
}

/// Whether an entity may occupy a tile.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Passability {
    Passable,
    Blocking,
}

impl Tile {
    #[cfg(test)]
    pub const ALL: [Tile; 7] = [
        Tile::Open,
        Tile::Wall,
        Tile::Water,
        Tile::Path,
        Tile::Rock,
        Tile::Start,
        Tile::Goal,
    ];

    pub fn classify(self) -> Passability {
        match self {
            Tile::Wall | Tile::Water | Tile::Rock => Passability::Blocking,
            Tile::Open | Tile::Path | Tile::Start | Tile::Goal => Passability::Passable,
        }
    }

    /// Does this tile stop movement?
    pub fn is_blocking(self) -> bool {
        self.classify() == Passability::Blocking
    }

    /// Can an entity occupy this cell?
    pub fn is_passable(self) -> bool {
        self.classify() == Passability::Passable
    }

    /// Can a slime be placed here at round start?
    /// Narrower than passable: Start and Goal are never spawn tiles.
    pub fn is_spawnable(self) -> bool {
        matches!(self, Tile::Open | Tile::Path)
    }
}
