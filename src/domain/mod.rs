pub mod entity;
pub mod grid;
pub mod maze;
pub mod placement;
pub mod tile;
