pub mod outcome;
pub mod step;
pub mod world;
