pub mod mapgen;
pub mod render;
pub mod types;
pub mod wire;

pub use mapgen::model::{Cell, DungeonMap};
pub use mapgen::{GenerateError, GeneratorKind, MapRequest, generate};
pub use types::{Direction, Pos, Turn};
