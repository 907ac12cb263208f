//! Procedural dungeon map generation split into coherent submodules.

pub mod model;
pub mod rng;
pub mod validate;

mod generator;
mod passages;
mod rooms;
mod walk;

pub use generator::{
    GenerateError, MAX_MAP_HEIGHT, MAX_MAP_WIDTH, MIN_MAP_HEIGHT, MIN_MAP_WIDTH,
    validate_dimensions,
};

use model::DungeonMap;
use rng::MapRng;

/// The map-growing algorithm a request selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneratorKind {
    /// Independent rectangular rooms with doors; no corridors.
    RoomBased,
    /// Rooms joined by straight, T- and X-shaped corridors.
    Passage,
    /// Corridors random-walked out of a central anchor room.
    RandomWalk,
}

impl GeneratorKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::RoomBased => "room",
            Self::Passage => "passage",
            Self::RandomWalk => "walk",
        }
    }
}

/// Parameters for one generation run. `min_rooms`/`max_rooms` steer the
/// passage generator only; the other kinds tune themselves from their
/// internal constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapRequest {
    pub kind: GeneratorKind,
    pub width: usize,
    pub height: usize,
    pub min_rooms: usize,
    pub max_rooms: usize,
    pub seed: Option<u64>,
}

impl Default for MapRequest {
    fn default() -> Self {
        Self {
            kind: GeneratorKind::Passage,
            width: 30,
            height: 30,
            min_rooms: 4,
            max_rooms: 8,
            seed: None,
        }
    }
}

/// Validates the request, resolves the seed, runs the chosen generator and
/// stamps the map's name and metadata. The returned map is sealed: callers
/// treat it as immutable.
pub fn generate(request: &MapRequest) -> Result<DungeonMap, GenerateError> {
    validate_dimensions(request.width, request.height)?;
    if request.kind == GeneratorKind::Passage {
        if request.min_rooms == 0 {
            return Err(GenerateError::InvalidParameters {
                reason: "minRooms must be at least 1".to_string(),
            });
        }
        if request.max_rooms < request.min_rooms {
            return Err(GenerateError::InvalidParameters {
                reason: format!(
                    "maxRooms ({}) must not be below minRooms ({})",
                    request.max_rooms, request.min_rooms
                ),
            });
        }
    }

    let seed = request.seed.unwrap_or_else(rng::entropy_seed);
    let mut rng = MapRng::from_seed(seed);

    let mut map = match request.kind {
        GeneratorKind::RoomBased => rooms::generate(request.width, request.height, &mut rng),
        GeneratorKind::Passage => passages::generate(
            request.width,
            request.height,
            request.min_rooms,
            request.max_rooms,
            &mut rng,
        ),
        GeneratorKind::RandomWalk => walk::generate(request.width, request.height, &mut rng),
    };

    map.name = format!("{} {}x{}", request.kind.label(), request.width, request.height);
    map.metadata.insert("generator".to_string(), request.kind.label().to_string());
    map.metadata.insert("seed".to_string(), seed.to_string());
    Ok(map)
}
