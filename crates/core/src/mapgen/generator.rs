//! Shared generator contract: dimension limits, generation errors and the
//! border-wall pass every sealed map ends with.

use std::error::Error;
use std::fmt;

use crate::types::{Direction, Pos};

use super::model::DungeonMap;

pub const MIN_MAP_WIDTH: usize = 10;
pub const MIN_MAP_HEIGHT: usize = 10;
pub const MAX_MAP_WIDTH: usize = 100;
pub const MAX_MAP_HEIGHT: usize = 100;

/// Errors surfaced by [`crate::mapgen::generate`]. A failed generation never
/// produces a partial map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerateError {
    /// Width or height outside the `10..=100` range.
    InvalidDimensions { width: usize, height: usize },
    /// A parameter combination that cannot be honoured, e.g. an inverted
    /// room-count range.
    InvalidParameters { reason: String },
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => write!(
                f,
                "invalid dimensions {width}x{height}: both sides must be within \
                 {MIN_MAP_WIDTH}..={MAX_MAP_WIDTH}"
            ),
            Self::InvalidParameters { reason } => write!(f, "invalid parameters: {reason}"),
        }
    }
}

impl Error for GenerateError {}

pub fn validate_dimensions(width: usize, height: usize) -> Result<(), GenerateError> {
    let width_ok = (MIN_MAP_WIDTH..=MAX_MAP_WIDTH).contains(&width);
    let height_ok = (MIN_MAP_HEIGHT..=MAX_MAP_HEIGHT).contains(&height);
    if width_ok && height_ok {
        Ok(())
    } else {
        Err(GenerateError::InvalidDimensions { width, height })
    }
}

/// Walls every non-empty cell against its empty neighbours and the map rim.
/// Only edges facing empty space are touched, so bilateral consistency
/// between carved neighbours is unaffected.
pub(super) fn apply_border_walls(map: &mut DungeonMap) {
    for y in 0..map.height() as i32 {
        for x in 0..map.width() as i32 {
            let pos = Pos::new(x, y);
            if map.cell(pos).is_none_or(|cell| cell.is_empty()) {
                continue;
            }
            for direction in Direction::ALL {
                if map.is_empty_at(pos.step(direction)) {
                    map.cell_mut(pos)
                        .expect("cell was just read")
                        .set_wall(direction, true);
                }
            }
        }
    }
}
