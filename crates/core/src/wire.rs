//! JSON wire contract between the generator service and its viewers.
//!
//! Field names are part of the contract, so the DTOs pin them with serde's
//! `PascalCase` renaming rather than exposing the model types directly.
//! Cell order is row-major with `index = y * Width + x`, `y` northward.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::mapgen::model::{Cell, DungeonMap};
use crate::types::Direction;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MapData {
    pub width: u32,
    pub height: u32,
    pub map_name: String,
    pub floor_level: i32,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    pub cells: Vec<CellData>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CellData {
    pub is_empty: bool,
    pub is_passable: bool,
    pub has_north_wall: bool,
    pub has_east_wall: bool,
    pub has_south_wall: bool,
    pub has_west_wall: bool,
    pub has_north_door: bool,
    pub has_east_door: bool,
    pub has_south_door: bool,
    pub has_west_door: bool,
    pub cell_type: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl CellData {
    fn from_cell(cell: &Cell) -> Self {
        Self {
            is_empty: cell.is_empty(),
            is_passable: cell.is_passable(),
            has_north_wall: cell.has_wall(Direction::North),
            has_east_wall: cell.has_wall(Direction::East),
            has_south_wall: cell.has_wall(Direction::South),
            has_west_wall: cell.has_wall(Direction::West),
            has_north_door: cell.has_door(Direction::North),
            has_east_door: cell.has_door(Direction::East),
            has_south_door: cell.has_door(Direction::South),
            has_west_door: cell.has_door(Direction::West),
            cell_type: cell.cell_type.clone(),
            properties: cell.properties.clone(),
        }
    }

    fn into_cell(self) -> Cell {
        Cell::from_wire_flags(
            self.is_empty,
            self.is_passable,
            [self.has_north_wall, self.has_east_wall, self.has_south_wall, self.has_west_wall],
            [self.has_north_door, self.has_east_door, self.has_south_door, self.has_west_door],
            self.cell_type,
            self.properties,
        )
    }
}

impl MapData {
    pub fn from_map(map: &DungeonMap) -> Self {
        Self {
            width: map.width() as u32,
            height: map.height() as u32,
            map_name: map.name.clone(),
            floor_level: map.floor_level,
            metadata: map.metadata.clone(),
            cells: map.cells().iter().map(CellData::from_cell).collect(),
        }
    }

    pub fn into_map(self) -> DungeonMap {
        DungeonMap::from_parts(
            self.width as usize,
            self.height as usize,
            self.map_name,
            self.floor_level,
            self.metadata,
            self.cells.into_iter().map(CellData::into_cell).collect(),
        )
    }
}

/// Encodes a map for the wire.
pub fn to_json(map: &DungeonMap) -> Result<String, serde_json::Error> {
    serde_json::to_string(&MapData::from_map(map))
}

/// Decodes a wire payload back into a map. The cell count is not validated
/// here; the renderer re-checks it at its own boundary.
pub fn from_json(json: &str) -> Result<DungeonMap, serde_json::Error> {
    serde_json::from_str::<MapData>(json).map(MapData::into_map)
}
