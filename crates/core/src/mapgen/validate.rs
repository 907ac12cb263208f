//! Structural checks over sealed maps. The generators are expected to
//! uphold these invariants on their own; this module exists so the test
//! suite and the soak harness can prove it for arbitrary seeds.

use crate::types::{Direction, Pos};

use super::model::DungeonMap;

/// Spacing floor between doors sharing a wall segment (walk maps).
const MIN_DOOR_SPACING: i32 = 2;

/// Invariants every generator must uphold: empty cells are impassable,
/// doors sit in walls, wall and door flags agree across shared edges, and
/// carved cells are walled against empty space and the rim. Returns one
/// finding per violation; an empty list means the map is sound.
pub fn check_structure(map: &DungeonMap) -> Vec<String> {
    let mut findings = Vec::new();

    for y in 0..map.height() as i32 {
        for x in 0..map.width() as i32 {
            let pos = Pos::new(x, y);
            let cell = map.cell(pos).expect("iteration stays in bounds");

            if cell.is_empty() && cell.is_passable() {
                findings.push(format!("{pos:?}: empty cell marked passable"));
            }
            for direction in Direction::ALL {
                if cell.has_door(direction) && !cell.has_wall(direction) {
                    findings.push(format!("{pos:?}: door without a wall to {direction:?}"));
                }
            }
            if cell.is_empty() {
                continue;
            }

            for direction in Direction::ALL {
                let neighbour = pos.step(direction);
                if map.is_empty_at(neighbour) {
                    if !cell.has_wall(direction) {
                        findings.push(format!(
                            "{pos:?}: faces empty space to {direction:?} without a wall"
                        ));
                    }
                    continue;
                }
                let far = map.cell(neighbour).expect("non-empty neighbour is in bounds");
                let opposite = direction.opposite();
                if cell.has_wall(direction) != far.has_wall(opposite) {
                    findings.push(format!("{pos:?}: one-sided wall to {direction:?}"));
                }
                if cell.has_door(direction) != far.has_door(opposite) {
                    findings.push(format!("{pos:?}: one-sided door to {direction:?}"));
                }
            }
        }
    }

    findings
}

/// Every door must open into carved space: no unresolved stubs. Holds for
/// the walk and passage generators; the room-based generator deliberately
/// leaves doors opening into nothing.
pub fn check_resolved_doors(map: &DungeonMap) -> Vec<String> {
    let mut findings = Vec::new();
    for y in 0..map.height() as i32 {
        for x in 0..map.width() as i32 {
            let pos = Pos::new(x, y);
            let cell = map.cell(pos).expect("iteration stays in bounds");
            for direction in Direction::ALL {
                if cell.has_door(direction) && map.is_empty_at(pos.step(direction)) {
                    findings.push(format!("{pos:?}: door to {direction:?} opens into nothing"));
                }
            }
        }
    }
    findings
}

/// Walk-map door spacing: along every contiguous run of same-direction
/// wall, two doors must keep at least `MIN_DOOR_SPACING` wall cells between
/// them.
pub fn check_door_spacing(map: &DungeonMap) -> Vec<String> {
    let mut findings = Vec::new();
    for direction in Direction::ALL {
        let horizontal_wall = !direction.is_horizontal();
        let (lines, length) = if horizontal_wall {
            (map.height(), map.width())
        } else {
            (map.width(), map.height())
        };
        for line in 0..lines as i32 {
            let mut last_door_at: Option<i32> = None;
            for along in 0..length as i32 {
                let pos = if horizontal_wall {
                    Pos::new(along, line)
                } else {
                    Pos::new(line, along)
                };
                let cell = map.cell(pos).expect("iteration stays in bounds");
                let on_run = !cell.is_empty() && cell.has_wall(direction);
                if !on_run {
                    last_door_at = None;
                    continue;
                }
                if cell.has_door(direction) {
                    if let Some(previous) = last_door_at {
                        if along - previous <= MIN_DOOR_SPACING {
                            findings.push(format!(
                                "{pos:?}: doors {} apart on one {direction:?} wall run",
                                along - previous
                            ));
                        }
                    }
                    last_door_at = Some(along);
                }
            }
        }
    }
    findings
}
