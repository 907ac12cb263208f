//! Room-based generation: rectangle packing with padded rejection sampling
//! and randomised door placement. Also home to the rectangle primitives the
//! other generators share.

use crate::types::{Direction, Pos};

use super::model::DungeonMap;
use super::rng::MapRng;

const MIN_ROOM_WIDTH: i32 = 3;
const MIN_ROOM_HEIGHT: i32 = 3;
const MAX_ROOM_SIZE: i32 = 8;
const MAX_PLACEMENT_ATTEMPTS: usize = 100;
const ADDITIONAL_DOOR_CHANCE: f64 = 0.3;

/// An axis-aligned room footprint. `x`/`y` name the south-west floor cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct RoomRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl RoomRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(self) -> i32 {
        self.x + self.width - 1
    }

    pub fn top(self) -> i32 {
        self.y + self.height - 1
    }

    pub fn center(self) -> Pos {
        Pos::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn expanded(self, margin: i32) -> Self {
        Self {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + margin * 2,
            height: self.height + margin * 2,
        }
    }

    pub fn intersects(self, other: &Self) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.top()
            && self.top() >= other.y
    }

    pub fn contains(self, pos: Pos) -> bool {
        pos.x >= self.x && pos.x <= self.right() && pos.y >= self.y && pos.y <= self.top()
    }

    pub fn cells(self) -> impl Iterator<Item = Pos> {
        (self.y..=self.top())
            .flat_map(move |y| (self.x..=self.right()).map(move |x| Pos::new(x, y)))
    }
}

pub(super) fn generate(width: usize, height: usize, rng: &mut MapRng) -> DungeonMap {
    let mut map = DungeonMap::new(width, height);
    let target_room_count =
        (width * height) / ((MIN_ROOM_WIDTH * MIN_ROOM_HEIGHT) as usize * 3);

    let rooms = place_rooms(&mut map, target_room_count, rng);
    for room in &rooms {
        add_room_doors(&mut map, *room, rng);
    }

    map.metadata.insert("rooms".to_string(), rooms.len().to_string());
    map
}

/// Rejection-samples up to `target` rooms within a shared attempt budget.
/// Exhausting the budget is not an error; the map simply holds fewer rooms.
fn place_rooms(map: &mut DungeonMap, target: usize, rng: &mut MapRng) -> Vec<RoomRect> {
    let width = map.width() as i32;
    let height = map.height() as i32;
    let mut rooms: Vec<RoomRect> = Vec::new();

    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        if rooms.len() >= target {
            break;
        }

        let wide = rng.coin();
        let long_side = rng.range_i32(MIN_ROOM_WIDTH, MAX_ROOM_SIZE + 1);
        let short_side = rng.range_i32(MIN_ROOM_WIDTH, long_side.min(MAX_ROOM_SIZE) + 1);
        let (room_width, room_height) =
            if wide { (long_side, short_side) } else { (short_side, long_side) };
        if room_width + 2 > width || room_height + 2 > height {
            continue;
        }

        let x = rng.range_i32(1, width - room_width);
        let y = rng.range_i32(1, height - room_height);
        let candidate = RoomRect::new(x, y, room_width, room_height);
        if rooms.iter().any(|room| room.expanded(1).intersects(&candidate)) {
            continue;
        }

        paint_rect_room(map, candidate);
        rooms.push(candidate);
    }

    rooms
}

/// Carves a rectangular room: floor everywhere, walls around the perimeter.
pub(super) fn paint_rect_room(map: &mut DungeonMap, room: RoomRect) {
    for pos in room.cells() {
        let cell = map.cell_mut(pos).expect("room cells are sampled in bounds");
        cell.carve();
        if pos.x == room.x {
            cell.set_wall(Direction::West, true);
        }
        if pos.x == room.right() {
            cell.set_wall(Direction::East, true);
        }
        if pos.y == room.y {
            cell.set_wall(Direction::South, true);
        }
        if pos.y == room.top() {
            cell.set_wall(Direction::North, true);
        }
    }
}

/// Non-corner perimeter positions paired with their outward direction, in
/// wall order north, east, south, west.
pub(super) fn wall_interior_positions(room: RoomRect) -> Vec<(Pos, Direction)> {
    let mut positions = Vec::new();
    for x in room.x + 1..room.right() {
        positions.push((Pos::new(x, room.top()), Direction::North));
    }
    for y in room.y + 1..room.top() {
        positions.push((Pos::new(room.right(), y), Direction::East));
    }
    for x in room.x + 1..room.right() {
        positions.push((Pos::new(x, room.y), Direction::South));
    }
    for y in room.y + 1..room.top() {
        positions.push((Pos::new(room.x, y), Direction::West));
    }
    positions
}

/// Every room gets one guaranteed door; the k-th extra door arrives with
/// probability `ADDITIONAL_DOOR_CHANCE^k` until a draw fails or candidates
/// run out. Doors are flagged on the owning cell only: this generator makes
/// no attempt at door-side coherence, so a door may open into empty space.
fn add_room_doors(map: &mut DungeonMap, room: RoomRect, rng: &mut MapRng) {
    let mut candidates = wall_interior_positions(room);
    let mut extra_index = 0_i32;
    while !candidates.is_empty() {
        if extra_index > 0 && !rng.chance(ADDITIONAL_DOOR_CHANCE.powi(extra_index)) {
            break;
        }
        let pick = rng.range_usize(0, candidates.len());
        let (pos, direction) = candidates.swap_remove(pick);
        map.cell_mut(pos).expect("door positions lie on the room").set_door(direction, true);
        extra_index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expanded_rect_grows_in_every_direction() {
        let room = RoomRect::new(5, 5, 3, 4);
        let grown = room.expanded(1);
        assert_eq!((grown.x, grown.y), (4, 4));
        assert_eq!((grown.right(), grown.top()), (8, 9));
    }

    #[test]
    fn placed_rooms_never_touch_even_with_padding() {
        for seed in [7_u64, 42, 1_000] {
            let mut map = DungeonMap::new(20, 20);
            let mut rng = MapRng::from_seed(seed);
            let rooms = place_rooms(&mut map, 14, &mut rng);
            assert!(!rooms.is_empty(), "seed {seed} should place at least one room");
            for first_index in 0..rooms.len() {
                for second_index in (first_index + 1)..rooms.len() {
                    assert!(
                        !rooms[first_index].expanded(1).intersects(&rooms[second_index]),
                        "rooms must stay a cell apart: {:?} vs {:?}",
                        rooms[first_index],
                        rooms[second_index]
                    );
                }
            }
        }
    }

    #[test]
    fn rooms_keep_a_margin_from_the_map_edge() {
        let mut map = DungeonMap::new(20, 20);
        let mut rng = MapRng::from_seed(3);
        for room in place_rooms(&mut map, 14, &mut rng) {
            assert!(room.x >= 1 && room.y >= 1);
            assert!(room.right() <= 18 && room.top() <= 18);
        }
    }

    #[test]
    fn every_room_receives_at_least_one_door() {
        let mut map = DungeonMap::new(20, 20);
        let mut rng = MapRng::from_seed(11);
        let rooms = place_rooms(&mut map, 14, &mut rng);
        for room in &rooms {
            add_room_doors(&mut map, *room, &mut rng);
        }
        for room in &rooms {
            let door_count: usize = room
                .cells()
                .map(|pos| {
                    let cell = map.cell(pos).expect("room cell");
                    Direction::ALL.iter().filter(|&&d| cell.has_door(d)).count()
                })
                .sum();
            assert!(door_count >= 1, "room {room:?} has no door");
        }
    }

    #[test]
    fn doors_avoid_room_corners() {
        let room = RoomRect::new(2, 2, 3, 3);
        for (pos, _) in wall_interior_positions(room) {
            let corner = (pos.x == 2 || pos.x == 4) && (pos.y == 2 || pos.y == 4);
            assert!(!corner, "{pos:?} is a corner");
        }
    }

    #[test]
    fn generated_room_map_marks_floor_passable() {
        let mut rng = MapRng::from_seed(8);
        let map = generate(20, 20, &mut rng);
        let passable = map.cells().iter().filter(|cell| cell.is_passable()).count();
        assert!(passable > 0);
        for cell in map.cells() {
            if cell.is_passable() {
                assert!(!cell.is_empty());
            }
        }
    }
}
