//! Passage generation: sampled rectangular and circular rooms joined into
//! one component by straight, T- and X-shaped corridors, followed by a wall
//! normalisation pass that restores bilateral consistency.

use std::collections::BTreeSet;

use crate::types::{Direction, Pos};

use super::generator::apply_border_walls;
use super::model::DungeonMap;
use super::rng::MapRng;
use super::rooms::{self, RoomRect};

const MAX_SAMPLE_ATTEMPTS: usize = 200;
const ROOM_BUFFER: i32 = 2;
const MIN_RECT_SIDE: i32 = 3;
const MAX_RECT_SIDE: i32 = 8;
const MIN_CIRCLE_RADIUS: i32 = 2;
const MAX_CIRCLE_RADIUS: i32 = 4;
const MIN_STUB_LENGTH: i32 = 3;
const MAX_STUB_LENGTH: i32 = 6;

#[derive(Clone, Copy, Debug)]
enum RoomShape {
    Rect(RoomRect),
    Circle { center: Pos, radius: i32 },
}

#[derive(Clone, Copy, Debug)]
struct PassageRoom {
    shape: RoomShape,
    bounds: RoomRect,
}

impl PassageRoom {
    fn center(&self) -> Pos {
        match self.shape {
            RoomShape::Rect(rect) => rect.center(),
            RoomShape::Circle { center, .. } => center,
        }
    }
}

/// Which room, if any, owns each grid cell. Lets corridor carving tell room
/// perimeters apart from its own transient walls.
struct RoomIndex {
    width: usize,
    height: usize,
    cells: Vec<Option<usize>>,
}

impl RoomIndex {
    fn new(width: usize, height: usize) -> Self {
        Self { width, height, cells: vec![None; width * height] }
    }

    fn get(&self, pos: Pos) -> Option<usize> {
        if pos.x < 0
            || pos.y < 0
            || pos.x as usize >= self.width
            || pos.y as usize >= self.height
        {
            return None;
        }
        self.cells[(pos.y as usize) * self.width + (pos.x as usize)]
    }

    fn set(&mut self, pos: Pos, room: usize) {
        let index = (pos.y as usize) * self.width + (pos.x as usize);
        self.cells[index] = Some(room);
    }
}

pub(super) fn generate(
    width: usize,
    height: usize,
    min_rooms: usize,
    max_rooms: usize,
    rng: &mut MapRng,
) -> DungeonMap {
    let mut map = DungeonMap::new(width, height);
    let mut index = RoomIndex::new(width, height);

    let target = rng.range_usize(min_rooms, max_rooms + 1);
    let placed = place_rooms(&mut map, &mut index, target, rng);
    connect_rooms(&mut map, &index, &placed, rng);
    normalize_walls(&mut map, &index);
    apply_border_walls(&mut map);

    map.metadata.insert("rooms".to_string(), placed.len().to_string());
    map
}

fn place_rooms(
    map: &mut DungeonMap,
    index: &mut RoomIndex,
    target: usize,
    rng: &mut MapRng,
) -> Vec<PassageRoom> {
    let width = map.width() as i32;
    let height = map.height() as i32;
    let mut placed: Vec<PassageRoom> = Vec::new();

    for _ in 0..MAX_SAMPLE_ATTEMPTS {
        if placed.len() >= target {
            break;
        }
        let candidate = if rng.coin() {
            sample_rect_room(width, height, rng)
        } else {
            sample_circle_room(width, height, rng)
        };
        let inflated = candidate.bounds.expanded(ROOM_BUFFER);
        if placed.iter().any(|room| room.bounds.expanded(ROOM_BUFFER).intersects(&inflated)) {
            continue;
        }
        carve_room(map, index, placed.len(), &candidate);
        placed.push(candidate);
    }

    placed
}

fn sample_rect_room(width: i32, height: i32, rng: &mut MapRng) -> PassageRoom {
    let widest = MAX_RECT_SIDE.min(width / 3);
    let tallest = MAX_RECT_SIDE.min(height / 3);
    let room_width = rng.range_i32(MIN_RECT_SIDE, widest + 1);
    let room_height = rng.range_i32(MIN_RECT_SIDE, tallest + 1);
    let x = rng.range_i32(1, width - room_width);
    let y = rng.range_i32(1, height - room_height);
    let rect = RoomRect::new(x, y, room_width, room_height);
    PassageRoom { shape: RoomShape::Rect(rect), bounds: rect }
}

fn sample_circle_room(width: i32, height: i32, rng: &mut MapRng) -> PassageRoom {
    let cap = (width.min(height) / 6).clamp(MIN_CIRCLE_RADIUS, MAX_CIRCLE_RADIUS);
    let radius = rng.range_i32(MIN_CIRCLE_RADIUS, cap + 1);
    let center = Pos::new(
        rng.range_i32(1 + radius, width - 1 - radius),
        rng.range_i32(1 + radius, height - 1 - radius),
    );
    let side = radius * 2 + 1;
    let bounds = RoomRect::new(center.x - radius, center.y - radius, side, side);
    PassageRoom { shape: RoomShape::Circle { center, radius }, bounds }
}

fn in_circle(pos: Pos, center: Pos, radius: i32) -> bool {
    pos.distance_squared(center) <= i64::from(radius) * i64::from(radius)
}

fn carve_room(map: &mut DungeonMap, index: &mut RoomIndex, room_id: usize, room: &PassageRoom) {
    match room.shape {
        RoomShape::Rect(rect) => {
            rooms::paint_rect_room(map, rect);
            for pos in rect.cells() {
                index.set(pos, room_id);
            }
        }
        RoomShape::Circle { center, radius } => {
            for pos in room.bounds.cells() {
                if !in_circle(pos, center, radius) {
                    continue;
                }
                map.cell_mut(pos).expect("circle cells are sampled in bounds").carve();
                index.set(pos, room_id);
            }
            // Edge cells wall the sides that have no same-room neighbour.
            for pos in room.bounds.cells() {
                if !in_circle(pos, center, radius) {
                    continue;
                }
                for direction in Direction::ALL {
                    if !in_circle(pos.step(direction), center, radius) {
                        map.cell_mut(pos)
                            .expect("circle cells are sampled in bounds")
                            .set_wall(direction, true);
                    }
                }
            }
        }
    }
}

fn ordered_pair(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Spanning phase then extra loops: every room joins the connected set via
/// its nearest already-connected peer, after which a few more passages are
/// added between rooms that are not yet directly linked.
fn connect_rooms(
    map: &mut DungeonMap,
    index: &RoomIndex,
    placed: &[PassageRoom],
    rng: &mut MapRng,
) {
    if placed.len() < 2 {
        return;
    }

    let mut linked: BTreeSet<(usize, usize)> = BTreeSet::new();
    let start = rng.range_usize(0, placed.len());
    let mut connected = vec![start];
    let mut pending: Vec<usize> = (0..placed.len()).filter(|&room| room != start).collect();

    while !pending.is_empty() {
        let pick = rng.range_usize(0, pending.len());
        let room = pending.remove(pick);
        let nearest = connected
            .iter()
            .copied()
            .min_by_key(|&other| {
                (placed[room].center().distance_squared(placed[other].center()), other)
            })
            .expect("connected set is never empty");
        carve_passage(map, index, placed[room].center(), placed[nearest].center(), rng);
        linked.insert(ordered_pair(room, nearest));
        connected.push(room);
    }

    let extra_limit = (placed.len() / 2).max(2);
    let extra_count = rng.range_usize(1, extra_limit + 1);
    for _ in 0..extra_count {
        let room = rng.range_usize(0, placed.len());
        let candidate = (0..placed.len())
            .filter(|&other| other != room && !linked.contains(&ordered_pair(room, other)))
            .min_by_key(|&other| {
                (placed[room].center().distance_squared(placed[other].center()), other)
            });
        let Some(other) = candidate else {
            continue;
        };
        carve_passage(map, index, placed[room].center(), placed[other].center(), rng);
        linked.insert(ordered_pair(room, other));
    }
}

/// Carves one passage between two room centres: the L-shaped trunk, then for
/// T and X shapes one or two perpendicular stubs hung off the trunk's
/// midpoint cell.
fn carve_passage(map: &mut DungeonMap, index: &RoomIndex, from: Pos, to: Pos, rng: &mut MapRng) {
    let path = l_path(from, to);
    carve_path(map, index, &path);

    let shape = rng.range_i32(0, 3);
    if shape == 0 {
        return;
    }
    let mid = path[path.len() / 2];
    let (one_side, other_side) = if rng.coin() {
        (Direction::North, Direction::South)
    } else {
        (Direction::East, Direction::West)
    };
    if shape == 1 {
        let side = if rng.coin() { one_side } else { other_side };
        let length = rng.range_i32(MIN_STUB_LENGTH, MAX_STUB_LENGTH + 1);
        carve_stub(map, index, mid, side, length);
    } else {
        let length = rng.range_i32(MIN_STUB_LENGTH, MAX_STUB_LENGTH + 1);
        carve_stub(map, index, mid, one_side, length);
        let length = rng.range_i32(MIN_STUB_LENGTH, MAX_STUB_LENGTH + 1);
        carve_stub(map, index, mid, other_side, length);
    }
}

/// The straight corridor: horizontal at the start's latitude, then vertical
/// at the destination's longitude.
fn l_path(from: Pos, to: Pos) -> Vec<Pos> {
    let mut path = vec![from];
    let step_x = if to.x >= from.x { 1 } else { -1 };
    let mut x = from.x;
    while x != to.x {
        x += step_x;
        path.push(Pos::new(x, from.y));
    }
    let step_y = if to.y >= from.y { 1 } else { -1 };
    let mut y = from.y;
    while y != to.y {
        y += step_y;
        path.push(Pos::new(to.x, y));
    }
    path
}

fn carve_path(map: &mut DungeonMap, index: &RoomIndex, path: &[Pos]) {
    for window in path.windows(2) {
        carve_step(map, index, window[0], window[1]);
    }
}

fn carve_stub(
    map: &mut DungeonMap,
    index: &RoomIndex,
    from: Pos,
    direction: Direction,
    length: i32,
) {
    let mut prev = from;
    for _ in 0..length {
        let cur = prev.step(direction);
        if !map.in_inner_bounds(cur) {
            break;
        }
        carve_step(map, index, prev, cur);
        prev = cur;
    }
}

/// Advances the corridor one cell and resolves the edge it crossed: a room
/// perimeter wall gains a door on both sides, any other wall on the shared
/// edge is stale and is cleared.
fn carve_step(map: &mut DungeonMap, index: &RoomIndex, prev: Pos, cur: Pos) {
    let direction = direction_between(prev, cur);
    if map.is_empty_at(cur) {
        carve_corridor_cell(map, cur);
    }

    let prev_room = index.get(prev);
    let cur_room = index.get(cur);
    if prev_room.is_some() && prev_room != cur_room {
        // Leaving a room through its perimeter.
        if map.cell(prev).expect("path stays on the map").has_wall(direction) {
            map.cell_mut(prev).expect("path stays on the map").set_door(direction, true);
            map.cell_mut(cur).expect("path stays on the map").set_door(direction.opposite(), true);
        }
    } else if cur_room.is_some() && cur_room != prev_room {
        // Entering a room through its perimeter.
        if map.cell(cur).expect("path stays on the map").has_wall(direction.opposite()) {
            map.cell_mut(cur).expect("path stays on the map").set_door(direction.opposite(), true);
            map.cell_mut(prev).expect("path stays on the map").set_door(direction, true);
        }
    } else {
        // Corridor to corridor (or within one room): the shared edge is open.
        map.cell_mut(prev).expect("path stays on the map").set_wall(direction, false);
        map.cell_mut(cur).expect("path stays on the map").set_wall(direction.opposite(), false);
    }
}

/// Marks a corridor cell and walls it against whichever neighbours are empty
/// right now; later carving beside it leaves a stale wall for the
/// normalisation pass to clear.
fn carve_corridor_cell(map: &mut DungeonMap, pos: Pos) {
    let mut empty_sides = [false; 4];
    for (slot, direction) in Direction::ALL.iter().enumerate() {
        empty_sides[slot] = map.is_empty_at(pos.step(*direction));
    }
    let cell = map.cell_mut(pos).expect("corridor cells stay on the map");
    cell.carve();
    for (slot, direction) in Direction::ALL.iter().enumerate() {
        if empty_sides[slot] {
            cell.set_wall(*direction, true);
        }
    }
}

fn direction_between(from: Pos, to: Pos) -> Direction {
    match (to.x - from.x, to.y - from.y) {
        (1, 0) => Direction::East,
        (-1, 0) => Direction::West,
        (0, 1) => Direction::North,
        (0, -1) => Direction::South,
        _ => unreachable!("path cells are orthogonally adjacent"),
    }
}

/// Restores bilateral wall consistency over every adjacent non-empty pair:
/// room-perimeter edges keep mutual walls (and mutual doors where a passage
/// cut one), all other shared edges are opened.
fn normalize_walls(map: &mut DungeonMap, index: &RoomIndex) {
    for y in 0..map.height() as i32 {
        for x in 0..map.width() as i32 {
            let pos = Pos::new(x, y);
            if map.is_empty_at(pos) {
                continue;
            }
            for direction in [Direction::East, Direction::North] {
                let neighbour = pos.step(direction);
                if map.is_empty_at(neighbour) {
                    continue;
                }
                let opposite = direction.opposite();
                let perimeter = index.get(pos) != index.get(neighbour);
                if perimeter {
                    let door = map.cell(pos).expect("in bounds").has_door(direction)
                        || map.cell(neighbour).expect("in bounds").has_door(opposite);
                    map.cell_mut(pos).expect("in bounds").set_wall(direction, true);
                    map.cell_mut(neighbour).expect("in bounds").set_wall(opposite, true);
                    if door {
                        map.cell_mut(pos).expect("in bounds").set_door(direction, true);
                        map.cell_mut(neighbour).expect("in bounds").set_door(opposite, true);
                    }
                } else {
                    map.cell_mut(pos).expect("in bounds").set_wall(direction, false);
                    map.cell_mut(neighbour).expect("in bounds").set_wall(opposite, false);
                }
            }
        }
    }
}
