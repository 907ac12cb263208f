//! Random-walk generation: corridors grown out of a central anchor room by
//! turn-biased walks that branch at turn points, attach terminal rooms, and
//! back-patch door stubs until every placed door opens into carved space.

use crate::types::{Direction, Pos, Turn};

use super::generator::apply_border_walls;
use super::model::DungeonMap;
use super::rng::MapRng;
use super::rooms::{self, RoomRect, wall_interior_positions};

const MIN_WALK_STEPS: usize = 2;
const MAX_POSSIBLE_STEPS: usize = 16;
const INITIAL_CONTINUE_CHANCE: f64 = 0.75;
const TURN_CHANCE: f64 = 0.5;
const BRANCH_CHANCE: f64 = 0.5;
const MIN_END_ROOM_SIZE: i32 = 2;
const MAX_END_ROOM_SIZE: i32 = 4;
const ADDITIONAL_DOOR_CHANCE: f64 = 0.5;
const EDGE_DOOR_REDUCTION: f64 = 0.15;
const MIN_WALL_DISTANCE_FROM_EDGE: i32 = 3;
const MIN_DOOR_SPACING: i32 = 2;
const ANCHOR_ROOM_SIZE: i32 = 3;

/// A door whose far side has not been carved yet.
#[derive(Clone, Copy, Debug)]
struct DoorStub {
    pos: Pos,
    direction: Direction,
}

struct Walker<'a> {
    map: DungeonMap,
    rng: &'a mut MapRng,
    stubs: Vec<DoorStub>,
    anchor_center: Pos,
}

pub(super) fn generate(width: usize, height: usize, rng: &mut MapRng) -> DungeonMap {
    let anchor_center = Pos::new(width as i32 / 2, height as i32 / 2);
    let mut walker =
        Walker { map: DungeonMap::new(width, height), rng, stubs: Vec::new(), anchor_center };
    walker.place_anchor_room();
    walker.drain_stubs();
    walker.seal();
    walker.map
}

impl Walker<'_> {
    /// The 3x3 anchor room at map centre, with one door at the centre of
    /// each wall. All four doors start out as stubs.
    fn place_anchor_room(&mut self) {
        let center = self.anchor_center;
        let room = RoomRect::new(center.x - 1, center.y - 1, ANCHOR_ROOM_SIZE, ANCHOR_ROOM_SIZE);
        rooms::paint_rect_room(&mut self.map, room);
        for direction in Direction::ALL {
            let door_pos = center.step(direction);
            self.map
                .cell_mut(door_pos)
                .expect("the anchor room fits every legal map")
                .set_door(direction, true);
            self.stubs.push(DoorStub { pos: door_pos, direction });
        }
    }

    /// Drains the stub queue front-first. End rooms placed along the way
    /// push fresh stubs, so the loop runs until the map is closed.
    fn drain_stubs(&mut self) {
        while !self.stubs.is_empty() {
            let stub = self.stubs.remove(0);
            self.launch_from_stub(stub);
        }
    }

    fn launch_from_stub(&mut self, stub: DoorStub) {
        let stub_cell = self.map.cell(stub.pos).expect("stub cells are on the map");
        if !stub_cell.has_door(stub.direction) {
            return; // the door was evicted by a later entry door
        }
        let outside = stub.pos.step(stub.direction);
        if !self.map.in_inner_bounds(outside) {
            // A door that cannot open into the playfield is un-placed; the
            // wall it sat in stays.
            self.map
                .cell_mut(stub.pos)
                .expect("stub cells are on the map")
                .set_door(stub.direction, false);
            return;
        }
        if !self.map.is_empty_at(outside) {
            return; // another walk already carved the far side
        }
        self.carve(outside);
        self.run_walk(outside, stub.direction);
    }

    fn carve(&mut self, pos: Pos) {
        self.map.cell_mut(pos).expect("walks stay on the map").carve();
    }

    /// One corridor walk. Terminates by striking a wall (door or dead-end),
    /// running out of playfield, or electing to stop and place an end room;
    /// afterwards each recorded turn point may branch a fresh walk in the
    /// direction the original walk did not take.
    fn run_walk(&mut self, start: Pos, start_direction: Direction) {
        let mut pos = start;
        let mut direction = start_direction;
        let mut last_turn: Option<Turn> = None;
        let mut total_steps = 0_usize;
        let mut turn_points: Vec<(Pos, Direction)> = Vec::new();

        loop {
            let next = pos.step(direction);
            if !self.map.in_inner_bounds(next) {
                break; // dead-ends at the rim; the border pass walls it off
            }

            let next_cell = self.map.cell(next).expect("inner playfield is in bounds");
            if !next_cell.is_empty() {
                let facing = direction.opposite();
                if next_cell.has_wall(facing) {
                    if self.door_spacing_ok(next, facing) {
                        // Struck a room wall: cut a door through it.
                        self.map
                            .cell_mut(next)
                            .expect("in bounds")
                            .set_door(facing, true);
                        self.map.cell_mut(pos).expect("in bounds").set_door(direction, true);
                    } else {
                        self.map.cell_mut(pos).expect("in bounds").set_wall(direction, true);
                    }
                } else {
                    // Open carved cell in the way: treat it as a wall.
                    self.map.cell_mut(pos).expect("in bounds").set_wall(direction, true);
                    self.map.cell_mut(next).expect("in bounds").set_wall(facing, true);
                }
                break;
            }

            self.carve(next);
            pos = next;
            total_steps += 1;

            if total_steps >= MIN_WALK_STEPS {
                let progress = (total_steps - MIN_WALK_STEPS) as f64
                    / (MAX_POSSIBLE_STEPS - MIN_WALK_STEPS) as f64;
                let continue_chance = INITIAL_CONTINUE_CHANCE * (1.0 - progress);
                if self.rng.next_f64() > continue_chance {
                    self.place_end_room(pos, direction);
                    break;
                }
            }

            if self.rng.chance(TURN_CHANCE) {
                let turn = match last_turn {
                    Some(Turn::Left) => Turn::Right,
                    Some(Turn::Right) => Turn::Left,
                    None => {
                        if self.rng.coin() {
                            Turn::Left
                        } else {
                            Turn::Right
                        }
                    }
                };
                turn_points.push((pos, direction.turned(turn.opposite())));
                direction = direction.turned(turn);
                last_turn = Some(turn);
            }
        }

        for (branch_pos, branch_direction) in turn_points {
            if self.rng.chance(BRANCH_CHANCE) {
                self.run_walk(branch_pos, branch_direction);
            }
        }
    }

    /// Places a terminal room abutting the walk's final cell, shrinking the
    /// dimension parallel to the heading until it fits or gives up.
    fn place_end_room(&mut self, terminus: Pos, heading: Direction) {
        let mut room_width = self.rng.range_i32(MIN_END_ROOM_SIZE, MAX_END_ROOM_SIZE + 1);
        let mut room_height = self.rng.range_i32(MIN_END_ROOM_SIZE, MAX_END_ROOM_SIZE + 1);

        loop {
            let room = end_room_rect(terminus, heading, room_width, room_height);
            if self.room_fits(room) {
                rooms::paint_rect_room(&mut self.map, room);
                self.add_end_room_doors(room, heading.opposite());

                // The entry door evicts earlier doors that would crowd its
                // wall runs. The anchor room's four doors are never evicted;
                // an entry that would crowd one is dropped instead.
                let entry = terminus.step(heading);
                self.evict_conflicting_doors(entry, heading.opposite());
                self.evict_conflicting_doors(terminus, heading);
                if self.door_spacing_ok(entry, heading.opposite())
                    && self.door_spacing_ok(terminus, heading)
                {
                    self.map
                        .cell_mut(entry)
                        .expect("the room face abuts the terminus")
                        .set_door(heading.opposite(), true);
                    self.map.cell_mut(terminus).expect("in bounds").set_door(heading, true);
                }
                return;
            }

            if heading.is_horizontal() {
                room_width -= 1;
                if room_width < MIN_END_ROOM_SIZE {
                    break;
                }
            } else {
                room_height -= 1;
                if room_height < MIN_END_ROOM_SIZE {
                    break;
                }
            }
        }

        // No room fits: plain dead end.
        self.map.cell_mut(terminus).expect("in bounds").set_wall(heading, true);
    }

    fn room_fits(&self, room: RoomRect) -> bool {
        room.cells().all(|pos| self.map.in_inner_bounds(pos) && self.map.is_empty_at(pos))
    }

    /// Random doors on every wall except the entry wall. The chance drops
    /// near the map edge, and a door is skipped when another same-direction
    /// door sits within the spacing window along the wall line. Accepted
    /// doors become stubs for later walks to resolve.
    fn add_end_room_doors(&mut self, room: RoomRect, entry_wall: Direction) {
        let map_width = self.map.width() as i32;
        let map_height = self.map.height() as i32;
        for (pos, direction) in wall_interior_positions(room) {
            if direction == entry_wall {
                continue;
            }
            let edge_distance =
                pos.x.min(pos.y).min(map_width - 1 - pos.x).min(map_height - 1 - pos.y);
            let shortfall = (MIN_WALL_DISTANCE_FROM_EDGE - edge_distance).max(0);
            let penalty = f64::from(shortfall) * EDGE_DOOR_REDUCTION;
            let door_chance = (ADDITIONAL_DOOR_CHANCE - penalty).max(0.0);
            if !self.rng.chance(door_chance) {
                continue;
            }
            if !self.door_spacing_ok(pos, direction) {
                continue;
            }
            self.map.cell_mut(pos).expect("room cells are in bounds").set_door(direction, true);
            self.stubs.push(DoorStub { pos, direction });
        }
    }

    /// Clears any door facing `direction` within the spacing window of
    /// `pos` along the wall line, on both sides of its edge. The wall the
    /// door sat in stays.
    fn evict_conflicting_doors(&mut self, pos: Pos, direction: Direction) {
        let along =
            if direction.is_horizontal() { Direction::North } else { Direction::East };
        let (dx, dy) = along.offset();
        for offset in 1..=MIN_DOOR_SPACING * 2 {
            for sign in [1_i32, -1] {
                let probe = Pos::new(pos.x + dx * offset * sign, pos.y + dy * offset * sign);
                if probe == self.anchor_center.step(direction) {
                    continue; // the four anchor doors are never evicted
                }
                if self.map.cell(probe).is_some_and(|cell| cell.has_door(direction)) {
                    self.map.cell_mut(probe).expect("probe was read").set_door(direction, false);
                    if let Some(partner) = self.map.cell_mut(probe.step(direction)) {
                        partner.set_door(direction.opposite(), false);
                    }
                }
            }
        }
    }

    /// True when no door facing `direction` lies within
    /// `MIN_DOOR_SPACING * 2` cells of `pos` along the wall line.
    fn door_spacing_ok(&self, pos: Pos, direction: Direction) -> bool {
        let along =
            if direction.is_horizontal() { Direction::North } else { Direction::East };
        let (dx, dy) = along.offset();
        for offset in 1..=MIN_DOOR_SPACING * 2 {
            for sign in [1_i32, -1] {
                let probe = Pos::new(pos.x + dx * offset * sign, pos.y + dy * offset * sign);
                if self.map.cell(probe).is_some_and(|cell| cell.has_door(direction)) {
                    return false;
                }
            }
        }
        true
    }

    /// Final passes: wall every carved cell against empty space and the rim,
    /// then mirror wall and door flags across shared edges so both sides of
    /// every edge agree.
    fn seal(&mut self) {
        apply_border_walls(&mut self.map);
        self.mirror_shared_edges();
    }

    fn mirror_shared_edges(&mut self) {
        for y in 0..self.map.height() as i32 {
            for x in 0..self.map.width() as i32 {
                let pos = Pos::new(x, y);
                if self.map.is_empty_at(pos) {
                    continue;
                }
                for direction in [Direction::East, Direction::North] {
                    let neighbour = pos.step(direction);
                    if self.map.is_empty_at(neighbour) {
                        continue;
                    }
                    let opposite = direction.opposite();
                    let near = self.map.cell(pos).expect("in bounds");
                    let far = self.map.cell(neighbour).expect("in bounds");
                    let wall = near.has_wall(direction) || far.has_wall(opposite);
                    let door = near.has_door(direction) || far.has_door(opposite);
                    if wall {
                        self.map.cell_mut(pos).expect("in bounds").set_wall(direction, true);
                        self.map
                            .cell_mut(neighbour)
                            .expect("in bounds")
                            .set_wall(opposite, true);
                    }
                    if door {
                        self.map.cell_mut(pos).expect("in bounds").set_door(direction, true);
                        self.map
                            .cell_mut(neighbour)
                            .expect("in bounds")
                            .set_door(opposite, true);
                    }
                }
            }
        }
    }
}

/// The candidate footprint for an end room: its face opposite the heading
/// abuts the terminus, centred on the perpendicular axis.
fn end_room_rect(terminus: Pos, heading: Direction, room_width: i32, room_height: i32) -> RoomRect {
    match heading {
        Direction::East => RoomRect::new(
            terminus.x + 1,
            terminus.y - (room_height - 1) / 2,
            room_width,
            room_height,
        ),
        Direction::West => RoomRect::new(
            terminus.x - room_width,
            terminus.y - (room_height - 1) / 2,
            room_width,
            room_height,
        ),
        Direction::North => RoomRect::new(
            terminus.x - (room_width - 1) / 2,
            terminus.y + 1,
            room_width,
            room_height,
        ),
        Direction::South => RoomRect::new(
            terminus.x - (room_width - 1) / 2,
            terminus.y - room_height,
            room_width,
            room_height,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_for_test(seed: u64, width: usize, height: usize) -> DungeonMap {
        let mut rng = MapRng::from_seed(seed);
        generate(width, height, &mut rng)
    }

    #[test]
    fn anchor_room_sits_at_map_centre_with_four_doors() {
        let map = generate_for_test(123, 25, 25);
        for pos in RoomRect::new(11, 11, 3, 3).cells() {
            assert!(!map.cell(pos).expect("in bounds").is_empty(), "{pos:?} should be floor");
        }
        let door_sites = [
            (Pos::new(12, 13), Direction::North),
            (Pos::new(13, 12), Direction::East),
            (Pos::new(12, 11), Direction::South),
            (Pos::new(11, 12), Direction::West),
        ];
        for (pos, direction) in door_sites {
            let cell = map.cell(pos).expect("in bounds");
            assert!(cell.has_door(direction), "anchor door missing at {pos:?}");
            let outside = pos.step(direction);
            assert!(
                !map.cell(outside).expect("in bounds").is_empty(),
                "anchor door at {pos:?} opens into empty space"
            );
        }
    }

    #[test]
    fn every_door_opens_into_carved_space() {
        for seed in [99_u64, 123, 7_777] {
            let map = generate_for_test(seed, 25, 25);
            for y in 0..25_i32 {
                for x in 0..25_i32 {
                    let pos = Pos::new(x, y);
                    let cell = map.cell(pos).expect("in bounds");
                    for direction in Direction::ALL {
                        if cell.has_door(direction) {
                            assert!(
                                !map.is_empty_at(pos.step(direction)),
                                "seed {seed}: unresolved door stub at {pos:?} {direction:?}"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn end_room_rect_abuts_the_terminus() {
        let room = end_room_rect(Pos::new(10, 10), Direction::East, 3, 3);
        assert_eq!(room.x, 11, "west face is one step past the terminus");
        assert_eq!(room.y, 9, "centred across the heading");
        let room = end_room_rect(Pos::new(10, 10), Direction::South, 2, 4);
        assert_eq!(room.top(), 9);
        assert!(room.contains(Pos::new(10, 9)));
    }

    #[test]
    fn door_spacing_rejects_near_neighbours_on_the_same_wall_line() {
        let mut rng = MapRng::from_seed(1);
        let mut walker = Walker {
            map: DungeonMap::new(20, 20),
            rng: &mut rng,
            stubs: Vec::new(),
            anchor_center: Pos::new(10, 10),
        };
        let room = RoomRect::new(5, 5, 8, 3);
        rooms::paint_rect_room(&mut walker.map, room);
        walker.map.cell_mut(Pos::new(8, 7)).expect("in bounds").set_door(Direction::North, true);

        assert!(!walker.door_spacing_ok(Pos::new(9, 7), Direction::North));
        assert!(!walker.door_spacing_ok(Pos::new(12, 7), Direction::North));
        assert!(walker.door_spacing_ok(Pos::new(9, 7), Direction::South));
    }

    #[test]
    fn walls_and_doors_are_bilateral_after_sealing() {
        for seed in [5_u64, 99, 321] {
            let map = generate_for_test(seed, 30, 30);
            for y in 0..30_i32 {
                for x in 0..30_i32 {
                    let pos = Pos::new(x, y);
                    let cell = map.cell(pos).expect("in bounds");
                    if cell.is_empty() {
                        continue;
                    }
                    for direction in [Direction::East, Direction::North] {
                        let Some(far) = map.cell(pos.step(direction)) else { continue };
                        if far.is_empty() {
                            continue;
                        }
                        let opposite = direction.opposite();
                        assert_eq!(cell.has_wall(direction), far.has_wall(opposite));
                        assert_eq!(cell.has_door(direction), far.has_door(opposite));
                    }
                }
            }
        }
    }

    #[test]
    fn carved_cells_are_walled_against_empty_space() {
        let map = generate_for_test(42, 20, 20);
        for y in 0..20_i32 {
            for x in 0..20_i32 {
                let pos = Pos::new(x, y);
                let cell = map.cell(pos).expect("in bounds");
                if cell.is_empty() {
                    continue;
                }
                for direction in Direction::ALL {
                    if map.is_empty_at(pos.step(direction)) {
                        assert!(
                            cell.has_wall(direction),
                            "{pos:?} faces empty space without a wall to {direction:?}"
                        );
                    }
                }
            }
        }
    }
}
