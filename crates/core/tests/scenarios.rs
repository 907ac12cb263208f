//! Concrete acceptance scenarios pinned to fixed seeds.

use warren_core::render::{RenderOptions, render};
use warren_core::{Direction, DungeonMap, GeneratorKind, MapRequest, Pos, generate, wire};

fn passage_request(width: usize, height: usize, min: usize, max: usize, seed: u64) -> MapRequest {
    MapRequest {
        kind: GeneratorKind::Passage,
        width,
        height,
        min_rooms: min,
        max_rooms: max,
        seed: Some(seed),
    }
}

fn room_count(map: &DungeonMap) -> usize {
    map.metadata
        .get("rooms")
        .expect("room-bearing generators record their room count")
        .parse()
        .expect("room count is numeric")
}

fn flood_passable_from(map: &DungeonMap, start: Pos, seen: &mut [bool]) -> usize {
    let mut stack = vec![start];
    seen[(start.y as usize) * map.width() + (start.x as usize)] = true;
    let mut count = 0;
    while let Some(pos) = stack.pop() {
        count += 1;
        for direction in Direction::ALL {
            let next = pos.step(direction);
            if !map.in_bounds(next) {
                continue;
            }
            let slot = (next.y as usize) * map.width() + (next.x as usize);
            if seen[slot] || !map.cell(next).expect("in bounds").is_passable() {
                continue;
            }
            seen[slot] = true;
            stack.push(next);
        }
    }
    count
}

/// Passable regions of a map with no corridors are exactly its rooms.
fn isolated_regions(map: &DungeonMap) -> Vec<(Pos, Pos)> {
    let mut seen = vec![false; map.width() * map.height()];
    let mut regions = Vec::new();
    for y in 0..map.height() as i32 {
        for x in 0..map.width() as i32 {
            let pos = Pos::new(x, y);
            let slot = (y as usize) * map.width() + (x as usize);
            if seen[slot] || !map.cell(pos).expect("in bounds").is_passable() {
                continue;
            }
            let before: Vec<bool> = seen.clone();
            flood_passable_from(map, pos, &mut seen);
            let mut low = pos;
            let mut high = pos;
            for (changed_slot, _) in
                seen.iter().enumerate().filter(|&(slot, &now)| now && !before[slot])
            {
                let cell_pos = Pos::new(
                    (changed_slot % map.width()) as i32,
                    (changed_slot / map.width()) as i32,
                );
                low = Pos::new(low.x.min(cell_pos.x), low.y.min(cell_pos.y));
                high = Pos::new(high.x.max(cell_pos.x), high.y.max(cell_pos.y));
            }
            regions.push((low, high));
        }
    }
    regions
}

#[test]
fn s1_passage_30x30_connects_at_least_five_rooms() {
    let map = generate(&passage_request(30, 30, 5, 8, 42)).expect("S1 request is valid");
    assert!(room_count(&map) >= 5, "expected at least five rooms, got {}", room_count(&map));

    let total = map.cells().iter().filter(|cell| cell.is_passable()).count();
    let start = (0..(30 * 30) as i32)
        .map(|slot| Pos::new(slot % 30, slot / 30))
        .find(|&pos| map.cell(pos).expect("in bounds").is_passable())
        .expect("the map has floor");
    let mut seen = vec![false; 30 * 30];
    assert_eq!(
        flood_passable_from(&map, start, &mut seen),
        total,
        "every room must be reachable from every other"
    );
}

#[test]
fn s2_room_20x20_packs_padded_disjoint_rooms_with_doors() {
    let request = MapRequest {
        kind: GeneratorKind::RoomBased,
        width: 20,
        height: 20,
        seed: Some(7),
        ..MapRequest::default()
    };
    let map = generate(&request).expect("S2 request is valid");
    let regions = isolated_regions(&map);
    assert_eq!(regions.len(), room_count(&map));

    for (first_index, &(a_low, a_high)) in regions.iter().enumerate() {
        for &(b_low, b_high) in &regions[first_index + 1..] {
            // Padding one AABB by a cell must still leave the pair disjoint.
            let disjoint = a_high.x + 1 < b_low.x
                || b_high.x + 1 < a_low.x
                || a_high.y + 1 < b_low.y
                || b_high.y + 1 < a_low.y;
            assert!(
                disjoint,
                "rooms {a_low:?}..{a_high:?} and {b_low:?}..{b_high:?} are too close"
            );
        }
    }

    for &(low, high) in &regions {
        let mut doors = 0;
        for y in low.y..=high.y {
            for x in low.x..=high.x {
                let cell = map.cell(Pos::new(x, y)).expect("in bounds");
                doors += Direction::ALL.iter().filter(|&&d| cell.has_door(d)).count();
            }
        }
        assert!(doors >= 1, "room {low:?}..{high:?} has no door");
    }
}

#[test]
fn s3_walk_25x25_anchors_a_three_by_three_room_at_centre() {
    let request = MapRequest {
        kind: GeneratorKind::RandomWalk,
        width: 25,
        height: 25,
        seed: Some(123),
        ..MapRequest::default()
    };
    let map = generate(&request).expect("S3 request is valid");

    for y in 11..=13 {
        for x in 11..=13 {
            assert!(
                map.cell(Pos::new(x, y)).expect("in bounds").is_passable(),
                "anchor floor missing at ({x}, {y})"
            );
        }
    }

    let door_sites = [
        (Pos::new(12, 13), Direction::North),
        (Pos::new(13, 12), Direction::East),
        (Pos::new(12, 11), Direction::South),
        (Pos::new(11, 12), Direction::West),
    ];
    for (pos, direction) in door_sites {
        assert!(
            map.cell(pos).expect("in bounds").has_door(direction),
            "initial door missing at {pos:?}"
        );
        let outside = pos.step(direction);
        assert!(
            map.cell(outside).expect("in bounds").is_passable(),
            "initial door at {pos:?} does not open into a corridor"
        );
    }
}

#[test]
fn s4_walk_25x25_seed_123_is_byte_equal_across_runs() {
    let request = MapRequest {
        kind: GeneratorKind::RandomWalk,
        width: 25,
        height: 25,
        seed: Some(123),
        ..MapRequest::default()
    };
    let first = wire::to_json(&generate(&request).expect("valid")).expect("serialisable");
    let second = wire::to_json(&generate(&request).expect("valid")).expect("serialisable");
    assert_eq!(first, second);
}

#[test]
fn s5_cramped_passage_request_still_completes() {
    let map = generate(&passage_request(10, 10, 5, 5, 1)).expect("S5 must not error");
    assert_eq!(map.cells().len(), 100);
}

#[test]
fn s6_rendered_walk_map_shows_one_floor_glyph_per_passable_cell() {
    let request = MapRequest {
        kind: GeneratorKind::RandomWalk,
        width: 12,
        height: 12,
        seed: Some(99),
        ..MapRequest::default()
    };
    let map = generate(&request).expect("S6 request is valid");
    let rendered = render(&map, RenderOptions::default()).expect("generated maps render");
    let floor_glyphs = rendered.chars().filter(|&glyph| glyph == '·').count();
    let passable = map.cells().iter().filter(|cell| cell.is_passable()).count();
    assert_eq!(floor_glyphs, passable);
    assert!(passable > 9, "the anchor room alone guarantees nine passable cells");
}
