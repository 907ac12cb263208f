//! ASCII rendering of dungeon maps.
//!
//! Every cell becomes a 3x2 character block: the top row carries the north
//! edge and its corner pieces, the bottom row carries the west edge, the
//! floor glyph and the east edge. South edges are painted into the row
//! below only where no southern neighbour will draw them itself, and the
//! canvas keeps one extra row so the map's bottom edge closes. Rows print
//! from high `y` to low `y`, so north is up on screen.

use std::error::Error;
use std::fmt;

use crate::mapgen::model::{Cell, DungeonMap};
use crate::types::{Direction, Pos};

const FLOOR: char = '·';
const WALL_HORIZONTAL: char = '─';
const WALL_VERTICAL: char = '│';
const DOOR_HORIZONTAL: char = '═';
const DOOR_VERTICAL: char = '║';
const CORNER_NW: char = '┌';
const CORNER_NE: char = '┐';
const CORNER_SW: char = '└';
const CORNER_SE: char = '┘';

const COLOR_WALL: &str = "\x1b[90m";
const COLOR_DOOR: &str = "\x1b[33m";
const COLOR_FLOOR: &str = "\x1b[97m";
const COLOR_RESET: &str = "\x1b[0m";

/// Renderer precondition failure: zero dimensions or a cell array that does
/// not match `width * height`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidMap {
    pub reason: String,
}

impl fmt::Display for InvalidMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid map: {}", self.reason)
    }
}

impl Error for InvalidMap {}

#[derive(Clone, Copy, Debug, Default)]
pub struct RenderOptions {
    /// Emit ANSI colour codes: dark-grey walls, yellow doors, white floors.
    pub color: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Paint {
    Blank,
    Floor,
    Wall,
    Door,
}

impl Paint {
    fn color(self) -> &'static str {
        match self {
            Paint::Blank => COLOR_RESET,
            Paint::Floor => COLOR_FLOOR,
            Paint::Wall => COLOR_WALL,
            Paint::Door => COLOR_DOOR,
        }
    }
}

/// Renders the map to a string, one canvas row per line.
pub fn render(map: &DungeonMap, options: RenderOptions) -> Result<String, InvalidMap> {
    validate(map)?;

    let columns = map.width() * 3;
    let rows = map.height() * 2 + 1;
    let mut canvas = vec![(' ', Paint::Blank); columns * rows];

    for y in 0..map.height() as i32 {
        for x in 0..map.width() as i32 {
            let pos = Pos::new(x, y);
            let cell = map.cell(pos).expect("iteration stays in bounds");
            if cell.is_empty() {
                continue;
            }
            paint_cell(map, pos, cell, &mut canvas, columns);
        }
    }

    let mut output = String::new();
    for row in 0..rows {
        if row > 0 {
            output.push('\n');
        }
        let mut current = Paint::Blank;
        for column in 0..columns {
            let (glyph, paint) = canvas[row * columns + column];
            if options.color && paint != current && glyph != ' ' {
                output.push_str(paint.color());
                current = paint;
            }
            output.push(glyph);
        }
        if options.color && current != Paint::Blank {
            output.push_str(COLOR_RESET);
        }
    }
    Ok(output)
}

fn validate(map: &DungeonMap) -> Result<(), InvalidMap> {
    if map.width() == 0 || map.height() == 0 {
        return Err(InvalidMap {
            reason: format!("dimensions {}x{} must be positive", map.width(), map.height()),
        });
    }
    let expected = map.width() * map.height();
    if map.cells().len() != expected {
        return Err(InvalidMap {
            reason: format!("expected {expected} cells, found {}", map.cells().len()),
        });
    }
    Ok(())
}

fn paint_cell(
    map: &DungeonMap,
    pos: Pos,
    cell: &Cell,
    canvas: &mut [(char, Paint)],
    columns: usize,
) {
    let base_row = (map.height() - 1 - pos.y as usize) * 2;
    let base_column = pos.x as usize * 3;
    let mut put = |row: usize, column: usize, glyph: char, paint: Paint| {
        if glyph != ' ' {
            canvas[row * columns + column] = (glyph, paint);
        }
    };

    let north = edge(cell, Direction::North);
    let east = edge(cell, Direction::East);
    let south = edge(cell, Direction::South);
    let west = edge(cell, Direction::West);

    // North edge row.
    put(base_row, base_column, corner(north.0, west.0, CORNER_NW), Paint::Wall);
    let (glyph, paint) = horizontal_edge(north);
    put(base_row, base_column + 1, glyph, paint);
    put(base_row, base_column + 2, corner(north.0, east.0, CORNER_NE), Paint::Wall);

    // Body row.
    let (glyph, paint) = vertical_edge(west);
    put(base_row + 1, base_column, glyph, paint);
    if cell.is_passable() {
        put(base_row + 1, base_column + 1, FLOOR, Paint::Floor);
    }
    let (glyph, paint) = vertical_edge(east);
    put(base_row + 1, base_column + 2, glyph, paint);

    // South edge row, only where no southern neighbour draws it as its own
    // north edge.
    if map.is_empty_at(pos.step(Direction::South)) {
        put(base_row + 2, base_column, corner(south.0, west.0, CORNER_SW), Paint::Wall);
        let (glyph, paint) = horizontal_edge(south);
        put(base_row + 2, base_column + 1, glyph, paint);
        put(base_row + 2, base_column + 2, corner(south.0, east.0, CORNER_SE), Paint::Wall);
    }
}

/// `(wall, door)` flags for one edge.
fn edge(cell: &Cell, direction: Direction) -> (bool, bool) {
    (cell.has_wall(direction), cell.has_door(direction))
}

fn corner(horizontal_wall: bool, vertical_wall: bool, both: char) -> char {
    match (horizontal_wall, vertical_wall) {
        (true, true) => both,
        (true, false) => WALL_HORIZONTAL,
        (false, true) => WALL_VERTICAL,
        (false, false) => ' ',
    }
}

fn horizontal_edge((wall, door): (bool, bool)) -> (char, Paint) {
    if door {
        (DOOR_HORIZONTAL, Paint::Door)
    } else if wall {
        (WALL_HORIZONTAL, Paint::Wall)
    } else {
        (' ', Paint::Blank)
    }
}

fn vertical_edge((wall, door): (bool, bool)) -> (char, Paint) {
    if door {
        (DOOR_VERTICAL, Paint::Door)
    } else if wall {
        (WALL_VERTICAL, Paint::Wall)
    } else {
        (' ', Paint::Blank)
    }
}
