//! Board coordinates and the static wall map.
//!
//! Origin is the top-left cell. `x` grows to the right, `y` grows
//! downwards, so [`Direction::Up`] moves towards row 0.

use crate::config::{
    BOARD_H,
    BOARD_W,
};

/// A board cell. Signed so a candidate one step off the edge is representable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cell {
    pub x: i16,
    pub y: i16,
}

impl Cell {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one step in `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Inside `[0, BOARD_W) × [0, BOARD_H)`.
    pub const fn on_board(self) -> bool {
        self.x >= 0 && self.x < BOARD_W && self.y >= 0 && self.y < BOARD_H
    }
}

/// Tank heading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    #[default]
    None,
    Up,
    Right,
    Left,
    Down,
}

impl Direction {
    pub const fn delta(self) -> (i16, i16) {
        match self {
            Self::None => (0, 0),
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Left => (-1, 0),
            Self::Down => (0, 1),
        }
    }
}

/// Outcome of checking a candidate cell against the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Verdict {
    Accepted,
    OutOfBounds,
    Wall,
}

/// Immutable wall grid, one bit per column per row (bit `x` set = wall).
pub struct Map {
    rows: [u32; BOARD_H as usize],
}

impl Map {
    /// Build a map from text rows, `#` marking a wall.
    ///
    /// Panics at compile time when used in a `const` and a row is the wrong width.
    pub const fn from_rows(text: [&str; BOARD_H as usize]) -> Self {
        let mut rows = [0u32; BOARD_H as usize];
        let mut y = 0;
        while y < text.len() {
            let bytes = text[y].as_bytes();
            assert!(bytes.len() == BOARD_W as usize, "map row has the wrong width");
            let mut x = 0;
            while x < bytes.len() {
                if bytes[x] == b'#' {
                    rows[y] |= 1 << x;
                }
                x += 1;
            }
            y += 1;
        }
        Self { rows }
    }

    /// Whether an on-board cell is a wall. Off-board cells report `false`.
    pub const fn is_wall(&self, cell: Cell) -> bool {
        if !cell.on_board() {
            return false;
        }
        self.rows[cell.y as usize] & (1 << cell.x) != 0
    }

    /// Bounds first, then walls.
    pub const fn check(&self, cell: Cell) -> Verdict {
        if !cell.on_board() {
            Verdict::OutOfBounds
        } else if self.is_wall(cell) {
            Verdict::Wall
        } else {
            Verdict::Accepted
        }
    }

    /// Every wall cell, row-major.
    pub fn walls(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..BOARD_H).flat_map(move |y| {
            (0..BOARD_W)
                .map(move |x| Cell::new(x, y))
                .filter(move |&cell| self.is_wall(cell))
        })
    }
}

/// The level layout.
pub static MAP: Map = Map::from_rows([
    "....................",
    ".##....#....#....##.",
    ".#.....#....#.....#.",
    "......##....##......",
    "....................",
    "..###..........###..",
    "....................",
    "....#....##....#....",
    "....#....##....#....",
    "....................",
    "..###..........###..",
    "....................",
    "......##....##......",
    ".#.....#....#.....#.",
    ".##....#....#....##.",
]);
