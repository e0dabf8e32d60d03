//! Grid primitives: coordinates, movement directions, and bounds.
//!
//! The board is a square of side `D`. Cells are addressed by integer pairs
//! `(x, y)` with `0 <= x, y < D`; `x` grows to the right and `y` grows
//! downward, so "up" is `(0, -1)`.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Coord
// ---------------------------------------------------------------------------

/// A cell on the board.
///
/// Ordering is lexicographic on `(x, y)`, which gives every map keyed by
/// `Coord` a stable iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another cell. Saturates instead of
    /// overflowing for cells at opposite ends of the `i32` range.
    pub fn manhattan_distance(&self, other: &Coord) -> u32 {
        self.x
            .abs_diff(other.x)
            .saturating_add(self.y.abs_diff(other.y))
    }

    /// Whether `other` shares an edge with this cell.
    pub fn is_adjacent(&self, other: &Coord) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// The cell one step away in `dir`. May lie outside the board.
    pub fn offset(self, dir: Direction) -> Coord {
        let (dx, dy) = dir.offset();
        Coord::new(self.x + dx, self.y + dy)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Movement directions available to a mech.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Left,
    Down,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    /// Unit vector `(dx, dy)` for this direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Down => (0, 1),
            Direction::Right => (1, 0),
        }
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// Square board of side `side`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    side: u32,
}

impl Grid {
    /// Smallest board with four distinct corners.
    pub const MIN_SIDE: u32 = 2;
    /// Largest accepted board side. Keeps every coordinate inside `i32`.
    pub const MAX_SIDE: u32 = 1 << 15;

    pub fn new(side: u32) -> Self {
        Self { side }
    }

    pub fn side(&self) -> u32 {
        self.side
    }

    /// Largest valid coordinate on either axis (`side - 1`).
    pub fn max_index(&self) -> i32 {
        self.side as i32 - 1
    }

    /// Whether `c` lies on the board.
    pub fn contains(&self, c: Coord) -> bool {
        in_range(c, self.max_index())
    }

    /// The four corner cells: top-left, top-right, bottom-left, bottom-right.
    pub fn corners(&self) -> [Coord; 4] {
        let m = self.max_index();
        [
            Coord::new(0, 0),
            Coord::new(m, 0),
            Coord::new(0, m),
            Coord::new(m, m),
        ]
    }

    /// Result of stepping from `from` in `dir`. A step that would leave the
    /// board returns `None` and the caller stays put.
    pub fn step(&self, from: Coord, dir: Direction) -> Option<Coord> {
        let to = from.offset(dir);
        self.contains(to).then_some(to)
    }
}

/// Whether `c` lies in `0..=max` on both axes.
pub(crate) fn in_range(c: Coord, max: i32) -> bool {
    (0..=max).contains(&c.x) && (0..=max).contains(&c.y)
}
