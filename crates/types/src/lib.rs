//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (board storage, match engine, network adapter).
//!
//! # Coordinates
//!
//! The grid uses `(x, y)` coordinates:
//!
//! - **x**: column, growing to the right (`0..width`)
//! - **y**: row, growing upward (`0..height`)
//!
//! Gravity pulls tiles toward `y = 0`, so freshly cleared cells collect at the top
//! of each column and are refilled from there.
//!
//! # Defaults
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_WIDTH` | 8 | Columns in a default board |
//! | `DEFAULT_HEIGHT` | 8 | Rows in a default board |
//! | `MIN_RUN` | 3 | Shortest run that counts as a match |
//! | `LAYOUT_RANDOM` | -1 | Layout sentinel: let the factory choose |
//!
//! # Examples
//!
//! ```
//! use match3_types::{Axis, Coord, TileKind};
//!
//! let a = Coord::new(2, 3);
//! let b = Coord::new(2, 4);
//! assert!(a.is_adjacent(b));
//! assert!(!a.is_adjacent(Coord::new(3, 4)));
//!
//! // Step along an axis
//! assert_eq!(a.step(Axis::Horizontal, 1), Coord::new(3, 3));
//!
//! // Tile kinds compare by palette index
//! assert_eq!(TileKind(1), TileKind::new(1));
//! ```

use std::fmt;

/// Default board width in cells
pub const DEFAULT_WIDTH: u8 = 8;

/// Default board height in cells
pub const DEFAULT_HEIGHT: u8 = 8;

/// Minimum run length that counts as a match
pub const MIN_RUN: usize = 3;

/// Layout value meaning "let the tile factory choose randomly"
pub const LAYOUT_RANDOM: i32 = -1;

/// A grid coordinate.
///
/// Signed so that inbound coordinates from collaborators can be represented
/// (and rejected) even when they fall outside the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Coord {
    pub x: i16,
    pub y: i16,
}

impl Coord {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// Move `delta` cells along `axis`
    pub fn step(self, axis: Axis, delta: i16) -> Self {
        match axis {
            Axis::Horizontal => Self::new(self.x + delta, self.y),
            Axis::Vertical => Self::new(self.x, self.y + delta),
        }
    }

    /// Orthogonal (4-directional) adjacency. Diagonals are never adjacent.
    pub fn is_adjacent(self, other: Coord) -> bool {
        let dx = (i32::from(self.x) - i32::from(other.x)).abs();
        let dy = (i32::from(self.y) - i32::from(other.y)).abs();
        dx + dy == 1
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i16, i16)> for Coord {
    fn from((x, y): (i16, i16)) -> Self {
        Self::new(x, y)
    }
}

/// Scan axis for runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Along a row (varying x)
    Horizontal,
    /// Along a column (varying y)
    Vertical,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Horizontal => "horizontal",
            Axis::Vertical => "vertical",
        }
    }
}

/// Tile type used for matching.
///
/// The value is an index into the session palette. Two tiles match iff their
/// kinds are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKind(pub u8);

impl TileKind {
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Unique tile identity, assigned when a tile is materialized and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub u32);

/// A tile in play.
///
/// `position` always equals the board slot holding the tile; the board keeps
/// it in sync on every write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub id: TileId,
    pub kind: TileKind,
    pub position: Coord,
}

/// A maximal run of at least [`MIN_RUN`] equal-kind tiles along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchRun {
    pub axis: Axis,
    /// Lowest coordinate of the run (leftmost for rows, bottom for columns)
    pub start: Coord,
    pub len: usize,
    pub kind: TileKind,
}

impl MatchRun {
    /// Coordinates covered by the run, in ascending order along its axis
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.len as i16).map(move |i| self.start.step(self.axis, i))
    }

    pub fn contains(&self, c: Coord) -> bool {
        let end = self.start.step(self.axis, self.len as i16 - 1);
        match self.axis {
            Axis::Horizontal => c.y == self.start.y && c.x >= self.start.x && c.x <= end.x,
            Axis::Vertical => c.x == self.start.x && c.y >= self.start.y && c.y <= end.y,
        }
    }
}

/// A tile moved by gravity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileMove {
    pub id: TileId,
    pub from: Coord,
    pub to: Coord,
}

/// A tile materialized by refill (or initial population)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Spawn {
    pub id: TileId,
    pub at: Coord,
    pub kind: TileKind,
}
