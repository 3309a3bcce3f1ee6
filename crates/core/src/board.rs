//! Board module - authoritative tile grid
//!
//! The board is a `width x height` grid where each cell is empty or holds a [`Tile`].
//! Uses a flat vector (row-major, `y * width + x`) for cache locality.
//! Coordinates: x grows to the right, y grows upward; gravity pulls toward `y = 0`.
//!
//! The board knows nothing about selection or input. It answers axis-aligned
//! run queries and performs the mechanical parts of a cascade (swap, gravity,
//! refill) on behalf of the match engine.

use arrayvec::ArrayVec;

use crate::error::CoreError;
use crate::factory::TileFactory;
use crate::snapshot::BoardSnapshot;
use crate::types::{Axis, Coord, MatchRun, Spawn, Tile, TileId, TileKind, TileMove, MIN_RUN};

/// A board slot
pub type Cell = Option<Tile>;

/// The tile grid
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    width: u8,
    height: u8,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Cell>,
    /// Next identity handed to a materialized tile
    next_id: u32,
}

impl Board {
    /// Create an empty board. Both dimensions must be positive.
    pub fn new(width: u8, height: u8) -> Result<Self, CoreError> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
            next_id: 0,
        })
    }

    /// Create a board from explicit kinds, row-major (`x + y * width`).
    pub fn from_kinds(width: u8, height: u8, kinds: &[Option<TileKind>]) -> Result<Self, CoreError> {
        let mut board = Self::new(width, height)?;
        if kinds.len() != board.cells.len() {
            return Err(CoreError::ShapeMismatch {
                expected: board.cells.len(),
                actual: kinds.len(),
            });
        }
        for (idx, kind) in kinds.iter().enumerate() {
            if let Some(kind) = *kind {
                let c = board.coord_of(idx);
                board.materialize(c, kind);
            }
        }
        Ok(board)
    }

    /// Calculate flat index from coordinates
    #[inline(always)]
    fn index(&self, c: Coord) -> Option<usize> {
        if c.x < 0 || c.y < 0 || c.x >= i16::from(self.width) || c.y >= i16::from(self.height) {
            return None;
        }
        Some(c.y as usize * self.width as usize + c.x as usize)
    }

    #[inline(always)]
    fn coord_of(&self, idx: usize) -> Coord {
        let w = self.width as usize;
        Coord::new((idx % w) as i16, (idx / w) as i16)
    }

    fn checked_index(&self, c: Coord) -> Result<usize, CoreError> {
        self.index(c).ok_or(CoreError::OutOfBounds {
            x: c.x,
            y: c.y,
            width: self.width,
            height: self.height,
        })
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Number of cells on the board
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, c: Coord) -> bool {
        self.index(c).is_some()
    }

    /// Get the tile at `c`, `Ok(None)` for an empty cell
    pub fn get(&self, c: Coord) -> Result<Option<&Tile>, CoreError> {
        let idx = self.checked_index(c)?;
        Ok(self.cells[idx].as_ref())
    }

    /// Tile kind at `c`, `Ok(None)` for an empty cell
    pub fn kind_at(&self, c: Coord) -> Result<Option<TileKind>, CoreError> {
        Ok(self.get(c)?.map(|t| t.kind))
    }

    /// Overwrite the slot at `c`, returning the previous occupant.
    /// A stored tile has its position rewritten to `c`.
    pub fn set(&mut self, c: Coord, cell: Cell) -> Result<Cell, CoreError> {
        let idx = self.checked_index(c)?;
        let cell = cell.map(|mut t| {
            t.position = c;
            t
        });
        Ok(std::mem::replace(&mut self.cells[idx], cell))
    }

    /// Remove and return the tile at `c`
    pub fn take(&mut self, c: Coord) -> Result<Cell, CoreError> {
        self.set(c, None)
    }

    /// Materialize a fresh tile of `kind` at `c`, replacing whatever was there
    pub fn place(&mut self, c: Coord, kind: TileKind) -> Result<Tile, CoreError> {
        self.checked_index(c)?;
        Ok(self.materialize(c, kind))
    }

    fn materialize(&mut self, c: Coord, kind: TileKind) -> Tile {
        let tile = Tile {
            id: TileId(self.next_id),
            kind,
            position: c,
        };
        self.next_id = self.next_id.wrapping_add(1);
        if let Some(idx) = self.index(c) {
            self.cells[idx] = Some(tile);
        }
        tile
    }

    /// Exchange the contents of two cells. Adjacency is not checked here.
    /// Either cell may be empty; swapping a pair twice restores the board.
    pub fn swap(&mut self, a: Coord, b: Coord) -> Result<(), CoreError> {
        let ia = self.checked_index(a)?;
        let ib = self.checked_index(b)?;
        self.cells.swap(ia, ib);
        if let Some(t) = self.cells[ia].as_mut() {
            t.position = a;
        }
        if let Some(t) = self.cells[ib].as_mut() {
            t.position = b;
        }
        Ok(())
    }

    /// In-bounds orthogonal neighbours of `c` (left, right, down, up)
    pub fn neighbors(&self, c: Coord) -> ArrayVec<Coord, 4> {
        let mut out = ArrayVec::new();
        if !self.contains(c) {
            return out;
        }
        for (axis, delta) in [
            (Axis::Horizontal, -1),
            (Axis::Horizontal, 1),
            (Axis::Vertical, -1),
            (Axis::Vertical, 1),
        ] {
            let n = c.step(axis, delta);
            if self.contains(n) {
                out.push(n);
            }
        }
        out
    }

    /// Length of the contiguous same-kind span through `c` along `axis`.
    /// Returns 0 for an empty cell. Scanning stops at board edges, empties
    /// and the first tile of a different kind.
    pub fn run_length_at(&self, c: Coord, axis: Axis) -> Result<usize, CoreError> {
        let Some(kind) = self.kind_at(c)? else {
            return Ok(0);
        };

        let mut len = 1;
        for dir in [-1i16, 1] {
            let mut cur = c.step(axis, dir);
            while self.same_kind(cur, kind) {
                len += 1;
                cur = cur.step(axis, dir);
            }
        }
        Ok(len)
    }

    #[inline(always)]
    fn same_kind(&self, c: Coord, kind: TileKind) -> bool {
        self.index(c)
            .and_then(|idx| self.cells[idx])
            .is_some_and(|t| t.kind == kind)
    }

    /// Every maximal run of at least three equal-kind tiles.
    ///
    /// Rows are reported first, top (`y = height - 1`) to bottom and left to
    /// right within a row; then columns left to right and bottom to top within
    /// a column. A tile may appear in one horizontal and one vertical run.
    pub fn find_all_runs(&self) -> Vec<MatchRun> {
        let mut runs = Vec::new();
        for y in (0..i16::from(self.height)).rev() {
            self.scan_line(Coord::new(0, y), Axis::Horizontal, &mut runs);
        }
        for x in 0..i16::from(self.width) {
            self.scan_line(Coord::new(x, 0), Axis::Vertical, &mut runs);
        }
        runs
    }

    /// Whether any run exists on the board
    pub fn has_runs(&self) -> bool {
        !self.find_all_runs().is_empty()
    }

    fn scan_line(&self, origin: Coord, axis: Axis, out: &mut Vec<MatchRun>) {
        let line_len = match axis {
            Axis::Horizontal => i16::from(self.width),
            Axis::Vertical => i16::from(self.height),
        };

        let mut run_start = origin;
        let mut run_kind: Option<TileKind> = None;
        let mut run_len = 0usize;

        // One step past the end flushes the trailing run
        for i in 0..=line_len {
            let c = origin.step(axis, i);
            let kind = if i < line_len {
                self.index(c).and_then(|idx| self.cells[idx]).map(|t| t.kind)
            } else {
                None
            };

            if kind.is_some() && kind == run_kind {
                run_len += 1;
                continue;
            }

            if let Some(k) = run_kind {
                if run_len >= MIN_RUN {
                    out.push(MatchRun {
                        axis,
                        start: run_start,
                        len: run_len,
                        kind: k,
                    });
                }
            }

            run_start = c;
            run_kind = kind;
            run_len = 1;
        }
    }

    /// Compact every column toward `y = 0`, preserving the relative order of
    /// tiles and leaving empties at the top. Returns the tiles that moved.
    /// A second call without intervening changes moves nothing.
    pub fn apply_gravity(&mut self) -> Vec<TileMove> {
        let mut moves = Vec::new();
        let w = self.width as usize;

        for x in 0..self.width as usize {
            let mut write_y = 0usize;
            for read_y in 0..self.height as usize {
                let read_idx = read_y * w + x;
                let Some(mut tile) = self.cells[read_idx] else {
                    continue;
                };
                if read_y != write_y {
                    let to = Coord::new(x as i16, write_y as i16);
                    moves.push(TileMove {
                        id: tile.id,
                        from: tile.position,
                        to,
                    });
                    tile.position = to;
                    self.cells[write_y * w + x] = Some(tile);
                    self.cells[read_idx] = None;
                }
                write_y += 1;
            }
        }

        moves
    }

    /// Fill every empty cell with a tile whose kind the factory chooses.
    /// Cells are visited column by column, bottom to top.
    pub fn refill_empties<F: TileFactory + ?Sized>(&mut self, factory: &mut F) -> Vec<Spawn> {
        let mut spawned = Vec::new();
        for x in 0..i16::from(self.width) {
            for y in 0..i16::from(self.height) {
                let c = Coord::new(x, y);
                if self.same_slot_empty(c) {
                    let kind = factory.make(c);
                    let tile = self.materialize(c, kind);
                    spawned.push(Spawn {
                        id: tile.id,
                        at: c,
                        kind,
                    });
                }
            }
        }
        spawned
    }

    #[inline(always)]
    fn same_slot_empty(&self, c: Coord) -> bool {
        self.index(c).is_some_and(|idx| self.cells[idx].is_none())
    }

    /// Number of empty cells
    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    /// True when every cell holds a tile
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| c.is_some())
    }

    /// Tile kinds, row-major (`x + y * width`)
    pub fn kinds(&self) -> Vec<Option<TileKind>> {
        self.cells.iter().map(|c| c.map(|t| t.kind)).collect()
    }

    /// Tiles currently on the board
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.cells.iter().flatten()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            width: self.width,
            height: self.height,
            cells: self.kinds(),
        }
    }
}
