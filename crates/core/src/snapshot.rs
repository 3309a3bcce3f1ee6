//! Board snapshots for observers
//!
//! A snapshot is a detached copy of tile kinds that presentation or network
//! collaborators can read without borrowing the live board.

use std::hash::{Hash, Hasher};

use crate::types::{Coord, TileKind};

/// Stable 64-bit FNV-1a hasher for deterministic `state_hash`.
///
/// `DefaultHasher` output is not guaranteed stable across Rust versions/platforms.
#[derive(Debug, Clone)]
pub struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Default for Fnv1aHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoardSnapshot {
    pub width: u8,
    pub height: u8,
    /// Row-major (`x + y * width`)
    pub cells: Vec<Option<TileKind>>,
}

impl BoardSnapshot {
    pub fn kind_at(&self, c: Coord) -> Option<TileKind> {
        if c.x < 0 || c.y < 0 || c.x >= i16::from(self.width) || c.y >= i16::from(self.height) {
            return None;
        }
        self.cells[c.x as usize + c.y as usize * self.width as usize]
    }

    /// Rows bottom to top; `-1` marks an empty cell, otherwise the palette index
    pub fn rows(&self) -> Vec<Vec<i16>> {
        self.cells
            .chunks(self.width as usize)
            .map(|row| {
                row.iter()
                    .map(|c| c.map(|k| i16::from(k.0)).unwrap_or(-1))
                    .collect()
            })
            .collect()
    }

    pub fn state_hash(&self) -> u64 {
        let mut hasher = Fnv1aHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(cells: Vec<Option<TileKind>>) -> BoardSnapshot {
        BoardSnapshot {
            width: 2,
            height: 2,
            cells,
        }
    }

    #[test]
    fn test_hash_is_stable_and_content_sensitive() {
        let a = snapshot(vec![Some(TileKind(0)), None, Some(TileKind(1)), Some(TileKind(2))]);
        let b = a.clone();
        let c = snapshot(vec![Some(TileKind(0)), None, Some(TileKind(2)), Some(TileKind(1))]);
        assert_eq!(a.state_hash(), b.state_hash());
        assert_ne!(a.state_hash(), c.state_hash());
    }

    #[test]
    fn test_rows_mark_empties() {
        let s = snapshot(vec![Some(TileKind(3)), None, None, Some(TileKind(1))]);
        assert_eq!(s.rows(), vec![vec![3, -1], vec![-1, 1]]);
        assert_eq!(s.kind_at(Coord::new(1, 1)), Some(TileKind(1)));
        assert_eq!(s.kind_at(Coord::new(2, 0)), None);
    }
}
