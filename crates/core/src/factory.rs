//! Tile factories - where new tiles get their kinds
//!
//! The board never chooses tile kinds itself. Initial population and refill
//! ask a [`TileFactory`], which is either uniform-random over a palette, driven
//! by an authored per-cell layout, or any closure (handy for scripted tests).

use tracing::warn;

use crate::error::CoreError;
use crate::rng::SimpleRng;
use crate::types::{Coord, TileKind, LAYOUT_RANDOM};

/// Chooses the kind of a tile materialized at a coordinate
pub trait TileFactory {
    fn make(&mut self, at: Coord) -> TileKind;
}

impl<F> TileFactory for F
where
    F: FnMut(Coord) -> TileKind,
{
    fn make(&mut self, at: Coord) -> TileKind {
        self(at)
    }
}

/// Ordered, non-empty list of tile type names. `TileKind(i)` names entry `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    names: Vec<String>,
}

impl Palette {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Result<Self, CoreError> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(CoreError::EmptyPalette);
        }
        if names.len() > usize::from(u8::MAX) + 1 {
            return Err(CoreError::PaletteTooLarge { len: names.len() });
        }
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, kind: TileKind) -> Option<&str> {
        self.names.get(kind.index()).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, kind: TileKind) -> bool {
        kind.index() < self.names.len()
    }

    /// Look a kind up by name (case-insensitive)
    pub fn kind_of(&self, name: &str) -> Option<TileKind> {
        self.names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .map(|i| TileKind(i as u8))
    }
}

/// Uniform random choice over `0..palette_len`
#[derive(Debug, Clone)]
pub struct RandomTileFactory {
    kinds: u32,
    rng: SimpleRng,
}

impl RandomTileFactory {
    pub fn new(palette_len: usize, seed: u32) -> Result<Self, CoreError> {
        if palette_len == 0 {
            return Err(CoreError::EmptyPalette);
        }
        if palette_len > usize::from(u8::MAX) + 1 {
            return Err(CoreError::PaletteTooLarge { len: palette_len });
        }
        Ok(Self {
            kinds: palette_len as u32,
            rng: SimpleRng::new(seed),
        })
    }

    pub fn palette_len(&self) -> usize {
        self.kinds as usize
    }
}

impl TileFactory for RandomTileFactory {
    fn make(&mut self, _at: Coord) -> TileKind {
        TileKind(self.rng.next_range(self.kinds) as u8)
    }
}

/// Authored per-cell override with random fallback.
///
/// Layout values are indexed `x + y * width`: [`LAYOUT_RANDOM`] lets the
/// fallback choose, `0..palette_len` forces that kind, anything else is
/// reported as [`CoreError::InvalidLayoutIndex`] and treated as random. A
/// layout whose length is not `width * height` is ignored entirely.
#[derive(Debug)]
pub struct LayoutTileFactory {
    width: u8,
    height: u8,
    forced: Vec<Option<TileKind>>,
    issues: Vec<CoreError>,
    fallback: RandomTileFactory,
}

impl LayoutTileFactory {
    pub fn new(
        width: u8,
        height: u8,
        layout: &[i32],
        fallback: RandomTileFactory,
    ) -> Self {
        let area = width as usize * height as usize;
        let palette_len = fallback.palette_len();
        let mut issues = Vec::new();

        let forced = if layout.len() != area {
            if !layout.is_empty() {
                warn!(
                    expected = area,
                    actual = layout.len(),
                    "layout length does not match board, populating randomly"
                );
            }
            vec![None; area]
        } else {
            layout
                .iter()
                .enumerate()
                .map(|(idx, &value)| {
                    if value == LAYOUT_RANDOM {
                        return None;
                    }
                    if value >= 0 && (value as usize) < palette_len {
                        return Some(TileKind(value as u8));
                    }
                    let err = CoreError::InvalidLayoutIndex {
                        x: (idx % width as usize) as i16,
                        y: (idx / width as usize) as i16,
                        value,
                        palette_len,
                    };
                    warn!(error = %err, "falling back to a random tile");
                    issues.push(err);
                    None
                })
                .collect()
        };

        Self {
            width,
            height,
            forced,
            issues,
            fallback,
        }
    }

    /// Layout entries that were rejected and replaced by random tiles
    pub fn issues(&self) -> &[CoreError] {
        &self.issues
    }

    /// Number of cells with a forced kind
    pub fn forced_count(&self) -> usize {
        self.forced.iter().filter(|f| f.is_some()).count()
    }

    /// Hand back the random fallback, continuing its stream
    pub fn into_fallback(self) -> RandomTileFactory {
        self.fallback
    }

    fn forced_at(&self, at: Coord) -> Option<TileKind> {
        if at.x < 0 || at.y < 0 || at.x >= i16::from(self.width) || at.y >= i16::from(self.height) {
            return None;
        }
        let idx = at.x as usize + at.y as usize * self.width as usize;
        self.forced.get(idx).copied().flatten()
    }
}

impl TileFactory for LayoutTileFactory {
    fn make(&mut self, at: Coord) -> TileKind {
        match self.forced_at(at) {
            Some(kind) => kind,
            None => self.fallback.make(at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_palette_rejected() {
        assert!(matches!(Palette::new(Vec::<String>::new()), Err(CoreError::EmptyPalette)));
        assert!(matches!(RandomTileFactory::new(0, 1), Err(CoreError::EmptyPalette)));
    }

    #[test]
    fn test_palette_lookup() {
        let palette = Palette::new(["red", "green", "blue"]).unwrap();
        assert_eq!(palette.len(), 3);
        assert_eq!(palette.name(TileKind(1)), Some("green"));
        assert_eq!(palette.kind_of("BLUE"), Some(TileKind(2)));
        assert!(!palette.contains(TileKind(3)));
    }

    #[test]
    fn test_random_factory_stays_in_palette() {
        let mut f = RandomTileFactory::new(4, 42).unwrap();
        for i in 0..200 {
            let kind = f.make(Coord::new(i % 8, i / 8));
            assert!(kind.index() < 4);
        }
    }

    #[test]
    fn test_random_factory_is_deterministic() {
        let mut a = RandomTileFactory::new(5, 3).unwrap();
        let mut b = RandomTileFactory::new(5, 3).unwrap();
        for _ in 0..50 {
            assert_eq!(a.make(Coord::default()), b.make(Coord::default()));
        }
    }

    #[test]
    fn test_layout_forces_kinds_and_reports_bad_indices() {
        let fallback = RandomTileFactory::new(3, 9).unwrap();
        // 2x2: (0,0)=2, (1,0)=random, (0,1)=7 (invalid), (1,1)=0
        let mut f = LayoutTileFactory::new(2, 2, &[2, -1, 7, 0], fallback);

        assert_eq!(f.forced_count(), 2);
        assert_eq!(f.issues().len(), 1);
        assert!(matches!(
            f.issues()[0],
            CoreError::InvalidLayoutIndex { x: 0, y: 1, value: 7, palette_len: 3 }
        ));

        assert_eq!(f.make(Coord::new(0, 0)), TileKind(2));
        assert_eq!(f.make(Coord::new(1, 1)), TileKind(0));
        assert!(f.make(Coord::new(0, 1)).index() < 3);
    }

    #[test]
    fn test_layout_length_mismatch_falls_back_to_random() {
        let fallback = RandomTileFactory::new(3, 9).unwrap();
        let f = LayoutTileFactory::new(3, 3, &[0, 0, 0], fallback);
        assert_eq!(f.forced_count(), 0);
        assert!(f.issues().is_empty());
    }

    #[test]
    fn test_closure_is_a_factory() {
        let mut calls = 0;
        let mut f = |_at: Coord| {
            calls += 1;
            TileKind(1)
        };
        assert_eq!(f.make(Coord::new(0, 0)), TileKind(1));
        assert_eq!(calls, 1);
    }
}
