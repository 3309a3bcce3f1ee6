//! Session construction from persisted settings
//!
//! A session is a populated engine plus the palette its tile kinds index into.
//! Initial population honours the authored layout; every later refill draws
//! from the same random stream the layout fell back to.

use tracing::info;

use crate::core::{Board, Palette, RandomTileFactory, Settings, DEFAULT_SEED};
use crate::engine::MatchEngine;
use crate::error::EngineError;
use crate::selection::SelectOutcome;
use crate::types::Coord;

#[derive(Debug, Clone)]
pub struct Session {
    engine: MatchEngine<RandomTileFactory>,
    palette: Palette,
    seed: u32,
}

impl Session {
    /// Build a session. `seed_override` wins over the seed stored in settings.
    ///
    /// Fails with `EmptyPalette` or `InvalidDimensions` when the settings
    /// cannot produce a playable board.
    pub fn from_settings(settings: &Settings, seed_override: Option<u32>) -> Result<Self, EngineError> {
        settings.validate()?;
        let palette = settings.palette()?;
        let seed = seed_override.or(settings.seed).unwrap_or(DEFAULT_SEED);

        let mut layout = settings.layout_factory(seed)?;
        let mut board = Board::new(settings.width, settings.height)?;
        let spawned = board.refill_empties(&mut layout);
        info!(
            width = settings.width,
            height = settings.height,
            seed,
            tiles = spawned.len(),
            forced = layout.forced_count(),
            layout_issues = layout.issues().len(),
            "session populated"
        );

        let mut engine = MatchEngine::new(board, layout.into_fallback());
        if let Some(passes) = settings.max_cascade_passes {
            engine = engine.with_max_cascade_passes(passes);
        }

        if settings.settle_on_start {
            let report = engine.resolve_cascade()?;
            info!(passes = report.passes, cleared = report.cleared, "settled initial board");
            // Startup clears are not player-visible turns
            engine.drain_events();
        }

        Ok(Self {
            engine,
            palette,
            seed,
        })
    }

    pub fn select(&mut self, c: Coord) -> Result<SelectOutcome, EngineError> {
        self.engine.select(c)
    }

    pub fn engine(&self) -> &MatchEngine<RandomTileFactory> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut MatchEngine<RandomTileFactory> {
        &mut self.engine
    }

    pub fn board(&self) -> &Board {
        self.engine.board()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Seed the session was built with
    pub fn seed(&self) -> u32 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CoreError;
    use crate::types::TileKind;

    #[test]
    fn test_default_settings_produce_full_board() {
        let session = Session::from_settings(&Settings::default(), Some(3)).unwrap();
        assert!(session.board().is_full());
        assert_eq!(session.board().width(), 8);
        assert_eq!(session.palette().len(), 5);
        assert_eq!(session.seed(), 3);
    }

    #[test]
    fn test_same_seed_same_board() {
        let a = Session::from_settings(&Settings::default(), Some(11)).unwrap();
        let b = Session::from_settings(&Settings::default(), Some(11)).unwrap();
        assert_eq!(a.board().kinds(), b.board().kinds());
    }

    #[test]
    fn test_layout_forces_cells() {
        let mut settings = Settings {
            width: 3,
            height: 3,
            ..Settings::default()
        };
        settings.init_layout();
        settings.set_layout_value(1, 2, 4).unwrap();
        let session = Session::from_settings(&settings, None).unwrap();
        assert_eq!(
            session.board().kind_at(Coord::new(1, 2)).unwrap(),
            Some(TileKind(4))
        );
    }

    #[test]
    fn test_empty_palette_is_fatal() {
        let settings = Settings {
            palette: Vec::new(),
            ..Settings::default()
        };
        let err = Session::from_settings(&settings, None).unwrap_err();
        assert!(matches!(err, EngineError::Core(CoreError::EmptyPalette)));
    }

    #[test]
    fn test_settle_on_start_leaves_stable_board() {
        let settings = Settings {
            settle_on_start: true,
            ..Settings::default()
        };
        for seed in 1..20 {
            let session = Session::from_settings(&settings, Some(seed)).unwrap();
            assert!(session.engine().is_stable(), "seed {} left runs", seed);
            assert!(session.engine().events().is_empty());
        }
    }
}
