//! Match engine - selection, swap evaluation and cascade resolution
//!
//! This module ties the board to the player's intent. It owns the selection
//! state machine, validates and tentatively performs swaps, and runs the
//! clear -> gravity -> refill loop until the board is stable.
//!
//! Every call runs to completion before returning, so a cascade can never be
//! interleaved with a new selection. Callers that receive input concurrently
//! must queue it and feed the engine one coordinate at a time.

use std::collections::BTreeSet;

use tracing::{debug, error, info, instrument};

use crate::core::{Board, RandomTileFactory, TileFactory};
use crate::error::EngineError;
use crate::events::{CascadeReport, MatchEvent, RejectReason};
use crate::selection::{SelectOutcome, Selection};
use crate::types::Coord;

/// Lower bound for the default cascade pass cap
pub const MIN_CASCADE_CAP: u32 = 16;

/// Default cascade pass cap for a board of `area` cells
pub fn default_cascade_cap(area: usize) -> u32 {
    (area.min(u32::MAX as usize) as u32).max(MIN_CASCADE_CAP)
}

/// Outcome of a swap evaluation that passed the adjacency check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    Accepted(CascadeReport),
    /// No run resulted; the board was restored
    Rejected,
}

/// Running totals over the life of an engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub swaps_accepted: u64,
    pub swaps_rejected: u64,
    pub tiles_cleared: u64,
    pub last_cascade_passes: u32,
}

/// The match engine
#[derive(Debug, Clone)]
pub struct MatchEngine<F: TileFactory = RandomTileFactory> {
    board: Board,
    factory: F,
    selection: Selection,
    /// Notifications since the last drain (consumed by observers)
    events: Vec<MatchEvent>,
    max_cascade_passes: u32,
    stats: EngineStats,
}

impl<F: TileFactory> MatchEngine<F> {
    /// Wrap an existing board. `factory` is used for every refill.
    pub fn new(board: Board, factory: F) -> Self {
        let max_cascade_passes = default_cascade_cap(board.area());
        Self {
            board,
            factory,
            selection: Selection::Idle,
            events: Vec::new(),
            max_cascade_passes,
            stats: EngineStats::default(),
        }
    }

    /// Build a fully populated board using `factory` for both population and refill.
    /// Runs present after population are left in place.
    pub fn populate(width: u8, height: u8, mut factory: F) -> Result<Self, EngineError> {
        let mut board = Board::new(width, height)?;
        let spawned = board.refill_empties(&mut factory);
        debug!(width, height, tiles = spawned.len(), "populated board");
        Ok(Self::new(board, factory))
    }

    pub fn with_max_cascade_passes(mut self, passes: u32) -> Self {
        self.max_cascade_passes = passes.max(1);
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn max_cascade_passes(&self) -> u32 {
        self.max_cascade_passes
    }

    /// Pending notifications, oldest first
    pub fn events(&self) -> &[MatchEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.events)
    }

    /// True when the board has no runs
    pub fn is_stable(&self) -> bool {
        !self.board.has_runs()
    }

    /// Feed one selected coordinate into the state machine.
    ///
    /// - `Idle` + `c` highlights `c`.
    /// - `One(c)` + `c` is a no-op.
    /// - `One(a)` + `b` evaluates the swap and always returns to `Idle`.
    ///
    /// Out-of-bounds coordinates fail without touching board or selection.
    #[instrument(skip(self), fields(selection = ?self.selection))]
    pub fn select(&mut self, c: Coord) -> Result<SelectOutcome, EngineError> {
        self.board.get(c)?;

        let first = match self.selection {
            Selection::Idle | Selection::Two(..) => {
                self.selection = Selection::One(c);
                self.events.push(MatchEvent::HighlightOn(c));
                debug!(%c, "selected");
                return Ok(SelectOutcome::Selected(c));
            }
            Selection::One(first) if first == c => return Ok(SelectOutcome::Unchanged),
            Selection::One(first) => first,
        };

        self.selection = Selection::Two(first, c);
        self.events.push(MatchEvent::HighlightOn(c));

        let result = match self.try_swap(first, c) {
            Ok(SwapOutcome::Accepted(report)) => Ok(SelectOutcome::Accepted {
                a: first,
                b: c,
                passes: report.passes,
                cleared: report.cleared,
            }),
            Ok(SwapOutcome::Rejected) => Ok(SelectOutcome::Rejected {
                a: first,
                b: c,
                reason: RejectReason::NoMatch,
            }),
            Err(EngineError::NotAdjacent { a, b }) => Ok(SelectOutcome::Rejected {
                a,
                b,
                reason: RejectReason::NotAdjacent,
            }),
            Err(e) => Err(e),
        };

        self.events.push(MatchEvent::HighlightOff(first));
        self.events.push(MatchEvent::HighlightOff(c));
        self.selection = Selection::Idle;
        result
    }

    /// Evaluate a swap without the selection state machine.
    ///
    /// Non-adjacent pairs fail with [`EngineError::NotAdjacent`] and leave the
    /// board untouched. Otherwise the swap is applied tentatively and kept only
    /// if the board then contains any run, in which case the cascade runs.
    #[instrument(skip(self))]
    pub fn try_swap(&mut self, a: Coord, b: Coord) -> Result<SwapOutcome, EngineError> {
        self.board.get(a)?;
        self.board.get(b)?;

        if !a.is_adjacent(b) {
            self.reject(a, b, RejectReason::NotAdjacent);
            return Err(EngineError::NotAdjacent { a, b });
        }

        self.board.swap(a, b)?;
        if !self.board.has_runs() {
            // Swap is its own inverse
            self.board.swap(a, b)?;
            self.reject(a, b, RejectReason::NoMatch);
            return Ok(SwapOutcome::Rejected);
        }

        self.stats.swaps_accepted += 1;
        self.events.push(MatchEvent::SwapAccepted { a, b });
        info!(%a, %b, "swap accepted");

        let report = self.resolve_cascade()?;
        Ok(SwapOutcome::Accepted(report))
    }

    fn reject(&mut self, a: Coord, b: Coord, reason: RejectReason) {
        self.stats.swaps_rejected += 1;
        self.events.push(MatchEvent::SwapRejected { a, b, reason });
        debug!(%a, %b, reason = reason.as_str(), "swap rejected");
    }

    /// Clear runs, apply gravity and refill until no run remains.
    ///
    /// Each pass clears the union of all runs (a tile in both a row and a
    /// column run is cleared once). Fails with
    /// [`EngineError::CascadeLimitExceeded`] if runs remain after
    /// `max_cascade_passes` passes; the board is full at that point.
    #[instrument(skip(self))]
    pub fn resolve_cascade(&mut self) -> Result<CascadeReport, EngineError> {
        let mut report = CascadeReport::default();

        loop {
            let runs = self.board.find_all_runs();
            if runs.is_empty() {
                break;
            }

            if report.passes >= self.max_cascade_passes {
                error!(
                    passes = report.passes,
                    remaining_runs = runs.len(),
                    "cascade did not settle"
                );
                self.finish_cascade(&report);
                return Err(EngineError::CascadeLimitExceeded {
                    passes: report.passes,
                });
            }

            report.passes += 1;
            let pass = report.passes;

            let clear_set: BTreeSet<Coord> = runs.iter().flat_map(|r| r.coords()).collect();
            for &c in &clear_set {
                self.board.take(c)?;
            }

            let moves = self.board.apply_gravity();
            let spawned = self.board.refill_empties(&mut self.factory);

            debug!(
                pass,
                runs = runs.len(),
                cleared = clear_set.len(),
                dropped = moves.len(),
                spawned = spawned.len(),
                "cascade pass"
            );

            report.cleared += clear_set.len();
            report.dropped += moves.len();
            report.spawned += spawned.len();

            self.events.push(MatchEvent::Cleared {
                pass,
                runs,
                coords: clear_set.into_iter().collect(),
            });
            self.events.push(MatchEvent::Dropped { pass, moves });
            self.events.push(MatchEvent::Spawned {
                pass,
                tiles: spawned,
            });
        }

        self.finish_cascade(&report);
        if report.passes > 0 {
            self.events.push(MatchEvent::Settled {
                passes: report.passes,
            });
        }
        Ok(report)
    }

    fn finish_cascade(&mut self, report: &CascadeReport) {
        self.stats.tiles_cleared += report.cleared as u64;
        self.stats.last_cascade_passes = report.passes;
    }
}
