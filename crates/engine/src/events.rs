//! Notifications for presentation collaborators
//!
//! The engine records what happened during a selection so that a renderer can
//! animate it. Events are advisory: engine correctness never depends on anyone
//! consuming them.

use crate::types::{Coord, MatchRun, Spawn, TileMove};

/// Why a swap attempt was turned down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// The two cells are not orthogonal neighbours
    NotAdjacent,
    /// The swap would not create any run; it was reverted
    NoMatch,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::NotAdjacent => "not_adjacent",
            RejectReason::NoMatch => "no_match",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchEvent {
    HighlightOn(Coord),
    HighlightOff(Coord),
    SwapAccepted {
        a: Coord,
        b: Coord,
    },
    SwapRejected {
        a: Coord,
        b: Coord,
        reason: RejectReason,
    },
    /// Tiles destroyed in one cascade pass (each coordinate once)
    Cleared {
        pass: u32,
        runs: Vec<MatchRun>,
        coords: Vec<Coord>,
    },
    /// Gravity moves in one cascade pass
    Dropped { pass: u32, moves: Vec<TileMove> },
    /// Refilled tiles in one cascade pass
    Spawned { pass: u32, tiles: Vec<Spawn> },
    /// The cascade finished with a stable board
    Settled { passes: u32 },
}

impl MatchEvent {
    pub fn name(&self) -> &'static str {
        match self {
            MatchEvent::HighlightOn(_) => "highlight_on",
            MatchEvent::HighlightOff(_) => "highlight_off",
            MatchEvent::SwapAccepted { .. } => "swap_accepted",
            MatchEvent::SwapRejected { .. } => "swap_rejected",
            MatchEvent::Cleared { .. } => "cleared",
            MatchEvent::Dropped { .. } => "dropped",
            MatchEvent::Spawned { .. } => "spawned",
            MatchEvent::Settled { .. } => "settled",
        }
    }
}

/// Summary of one cascade resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub passes: u32,
    pub cleared: usize,
    pub dropped: usize,
    pub spawned: usize,
}
