//! Selection state for one interaction cycle

use crate::types::Coord;

/// `Idle -> One -> Two -> Idle`. `Two` only exists while a swap is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Selection {
    #[default]
    Idle,
    One(Coord),
    Two(Coord, Coord),
}

impl Selection {
    pub fn is_idle(&self) -> bool {
        matches!(self, Selection::Idle)
    }

    /// The first selected coordinate, if any
    pub fn first(&self) -> Option<Coord> {
        match *self {
            Selection::Idle => None,
            Selection::One(c) | Selection::Two(c, _) => Some(c),
        }
    }
}

/// Result of feeding one selected coordinate to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// First cell of a pair is now highlighted
    Selected(Coord),
    /// The already selected cell was selected again; nothing changed
    Unchanged,
    Rejected {
        a: Coord,
        b: Coord,
        reason: crate::events::RejectReason,
    },
    Accepted {
        a: Coord,
        b: Coord,
        passes: u32,
        cleared: usize,
    },
}

impl SelectOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectOutcome::Selected(_) => "selected",
            SelectOutcome::Unchanged => "unchanged",
            SelectOutcome::Rejected { .. } => "rejected",
            SelectOutcome::Accepted { .. } => "accepted",
        }
    }
}
