//! Match engine - the swap/selection state machine and cascade loop
//!
//! The engine consumes "tile at (x, y) was selected" and turns pairs of
//! selections into accepted or rejected swaps. An accepted swap triggers
//! cascade resolution: clear every run, let tiles fall, refill, and repeat
//! until the board is stable.
//!
//! # Module Structure
//!
//! - [`engine`]: [`MatchEngine`] with selection, swap evaluation and cascade
//! - [`selection`]: selection state and per-selection outcomes
//! - [`events`]: notifications for presentation collaborators
//! - [`session`]: engine construction from persisted settings
//! - [`error`]: engine error taxonomy
//!
//! # Example
//!
//! ```
//! use match3_engine::{MatchEngine, SelectOutcome};
//! use match3_engine::core::Board;
//! use match3_engine::types::{Coord, TileKind};
//!
//! let a = Some(TileKind(0));
//! let b = Some(TileKind(1));
//! let board = Board::from_kinds(5, 1, &[a, a, b, a, b]).unwrap();
//!
//! // Refill with kinds that never line up
//! let mut next = 3u8;
//! let factory = move |_: Coord| {
//!     next = if next == 2 { 3 } else { 2 };
//!     TileKind(next)
//! };
//! let mut engine = MatchEngine::new(board, factory);
//!
//! engine.select(Coord::new(2, 0)).unwrap();
//! let outcome = engine.select(Coord::new(3, 0)).unwrap();
//! assert!(matches!(outcome, SelectOutcome::Accepted { cleared: 3, .. }));
//! assert!(engine.is_stable());
//! ```

pub mod engine;
pub mod error;
pub mod events;
pub mod selection;
pub mod session;

pub use match3_core as core;
pub use match3_types as types;

pub use engine::{default_cascade_cap, EngineStats, MatchEngine, SwapOutcome, MIN_CASCADE_CAP};
pub use error::EngineError;
pub use events::{CascadeReport, MatchEvent, RejectReason};
pub use selection::{SelectOutcome, Selection};
pub use session::Session;
