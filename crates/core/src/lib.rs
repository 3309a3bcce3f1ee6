//! Core board module - pure, deterministic, and testable
//!
//! This crate owns the tile grid and everything that decides what a tile is.
//! It has **no knowledge** of selection, input, or presentation, making it:
//!
//! - **Deterministic**: Same seed produces identical boards and refills
//! - **Testable**: Tile factories can be plain closures
//! - **Portable**: Runs headless, behind a network adapter, or in a benchmark
//!
//! # Module Structure
//!
//! - [`board`]: `width x height` grid with run detection, gravity and refill
//! - [`factory`]: tile factories (random, layout-driven, closure) and the palette
//! - [`rng`]: small LCG for reproducible tile selection
//! - [`settings`]: persisted dimensions, palette and authored layout
//! - [`snapshot`]: detached board copies with a stable hash
//! - [`error`]: core error taxonomy
//!
//! # Rules
//!
//! - A **run** is a maximal line of at least three equal-kind tiles along a row
//!   or a column. A tile can belong to one row run and one column run at once.
//! - **Gravity** pulls tiles toward `y = 0` within their column, preserving order.
//! - **Refill** asks a [`TileFactory`] for each empty cell.
//!
//! # Example
//!
//! ```
//! use match3_core::{Board, RandomTileFactory};
//! use match3_core::types::{Axis, Coord, TileKind};
//!
//! let a = Some(TileKind(0));
//! let b = Some(TileKind(1));
//! let mut board = Board::from_kinds(5, 1, &[a, a, b, a, a]).unwrap();
//! assert!(board.find_all_runs().is_empty());
//!
//! board.swap(Coord::new(2, 0), Coord::new(3, 0)).unwrap();
//! let runs = board.find_all_runs();
//! assert_eq!(runs.len(), 1);
//! assert_eq!(board.run_length_at(Coord::new(0, 0), Axis::Horizontal).unwrap(), 3);
//!
//! for run in &runs {
//!     for c in run.coords() {
//!         board.take(c).unwrap();
//!     }
//! }
//! board.apply_gravity();
//! let mut factory = RandomTileFactory::new(4, 7).unwrap();
//! let spawned = board.refill_empties(&mut factory);
//! assert_eq!(spawned.len(), 3);
//! assert!(board.is_full());
//! ```

pub mod board;
pub mod error;
pub mod factory;
pub mod rng;
pub mod settings;
pub mod snapshot;

pub use match3_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, Cell};
pub use error::CoreError;
pub use factory::{LayoutTileFactory, Palette, RandomTileFactory, TileFactory};
pub use rng::SimpleRng;
pub use settings::{Settings, DEFAULT_PALETTE, DEFAULT_SEED};
pub use snapshot::{BoardSnapshot, Fnv1aHasher};
