//! Property tests for board and cascade invariants.
//!
//! Invariants covered:
//! - An accepted swap leaves a full board with no runs.
//! - A swap is kept exactly when the swapped board holds a run.
//! - A rejected swap leaves the board exactly as it was.
//! - Every tile's recorded position matches its slot; ids stay unique.
//! - Gravity is idempotent and never changes the tile count.
//! - Adjacency is symmetric and orthogonal-only.

use std::collections::HashSet;

use proptest::prelude::*;

use match3::core::{Board, RandomTileFactory};
use match3::engine::{MatchEngine, SwapOutcome};
use match3::types::{Axis, Coord};

fn assert_positions_consistent(board: &Board) {
    let mut ids = HashSet::new();
    for y in 0..i16::from(board.height()) {
        for x in 0..i16::from(board.width()) {
            let c = Coord::new(x, y);
            if let Some(tile) = board.get(c).unwrap() {
                assert_eq!(tile.position, c);
                assert!(ids.insert(tile.id), "duplicate id {:?}", tile.id);
            }
        }
    }
}

fn populated(width: u8, height: u8, kinds: usize, seed: u32) -> MatchEngine<RandomTileFactory> {
    let factory = RandomTileFactory::new(kinds, seed).unwrap();
    MatchEngine::populate(width, height, factory)
        .unwrap()
        .with_max_cascade_passes(10_000)
}

proptest! {
    #[test]
    fn swap_outcome_respects_board_invariants(
        width in 2u8..9,
        height in 2u8..9,
        kinds in 4usize..7,
        seed in any::<u32>(),
        x in 0i16..8,
        y in 0i16..8,
        vertical in any::<bool>(),
    ) {
        let mut e = populated(width, height, kinds, seed);
        let a = Coord::new(x % i16::from(width), y % i16::from(height));
        let axis = if vertical { Axis::Vertical } else { Axis::Horizontal };
        let mut b = a.step(axis, 1);
        if !e.board().contains(b) {
            b = a.step(axis, -1);
        }
        prop_assert!(a.is_adjacent(b));

        let before = e.board().clone();
        let mut swapped = before.clone();
        swapped.swap(a, b).unwrap();
        let swap_forms_runs = swapped.has_runs();

        match e.try_swap(a, b).unwrap() {
            SwapOutcome::Accepted(report) => {
                prop_assert!(swap_forms_runs);
                prop_assert!(report.passes >= 1);
                prop_assert!(e.is_stable());
                prop_assert!(e.board().is_full());
            }
            SwapOutcome::Rejected => {
                prop_assert!(!swap_forms_runs);
                prop_assert_eq!(e.board(), &before);
            }
        }
        prop_assert!(e.selection().is_idle());
        assert_positions_consistent(e.board());
    }

    #[test]
    fn gravity_is_idempotent(
        width in 1u8..9,
        height in 1u8..9,
        seed in any::<u32>(),
        holes in proptest::collection::vec((0i16..8, 0i16..8), 0..30),
    ) {
        let mut board = populated(width, height, 5, seed).board().clone();
        for (x, y) in holes {
            let _ = board.take(Coord::new(x, y));
        }
        let tiles = board.area() - board.empty_count();

        board.apply_gravity();
        let settled = board.clone();
        prop_assert!(board.apply_gravity().is_empty());
        prop_assert_eq!(&board, &settled);
        prop_assert_eq!(board.area() - board.empty_count(), tiles);

        // Within each column, no tile sits above an empty cell
        for x in 0..i16::from(width) {
            let mut seen_empty = false;
            for y in 0..i16::from(height) {
                let occupied = board.get(Coord::new(x, y)).unwrap().is_some();
                prop_assert!(!(seen_empty && occupied));
                seen_empty |= !occupied;
            }
        }
        assert_positions_consistent(&board);
    }

    #[test]
    fn adjacency_is_symmetric_and_orthogonal(
        ax in -20i16..20, ay in -20i16..20, bx in -20i16..20, by in -20i16..20,
    ) {
        let a = Coord::new(ax, ay);
        let b = Coord::new(bx, by);
        prop_assert_eq!(a.is_adjacent(b), b.is_adjacent(a));
        let manhattan = (ax - bx).abs() + (ay - by).abs();
        prop_assert_eq!(a.is_adjacent(b), manhattan == 1);
    }

    #[test]
    fn settled_cascade_leaves_no_runs(
        width in 3u8..9,
        height in 3u8..9,
        kinds in 3usize..6,
        seed in any::<u32>(),
    ) {
        let mut e = populated(width, height, kinds, seed);
        let report = e.resolve_cascade().unwrap();
        prop_assert!(e.is_stable());
        prop_assert!(e.board().is_full());
        prop_assert_eq!(report.spawned, report.cleared);
        assert_positions_consistent(e.board());
    }
}
