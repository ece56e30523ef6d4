//! Move inference from consecutive board observations.
//!
//! The capture side only ever shows us whole boards. Comparing the tracked
//! [`Board`] with a new [`Snapshot`] yields the stones that appeared and
//! vanished since the last accepted sample; from that we either recover the
//! moves that were played, or give up and rebuild from the snapshot.

use std::collections::BTreeSet;
use std::fmt;

use tracing::{debug, warn};

use crate::board::{Board, Color, Point};
use crate::snapshot::Snapshot;

/// Why the observation stream could not be followed move by move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResyncReason {
    /// More new stones than a single exchange can explain.
    TooManyChanges(usize),
    /// Stones vanished but the capturing moves were not observed.
    UnreconciledCapture,
    /// A stone changed color without the point becoming empty first.
    Recolored(Point),
    /// Two new stones of the same color appeared at once.
    SameColorPair,
    /// Applying the inferred moves did not reproduce the snapshot.
    Diverged,
}

impl fmt::Display for ResyncReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResyncReason::TooManyChanges(n) => write!(f, "{n} stones appeared at once"),
            ResyncReason::UnreconciledCapture => write!(f, "capture without its moves"),
            ResyncReason::Recolored(pt) => write!(f, "stone at {pt:?} changed color"),
            ResyncReason::SameColorPair => write!(f, "two stones of one color appeared"),
            ResyncReason::Diverged => write!(f, "board diverged from the snapshot"),
        }
    }
}

/// Outcome of comparing the board with a new observation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inference {
    NoChange,
    /// Moves to apply, in play order.
    Moves(Vec<(Point, Color)>),
    Resync(ResyncReason),
}

/// A point whose color differs between the board and the snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Change {
    pub point: Point,
    pub before: Option<Color>,
    pub after: Option<Color>,
}

/// Points whose color differs, in snapshot scan order.
pub fn diff(board: &Board, snapshot: &Snapshot) -> Vec<Change> {
    Snapshot::points()
        .filter_map(|pt| {
            let before = board.color_at(pt);
            let after = snapshot.get(pt);
            (before != after).then_some(Change {
                point: pt,
                before,
                after,
            })
        })
        .collect()
}

/// Work out which moves turn `board` into `snapshot`.
///
/// `next_to_play` orders a pair of simultaneous stones; when it is unknown
/// the pair is taken in scan order.
pub fn infer(board: &Board, snapshot: &Snapshot, next_to_play: Option<Color>) -> Inference {
    let changes = diff(board, snapshot);
    if changes.is_empty() {
        return Inference::NoChange;
    }

    let mut added = Vec::new();
    let mut vanished = Vec::new();
    for change in &changes {
        match (change.before, change.after) {
            (Some(_), Some(_)) => return Inference::Resync(ResyncReason::Recolored(change.point)),
            (None, Some(color)) => added.push((change.point, color)),
            (Some(_), None) => vanished.push(change.point),
            (None, None) => {}
        }
    }

    if !vanished.is_empty() {
        let filled: BTreeSet<Point> = added.iter().map(|&(pt, _)| pt).collect();
        let mut checked = BTreeSet::new();
        for pt in vanished {
            let Some(group) = board.group_at(pt) else {
                continue;
            };
            if !checked.insert(group.id()) {
                continue;
            }
            if let Some(lib) = group.liberties().iter().find(|lib| !filled.contains(lib)) {
                debug!(group = group.id(), ?lib, "liberty of captured group was never filled");
                return Inference::Resync(ResyncReason::UnreconciledCapture);
            }
        }
        debug!(captured = checked.len(), "captures explained by new stones");
    }

    match added.len() {
        0 => Inference::NoChange,
        1 => {
            let (pt, color) = added[0];
            if next_to_play.is_some_and(|next| next != color) {
                debug!(?pt, ?color, ?next_to_play, "stone played out of turn");
            }
            Inference::Moves(added)
        }
        2 => {
            let (first, second) = (added[0].1, added[1].1);
            if first == second {
                return Inference::Resync(ResyncReason::SameColorPair);
            }
            match next_to_play {
                Some(next) if next == second => added.swap(0, 1),
                Some(_) => {}
                None => warn!(?added, "move order unknown, using scan order"),
            }
            Inference::Moves(added)
        }
        n => Inference::Resync(ResyncReason::TooManyChanges(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(stones: &[(Point, Color)]) -> Board {
        let mut board = Board::new();
        for &(pt, color) in stones {
            board.add_stone(pt, color).unwrap();
        }
        board
    }

    fn snapshot_with(board: &Board, extra: &[(Point, Option<Color>)]) -> Snapshot {
        let mut snapshot = board.to_snapshot();
        for &(pt, color) in extra {
            snapshot.set(pt, color);
        }
        snapshot
    }

    #[test]
    fn test_identical_is_no_change() {
        let board = board_with(&[((3, 3), Color::Black)]);
        let snapshot = board.to_snapshot();
        assert_eq!(infer(&board, &snapshot, Some(Color::White)), Inference::NoChange);
    }

    #[test]
    fn test_single_stone() {
        let board = Board::new();
        let snapshot = snapshot_with(&board, &[((3, 3), Some(Color::Black))]);
        assert_eq!(
            infer(&board, &snapshot, Some(Color::Black)),
            Inference::Moves(vec![((3, 3), Color::Black)])
        );
        // The observed color wins even when it is not the expected player.
        assert_eq!(
            infer(&board, &snapshot, Some(Color::White)),
            Inference::Moves(vec![((3, 3), Color::Black)])
        );
    }

    #[test]
    fn test_pair_ordered_by_next_player() {
        let board = Board::new();
        let snapshot = snapshot_with(
            &board,
            &[((2, 2), Some(Color::Black)), ((5, 5), Some(Color::White))],
        );
        assert_eq!(
            infer(&board, &snapshot, Some(Color::White)),
            Inference::Moves(vec![((5, 5), Color::White), ((2, 2), Color::Black)])
        );
        assert_eq!(
            infer(&board, &snapshot, Some(Color::Black)),
            Inference::Moves(vec![((2, 2), Color::Black), ((5, 5), Color::White)])
        );
        assert_eq!(
            infer(&board, &snapshot, None),
            Inference::Moves(vec![((2, 2), Color::Black), ((5, 5), Color::White)])
        );
    }

    #[test]
    fn test_same_color_pair_resyncs() {
        let board = Board::new();
        let snapshot = snapshot_with(
            &board,
            &[((2, 2), Some(Color::Black)), ((5, 5), Some(Color::Black))],
        );
        assert_eq!(
            infer(&board, &snapshot, Some(Color::Black)),
            Inference::Resync(ResyncReason::SameColorPair)
        );
    }

    #[test]
    fn test_three_stones_resync() {
        let board = Board::new();
        let snapshot = snapshot_with(
            &board,
            &[
                ((2, 2), Some(Color::Black)),
                ((5, 5), Some(Color::White)),
                ((8, 8), Some(Color::Black)),
            ],
        );
        assert_eq!(
            infer(&board, &snapshot, Some(Color::Black)),
            Inference::Resync(ResyncReason::TooManyChanges(3))
        );
    }

    #[test]
    fn test_recolored_stone_resyncs() {
        let board = board_with(&[((4, 4), Color::Black)]);
        let snapshot = snapshot_with(&board, &[((4, 4), Some(Color::White))]);
        assert_eq!(
            infer(&board, &snapshot, None),
            Inference::Resync(ResyncReason::Recolored((4, 4)))
        );
    }

    #[test]
    fn test_capture_reduces_to_filling_move() {
        let board = board_with(&[
            ((3, 3), Color::White),
            ((2, 3), Color::Black),
            ((4, 3), Color::Black),
            ((3, 2), Color::Black),
        ]);
        let snapshot = snapshot_with(
            &board,
            &[((3, 4), Some(Color::Black)), ((3, 3), None)],
        );
        assert_eq!(
            infer(&board, &snapshot, Some(Color::Black)),
            Inference::Moves(vec![((3, 4), Color::Black)])
        );
    }

    #[test]
    fn test_capture_with_missing_move_resyncs() {
        let board = board_with(&[
            ((3, 3), Color::White),
            ((2, 3), Color::Black),
            ((4, 3), Color::Black),
        ]);
        // Two liberties were left; only one is filled in the snapshot.
        let snapshot = snapshot_with(
            &board,
            &[((3, 4), Some(Color::Black)), ((3, 3), None)],
        );
        assert_eq!(
            infer(&board, &snapshot, Some(Color::Black)),
            Inference::Resync(ResyncReason::UnreconciledCapture)
        );
    }

    #[test]
    fn test_vanished_without_new_stones_resyncs() {
        let board = board_with(&[((10, 10), Color::White)]);
        let snapshot = snapshot_with(&board, &[((10, 10), None)]);
        assert_eq!(
            infer(&board, &snapshot, Some(Color::Black)),
            Inference::Resync(ResyncReason::UnreconciledCapture)
        );
    }

    #[test]
    fn test_diff_reports_changes() {
        let board = board_with(&[((1, 1), Color::Black)]);
        let snapshot = snapshot_with(&board, &[((1, 1), None), ((0, 5), Some(Color::White))]);
        let changes = diff(&board, &snapshot);
        assert_eq!(
            changes,
            vec![
                Change {
                    point: (0, 5),
                    before: None,
                    after: Some(Color::White)
                },
                Change {
                    point: (1, 1),
                    before: Some(Color::Black),
                    after: None
                },
            ]
        );
    }
}
