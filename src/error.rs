//! Error types for contract violations in the board, record tree and game.
//!
//! Observations that cannot be reconciled are not errors: they resolve to a
//! resync (see [`crate::game::Update`]). Everything here means the caller or
//! the inference layer broke an invariant and the operation was aborted.

use derive_more::{Display, Error, From};

use crate::board::Point;
use crate::sgf::NodeId;

/// Invalid stone placement.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum BoardError {
    /// The point lies outside the 19x19 grid.
    #[display("point {:?} is off the board", _0)]
    OutOfBounds(#[error(not(source))] Point),

    /// The point already holds a stone.
    #[display("point {:?} is already occupied", _0)]
    Occupied(#[error(not(source))] Point),

    /// The grid refers to a group that is no longer tracked.
    #[display("group {} is not on the board", _0)]
    UnknownGroup(#[error(not(source))] usize),

    /// A group was asked to give up a liberty it does not have.
    #[display("group {group} has no liberty at {point:?}")]
    MissingLiberty { group: usize, point: Point },
}

/// Invalid operation on the game record tree.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum TreeError {
    /// A variation must contain at least one move.
    #[display("variation has no moves")]
    EmptyVariation,

    /// The node id does not belong to this tree.
    #[display("unknown node {}", _0)]
    UnknownNode(#[error(not(source))] NodeId),
}

/// Failure of a [`crate::game::Game`] operation.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum GameError {
    #[from]
    #[display("board: {}", _0)]
    Board(#[error(source)] BoardError),

    #[from]
    #[display("record: {}", _0)]
    Tree(#[error(source)] TreeError),

    /// No variation was registered under this handle (or it predates a resync).
    #[display("unknown variation {index}")]
    UnknownVariation { index: usize },
}

/// Malformed text rendering of a board snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum SnapshotError {
    #[display("expected 19 rows, found {}", _0)]
    RowCount(#[error(not(source))] usize),

    #[display("row {row} has {len} cells, expected 19")]
    RowLength { row: usize, len: usize },

    #[display("row {row}: unexpected cell {cell:?}")]
    Cell { row: usize, cell: char },
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_game_error_keeps_source() {
        let err = GameError::from(BoardError::Occupied((3, 3)));
        assert_eq!(err.to_string(), "board: point (3, 3) is already occupied");
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("point (3, 3) is already occupied"));

        assert!(GameError::UnknownVariation { index: 2 }.source().is_none());
        assert!(BoardError::UnknownGroup(4).source().is_none());
    }
}
