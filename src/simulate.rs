//! Random games and lossy sampling, for exercising the relay without a
//! screen to capture.
//!
//! A game is played with random non-suicidal moves, then observed the way
//! the capture loop would: every few moves a snapshot is taken, so some
//! samples show one new stone, some show an exchange, and some show more
//! than the tracker can follow.

use crate::board::{Board, Color, Point};
use crate::constants::N;
use crate::snapshot::Snapshot;

/// Attempts at finding a playable point before the game is cut short.
const MAX_TRIES: usize = 1000;

/// Play up to `n_moves` random moves, alternating colors from black.
///
/// Moves that would leave the new stone without liberties are skipped.
pub fn random_game(rng: &mut fastrand::Rng, n_moves: usize) -> Vec<(Point, Color)> {
    let mut board = Board::new();
    let mut moves = Vec::with_capacity(n_moves);
    let mut color = Color::Black;

    'game: for _ in 0..n_moves {
        for _ in 0..MAX_TRIES {
            let pt = (rng.usize(..N), rng.usize(..N));
            if board.color_at(pt).is_some() {
                continue;
            }
            let mut trial = board.clone();
            if trial.add_stone(pt, color).is_err() || trial.color_at(pt).is_none() {
                continue;
            }
            board = trial;
            moves.push((pt, color));
            color = color.opponent();
            continue 'game;
        }
        break;
    }
    moves
}

/// Snapshots of `moves` taken every 1 to `max_gap` moves. The final
/// position is always included.
pub fn sample(rng: &mut fastrand::Rng, moves: &[(Point, Color)], max_gap: usize) -> Vec<Snapshot> {
    let max_gap = max_gap.max(1);
    let mut board = Board::new();
    let mut samples = Vec::new();
    let mut until_next = rng.usize(1..=max_gap);

    for (i, &(pt, color)) in moves.iter().enumerate() {
        // Moves come from `random_game`, so they are always playable.
        if board.add_stone(pt, color).is_err() {
            break;
        }
        until_next -= 1;
        if until_next == 0 || i + 1 == moves.len() {
            samples.push(board.to_snapshot());
            until_next = rng.usize(1..=max_gap);
        }
    }
    samples
}
