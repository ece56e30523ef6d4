//! The tracked game: board, record and turn bookkeeping behind one façade.
//!
//! [`Game`] is what the capture loop and the chat side talk to. Every move
//! goes to the [`Board`] and the [`GameTree`] together, and an observation
//! that cannot be followed move by move replaces both.

use tracing::{info, warn};

use crate::board::{Board, Color, Point};
use crate::constants::FIRST_PLAYER;
use crate::error::GameError;
use crate::inference::{Inference, ResyncReason, infer};
use crate::sgf::{GameTree, NodeId};
use crate::snapshot::Snapshot;

/// What an observation did to the game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Update {
    NoChange,
    /// This many moves were appended to the mainline.
    Played(usize),
    /// The game was rebuilt from the snapshot.
    Resynced(ResyncReason),
}

/// A registered variation: its current terminal node and total stones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct VariationHandle {
    terminal: NodeId,
    moves: usize,
}

pub struct Game {
    board: Board,
    tree: GameTree,
    /// `None` when the position was set up and the turn is unknown.
    next_to_play: Option<Color>,
    variations: Vec<VariationHandle>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// An empty board with black to play.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            tree: GameTree::new(),
            next_to_play: Some(FIRST_PLAYER),
            variations: Vec::new(),
        }
    }

    /// A game whose initial position is `snapshot`.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, GameError> {
        let mut game = Self::new();
        game.reset(snapshot)?;
        Ok(game)
    }

    /// Drop all tracked state and treat `snapshot` as a set-up position.
    pub fn reset(&mut self, snapshot: &Snapshot) -> Result<(), GameError> {
        self.board = Board::from_snapshot(snapshot)?;
        self.tree = GameTree::with_setup(snapshot.stones().collect());
        self.next_to_play = if snapshot.is_empty() {
            Some(FIRST_PLAYER)
        } else {
            None
        };
        self.variations.clear();
        Ok(())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn tree(&self) -> &GameTree {
        &self.tree
    }

    pub fn move_count(&self) -> usize {
        self.tree.move_count()
    }

    pub fn next_to_play(&self) -> Option<Color> {
        self.next_to_play
    }

    /// The player to show as next; black when the turn is unknown.
    pub fn next_player(&self) -> Color {
        self.next_to_play.unwrap_or(FIRST_PLAYER)
    }

    /// Bring the game in line with a new observation.
    ///
    /// Unrecoverable observations are handled by a resync and reported in
    /// the returned [`Update`]; only contract violations are errors.
    pub fn update_game(&mut self, snapshot: &Snapshot) -> Result<Update, GameError> {
        let moves = match infer(&self.board, snapshot, self.next_to_play) {
            Inference::NoChange => return Ok(Update::NoChange),
            Inference::Resync(reason) => return self.resync(snapshot, reason),
            Inference::Moves(moves) => moves,
        };

        let turn_known = self.next_to_play.is_some();
        for &(pt, color) in &moves {
            self.add_move(pt, color)?;
        }
        if moves.len() == 2 && !turn_known {
            self.next_to_play = None;
        }

        if self.board.to_snapshot() != *snapshot {
            return self.resync(snapshot, ResyncReason::Diverged);
        }
        Ok(Update::Played(moves.len()))
    }

    fn resync(&mut self, snapshot: &Snapshot, reason: ResyncReason) -> Result<Update, GameError> {
        warn!(%reason, moves = self.move_count(), "lost track of the game, resetting");
        self.reset(snapshot)?;
        info!(setup = self.tree.setup().len(), "game reset complete");
        Ok(Update::Resynced(reason))
    }

    /// Play a move on the board and record it on the mainline.
    pub fn add_move(&mut self, pt: Point, color: Color) -> Result<(), GameError> {
        self.board.add_stone(pt, color)?;
        self.tree.add_move(pt, color);
        self.next_to_play = Some(color.opponent());
        Ok(())
    }

    /// Record a variation branching after move `from_move_number`, or from
    /// the live position when `None`. Returns the variation's handle.
    pub fn add_variation(
        &mut self,
        moves: &[(Point, Color)],
        from_move_number: Option<usize>,
    ) -> Result<usize, GameError> {
        let from = from_move_number.unwrap_or_else(|| self.tree.move_count());
        let terminal = self.tree.add_variation(moves, from)?;
        self.variations.push(VariationHandle {
            terminal,
            moves: moves.len(),
        });
        Ok(self.variations.len() - 1)
    }

    /// Continue an existing variation with more moves.
    pub fn expand_variation(
        &mut self,
        moves: &[(Point, Color)],
        index: usize,
    ) -> Result<usize, GameError> {
        let handle = self
            .variations
            .get_mut(index)
            .ok_or(GameError::UnknownVariation { index })?;
        handle.terminal = self.tree.extend_variation(handle.terminal, moves)?;
        handle.moves += moves.len();
        Ok(index)
    }

    /// The standalone record of a variation and its number of stones.
    pub fn get_variation(&self, index: usize) -> Result<(String, usize), GameError> {
        let handle = self
            .variations
            .get(index)
            .ok_or(GameError::UnknownVariation { index })?;
        Ok((self.tree.branch_text(handle.terminal)?, handle.moves))
    }

    /// The mainline record.
    pub fn sgf(&self) -> String {
        self.tree.serialize_mainline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TreeError;

    fn with_stone(snapshot: &Snapshot, pt: Point, color: Color) -> Snapshot {
        let mut next = snapshot.clone();
        next.set(pt, Some(color));
        next
    }

    #[test]
    fn test_new_game_black_first() {
        let game = Game::new();
        assert_eq!(game.next_to_play(), Some(Color::Black));
        assert_eq!(game.sgf(), "(;FF[4]GM[1]SZ[19])");
    }

    #[test]
    fn test_update_with_identical_snapshot_is_noop() {
        let mut game = Game::new();
        let s1 = with_stone(&Snapshot::empty(), (3, 3), Color::Black);
        game.update_game(&s1).unwrap();
        assert_eq!(game.update_game(&s1).unwrap(), Update::NoChange);
        assert_eq!(game.move_count(), 1);
    }

    #[test]
    fn test_single_move_alternates_turn() {
        let mut game = Game::new();
        let s1 = with_stone(&Snapshot::empty(), (3, 3), Color::Black);
        assert_eq!(game.update_game(&s1).unwrap(), Update::Played(1));
        assert_eq!(game.next_to_play(), Some(Color::White));
        assert_eq!(game.sgf(), "(;FF[4]GM[1]SZ[19];B[dd])");
    }

    #[test]
    fn test_pair_with_unknown_turn_stays_unknown() {
        let setup = with_stone(&Snapshot::empty(), (9, 9), Color::Black);
        let mut game = Game::from_snapshot(&setup).unwrap();
        assert_eq!(game.next_to_play(), None);
        assert_eq!(game.next_player(), Color::Black);

        let s1 = with_stone(&with_stone(&setup, (3, 3), Color::White), (15, 15), Color::Black);
        assert_eq!(game.update_game(&s1).unwrap(), Update::Played(2));
        assert_eq!(game.next_to_play(), None);
        assert_eq!(game.move_count(), 2);
    }

    #[test]
    fn test_resync_resets_everything() {
        let mut game = Game::new();
        let s1 = with_stone(&Snapshot::empty(), (3, 3), Color::Black);
        game.update_game(&s1).unwrap();
        let handle = game.add_variation(&[((4, 4), Color::White)], Some(0)).unwrap();

        let mut s2 = s1.clone();
        for pt in [(5, 5), (6, 6), (7, 7)] {
            s2.set(pt, Some(Color::White));
        }
        assert_eq!(
            game.update_game(&s2).unwrap(),
            Update::Resynced(ResyncReason::TooManyChanges(3))
        );
        assert_eq!(game.move_count(), 0);
        assert_eq!(game.next_to_play(), None);
        assert_eq!(game.tree().setup().len(), 4);
        assert_eq!(
            game.get_variation(handle),
            Err(GameError::UnknownVariation { index: handle })
        );
    }

    #[test]
    fn test_resync_with_dead_group_matches_snapshot() {
        let mut snapshot = Snapshot::empty();
        snapshot.set((0, 0), Some(Color::White));
        snapshot.set((1, 0), Some(Color::Black));
        snapshot.set((0, 1), Some(Color::Black));
        snapshot.set((10, 10), Some(Color::Black));

        let mut game = Game::new();
        assert_eq!(
            game.update_game(&snapshot).unwrap(),
            Update::Resynced(ResyncReason::TooManyChanges(4))
        );
        assert_eq!(game.board().to_snapshot(), snapshot);
        assert!(game.tree().setup().contains(&((0, 0), Color::White)));

        for _ in 0..3 {
            assert_eq!(game.update_game(&snapshot).unwrap(), Update::NoChange);
        }
        assert!(game.sgf().contains(";AW[aa]"));
    }

    #[test]
    fn test_resync_to_empty_board_gives_black() {
        let mut game = Game::new();
        game.reset(&Snapshot::empty()).unwrap();
        assert_eq!(game.next_to_play(), Some(Color::Black));
    }

    #[test]
    fn test_occupied_move_is_error() {
        let mut game = Game::new();
        game.add_move((3, 3), Color::Black).unwrap();
        assert!(matches!(
            game.add_move((3, 3), Color::White),
            Err(GameError::Board(_))
        ));
        assert_eq!(game.move_count(), 1);
    }

    #[test]
    fn test_variation_handles() {
        let mut game = Game::new();
        game.add_move((3, 3), Color::Black).unwrap();
        game.add_move((15, 15), Color::White).unwrap();

        let idx = game
            .add_variation(&[((2, 2), Color::White)], Some(1))
            .unwrap();
        assert_eq!(idx, 0);
        let (text, n) = game.get_variation(idx).unwrap();
        assert_eq!(n, 1);
        assert_eq!(text, "(;FF[4]GM[1]SZ[19];B[dd];W[cc]LB[cc:1])");

        assert_eq!(game.expand_variation(&[((3, 2), Color::Black)], idx), Ok(idx));
        let (text, n) = game.get_variation(idx).unwrap();
        assert_eq!(n, 2);
        assert!(text.ends_with(";B[dc]LB[cc:1][dc:2])"));

        assert_eq!(
            game.expand_variation(&[((0, 0), Color::Black)], 7),
            Err(GameError::UnknownVariation { index: 7 })
        );
        assert_eq!(
            game.add_variation(&[], None),
            Err(GameError::Tree(TreeError::EmptyVariation))
        );
    }
}
