//! Connected groups of same-colored stones and their liberties.

use std::collections::BTreeSet;

use crate::board::{Color, Point};
use crate::error::BoardError;

/// Identifier of a group, unique for the lifetime of a [`crate::board::Board`].
pub type GroupId = usize;

/// A maximal connected set of same-colored stones.
///
/// Groups are owned by the board; they are only mutated through
/// [`crate::board::Board::add_stone`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    id: GroupId,
    color: Color,
    stones: Vec<Point>,
    liberties: BTreeSet<Point>,
}

impl Group {
    pub(crate) fn new(id: GroupId, pt: Point, color: Color, liberties: BTreeSet<Point>) -> Self {
        Self {
            id,
            color,
            stones: vec![pt],
            liberties,
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Stones in the order they joined the group.
    pub fn stones(&self) -> &[Point] {
        &self.stones
    }

    pub fn liberties(&self) -> &BTreeSet<Point> {
        &self.liberties
    }

    /// A group without liberties is captured.
    pub fn is_dead(&self) -> bool {
        self.liberties.is_empty()
    }

    /// Absorb a stone played on one of this group's liberties.
    pub(crate) fn add_stone(
        &mut self,
        pt: Point,
        liberties: &BTreeSet<Point>,
    ) -> Result<(), BoardError> {
        self.stones.push(pt);
        self.remove_liberty(pt)?;
        self.liberties.extend(liberties.iter().copied());
        Ok(())
    }

    pub(crate) fn add_liberty(&mut self, pt: Point) {
        self.liberties.insert(pt);
    }

    pub(crate) fn remove_liberty(&mut self, pt: Point) -> Result<(), BoardError> {
        if self.liberties.remove(&pt) {
            Ok(())
        } else {
            Err(BoardError::MissingLiberty {
                group: self.id,
                point: pt,
            })
        }
    }

    /// Take over every stone and liberty of `other`.
    pub(crate) fn merge(&mut self, other: Group) {
        self.stones.extend(other.stones);
        self.liberties.extend(other.liberties);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_stone_consumes_liberty() {
        let libs: BTreeSet<Point> = [(3, 2), (3, 4), (2, 3)].into_iter().collect();
        let mut group = Group::new(0, (3, 3), Color::Black, libs);

        let new_libs: BTreeSet<Point> = [(3, 1), (2, 2), (4, 2)].into_iter().collect();
        group.add_stone((3, 2), &new_libs).unwrap();

        assert_eq!(group.stones(), &[(3, 3), (3, 2)]);
        assert!(!group.liberties().contains(&(3, 2)));
        assert_eq!(group.liberties().len(), 5);
    }

    #[test]
    fn test_remove_missing_liberty_is_error() {
        let mut group = Group::new(7, (0, 0), Color::White, BTreeSet::from([(1, 0)]));
        assert_eq!(
            group.remove_liberty((0, 1)),
            Err(BoardError::MissingLiberty {
                group: 7,
                point: (0, 1)
            })
        );
        group.remove_liberty((1, 0)).unwrap();
        assert!(group.is_dead());
    }

    #[test]
    fn test_merge_unions_stones_and_liberties() {
        let mut a = Group::new(0, (0, 0), Color::Black, BTreeSet::from([(1, 0), (0, 1)]));
        let b = Group::new(1, (2, 0), Color::Black, BTreeSet::from([(1, 0), (3, 0), (2, 1)]));
        a.merge(b);
        assert_eq!(a.id(), 0);
        assert_eq!(a.stones(), &[(0, 0), (2, 0)]);
        assert_eq!(a.liberties().len(), 4);
    }
}
