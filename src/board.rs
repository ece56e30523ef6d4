//! Incremental board model with group and liberty tracking.
//!
//! Every point on the grid holds either nothing or the id of the [`Group`]
//! owning it. Placing a stone merges adjacent friendly groups and removes
//! enemy groups whose last liberty was filled, so after each placement every
//! tracked group has at least one liberty. Set-up positions are the one
//! exception, see [`Board::from_snapshot`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::{debug, warn};

use crate::constants::{BOARDSIZE, N};
use crate::error::BoardError;
use crate::group::{Group, GroupId};
use crate::snapshot::Snapshot;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

/// A point on the board as `(column, row)`, both zero-based.
pub type Point = (usize, usize);

#[derive(Clone, Debug)]
pub struct Board {
    grid: Vec<Option<GroupId>>,
    groups: BTreeMap<GroupId, Group>,
    next_group_id: GroupId,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            grid: vec![None; BOARDSIZE],
            groups: BTreeMap::new(),
            next_group_id: 0,
        }
    }

    /// Build a board holding exactly the stones of `snapshot`.
    ///
    /// A set-up position is taken as given: stones are grouped and their
    /// liberties counted, but nothing is captured. A group left without
    /// liberties by a noisy frame stays on the board until a neighbor is
    /// removed.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, BoardError> {
        let mut board = Self::new();
        for (pt, color) in snapshot.stones() {
            debug!(?pt, ?color, "placing setup stone");
            board.place(pt, color)?;
        }
        if let Some(group) = board.groups.values().find(|g| g.is_dead()) {
            warn!(group = group.id(), "setup position holds a group without liberties");
        }
        Ok(board)
    }

    fn idx(pt: Point) -> usize {
        pt.1 * N + pt.0
    }

    fn check_bounds(pt: Point) -> Result<(), BoardError> {
        if pt.0 >= N || pt.1 >= N {
            return Err(BoardError::OutOfBounds(pt));
        }
        Ok(())
    }

    /// Orthogonal neighbors, clipped at the edges.
    pub fn neighbors(pt: Point) -> impl Iterator<Item = Point> {
        let (x, y) = pt;
        let mut v = Vec::with_capacity(4);
        if x > 0 {
            v.push((x - 1, y));
        }
        if x + 1 < N {
            v.push((x + 1, y));
        }
        if y > 0 {
            v.push((x, y - 1));
        }
        if y + 1 < N {
            v.push((x, y + 1));
        }
        v.into_iter()
    }

    pub fn group_at(&self, pt: Point) -> Option<&Group> {
        if pt.0 >= N || pt.1 >= N {
            return None;
        }
        self.grid[Self::idx(pt)].and_then(|id| self.groups.get(&id))
    }

    pub fn color_at(&self, pt: Point) -> Option<Color> {
        self.group_at(pt).map(Group::color)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn stone_count(&self) -> usize {
        self.groups.values().map(|g| g.stones().len()).sum()
    }

    pub fn to_snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::empty();
        for group in self.groups.values() {
            for &pt in group.stones() {
                snapshot.set(pt, Some(group.color()));
            }
        }
        snapshot
    }

    fn group_mut(&mut self, id: GroupId) -> Result<&mut Group, BoardError> {
        self.groups.get_mut(&id).ok_or(BoardError::UnknownGroup(id))
    }

    /// Split the neighbors of `pt` into friendly groups, enemy groups and
    /// empty points.
    fn adjacent(
        &self,
        pt: Point,
        color: Color,
    ) -> (BTreeSet<GroupId>, BTreeSet<GroupId>, BTreeSet<Point>) {
        let mut friends = BTreeSet::new();
        let mut enemies = BTreeSet::new();
        let mut libs = BTreeSet::new();
        for n in Self::neighbors(pt) {
            match self.group_at(n) {
                None => {
                    libs.insert(n);
                }
                Some(g) if g.color() == color => {
                    friends.insert(g.id());
                }
                Some(g) => {
                    enemies.insert(g.id());
                }
            }
        }
        (friends, enemies, libs)
    }

    /// Place a stone and resolve merges and captures.
    ///
    /// Returns the id of the group the stone joined. When several friendly
    /// groups touch the stone, the oldest one survives and absorbs the rest.
    ///
    /// # Errors
    /// - [`BoardError::OutOfBounds`] if `pt` is off the board
    /// - [`BoardError::Occupied`] if `pt` already holds a stone
    /// - [`BoardError::MissingLiberty`] if a neighboring group does not count
    ///   `pt` among its liberties
    ///
    /// The board is left unchanged when an error is returned.
    pub fn add_stone(&mut self, pt: Point, color: Color) -> Result<GroupId, BoardError> {
        let (id, enemies) = self.place(pt, color)?;

        for enemy in enemies {
            if self.groups.get(&enemy).is_some_and(Group::is_dead) {
                self.remove_group(enemy)?;
            }
        }

        if self.groups.get(&id).is_some_and(Group::is_dead) {
            warn!(group = id, ?pt, "suicide, removing own group");
            self.remove_group(id)?;
        }
        Ok(id)
    }

    /// Put a stone on the grid, merge it with its friends and take the point
    /// from its enemies' liberties. Returns the stone's group and the
    /// adjacent enemy groups, which may now be dead.
    fn place(&mut self, pt: Point, color: Color) -> Result<(GroupId, BTreeSet<GroupId>), BoardError> {
        Self::check_bounds(pt)?;
        if self.grid[Self::idx(pt)].is_some() {
            return Err(BoardError::Occupied(pt));
        }

        let (friends, enemies, libs) = self.adjacent(pt, color);
        for &gid in friends.iter().chain(&enemies) {
            let group = self.groups.get(&gid).ok_or(BoardError::UnknownGroup(gid))?;
            if !group.liberties().contains(&pt) {
                return Err(BoardError::MissingLiberty {
                    group: gid,
                    point: pt,
                });
            }
        }

        // Every adjacent group holds `pt` as a liberty from here on.
        let id = match friends.first().copied() {
            None => self.create_group(pt, color, libs),
            Some(survivor) => {
                for &other in friends.iter().skip(1) {
                    self.merge_groups(survivor, other)?;
                }
                self.group_mut(survivor)?.add_stone(pt, &libs)?;
                self.grid[Self::idx(pt)] = Some(survivor);
                survivor
            }
        };
        for &enemy in &enemies {
            self.group_mut(enemy)?.remove_liberty(pt)?;
        }
        Ok((id, enemies))
    }

    fn create_group(&mut self, pt: Point, color: Color, libs: BTreeSet<Point>) -> GroupId {
        let id = self.next_group_id;
        self.next_group_id += 1;
        self.groups.insert(id, Group::new(id, pt, color, libs));
        self.grid[Self::idx(pt)] = Some(id);
        debug!(group = id, ?pt, ?color, "created group");
        id
    }

    fn merge_groups(&mut self, survivor: GroupId, other: GroupId) -> Result<(), BoardError> {
        if survivor == other {
            return Ok(());
        }
        let absorbed = self
            .groups
            .remove(&other)
            .ok_or(BoardError::UnknownGroup(other))?;
        for &pt in absorbed.stones() {
            self.grid[Self::idx(pt)] = Some(survivor);
        }
        debug!(from = other, into = survivor, "merging groups");
        self.group_mut(survivor)?.merge(absorbed);
        Ok(())
    }

    /// Take a captured group off the board, giving its points back as
    /// liberties to the surrounding enemy groups.
    fn remove_group(&mut self, id: GroupId) -> Result<(), BoardError> {
        let group = self.groups.remove(&id).ok_or(BoardError::UnknownGroup(id))?;
        debug!(group = id, stones = group.stones().len(), "removing captured group");
        for &pt in group.stones() {
            self.grid[Self::idx(pt)] = None;
        }
        for &pt in group.stones() {
            for n in Self::neighbors(pt) {
                if let Some(gid) = self.grid[Self::idx(n)] {
                    let neighbor = self.group_mut(gid)?;
                    if neighbor.color() != group.color() {
                        neighbor.add_liberty(pt);
                    }
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_snapshot())
    }
}
