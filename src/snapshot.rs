//! Full-board observations.
//!
//! A [`Snapshot`] is one sample of the board as seen by the capture side:
//! a 19x19 grid of optional colors with no notion of groups or move order.
//! Text form is one row per line, cells separated by spaces, `X` for black,
//! `O` for white and `.` for empty.

use std::fmt;
use std::str::FromStr;

use crate::board::{Color, Point};
use crate::constants::{BOARDSIZE, N};
use crate::error::SnapshotError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    cells: Vec<Option<Color>>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl Snapshot {
    pub fn empty() -> Self {
        Self {
            cells: vec![None; BOARDSIZE],
        }
    }

    /// Build a snapshot by asking `f` for the color of every point.
    pub fn from_fn(mut f: impl FnMut(Point) -> Option<Color>) -> Self {
        let mut snapshot = Self::empty();
        for (x, y) in Self::points() {
            snapshot.cells[y * N + x] = f((x, y));
        }
        snapshot
    }

    /// All points in scan order: column by column, top to bottom.
    pub fn points() -> impl Iterator<Item = Point> {
        (0..N).flat_map(|x| (0..N).map(move |y| (x, y)))
    }

    pub fn get(&self, pt: Point) -> Option<Color> {
        if pt.0 >= N || pt.1 >= N {
            return None;
        }
        self.cells[pt.1 * N + pt.0]
    }

    /// Set a cell. Points off the board are ignored.
    pub fn set(&mut self, pt: Point, color: Option<Color>) {
        if pt.0 < N && pt.1 < N {
            self.cells[pt.1 * N + pt.0] = color;
        }
    }

    /// Occupied points with their colors, in scan order.
    pub fn stones(&self) -> impl Iterator<Item = (Point, Color)> + '_ {
        Self::points().filter_map(|pt| self.get(pt).map(|c| (pt, c)))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}

fn parse_cell(row: usize, cell: char) -> Result<Option<Color>, SnapshotError> {
    match cell {
        'X' | 'x' | 'B' | 'b' => Ok(Some(Color::Black)),
        'O' | 'o' | 'W' | 'w' => Ok(Some(Color::White)),
        '.' | '+' => Ok(None),
        _ => Err(SnapshotError::Cell { row, cell }),
    }
}

impl FromStr for Snapshot {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        if rows.len() != N {
            return Err(SnapshotError::RowCount(rows.len()));
        }
        let mut snapshot = Snapshot::empty();
        for (y, line) in rows.iter().enumerate() {
            let cells = line
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| parse_cell(y, c))
                .collect::<Result<Vec<_>, _>>()?;
            if cells.len() != N {
                return Err(SnapshotError::RowLength {
                    row: y,
                    len: cells.len(),
                });
            }
            for (x, color) in cells.into_iter().enumerate() {
                snapshot.set((x, y), color);
            }
        }
        Ok(snapshot)
    }
}

/// Parse a stream of snapshots separated by blank lines.
pub fn parse_stream(text: &str) -> Result<Vec<Snapshot>, SnapshotError> {
    let mut snapshots = Vec::new();
    let mut block = String::new();
    for line in text.lines().chain(std::iter::once("")) {
        if line.trim().is_empty() {
            if !block.is_empty() {
                snapshots.push(block.parse()?);
                block.clear();
            }
        } else {
            block.push_str(line);
            block.push('\n');
        }
    }
    Ok(snapshots)
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..N {
            for x in 0..N {
                let ch = match self.get((x, y)) {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                if x > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_roundtrip() {
        let mut snapshot = Snapshot::empty();
        snapshot.set((3, 3), Some(Color::Black));
        snapshot.set((15, 3), Some(Color::White));
        snapshot.set((18, 18), Some(Color::Black));

        let parsed: Snapshot = snapshot.to_string().parse().unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert_eq!(
            ". . .\n".parse::<Snapshot>(),
            Err(SnapshotError::RowCount(1))
        );

        let mut text = Snapshot::empty().to_string();
        text = text.replacen(". ", "", 1);
        assert_eq!(
            text.parse::<Snapshot>(),
            Err(SnapshotError::RowLength { row: 0, len: 18 })
        );

        let text = Snapshot::empty().to_string().replacen('.', "?", 1);
        assert_eq!(
            text.parse::<Snapshot>(),
            Err(SnapshotError::Cell { row: 0, cell: '?' })
        );
    }

    #[test]
    fn test_stones_in_scan_order() {
        let snapshot = Snapshot::from_fn(|pt| match pt {
            (0, 5) => Some(Color::White),
            (1, 0) => Some(Color::Black),
            (0, 2) => Some(Color::Black),
            _ => None,
        });
        let stones: Vec<_> = snapshot.stones().collect();
        assert_eq!(
            stones,
            vec![
                ((0, 2), Color::Black),
                ((0, 5), Color::White),
                ((1, 0), Color::Black)
            ]
        );
        assert!(!snapshot.is_empty());
        assert!(Snapshot::empty().is_empty());
    }

    #[test]
    fn test_parse_stream_splits_on_blank_lines() {
        let a = Snapshot::empty();
        let mut b = Snapshot::empty();
        b.set((9, 9), Some(Color::Black));
        let text = format!("{a}\n\n{b}\n");
        assert_eq!(parse_stream(&text).unwrap(), vec![a, b]);
    }
}
