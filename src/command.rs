//! Variation requests typed into chat.
//!
//! ## Grammar
//!
//! ```text
//! [move <n> | variation <k>] [b | w] <coord> <coord> ...
//! ```
//!
//! - `move <n>` branches after mainline move `n`
//! - `variation <k>` continues the variation with handle `k`
//! - neither: branch from the live position
//! - `b` / `w` pick the color of the first stone; colors then alternate
//! - a coordinate is a column letter followed by a 1-based row number
//!
//! Messages are matched case-insensitively. Words that are not coordinates
//! are ignored, and a message without coordinates is not a request.

use crate::board::{Color, Point};
use crate::config::ServerProfile;
use crate::constants::N;

/// Where a requested variation starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    Live,
    Move(usize),
    Variation(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariationCommand {
    pub origin: Origin,
    /// Color of the first stone, if the message named one.
    pub first_color: Option<Color>,
    pub points: Vec<Point>,
}

impl VariationCommand {
    /// Pair each point with a color, alternating from the first stone.
    pub fn moves(&self, default_first: Color) -> Vec<(Point, Color)> {
        let mut color = self.first_color.unwrap_or(default_first);
        self.points
            .iter()
            .map(|&pt| {
                let mv = (pt, color);
                color = color.opponent();
                mv
            })
            .collect()
    }
}

/// Parse a chat message. `profile` translates server-specific labels.
pub fn parse(message: &str, profile: Option<&ServerProfile>) -> Option<VariationCommand> {
    let lowered = message.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_ascii_alphanumeric()))
        .filter(|t| !t.is_empty())
        .collect();

    let (origin, rest) = parse_origin(&tokens);
    let (first_color, rest) = match rest.first() {
        Some(&"b") | Some(&"black") => (Some(Color::Black), &rest[1..]),
        Some(&"w") | Some(&"white") => (Some(Color::White), &rest[1..]),
        _ => (None, rest),
    };

    let points: Vec<Point> = rest
        .iter()
        .filter_map(|t| parse_point(t, profile))
        .collect();
    if points.is_empty() {
        return None;
    }
    Some(VariationCommand {
        origin,
        first_color,
        points,
    })
}

fn parse_origin<'a, 'b>(tokens: &'a [&'b str]) -> (Origin, &'a [&'b str]) {
    if let [keyword, number, rest @ ..] = tokens {
        if let Ok(n) = number.parse::<usize>() {
            match *keyword {
                "move" => return (Origin::Move(n), rest),
                "variation" => return (Origin::Variation(n), rest),
                _ => {}
            }
        }
    }
    (Origin::Live, tokens)
}

/// Parse a coordinate such as `d4` or `q16`.
pub fn parse_point(token: &str, profile: Option<&ServerProfile>) -> Option<Point> {
    let bytes = token.as_bytes();
    if !(2..=3).contains(&bytes.len()) || !bytes[0].is_ascii_lowercase() {
        return None;
    }
    if !bytes[1..].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let mut col = (bytes[0] - b'a') as usize;
    let mut row = token[1..].parse::<usize>().ok()?.checked_sub(1)?;
    if let Some(profile) = profile {
        // Servers without an `i` column label `j` as the ninth column.
        if col > 7 && !profile.i_col {
            col -= 1;
        }
        if profile.reversed_rows {
            row = (N - 1).checked_sub(row)?;
        }
    }
    (col < N && row < N).then_some((col, row))
}
