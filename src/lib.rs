//! Goban-Relay: follow a Go game from periodic board captures.
//!
//! The relay never sees moves directly. It receives full-board snapshots,
//! works out which moves were played since the previous one, keeps a legal
//! board with groups and liberties, and maintains an SGF game record that
//! viewers can display. Chat viewers can hang variations off the record.
//!
//! ## Modules
//!
//! - [`constants`] - Board size, record header and relay defaults
//! - [`board`] - Stone placement with merging and captures
//! - [`group`] - Connected stones and their liberties
//! - [`snapshot`] - Full-board observations
//! - [`inference`] - Moves (or a resync) from two observations
//! - [`sgf`] - Branching game record and its serialization
//! - [`game`] - The façade tying board, record and turn together
//! - [`command`] - Chat variation requests
//! - [`relay`] - Locking boundary and publishing to viewers
//! - [`config`] - Settings file
//! - [`simulate`] - Random games sampled like a capture loop would
//!
//! ## Example
//!
//! ```
//! use goban_relay::board::Color;
//! use goban_relay::game::{Game, Update};
//! use goban_relay::snapshot::Snapshot;
//!
//! let mut game = Game::new();
//! let mut snapshot = Snapshot::empty();
//! snapshot.set((3, 3), Some(Color::Black));
//!
//! assert_eq!(game.update_game(&snapshot).unwrap(), Update::Played(1));
//! assert_eq!(game.sgf(), "(;FF[4]GM[1]SZ[19];B[dd])");
//!
//! let handle = game.add_variation(&[((15, 15), Color::White)], None).unwrap();
//! let (variation, stones) = game.get_variation(handle).unwrap();
//! assert_eq!(stones, 1);
//! assert!(variation.ends_with(";W[pp]LB[pp:1])"));
//! ```

pub mod board;
pub mod command;
pub mod config;
pub mod constants;
pub mod error;
pub mod game;
pub mod group;
pub mod inference;
pub mod relay;
pub mod sgf;
pub mod simulate;
pub mod snapshot;
