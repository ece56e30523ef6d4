//! Constants for board geometry, record formatting and relay defaults.

use crate::board::Color;

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN). Only the full 19x19 board is tracked.
pub const N: usize = 19;

/// Number of points on the board.
pub const BOARDSIZE: usize = N * N;

/// Color that moves first on an empty board.
pub const FIRST_PLAYER: Color = Color::Black;

// =============================================================================
// Game Record Format
// =============================================================================

/// Opening of every serialized record (file format 4, game type Go, size 19).
pub const SGF_HEADER: &str = "(;FF[4]GM[1]SZ[19]";

/// Comment carried by the placeholder node that stands in for a position
/// which was set up all at once rather than played move by move.
pub const SETUP_COMMENT: &str = "setup";

// =============================================================================
// Relay Defaults
// =============================================================================

/// Variation requests a single user may make per reset window.
pub const ALLOWED_VARIATIONS_PER_USER: u32 = 3;

/// Length of the per-user request window, in minutes.
pub const RESET_VARIATION_COUNT_MINUTES: u64 = 10;

/// Fixed part of a variation's display time, in seconds.
pub const BASE_VARIATION_SECONDS: u64 = 10;

/// Extra display time granted per variation stone, in seconds.
pub const VARIATION_SECONDS_PER_STONE: u64 = 2;
