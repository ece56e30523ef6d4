//! Relay settings, read from a JSON file.
//!
//! Every field has a default, and unknown keys are ignored so a settings
//! file shared with the capture and overlay tools can be used as is.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::constants::{
    ALLOWED_VARIATIONS_PER_USER, BASE_VARIATION_SECONDS, RESET_VARIATION_COUNT_MINUTES,
    VARIATION_SECONDS_PER_STONE,
};

/// How a Go server labels its board, for translating chat coordinates.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ServerProfile {
    pub name: String,
    /// Whether the column labels include the letter `i`.
    #[serde(default)]
    pub i_col: bool,
    /// Whether row 1 is at the bottom of the board.
    #[serde(default)]
    pub reversed_rows: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub allowed_variations_per_user: u32,
    /// Minutes after which every user's request count starts over.
    pub reset_variation_count_timer: u64,
    /// Seconds a variation stays on screen regardless of its length.
    pub base_variation_displaying_time: u64,
    /// Extra seconds per variation stone.
    pub variation_displaying_time_per_stone: u64,
    pub use_server_coordinates: bool,
    pub servers: Vec<ServerProfile>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            allowed_variations_per_user: ALLOWED_VARIATIONS_PER_USER,
            reset_variation_count_timer: RESET_VARIATION_COUNT_MINUTES,
            base_variation_displaying_time: BASE_VARIATION_SECONDS,
            variation_displaying_time_per_stone: VARIATION_SECONDS_PER_STONE,
            use_server_coordinates: false,
            servers: Vec::new(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn server(&self, name: &str) -> Option<&ServerProfile> {
        self.servers.iter().find(|s| s.name == name)
    }

    pub fn reset_window(&self) -> Duration {
        Duration::from_secs(self.reset_variation_count_timer * 60)
    }

    /// How long a variation of `stones` moves should be shown.
    pub fn display_time(&self, stones: usize) -> Duration {
        Duration::from_secs(
            self.base_variation_displaying_time
                + stones as u64 * self.variation_displaying_time_per_stone,
        )
    }
}
