//! The boundary between the game and its collaborators.
//!
//! The capture loop and the chat side run independently, but the game is
//! not safe to enter twice, so [`Relay`] keeps the [`Game`] behind a single
//! mutex and pushes every change out through a [`Publisher`].

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use serde::Serialize;
use tracing::{debug, info};

use crate::command::{self, Origin};
use crate::config::Settings;
use crate::error::{GameError, TreeError};
use crate::game::{Game, Update};
use crate::snapshot::Snapshot;

/// Receiver of serialized records, typically a viewer connection.
pub trait Publisher {
    /// The mainline changed.
    fn publish_record(&mut self, sgf: &str) -> Result<()>;

    /// Show a variation for roughly `display` before returning to the game.
    fn publish_variation(&mut self, sgf: &str, display: Duration) -> Result<()>;
}

#[derive(Serialize)]
struct Message<'a> {
    action: &'static str,
    data: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<u64>,
}

/// Writes one JSON object per line: `{"action":"play","data":<sgf>}`.
/// Variations carry an extra `duration` in seconds.
pub struct JsonLinesPublisher<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesPublisher<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn send(&mut self, message: &Message<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.out, message)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Publisher for JsonLinesPublisher<W> {
    fn publish_record(&mut self, sgf: &str) -> Result<()> {
        self.send(&Message {
            action: "play",
            data: sgf,
            duration: None,
        })
    }

    fn publish_variation(&mut self, sgf: &str, display: Duration) -> Result<()> {
        self.send(&Message {
            action: "play",
            data: sgf,
            duration: Some(display.as_secs()),
        })
    }
}

/// Totals from feeding a sequence of snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub samples: usize,
    pub moves: usize,
    pub resyncs: usize,
}

struct RelayState<P> {
    game: Game,
    publisher: P,
    last_record: String,
    current_server: Option<String>,
    requests: HashMap<String, u32>,
    window_start: Instant,
}

impl<P> RelayState<P> {
    /// Whether `user` may make another request, starting a new window when
    /// the old one has run out.
    fn has_allowance(&mut self, user: &str, now: Instant, settings: &Settings) -> bool {
        if now.saturating_duration_since(self.window_start) > settings.reset_window() {
            debug!("resetting variation request counts");
            self.requests.clear();
            self.window_start = now;
        }
        self.requests.get(user).copied().unwrap_or(0) < settings.allowed_variations_per_user
    }

    fn charge(&mut self, user: &str) {
        *self.requests.entry(user.to_string()).or_insert(0) += 1;
    }
}

pub struct Relay<P: Publisher> {
    settings: Settings,
    state: Mutex<RelayState<P>>,
}

impl<P: Publisher> Relay<P> {
    pub fn new(settings: Settings, publisher: P) -> Self {
        Self::with_game(settings, publisher, Game::new())
    }

    pub fn with_game(settings: Settings, publisher: P, game: Game) -> Self {
        Self {
            settings,
            state: Mutex::new(RelayState {
                last_record: game.sgf(),
                game,
                publisher,
                current_server: None,
                requests: HashMap::new(),
                window_start: Instant::now(),
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, RelayState<P>>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("relay state poisoned by an earlier panic"))
    }

    /// Apply an observation and publish the mainline if it changed.
    pub fn observe(&self, snapshot: &Snapshot) -> Result<Update> {
        let mut state = self.lock()?;
        let update = state.game.update_game(snapshot)?;
        let record = state.game.sgf();
        if record != state.last_record {
            state.publisher.publish_record(&record)?;
            state.last_record = record;
        }
        Ok(update)
    }

    /// Feed snapshots in order, tallying what happened.
    pub fn observe_all<'a>(
        &self,
        snapshots: impl IntoIterator<Item = &'a Snapshot>,
    ) -> Result<Summary> {
        let mut summary = Summary::default();
        for snapshot in snapshots {
            summary.samples += 1;
            match self.observe(snapshot)? {
                Update::NoChange => {}
                Update::Played(n) => summary.moves += n,
                Update::Resynced(_) => summary.resyncs += 1,
            }
        }
        Ok(summary)
    }

    /// The server whose board is being captured, for coordinate mapping.
    pub fn set_current_server(&self, name: Option<String>) -> Result<()> {
        self.lock()?.current_server = name;
        Ok(())
    }

    /// Handle a chat message, publishing the variation it asks for.
    ///
    /// Returns the variation handle, or `None` when the message is not a
    /// request, names a variation that does not exist, or the user is over
    /// their allowance. Only requests that produced a variation count
    /// against the allowance.
    pub fn handle_chat(&self, message: &str, user: &str) -> Result<Option<usize>> {
        self.handle_chat_at(message, user, Instant::now())
    }

    pub fn handle_chat_at(&self, message: &str, user: &str, now: Instant) -> Result<Option<usize>> {
        let mut state = self.lock()?;
        let profile = if self.settings.use_server_coordinates {
            state
                .current_server
                .as_deref()
                .and_then(|name| self.settings.server(name))
        } else {
            None
        };
        let Some(cmd) = command::parse(message, profile) else {
            return Ok(None);
        };
        if !state.has_allowance(user, now, &self.settings) {
            info!(user, "variation allowance used up");
            return Ok(None);
        }

        let moves = cmd.moves(state.game.next_player());
        let built = match cmd.origin {
            Origin::Live => state.game.add_variation(&moves, None),
            Origin::Move(n) => state.game.add_variation(&moves, Some(n)),
            Origin::Variation(k) => state.game.expand_variation(&moves, k),
        };
        let index = match built {
            Ok(index) => index,
            Err(
                err @ (GameError::UnknownVariation { .. }
                | GameError::Tree(TreeError::EmptyVariation)),
            ) => {
                info!(user, %err, "variation request refused");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        state.charge(user);

        let (sgf, stones) = state.game.get_variation(index)?;
        let display = self.settings.display_time(stones);
        info!(user, index, stones, "showing variation");
        state.publisher.publish_variation(&sgf, display)?;
        Ok(Some(index))
    }

    /// Run `f` against the game while holding the lock.
    pub fn inspect<R>(&self, f: impl FnOnce(&Game) -> R) -> Result<R> {
        Ok(f(&self.lock()?.game))
    }

    pub fn into_publisher(self) -> Result<P> {
        self.state
            .into_inner()
            .map(|state| state.publisher)
            .map_err(|_| anyhow!("relay state poisoned by an earlier panic"))
    }
}
