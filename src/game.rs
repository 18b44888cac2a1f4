//! Game controller
//!
//! Owns the one copy of session state together with the payment gate, held
//! input and the leaderboard. The UI (or the headless demo) only calls into
//! this type and reads state back out of it.

use std::sync::Arc;

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::highscores::{self, LeaderboardEntry, PersistReport};
use crate::persistence::KeyValueStore;
use crate::platform::Clock;
use crate::settings::GameConfig;
use crate::sim::{GameEvent, InputTracker, KeyEvent, Session, SessionSummary, TickInput, tick};
use crate::wallet::{GateError, PaymentGate, PaymentProvider, PaymentRecord};

#[derive(Debug, Error)]
pub enum GameError {
    #[error("Please pay the entry fee first!")]
    PaymentRequired,

    #[error("A session is already running.")]
    AlreadyActive,

    #[error(transparent)]
    Gate(#[from] GateError),
}

/// A finished session and its in-flight score persistence
#[derive(Debug)]
pub struct SessionEnd {
    pub summary: SessionSummary,
    /// Persistence runs in the background and completes even if this handle
    /// is dropped. The reloaded leaderboard only reaches `Game` through
    /// `Game::apply_report`; without it, call `Game::refresh_leaderboard`.
    pub persistence: JoinHandle<PersistReport>,
}

pub struct Game {
    config: GameConfig,
    session: Session,
    gate: PaymentGate,
    input: InputTracker,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    leaderboard: Vec<LeaderboardEntry>,
    /// Runtime that persistence tasks are spawned on
    runtime: Handle,
}

impl Game {
    /// Build the controller and load the saved best score and leaderboard.
    /// Must be awaited on a tokio runtime; later ticks may come from any thread.
    pub async fn new(
        config: GameConfig,
        provider: Option<Arc<dyn PaymentProvider>>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let best = highscores::load_best_score(store.as_ref()).await;
        let leaderboard = match highscores::load_leaderboard(store.as_ref()).await {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Leaderboard unavailable: {}", e);
                Vec::new()
            }
        };
        let seed = config.seed.unwrap_or_else(rand::random);
        let gate = PaymentGate::new(provider, store.clone(), clock.clone(), config.clone());

        Self {
            config,
            session: Session::new(seed, best),
            gate,
            input: InputTracker::new(),
            store,
            clock,
            leaderboard,
            runtime: Handle::current(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn gate(&self) -> &PaymentGate {
        &self.gate
    }

    pub fn leaderboard(&self) -> &[LeaderboardEntry] {
        &self.leaderboard
    }

    pub fn best_score(&self) -> u64 {
        self.session.best_score
    }

    pub async fn connect(&mut self) -> Result<String, GameError> {
        Ok(self.gate.connect().await?)
    }

    pub async fn pay(&mut self) -> Result<PaymentRecord, GameError> {
        Ok(self.gate.pay().await?)
    }

    /// Begin a new session. Requires a completed payment.
    pub fn start(&mut self) -> Result<(), GameError> {
        if !self.gate.is_paid() {
            return Err(GameError::PaymentRequired);
        }
        if self.session.is_active() {
            return Err(GameError::AlreadyActive);
        }
        self.input.clear();
        self.session.start();
        Ok(())
    }

    /// Returns true when the host should suppress the key's default action
    pub fn key_down(&mut self, key: &str) -> bool {
        self.input.key_down(key)
    }

    pub fn key_up(&mut self, key: &str) {
        self.input.key_up(key);
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        self.input.apply(event)
    }

    pub fn held_input(&self) -> TickInput {
        self.input.snapshot()
    }

    /// Advance one tick with the held keys
    pub fn tick(&mut self) -> Option<SessionEnd> {
        let input = self.input.snapshot();
        self.tick_with(input)
    }

    /// Advance one tick with explicit input. When the car crashes, score
    /// persistence is spawned on the runtime `Game::new` ran on.
    pub fn tick_with(&mut self, input: TickInput) -> Option<SessionEnd> {
        let (next, event) = tick(&self.session, &input);
        self.session = next;

        match event {
            Some(GameEvent::Crashed { summary, .. }) => {
                self.input.clear();
                Some(self.finish(summary))
            }
            None => None,
        }
    }

    /// End an active session early (e.g. the host gave up waiting) and
    /// persist its score like a crash would. `None` when nothing is running.
    pub fn end_session(&mut self) -> Option<SessionEnd> {
        if !self.session.is_active() {
            return None;
        }
        self.input.clear();
        let summary = self.session.end();
        Some(self.finish(summary))
    }

    fn finish(&self, summary: SessionSummary) -> SessionEnd {
        let store = self.store.clone();
        let account = self.gate.account().map(str::to_string);
        let now = self.clock.now_millis();

        let persistence = self.runtime.spawn(async move {
            highscores::persist_session_end(store.as_ref(), &summary, account.as_deref(), now)
                .await
        });
        SessionEnd {
            summary,
            persistence,
        }
    }

    /// Adopt the leaderboard reloaded by a finished persistence task
    pub fn apply_report(&mut self, report: &PersistReport) {
        if let Some(entries) = &report.leaderboard {
            self.leaderboard = entries.clone();
        }
    }

    pub async fn refresh_leaderboard(&mut self) {
        match highscores::load_leaderboard(self.store.as_ref()).await {
            Ok(entries) => self.leaderboard = entries,
            Err(e) => log::warn!("Failed to refresh leaderboard: {}", e),
        }
    }
}
