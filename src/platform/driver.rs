//! Fixed-rate tick driver
//!
//! The timer lives only inside `run`, which returns the moment the session
//! ends. Nothing can tick an ended session, and a later `start` always
//! begins from freshly reset state.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::game::{Game, SessionEnd};
use crate::settings::GameConfig;
use crate::sim::{KeyEvent, autopilot};

/// Where a session's input comes from
pub enum Controls<'a> {
    /// Key events from the host, applied just before each tick
    Keyboard(&'a mut UnboundedReceiver<KeyEvent>),
    /// Demo mode
    Autopilot,
}

#[derive(Debug, Clone, Copy)]
pub struct TickDriver {
    period: Duration,
}

impl TickDriver {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.tick_interval())
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Tick `game` at the fixed rate until its session ends.
    /// Returns `None` straight away if no session is active.
    pub async fn run(&self, game: &mut Game, mut controls: Controls<'_>) -> Option<SessionEnd> {
        if !game.session().is_active() {
            return None;
        }

        // First tick one period after arming, like a repeating timer
        let mut timer = interval_at(Instant::now() + self.period, self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            timer.tick().await;

            let input = match &mut controls {
                Controls::Keyboard(events) => {
                    while let Ok(event) = events.try_recv() {
                        game.handle_key(&event);
                    }
                    game.held_input()
                }
                Controls::Autopilot => autopilot(game.session()),
            };

            if let Some(end) = game.tick_with(input) {
                log::debug!("Tick driver disarmed after {} ticks", end.summary.ticks);
                return Some(end);
            }
        }
    }
}
