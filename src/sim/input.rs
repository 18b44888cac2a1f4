//! Held-key tracking
//!
//! Key-down/key-up events update four logical controls; each tick reads a
//! snapshot of whatever is held at that moment.

/// Logical direction driven by an arrow key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Accelerate,
    Decelerate,
}

impl Direction {
    /// Map a DOM-style key name to a direction
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            "ArrowUp" => Some(Direction::Accelerate),
            "ArrowDown" => Some(Direction::Decelerate),
            _ => None,
        }
    }
}

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub accelerate: bool,
    pub decelerate: bool,
}

impl TickInput {
    pub fn set(&mut self, direction: Direction, pressed: bool) {
        match direction {
            Direction::Left => self.left = pressed,
            Direction::Right => self.right = pressed,
            Direction::Accelerate => self.accelerate = pressed,
            Direction::Decelerate => self.decelerate = pressed,
        }
    }
}

/// Keyboard event delivered to the tick driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEvent {
    Down(String),
    Up(String),
}

/// Tracks which directional keys are currently held (last write wins)
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    held: TickInput,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press. Returns true when the host should suppress the
    /// key's default action (page scrolling for the arrow keys).
    pub fn key_down(&mut self, key: &str) -> bool {
        match Direction::from_key(key) {
            Some(direction) => {
                self.held.set(direction, true);
                true
            }
            None => false,
        }
    }

    /// Record a key release
    pub fn key_up(&mut self, key: &str) {
        if let Some(direction) = Direction::from_key(key) {
            self.held.set(direction, false);
        }
    }

    /// Apply a queued keyboard event
    pub fn apply(&mut self, event: &KeyEvent) -> bool {
        match event {
            KeyEvent::Down(key) => self.key_down(key),
            KeyEvent::Up(key) => {
                self.key_up(key);
                false
            }
        }
    }

    /// Release everything (focus loss, session reset)
    pub fn clear(&mut self) {
        self.held = TickInput::default();
    }

    /// Snapshot of currently held controls
    pub fn snapshot(&self) -> TickInput {
        self.held
    }
}
