//! Platform abstraction layer
//!
//! Handles host concerns the simulation must not see:
//! - Wall-clock time for record timestamps
//! - The fixed-rate tick timer

pub mod clock;
pub mod driver;

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{Controls, TickDriver};
