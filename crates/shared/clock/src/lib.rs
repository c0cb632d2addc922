//! Hermes Clock Infrastructure
//!
//! [`WorldClock`] is the venue time of paper sessions: simulated time that
//! runs at a configurable scale relative to the tokio clock, or stays frozen.
//!
//! ## Usage
//!
//! ```ignore
//! use hermes_clock::{WorldClock, TimeScale};
//!
//! let world = WorldClock::new(None);
//! world.set_time_scale(TimeScale::Fast(60)); // one simulated minute per second
//! world.set_time_scale(TimeScale::Fixed);    // frozen time
//! ```

mod world;

pub use world::{TimeScale, WorldClock};

// Re-export the Clock trait for convenience
pub use hermes_ports::Clock;
