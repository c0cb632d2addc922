use chrono::{Duration, Utc};
use hermes_core::Timestamp;
use hermes_ports::Clock;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::time::Instant;

/// Time scale modes for simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeScale {
    /// Real-time (1:1 ratio with the tokio clock)
    #[default]
    Normal,
    /// Accelerated time (multiplier applied to elapsed time)
    Fast(u32),
    /// Fixed time (only advances when explicitly moved)
    Fixed,
}

/// Simulated time anchored at a point and projected forward
#[derive(Debug, Clone, Copy)]
struct Anchor {
    /// Simulated time at the anchor
    sim: Timestamp,
    /// Tokio instant at the anchor
    instant: Instant,
    scale: TimeScale,
}

impl Anchor {
    fn project(&self, at: Instant) -> Timestamp {
        let elapsed = Duration::from_std(at.saturating_duration_since(self.instant))
            .unwrap_or_else(|_| Duration::zero());

        match self.scale {
            TimeScale::Normal => self.sim + elapsed,
            TimeScale::Fast(multiplier) => self.sim + elapsed * multiplier as i32,
            TimeScale::Fixed => self.sim,
        }
    }
}

/// Simulation clock - the source of truth for venue time in paper trading
///
/// Elapsed time is measured on the tokio clock, so a runtime with paused
/// time (`tokio::time::pause`) drives the simulation deterministically.
/// Changing the scale re-anchors the clock, preserving continuity.
pub struct WorldClock {
    anchor: RwLock<Anchor>,
}

impl WorldClock {
    /// Create a new world clock running in real time
    ///
    /// # Arguments
    /// * `initial_time` - Optional starting time. If None, uses current wall time.
    pub fn new(initial_time: Option<Timestamp>) -> Arc<Self> {
        Self::with_scale(initial_time, TimeScale::Normal)
    }

    /// Create a frozen clock; it moves again once given another scale
    pub fn fixed(initial_time: Timestamp) -> Arc<Self> {
        Self::with_scale(Some(initial_time), TimeScale::Fixed)
    }

    /// Create a clock with an explicit scale
    pub fn with_scale(initial_time: Option<Timestamp>, scale: TimeScale) -> Arc<Self> {
        Arc::new(Self {
            anchor: RwLock::new(Anchor {
                sim: initial_time.unwrap_or_else(Utc::now),
                instant: Instant::now(),
                scale,
            }),
        })
    }

    /// Set the time scale
    pub fn set_time_scale(&self, scale: TimeScale) {
        let mut anchor = self.anchor.write();
        let at = Instant::now();
        anchor.sim = anchor.project(at);
        anchor.instant = at;
        anchor.scale = scale;
    }

    /// Get the current time scale
    pub fn time_scale(&self) -> TimeScale {
        self.anchor.read().scale
    }
}

impl Clock for WorldClock {
    fn now(&self) -> Timestamp {
        self.anchor.read().project(Instant::now())
    }

    fn name(&self) -> &str {
        "WorldClock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn epoch() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, 0).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_normal_scale_follows_tokio_time() {
        let clock = WorldClock::new(Some(epoch()));
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;

        assert_eq!(clock.now() - epoch(), Duration::seconds(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_mode() {
        let clock = WorldClock::fixed(epoch());

        tokio::time::sleep(std::time::Duration::from_secs(10)).await;
        assert_eq!(clock.now(), epoch());

        // Resumes from the frozen instant, not from the elapsed time
        clock.set_time_scale(TimeScale::Normal);
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        assert_eq!(clock.now() - epoch(), Duration::seconds(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_scale_and_rescale_continuity() {
        let clock = WorldClock::with_scale(Some(epoch()), TimeScale::Fast(60));
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        assert_eq!(clock.now() - epoch(), Duration::minutes(2));

        clock.set_time_scale(TimeScale::Fixed);
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        assert_eq!(clock.now() - epoch(), Duration::minutes(2));
        assert_eq!(clock.time_scale(), TimeScale::Fixed);
    }
}
