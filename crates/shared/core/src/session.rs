//! Session window - the [start, end) bounds of one trading session
//!
//! Both bounds are venue times. The comparisons live here so every caller
//! (orchestrator polling, per-instrument loops) applies the same boundary
//! rule: the start instant is inside the session, the end instant is not.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::values::Timestamp;

/// Half-open session interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindow {
    start: Timestamp,
    end: Timestamp,
}

impl SessionWindow {
    /// Create a window; an `end` before `start` is clamped to `start`
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Window starting at `start` and lasting `duration`
    ///
    /// `None` when the end is not representable.
    pub fn starting_at(start: Timestamp, duration: Duration) -> Option<Self> {
        start
            .checked_add_signed(duration)
            .map(|end| Self::new(start, end))
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Market is open for this session (`now >= start`)
    pub fn has_started(&self, now: Timestamp) -> bool {
        now >= self.start
    }

    /// Session is over (`now >= end`)
    pub fn has_ended(&self, now: Timestamp) -> bool {
        now >= self.end
    }

    /// A loop iteration may be admitted (`now < end`)
    ///
    /// Only checked before a tick; an admitted tick runs to completion even
    /// if the end passes while it executes.
    pub fn admits_tick(&self, now: Timestamp) -> bool {
        !self.has_ended(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn t(secs: i64) -> Timestamp {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_boundaries() {
        let window = SessionWindow::new(t(0), t(600));

        assert!(!window.has_started(t(-1)));
        assert!(window.has_started(t(0)));

        assert!(window.admits_tick(t(599)));
        assert!(!window.admits_tick(t(600)));
        assert!(window.has_ended(t(600)));
    }

    #[test]
    fn test_zero_duration_window_admits_nothing() {
        let window = SessionWindow::starting_at(t(0), Duration::zero()).unwrap();
        assert!(window.has_started(t(0)));
        assert!(!window.admits_tick(t(0)));
    }

    #[test]
    fn test_unrepresentable_end_is_rejected() {
        assert_eq!(SessionWindow::starting_at(t(0), Duration::MAX), None);
        assert!(SessionWindow::starting_at(t(0), Duration::days(7)).is_some());
    }

    #[test]
    fn test_inverted_bounds_are_clamped() {
        let window = SessionWindow::new(t(10), t(5));
        assert_eq!(window.end(), window.start());
        assert_eq!(window.duration(), Duration::zero());
    }
}
