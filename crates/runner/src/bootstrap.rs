//! Bootstrap - wiring a paper session from configuration
//!
//! Builds the venue clock, the paper venue (wrapped in the retry decorator
//! when the policy allows more than one attempt), the forecaster and the
//! orchestrator.

use hermes_clock::{TimeScale, WorldClock};
use hermes_gateway::{PaperVenue, RetryingGateway};
use hermes_ports::{ForecastOracle, OrderGateway};
use hermes_strategy::ArimaOracle;
use log::info;
use std::sync::Arc;

use crate::config::SessionConfig;
use crate::orchestrator::SessionOrchestrator;

/// Components of a paper trading session
pub struct PaperSession {
    pub clock: Arc<WorldClock>,
    /// The venue itself, for inspection after the session
    pub venue: Arc<PaperVenue>,
    /// What strategy loops talk to
    pub gateway: Arc<dyn OrderGateway>,
    pub oracle: Arc<dyn ForecastOracle>,
    pub orchestrator: SessionOrchestrator,
}

impl PaperSession {
    pub fn from_config(config: &SessionConfig) -> Self {
        let scale = match config.clock_speed {
            0 | 1 => TimeScale::Normal,
            speed => TimeScale::Fast(speed),
        };
        let clock = WorldClock::with_scale(None, scale);
        let venue = Arc::new(PaperVenue::new(config.venue.clone(), clock.clone()));

        let gateway: Arc<dyn OrderGateway> = if config.retry.is_enabled() {
            info!(
                "[bootstrap] Retrying transient venue errors ({} attempts, {}ms backoff)",
                config.retry.max_attempts, config.retry.backoff_ms
            );
            Arc::new(RetryingGateway::new(venue.clone(), config.retry))
        } else {
            venue.clone()
        };

        let oracle: Arc<dyn ForecastOracle> = Arc::new(ArimaOracle::new(config.oracle));
        info!(
            "[bootstrap] {} model ARIMA({}, {}, 0), window {}",
            oracle.name(),
            config.oracle.ar_order,
            config.oracle.diff_order,
            config.window_capacity
        );

        let orchestrator = SessionOrchestrator::new(
            gateway.clone(),
            oracle.clone(),
            config.orchestrator_config(),
        );

        Self {
            clock,
            venue,
            gateway,
            oracle,
            orchestrator,
        }
    }
}
