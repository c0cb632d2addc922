//! Per-instrument forecasting loop
//!
//! ```text
//!   Warmup ──(window full)──► Active ──(venue time >= end)──► Unwinding ──► Done
//!      └───────────────────────┴──────(shutdown)──────────────────────────► Cancelled
//! ```
//!
//! Each tick samples the top of book into the loop's own [`PriceWindow`],
//! asks the oracle for a forecast once the window is full, and places one
//! market order of `order_size` lots in the forecast's direction. The end of
//! the session is checked only at the top of a tick, so an admitted tick runs
//! to completion.

use hermes_core::{InstrumentId, Lots, Order, SessionWindow, Side};
use hermes_ports::{ForecastOracle, OrderGateway};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::counter::TradeCounter;
use crate::error::{StrategyError, StrategyResult};
use crate::oracle::Signal;
use crate::shutdown::ShutdownSignal;
use crate::unwind::{PositionUnwinder, UnwindConfig, UnwindReport};
use crate::window::{DEFAULT_CAPACITY, PriceSample, PriceWindow};

/// What a loop does with a tick whose forecast failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleFailurePolicy {
    /// No signal this tick
    Skip,
    /// Act on the last successful forecast, if there is one
    #[default]
    ReusePrevious,
}

/// Lifecycle of a strategy loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Collecting samples, no forecasts yet
    Warmup,
    /// Forecasting and trading every tick
    Active,
    /// Session over, cancelling orders and flattening
    Unwinding,
    Done,
    /// Stopped by the shutdown signal before finishing
    Cancelled,
}

/// Strategy loop settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// Lots per market order
    pub order_size: Lots,
    /// Pause between ticks
    pub check_freq: Duration,
    /// Samples required before forecasting
    pub window_capacity: usize,
    pub failure_policy: OracleFailurePolicy,
    pub unwind: UnwindConfig,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            order_size: 5,
            check_freq: Duration::from_secs(1),
            window_capacity: DEFAULT_CAPACITY,
            failure_policy: OracleFailurePolicy::default(),
            unwind: UnwindConfig::default(),
        }
    }
}

impl LoopConfig {
    pub fn validate(&self) -> StrategyResult<()> {
        if self.order_size == 0 {
            return Err(StrategyError::InvalidConfig(
                "order_size must be at least one lot".to_string(),
            ));
        }
        if self.window_capacity == 0 {
            return Err(StrategyError::InvalidConfig(
                "window_capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Summary of one loop run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOutcome {
    pub instrument: InstrumentId,
    /// Ticks admitted before the session ended
    pub ticks: u64,
    /// Orders placed from forecasts
    pub trades: u64,
    pub forecast_failures: u64,
    pub final_state: LoopState,
    /// Instrument P&L read after the unwind
    pub realized_pl: Option<Decimal>,
    pub unwind: Option<UnwindReport>,
}

enum Flow {
    Continue,
    Cancelled,
}

/// Forecast-driven trading loop for a single instrument
pub struct StrategyLoop {
    instrument: InstrumentId,
    gateway: Arc<dyn OrderGateway>,
    oracle: Arc<dyn ForecastOracle>,
    counter: TradeCounter,
    session: SessionWindow,
    config: LoopConfig,
    shutdown: ShutdownSignal,

    window: PriceWindow,
    state: LoopState,
    last_forecast: Option<f64>,
    ticks: u64,
    trades: u64,
    forecast_failures: u64,
}

impl StrategyLoop {
    pub fn new(
        instrument: InstrumentId,
        gateway: Arc<dyn OrderGateway>,
        oracle: Arc<dyn ForecastOracle>,
        counter: TradeCounter,
        session: SessionWindow,
        config: LoopConfig,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            instrument,
            gateway,
            oracle,
            counter,
            session,
            window: PriceWindow::new(config.window_capacity),
            config,
            shutdown,
            state: LoopState::Warmup,
            last_forecast: None,
            ticks: 0,
            trades: 0,
            forecast_failures: 0,
        }
    }

    pub fn instrument(&self) -> &InstrumentId {
        &self.instrument
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Trade until the session ends, then unwind the instrument
    pub async fn run(mut self) -> StrategyResult<LoopOutcome> {
        self.config.validate()?;
        info!(
            "[{}] Running strategy ({} lots every {:?}, oracle {})",
            self.instrument,
            self.config.order_size,
            self.config.check_freq,
            self.oracle.name()
        );

        loop {
            let now = match self.shutdown.guard(self.gateway.last_trade_time()).await {
                Some(now) => now?,
                None => return Ok(self.cancelled()),
            };
            if !self.session.admits_tick(now) {
                break;
            }
            if let Flow::Cancelled = self.tick().await? {
                return Ok(self.cancelled());
            }
        }

        self.unwind().await
    }

    async fn tick(&mut self) -> StrategyResult<Flow> {
        self.ticks += 1;

        let quote = match self
            .shutdown
            .guard(self.gateway.best_price(&self.instrument))
            .await
        {
            Some(quote) => quote?,
            None => return Ok(Flow::Cancelled),
        };
        match PriceSample::from_quote(&quote) {
            Some(sample) => {
                self.window.push(sample);
                if let Flow::Cancelled = self.act().await? {
                    return Ok(Flow::Cancelled);
                }
            }
            // No new information, so no forecast either
            None => debug!("[{}] One-sided quote, skipping tick", self.instrument),
        }

        if !self.shutdown.sleep(self.config.check_freq).await {
            return Ok(Flow::Cancelled);
        }
        Ok(Flow::Continue)
    }

    /// Forecast on the current window and trade the signal
    async fn act(&mut self) -> StrategyResult<Flow> {
        let Some(series) = self.window.log_series() else {
            return Ok(Flow::Continue);
        };
        if self.state == LoopState::Warmup {
            info!(
                "[{}] Window full after {} ticks, forecasting",
                self.instrument, self.ticks
            );
            self.state = LoopState::Active;
        }

        let side = match self.signal(&series) {
            Signal::Buy => Side::Buy,
            Signal::Sell => Side::Sell,
            Signal::Hold => return Ok(Flow::Continue),
        };
        let order = Order::market(side, self.instrument.clone(), self.config.order_size);
        info!(
            "[{}] {} {} lots",
            self.instrument,
            side.verb(),
            self.config.order_size
        );
        match self.shutdown.guard(self.gateway.submit_order(order)).await {
            Some(result) => {
                result?;
            }
            None => return Ok(Flow::Cancelled),
        }
        self.trades += 1;
        self.counter.increment();
        Ok(Flow::Continue)
    }

    fn signal(&mut self, series: &[f64]) -> Signal {
        match self.oracle.forecast(series) {
            Ok(forecast) => {
                debug!("[{}] Forecast {:.6}", self.instrument, forecast);
                self.last_forecast = Some(forecast);
                Signal::from_forecast(forecast)
            }
            Err(e) => {
                self.forecast_failures += 1;
                match (self.config.failure_policy, self.last_forecast) {
                    (OracleFailurePolicy::ReusePrevious, Some(previous)) => {
                        debug!(
                            "[{}] Forecast failed ({}), reusing {:.6}",
                            self.instrument, e, previous
                        );
                        Signal::from_forecast(previous)
                    }
                    _ => {
                        debug!("[{}] Forecast failed ({}), no signal", self.instrument, e);
                        Signal::Hold
                    }
                }
            }
        }
    }

    async fn unwind(mut self) -> StrategyResult<LoopOutcome> {
        self.state = LoopState::Unwinding;
        info!(
            "[{}] Session over after {} ticks and {} trades, unwinding",
            self.instrument, self.ticks, self.trades
        );

        let unwinder = PositionUnwinder::new(self.gateway.clone(), self.config.unwind);
        let cancelled = match self
            .shutdown
            .guard(unwinder.cancel_orders(&self.instrument))
            .await
        {
            Some(report) => report?,
            None => return Ok(self.cancelled()),
        };
        let closed = match self
            .shutdown
            .guard(unwinder.close_positions(&self.instrument))
            .await
        {
            Some(report) => report?,
            None => return Ok(self.cancelled()),
        };
        let item = match self
            .shutdown
            .guard(self.gateway.portfolio_item(&self.instrument))
            .await
        {
            Some(item) => item?,
            None => return Ok(self.cancelled()),
        };

        info!(
            "[{}] Unwound ({} cancelled, {} closing orders), realized P&L {}",
            self.instrument,
            cancelled.cancelled,
            closed.submitted(),
            item.realized_pl
        );

        self.state = LoopState::Done;
        Ok(self.outcome(Some(item.realized_pl), Some(cancelled.merge(closed))))
    }

    fn cancelled(mut self) -> LoopOutcome {
        warn!(
            "[{}] Shutdown requested, stopping in {:?} state",
            self.instrument, self.state
        );
        self.state = LoopState::Cancelled;
        self.outcome(None, None)
    }

    fn outcome(self, realized_pl: Option<Decimal>, unwind: Option<UnwindReport>) -> LoopOutcome {
        LoopOutcome {
            instrument: self.instrument,
            ticks: self.ticks,
            trades: self.trades,
            forecast_failures: self.forecast_failures,
            final_state: self.state,
            realized_pl,
            unwind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(LoopConfig::default().validate().is_ok());

        let zero_size = LoopConfig {
            order_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            zero_size.validate(),
            Err(StrategyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_failure_policy_parses_snake_case() {
        let policy: OracleFailurePolicy = serde_json::from_str("\"skip\"").unwrap();
        assert_eq!(policy, OracleFailurePolicy::Skip);
        assert_eq!(
            OracleFailurePolicy::default(),
            OracleFailurePolicy::ReusePrevious
        );
    }
}
