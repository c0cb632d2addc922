//! Session orchestration
//!
//! One session runs through these steps:
//! 1. Fix the session window from venue time and wait for it to open
//! 2. Record the realized P&L baseline
//! 3. Launch one strategy loop per instrument, staggered
//! 4. Wait for the window to close
//! 5. Join every loop with a timeout; on the first timeout broadcast shutdown
//!    and give the rest a grace period, abandoning loops that still run
//! 6. Cancel orders and flatten positions for every instrument as a safety net
//! 7. Report buying power, P&L delta versus the baseline and trade count

use hermes_core::{InstrumentId, PortfolioItem, SessionWindow, Timestamp};
use hermes_ports::{ForecastOracle, OrderGateway};
use hermes_strategy::{
    LoopConfig, LoopOutcome, LoopState, PositionUnwinder, ShutdownSignal, StrategyError,
    StrategyLoop, StrategyResult, TradeCounter, UnwindReport,
};
use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::{JoinError, JoinHandle};

use crate::error::{SessionError, SessionResult};

/// Timing and loop settings of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Instruments to trade; empty means the venue's stock list
    pub instruments: Vec<InstrumentId>,
    pub start_offset: Duration,
    pub duration: Duration,
    pub poll_interval: Duration,
    pub launch_stagger: Duration,
    pub join_timeout: Duration,
    pub cancel_grace: Duration,
    pub strategy: LoopConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            instruments: Vec::new(),
            start_offset: Duration::ZERO,
            duration: Duration::from_secs(600),
            poll_interval: Duration::from_secs(1),
            launch_stagger: Duration::from_secs(1),
            join_timeout: Duration::from_secs(30),
            cancel_grace: Duration::from_secs(5),
            strategy: LoopConfig::default(),
        }
    }
}

/// How a strategy loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopStatus {
    /// Returned normally (including after a shutdown request)
    Finished(LoopOutcome),
    /// Returned an error
    Failed(StrategyError),
    /// Task panicked
    Panicked(String),
    /// Still running when the grace period ran out; left detached
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopReport {
    pub instrument: InstrumentId,
    pub status: LoopStatus,
}

impl LoopReport {
    pub fn outcome(&self) -> Option<&LoopOutcome> {
        match &self.status {
            LoopStatus::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }
}

/// Result of a whole session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub window: SessionWindow,
    pub loops: Vec<LoopReport>,
    /// Safety-net unwind per instrument, in instrument order
    pub safety_net: Vec<UnwindReport>,
    /// Instruments whose safety-net unwind failed
    pub safety_net_failures: Vec<(InstrumentId, StrategyError)>,
    /// Positions still open after the safety net
    pub residual_positions: Vec<PortfolioItem>,
    pub total_trades: u64,
    pub initial_realized_pl: Decimal,
    pub final_realized_pl: Decimal,
    pub final_buying_power: Decimal,
}

impl SessionReport {
    /// Realized P&L produced during the session
    pub fn pnl_delta(&self) -> Decimal {
        self.final_realized_pl - self.initial_realized_pl
    }

    fn count(&self, pred: impl Fn(&LoopStatus) -> bool) -> usize {
        self.loops.iter().filter(|l| pred(&l.status)).count()
    }

    pub fn abandoned(&self) -> usize {
        self.count(|s| matches!(s, LoopStatus::Abandoned))
    }

    pub fn is_flat(&self) -> bool {
        self.residual_positions.is_empty()
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let done = self.count(|s| {
            matches!(s, LoopStatus::Finished(o) if o.final_state == LoopState::Done)
        });
        let cancelled = self.count(|s| {
            matches!(s, LoopStatus::Finished(o) if o.final_state == LoopState::Cancelled)
        });
        let failed = self.count(|s| matches!(s, LoopStatus::Failed(_) | LoopStatus::Panicked(_)));

        writeln!(
            f,
            "session {} .. {}",
            self.window.start().format("%H:%M:%S"),
            self.window.end().format("%H:%M:%S")
        )?;
        writeln!(
            f,
            "loops: {} done, {} cancelled, {} failed, {} abandoned",
            done,
            cancelled,
            failed,
            self.abandoned()
        )?;
        writeln!(f, "trades: {}", self.total_trades)?;
        for item in &self.residual_positions {
            writeln!(
                f,
                "residual {}: long {} short {}",
                item.instrument_id, item.long_shares, item.short_shares
            )?;
        }
        writeln!(f, "final bp: {}", self.final_buying_power)?;
        write!(f, "final profits/losses: {}", self.pnl_delta())
    }
}

/// Runs one trading session across instruments
pub struct SessionOrchestrator {
    gateway: Arc<dyn OrderGateway>,
    oracle: Arc<dyn ForecastOracle>,
    config: OrchestratorConfig,
}

impl SessionOrchestrator {
    pub fn new(
        gateway: Arc<dyn OrderGateway>,
        oracle: Arc<dyn ForecastOracle>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            gateway,
            oracle,
            config,
        }
    }

    pub async fn run(&self) -> SessionResult<SessionReport> {
        let window = self.session_window().await?;
        info!(
            "[session] Window {} .. {}",
            window.start().format("%Y-%m-%d %H:%M:%S"),
            window.end().format("%H:%M:%S")
        );

        self.wait_until(|now| window.has_started(now), "market open")
            .await?;

        let initial_realized_pl = self.gateway.portfolio_summary().await?.total_realized_pl;
        let instruments = self.instruments().await?;
        let counter = TradeCounter::new();
        let (shutdown_tx, _) = broadcast::channel(instruments.len());

        info!(
            "[session] START: {} instruments, initial P&L {}",
            instruments.len(),
            initial_realized_pl
        );
        let handles = self
            .launch(&instruments, window, &counter, &shutdown_tx)
            .await;

        self.wait_until(|now| window.has_ended(now), "session end")
            .await?;

        let loops = self.join(handles, &shutdown_tx).await;

        let (safety_net, safety_net_failures) = self.safety_net(&instruments).await;

        let mut residual_positions = Vec::new();
        for instrument in &instruments {
            match self.gateway.portfolio_item(instrument).await {
                Ok(item) if !item.is_flat() => {
                    warn!(
                        "[{}] Position not flat after unwind: long {} short {}",
                        instrument, item.long_shares, item.short_shares
                    );
                    residual_positions.push(item);
                }
                Ok(_) => {}
                Err(e) => warn!("[{}] Could not check final position: {}", instrument, e),
            }
        }

        let summary = self.gateway.portfolio_summary().await?;
        let report = SessionReport {
            window,
            loops,
            safety_net,
            safety_net_failures,
            residual_positions,
            total_trades: counter.get(),
            initial_realized_pl,
            final_realized_pl: summary.total_realized_pl,
            final_buying_power: summary.total_buying_power,
        };
        info!(
            "[session] END: {} trades, final bp {}, P&L {}",
            report.total_trades,
            report.final_buying_power,
            report.pnl_delta()
        );
        Ok(report)
    }

    async fn session_window(&self) -> SessionResult<SessionWindow> {
        let now = self.gateway.last_trade_time().await?;
        let start = now
            .checked_add_signed(to_chrono(self.config.start_offset))
            .ok_or_else(|| {
                SessionError::WindowOutOfRange(format!(
                    "start offset {:?} from {}",
                    self.config.start_offset, now
                ))
            })?;
        SessionWindow::starting_at(start, to_chrono(self.config.duration)).ok_or_else(|| {
            SessionError::WindowOutOfRange(format!(
                "duration {:?} from {}",
                self.config.duration, start
            ))
        })
    }

    /// Poll venue time until `reached` holds
    async fn wait_until(
        &self,
        reached: impl Fn(Timestamp) -> bool,
        what: &str,
    ) -> SessionResult<()> {
        loop {
            let now = self.gateway.last_trade_time().await?;
            if reached(now) {
                return Ok(());
            }
            debug!("[session] Waiting for {} (venue time {})", what, now);
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn instruments(&self) -> SessionResult<Vec<InstrumentId>> {
        let instruments = if self.config.instruments.is_empty() {
            self.gateway.stock_list().await?
        } else {
            self.config.instruments.clone()
        };
        if instruments.is_empty() {
            return Err(SessionError::NoInstruments);
        }
        Ok(instruments)
    }

    async fn launch(
        &self,
        instruments: &[InstrumentId],
        window: SessionWindow,
        counter: &TradeCounter,
        shutdown_tx: &broadcast::Sender<()>,
    ) -> Vec<(InstrumentId, JoinHandle<StrategyResult<LoopOutcome>>)> {
        let mut handles = Vec::with_capacity(instruments.len());
        for (i, instrument) in instruments.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.launch_stagger).await;
            }
            let strategy = StrategyLoop::new(
                instrument.clone(),
                self.gateway.clone(),
                self.oracle.clone(),
                counter.clone(),
                window,
                self.config.strategy,
                ShutdownSignal::new(shutdown_tx.subscribe()),
            );
            info!("[{}] Launching strategy loop", instrument);
            handles.push((instrument.clone(), tokio::spawn(strategy.run())));
        }
        handles
    }

    async fn join(
        &self,
        handles: Vec<(InstrumentId, JoinHandle<StrategyResult<LoopOutcome>>)>,
        shutdown_tx: &broadcast::Sender<()>,
    ) -> Vec<LoopReport> {
        let mut shutdown_sent = false;
        let mut loops = Vec::with_capacity(handles.len());

        for (instrument, mut handle) in handles {
            let wait = if shutdown_sent {
                self.config.cancel_grace
            } else {
                self.config.join_timeout
            };

            let status = match tokio::time::timeout(wait, &mut handle).await {
                Ok(result) => classify(&instrument, result),
                Err(_) if !shutdown_sent => {
                    warn!(
                        "[{}] Loop still running after {:?}, broadcasting shutdown",
                        instrument, wait
                    );
                    shutdown_tx.send(()).ok();
                    shutdown_sent = true;
                    match tokio::time::timeout(self.config.cancel_grace, &mut handle).await {
                        Ok(result) => classify(&instrument, result),
                        Err(_) => abandon(&instrument),
                    }
                }
                Err(_) => abandon(&instrument),
            };
            loops.push(LoopReport { instrument, status });
        }
        loops
    }

    async fn safety_net(
        &self,
        instruments: &[InstrumentId],
    ) -> (Vec<UnwindReport>, Vec<(InstrumentId, StrategyError)>) {
        let unwinder = PositionUnwinder::new(self.gateway.clone(), self.config.strategy.unwind);
        let mut reports = Vec::with_capacity(instruments.len());
        let mut failures = Vec::new();

        for instrument in instruments {
            let result = match unwinder.cancel_orders(instrument).await {
                Ok(cancelled) => unwinder
                    .close_positions(instrument)
                    .await
                    .map(|closed| cancelled.merge(closed)),
                Err(e) => Err(e),
            };
            match result {
                Ok(report) => {
                    info!(
                        "[{}] Safety net: {} cancelled, {} closing orders",
                        instrument,
                        report.cancelled,
                        report.submitted()
                    );
                    reports.push(report);
                }
                Err(e) => {
                    error!("[{}] Safety net unwind failed: {}", instrument, e);
                    failures.push((instrument.clone(), e));
                }
            }
        }
        (reports, failures)
    }
}

fn classify(
    instrument: &InstrumentId,
    result: Result<StrategyResult<LoopOutcome>, JoinError>,
) -> LoopStatus {
    match result {
        Ok(Ok(outcome)) => LoopStatus::Finished(outcome),
        Ok(Err(e)) => {
            error!("[{}] Strategy loop failed: {}", instrument, e);
            LoopStatus::Failed(e)
        }
        Err(e) => {
            error!("[{}] Strategy task panicked: {}", instrument, e);
            LoopStatus::Panicked(e.to_string())
        }
    }
}

fn abandon(instrument: &InstrumentId) -> LoopStatus {
    warn!("[{}] Loop did not stop within the grace period, abandoning", instrument);
    LoopStatus::Abandoned
}

fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_chrono() {
        assert_eq!(
            to_chrono(Duration::from_millis(1_500)),
            chrono::Duration::milliseconds(1_500)
        );
        assert_eq!(to_chrono(Duration::MAX), chrono::Duration::MAX);
    }
}
