//! Integration test: full session lifecycle on the paper venue
//!
//! Runs under paused tokio time; venue time follows it, so sessions of
//! several simulated minutes finish instantly.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use hermes_clock::WorldClock;
use hermes_core::{
    BestPrice, InstrumentId, Order, OrderId, PortfolioItem, PortfolioSummary, Timestamp,
};
use hermes_gateway::{
    GatewayResult, InstrumentSeed, OrderGateway, PaperVenue, PaperVenueConfig,
};
use hermes_ports::{ForecastOracle, OracleResult};
use hermes_runner::{
    LoopStatus, OrchestratorConfig, SessionConfig, SessionError, SessionOrchestrator,
};
use hermes_strategy::{ArimaOracle, LoopConfig, LoopState};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;

fn open() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, 0).unwrap()
}

fn symbols() -> Vec<InstrumentId> {
    ["AAPL", "IBM", "MSFT"].into_iter().map(InstrumentId::new).collect()
}

fn walk_venue(seed: u64) -> Arc<PaperVenue> {
    let config = PaperVenueConfig {
        instruments: vec![
            InstrumentSeed::new("AAPL", dec!(185.00)),
            InstrumentSeed::new("IBM", dec!(165.00)),
            InstrumentSeed::new("MSFT", dec!(410.00)),
        ],
        initial_buying_power: dec!(10_000_000),
        seed: Some(seed),
        ..Default::default()
    };
    Arc::new(PaperVenue::new(config, WorldClock::new(Some(open()))))
}

/// Always forecasts the same value
struct Constant(f64);

impl ForecastOracle for Constant {
    fn forecast(&self, _: &[f64]) -> OracleResult<f64> {
        Ok(self.0)
    }
}

fn config(duration_secs: u64) -> OrchestratorConfig {
    OrchestratorConfig {
        duration: Duration::from_secs(duration_secs),
        strategy: LoopConfig {
            window_capacity: 5,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_zero_length_session_runs_safety_net_once_per_instrument() {
    let _ = env_logger::try_init();

    let venue = walk_venue(1);
    venue.seed_position("AAPL", 300, 0, dec!(180.00));
    venue.seed_position("MSFT", 0, 200, dec!(420.00));

    let orchestrator =
        SessionOrchestrator::new(venue.clone(), Arc::new(Constant(1.0)), config(0));
    let report = orchestrator.run().await.unwrap();

    assert_eq!(report.loops.len(), 3);
    for report in &report.loops {
        let outcome = report.outcome().unwrap();
        assert_eq!(outcome.ticks, 0);
        assert_eq!(outcome.final_state, LoopState::Done);
    }

    // One safety-net pass per instrument, in order, with nothing left to do
    let unwound: Vec<_> = report.safety_net.iter().map(|r| r.instrument.clone()).collect();
    assert_eq!(unwound, symbols());
    assert!(report.safety_net.iter().all(|r| r.submitted() == 0 && r.cancelled == 0));
    assert!(report.safety_net_failures.is_empty());

    assert_eq!(report.total_trades, 0);
    assert!(report.is_flat());
    // Seeded positions were flattened by the loops' own unwind
    assert_eq!(venue.fills().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_waits_for_market_open() {
    let venue = walk_venue(2);
    let mut config = config(10);
    config.start_offset = Duration::from_secs(120);

    let started = tokio::time::Instant::now();
    let orchestrator = SessionOrchestrator::new(venue.clone(), Arc::new(Constant(0.0)), config);
    let report = orchestrator.run().await.unwrap();

    assert_eq!(report.window.start(), open() + chrono::Duration::seconds(120));
    assert!(started.elapsed() >= Duration::from_secs(130));
    assert!(venue.executions().is_empty());
    assert_eq!(report.pnl_delta(), Decimal::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_session_trades_and_ends_flat() {
    let _ = env_logger::try_init();

    let venue = walk_venue(3);
    let orchestrator =
        SessionOrchestrator::new(venue.clone(), Arc::new(Constant(-1.0)), config(20));
    let report = orchestrator.run().await.unwrap();

    let loop_trades: u64 = report
        .loops
        .iter()
        .filter_map(|l| l.outcome())
        .map(|o| o.trades)
        .sum();
    assert!(report.total_trades > 0);
    assert_eq!(report.total_trades, loop_trades);
    assert!(report.is_flat());

    let summary = venue.portfolio_summary().await.unwrap();
    assert_eq!(report.final_realized_pl, summary.total_realized_pl);
    assert_eq!(report.pnl_delta(), summary.total_realized_pl);
    assert_eq!(report.final_buying_power, summary.total_buying_power);
    assert_eq!(summary.total_shares, 0);
}

#[tokio::test(start_paused = true)]
async fn test_arima_session_on_random_walk() {
    let venue = walk_venue(4);
    let oracle = Arc::new(ArimaOracle::default());
    let config = OrchestratorConfig {
        duration: Duration::from_secs(90),
        ..Default::default()
    };

    let report = SessionOrchestrator::new(venue.clone(), oracle, config)
        .run()
        .await
        .unwrap();

    for l in &report.loops {
        let outcome = l.outcome().unwrap();
        assert_eq!(outcome.final_state, LoopState::Done);
        assert!(outcome.ticks >= 85);
    }
    assert!(report.is_flat());
}

/// Gateway whose quotes never arrive for one instrument
struct Stalling {
    inner: Arc<PaperVenue>,
    stalled: InstrumentId,
}

#[async_trait]
impl OrderGateway for Stalling {
    async fn last_trade_time(&self) -> GatewayResult<Timestamp> {
        self.inner.last_trade_time().await
    }

    async fn best_price(&self, instrument: &InstrumentId) -> GatewayResult<BestPrice> {
        if instrument == &self.stalled {
            std::future::pending::<()>().await;
        }
        self.inner.best_price(instrument).await
    }

    async fn submit_order(&self, order: Order) -> GatewayResult<OrderId> {
        self.inner.submit_order(order).await
    }

    async fn submit_cancellation(&self, order: &Order) -> GatewayResult<()> {
        self.inner.submit_cancellation(order).await
    }

    async fn waiting_list(&self) -> GatewayResult<Vec<Order>> {
        self.inner.waiting_list().await
    }

    async fn portfolio_item(&self, instrument: &InstrumentId) -> GatewayResult<PortfolioItem> {
        self.inner.portfolio_item(instrument).await
    }

    async fn portfolio_summary(&self) -> GatewayResult<PortfolioSummary> {
        self.inner.portfolio_summary().await
    }

    async fn stock_list(&self) -> GatewayResult<Vec<InstrumentId>> {
        self.inner.stock_list().await
    }
}

#[tokio::test(start_paused = true)]
async fn test_stuck_loop_is_cancelled_after_join_timeout() {
    let _ = env_logger::try_init();

    let venue = walk_venue(5);
    let gateway = Arc::new(Stalling {
        inner: venue.clone(),
        stalled: InstrumentId::new("AAPL"),
    });

    let started = tokio::time::Instant::now();
    let report = SessionOrchestrator::new(gateway, Arc::new(Constant(1.0)), config(10))
        .run()
        .await
        .unwrap();

    let aapl = &report.loops[0];
    assert_eq!(aapl.instrument, InstrumentId::new("AAPL"));
    assert_eq!(
        aapl.outcome().map(|o| o.final_state),
        Some(LoopState::Cancelled)
    );
    for other in &report.loops[1..] {
        assert_eq!(other.outcome().map(|o| o.final_state), Some(LoopState::Done));
    }
    assert_eq!(report.abandoned(), 0);

    // Join timeout elapsed once, well short of a second full timeout
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(40));
    assert!(elapsed < Duration::from_secs(70));
    assert!(report.is_flat());
}

#[tokio::test(start_paused = true)]
async fn test_unknown_configured_instrument_fails_its_loop_only() {
    let venue = walk_venue(6);
    let mut config = config(5);
    config.instruments = vec![InstrumentId::new("IBM"), InstrumentId::new("TSLA")];

    let report = SessionOrchestrator::new(venue, Arc::new(Constant(0.0)), config)
        .run()
        .await
        .unwrap();

    assert!(matches!(report.loops[0].status, LoopStatus::Finished(_)));
    assert!(matches!(report.loops[1].status, LoopStatus::Failed(_)));

    // The unknown instrument cannot be unwound either
    assert_eq!(report.safety_net.len(), 1);
    assert_eq!(report.safety_net_failures.len(), 1);
    assert_eq!(report.safety_net_failures[0].0, InstrumentId::new("TSLA"));
}

#[tokio::test(start_paused = true)]
async fn test_venue_without_instruments() {
    let clock = WorldClock::fixed(open());
    let venue = PaperVenue::replay(Vec::<(&str, Vec<BestPrice>)>::new(), dec!(1_000), clock);

    let err = SessionOrchestrator::new(Arc::new(venue), Arc::new(Constant(0.0)), config(0))
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::NoInstruments));
}

#[tokio::test(start_paused = true)]
async fn test_unrepresentable_session_window_is_an_error() {
    let venue = walk_venue(8);
    let mut config = config(0);
    config.duration = Duration::MAX;

    let err = SessionOrchestrator::new(venue.clone(), Arc::new(Constant(1.0)), config)
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::WindowOutOfRange(_)));
    assert!(venue.executions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_session_config_drives_orchestrator() {
    let config: SessionConfig = hermes_runner::load_config_from_str(
        r#"{ "duration_secs": 0, "instruments": ["IBM"], "settle_delay_ms": 10 }"#,
    )
    .unwrap();
    config.validate().unwrap();

    let venue = walk_venue(7);
    let orchestrator = SessionOrchestrator::new(
        venue,
        Arc::new(Constant(0.0)),
        config.orchestrator_config(),
    );
    let report = orchestrator.run().await.unwrap();
    assert_eq!(report.loops.len(), 1);
    assert_eq!(report.safety_net.len(), 1);
    assert_eq!(report.loops[0].instrument, InstrumentId::new("IBM"));
}
