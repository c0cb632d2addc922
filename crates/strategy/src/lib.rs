//! Hermes Strategy
//!
//! Per-instrument trading logic for the Hermes client:
//! - Rolling price windows owned by each loop
//! - An ARIMA-style forecaster behind the `ForecastOracle` port
//! - The forecasting loop and its session lifecycle
//! - Position unwind (order cancellation and batched flattening)
//! - A shared trade counter and cooperative shutdown
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────┐
//!  best_price ───►│ PriceWindow  │ (one per loop)
//!                 └──────┬───────┘
//!                        │ log series
//!                 ┌──────▼───────┐
//!                 │ForecastOracle│
//!                 └──────┬───────┘
//!                        │ Signal
//!                 ┌──────▼───────┐      ┌──────────────┐
//!                 │ StrategyLoop │─────►│ TradeCounter │ (shared)
//!                 └──────┬───────┘      └──────────────┘
//!        submit_order    │  session end
//!                 ┌──────▼───────────┐
//!                 │ PositionUnwinder │
//!                 └──────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hermes_strategy::{LoopConfig, ShutdownSignal, StrategyLoop, TradeCounter};
//!
//! let strategy = StrategyLoop::new(
//!     InstrumentId::new("AAPL"),
//!     gateway,
//!     oracle,
//!     TradeCounter::new(),
//!     session,
//!     LoopConfig::default(),
//!     ShutdownSignal::never(),
//! );
//! let outcome = strategy.run().await?;
//! ```

pub mod counter;
pub mod error;
pub mod oracle;
pub mod shutdown;
pub mod strategy_loop;
pub mod unwind;
pub mod window;

// Re-export main types
pub use counter::TradeCounter;
pub use error::{StrategyError, StrategyResult};
pub use oracle::{ArimaConfig, ArimaOracle, Signal};
pub use shutdown::ShutdownSignal;
pub use strategy_loop::{LoopConfig, LoopOutcome, LoopState, OracleFailurePolicy, StrategyLoop};
pub use unwind::{PositionUnwinder, UnwindConfig, UnwindOrder, UnwindReport, plan_lots, plan_slices};
pub use window::{DEFAULT_CAPACITY, PriceSample, PriceWindow};
