//! Paper venue adapter
//!
//! An in-memory venue for paper trading and tests. Quotes come from a
//! random walk or from a replayed script; market orders fill against the
//! current quote (buys at the ask, sells at the bid), either immediately or
//! after a configurable delay during which they rest in the waiting list.

mod account;
mod feed;
mod venue;

use hermes_core::{Lots, Price};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use venue::{Execution, PaperVenue};

/// Initial state of one paper instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSeed {
    pub symbol: String,
    pub initial_price: Price,
}

impl InstrumentSeed {
    pub fn new(symbol: impl Into<String>, initial_price: Price) -> Self {
        Self {
            symbol: symbol.into(),
            initial_price,
        }
    }
}

/// Paper venue configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperVenueConfig {
    /// Tradeable instruments and their starting mid prices
    pub instruments: Vec<InstrumentSeed>,
    /// Starting buying power of the account
    pub initial_buying_power: Decimal,
    /// Distance from mid to each side of the quote
    pub half_spread: Price,
    /// Max relative mid move per quote request (0.0005 = 0.05%)
    pub volatility: f64,
    /// Displayed size on each side, in lots
    pub displayed_size: Lots,
    /// How long a market order rests before it fills (0 = immediate)
    pub fill_delay_ms: u64,
    /// Random seed for reproducible quote paths
    pub seed: Option<u64>,
}

impl Default for PaperVenueConfig {
    fn default() -> Self {
        Self {
            instruments: vec![
                InstrumentSeed::new("AAPL", Decimal::new(18_500, 2)),
                InstrumentSeed::new("IBM", Decimal::new(16_500, 2)),
                InstrumentSeed::new("MSFT", Decimal::new(41_000, 2)),
            ],
            initial_buying_power: Decimal::from(1_000_000),
            half_spread: Decimal::new(1, 2),
            volatility: 0.0005,
            displayed_size: 10,
            fill_delay_ms: 0,
            seed: None,
        }
    }
}
