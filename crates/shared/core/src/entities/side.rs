use serde::{Deserialize, Serialize};

/// Market order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Market buy - lifts the best ask
    Buy,
    /// Market sell - hits the best bid
    Sell,
}

impl Side {
    /// Returns the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Verb used in status lines ("Buying", "Selling")
    pub fn verb(&self) -> &'static str {
        match self {
            Side::Buy => "Buying",
            Side::Sell => "Selling",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "MARKET_BUY"),
            Side::Sell => write!(f, "MARKET_SELL"),
        }
    }
}
