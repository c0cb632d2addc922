use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Side;
use crate::instruments::InstrumentId;
use crate::values::Lots;

/// Unique identifier for an order
pub type OrderId = Uuid;

/// A market order as submitted to the venue
///
/// Once submitted the venue owns the order; the client can only cancel it
/// while it is still resting in the waiting list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// The instrument being traded
    pub instrument_id: InstrumentId,
    pub side: Side,
    /// Quantity in lots (1 lot = 100 shares)
    pub lots: Lots,
}

impl Order {
    /// Create a new market order
    pub fn market(side: Side, instrument_id: impl Into<InstrumentId>, lots: Lots) -> Self {
        Self {
            id: Uuid::new_v4(),
            instrument_id: instrument_id.into(),
            side,
            lots,
        }
    }

    /// Create a market buy order
    pub fn market_buy(instrument_id: impl Into<InstrumentId>, lots: Lots) -> Self {
        Self::market(Side::Buy, instrument_id, lots)
    }

    /// Create a market sell order
    pub fn market_sell(instrument_id: impl Into<InstrumentId>, lots: Lots) -> Self {
        Self::market(Side::Sell, instrument_id, lots)
    }

    /// Get the symbol as a string slice
    pub fn symbol(&self) -> &str {
        self.instrument_id.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_constructors() {
        let buy = Order::market_buy("AAPL", 5);
        assert_eq!(buy.side, Side::Buy);
        assert_eq!(buy.lots, 5);
        assert_eq!(buy.symbol(), "AAPL");

        let sell = Order::market_sell("AAPL", 5);
        assert_eq!(sell.side, Side::Sell);
        assert_ne!(buy.id, sell.id);
    }
}
