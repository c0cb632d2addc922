use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::values::{Lots, Price};

/// Top of book for one instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BestPrice {
    pub bid_price: Price,
    pub ask_price: Price,
    /// Displayed size at the best bid, in lots
    pub bid_size: Lots,
    /// Displayed size at the best ask, in lots
    pub ask_size: Lots,
}

impl BestPrice {
    pub fn new(bid_price: Price, ask_price: Price, bid_size: Lots, ask_size: Lots) -> Self {
        Self {
            bid_price,
            ask_price,
            bid_size,
            ask_size,
        }
    }

    /// True when both sides carry a positive price
    pub fn is_two_sided(&self) -> bool {
        self.bid_price > Decimal::ZERO && self.ask_price > Decimal::ZERO
    }

    /// Average of best bid and best ask, if both sides are quoted
    pub fn mid_price(&self) -> Option<Price> {
        if !self.is_two_sided() {
            return None;
        }
        Some((self.bid_price + self.ask_price) / Decimal::TWO)
    }

    /// Ask minus bid
    pub fn spread(&self) -> Price {
        self.ask_price - self.bid_price
    }
}
