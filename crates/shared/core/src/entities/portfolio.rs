use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::instruments::InstrumentId;
use crate::values::{Price, Shares};

/// Venue-owned position in one instrument
///
/// Long and short exposure are reported separately, the way the venue
/// books them. Read-only to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub instrument_id: InstrumentId,
    pub long_shares: Shares,
    pub short_shares: Shares,
    /// Average entry price of the long shares
    pub long_price: Price,
    /// Average entry price of the short shares
    pub short_price: Price,
    /// Profit/loss booked from closed round trips
    pub realized_pl: Decimal,
}

impl PortfolioItem {
    /// An empty position
    pub fn flat(instrument_id: impl Into<InstrumentId>) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            long_shares: 0,
            short_shares: 0,
            long_price: Decimal::ZERO,
            short_price: Decimal::ZERO,
            realized_pl: Decimal::ZERO,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.long_shares == 0 && self.short_shares == 0
    }

    /// Long minus short shares
    pub fn net_shares(&self) -> i64 {
        self.long_shares as i64 - self.short_shares as i64
    }
}

/// Account-wide summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_realized_pl: Decimal,
    pub total_buying_power: Decimal,
    /// Total shares held across instruments (long plus short)
    pub total_shares: Shares,
}
