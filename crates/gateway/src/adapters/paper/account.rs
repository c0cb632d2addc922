//! Cash and position book of the paper venue

use hermes_core::{InstrumentId, PortfolioItem, PortfolioSummary, Price, Shares, Side};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use thiserror::Error;

/// Why a fill was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum FillRejection {
    #[error("insufficient buying power (needed {needed}, available {available})")]
    InsufficientBuyingPower { needed: Decimal, available: Decimal },
}

/// Single trading account with separate long and short books per instrument
///
/// A buy first covers short shares and only the remainder opens long; a sell
/// first reduces long shares and only the remainder opens short. Opening
/// exposure on either side consumes buying power at the fill price; closing
/// releases the entry notional plus the realized P&L.
#[derive(Debug, Clone)]
pub(crate) struct Account {
    buying_power: Decimal,
    positions: BTreeMap<InstrumentId, PortfolioItem>,
}

impl Account {
    pub fn new(buying_power: Decimal) -> Self {
        Self {
            buying_power,
            positions: BTreeMap::new(),
        }
    }

    pub fn position(&self, instrument: &InstrumentId) -> PortfolioItem {
        self.positions
            .get(instrument)
            .cloned()
            .unwrap_or_else(|| PortfolioItem::flat(instrument.clone()))
    }

    pub fn summary(&self) -> PortfolioSummary {
        PortfolioSummary {
            total_realized_pl: self.positions.values().map(|p| p.realized_pl).sum(),
            total_buying_power: self.buying_power,
            total_shares: self
                .positions
                .values()
                .map(|p| p.long_shares + p.short_shares)
                .sum(),
        }
    }

    /// Overwrite a position (paper-venue setup only)
    pub fn set_position(&mut self, item: PortfolioItem) {
        self.positions.insert(item.instrument_id.clone(), item);
    }

    /// Apply a fill of `shares` at `price`, or refuse it without side effects
    pub fn fill(
        &mut self,
        instrument: &InstrumentId,
        side: Side,
        shares: Shares,
        price: Price,
    ) -> Result<(), FillRejection> {
        let mut item = self.position(instrument);

        let (closing, opening) = match side {
            Side::Buy => {
                let cover = shares.min(item.short_shares);
                (cover, shares - cover)
            }
            Side::Sell => {
                let reduce = shares.min(item.long_shares);
                (reduce, shares - reduce)
            }
        };

        let closing_qty = Decimal::from(closing);
        let opening_qty = Decimal::from(opening);

        let (entry_price, pnl) = match side {
            Side::Buy => (item.short_price, (item.short_price - price) * closing_qty),
            Side::Sell => (item.long_price, (price - item.long_price) * closing_qty),
        };
        let released = entry_price * closing_qty + pnl;
        let needed = price * opening_qty;
        let available = self.buying_power + released;
        if needed > available {
            return Err(FillRejection::InsufficientBuyingPower { needed, available });
        }

        match side {
            Side::Buy => {
                item.short_shares -= closing;
                if item.short_shares == 0 {
                    item.short_price = Decimal::ZERO;
                }
                item.long_price = weighted_price(item.long_price, item.long_shares, price, opening);
                item.long_shares += opening;
            }
            Side::Sell => {
                item.long_shares -= closing;
                if item.long_shares == 0 {
                    item.long_price = Decimal::ZERO;
                }
                item.short_price =
                    weighted_price(item.short_price, item.short_shares, price, opening);
                item.short_shares += opening;
            }
        }

        item.realized_pl += pnl;
        self.buying_power = available - needed;
        self.positions.insert(instrument.clone(), item);
        Ok(())
    }
}

fn weighted_price(price: Price, shares: Shares, add_price: Price, add_shares: Shares) -> Price {
    let total = shares + add_shares;
    if total == 0 {
        return Decimal::ZERO;
    }
    (price * Decimal::from(shares) + add_price * Decimal::from(add_shares)) / Decimal::from(total)
}
