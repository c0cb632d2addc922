//! End-of-session cleanup for one instrument
//!
//! Cancels the instrument's resting orders and flattens its long and short
//! exposure with market orders, optionally split into size-capped batches.
//! Both operations read venue state before acting, so running them again
//! after a successful pass submits nothing.

use hermes_core::{
    InstrumentId, LOT_SIZE, Lots, Order, Shares, Side, lots_to_shares, shares_to_lots,
};
use hermes_ports::{GatewayError, OrderGateway};
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::error::StrategyResult;

/// One flattening order and the share slice it covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnwindOrder {
    pub order: Order,
    pub shares: Shares,
}

/// What one unwind call did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnwindReport {
    pub instrument: InstrumentId,
    /// Resting orders cancelled
    pub cancelled: usize,
    /// Flattening orders submitted, in submission order
    pub orders: Vec<UnwindOrder>,
}

impl UnwindReport {
    pub fn new(instrument: InstrumentId) -> Self {
        Self {
            instrument,
            cancelled: 0,
            orders: Vec::new(),
        }
    }

    /// Combine a cancel pass and a close pass for the same instrument
    pub fn merge(mut self, other: UnwindReport) -> Self {
        self.cancelled += other.cancelled;
        self.orders.extend(other.orders);
        self
    }

    pub fn submitted(&self) -> usize {
        self.orders.len()
    }

    /// Shares covered by submitted orders on one side
    pub fn shares(&self, side: Side) -> Shares {
        self.orders
            .iter()
            .filter(|o| o.order.side == side)
            .map(|o| o.shares)
            .sum()
    }
}

/// Unwinder settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnwindConfig {
    /// Pause after each cancellation or submission
    pub settle_delay: Duration,
    /// Max shares per flattening order; `None` closes each side in one order
    pub batch_shares: Option<Shares>,
}

impl Default for UnwindConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(1),
            batch_shares: None,
        }
    }
}

/// Split `total` shares into slices of at most `batch` shares
pub fn plan_slices(total: Shares, batch: Option<Shares>) -> Vec<Shares> {
    let batch = match batch {
        Some(b) if b > 0 => b,
        _ => return if total > 0 { vec![total] } else { Vec::new() },
    };

    let mut slices = Vec::with_capacity(total.div_ceil(batch) as usize);
    let mut remaining = total;
    while remaining > 0 {
        let slice = remaining.min(batch);
        slices.push(slice);
        remaining -= slice;
    }
    slices
}

/// Lots to submit for each slice of `total` shares
///
/// Lots follow the running share total, so sub-lot slices accumulate into
/// whole lots and the sum never exceeds what `total` holds in whole lots. A
/// trailing odd lot is left unsubmitted.
pub fn plan_lots(total: Shares, batch: Option<Shares>) -> Vec<Lots> {
    let mut covered = 0;
    let mut sent = 0;
    plan_slices(total, batch)
        .into_iter()
        .filter_map(|slice| {
            covered += slice;
            let lots = shares_to_lots(covered) - sent;
            sent += lots;
            (lots > 0).then_some(lots)
        })
        .collect()
}

/// Cancels resting orders and flattens positions through the gateway
pub struct PositionUnwinder {
    gateway: Arc<dyn OrderGateway>,
    config: UnwindConfig,
}

impl PositionUnwinder {
    pub fn new(gateway: Arc<dyn OrderGateway>, config: UnwindConfig) -> Self {
        Self { gateway, config }
    }

    pub fn config(&self) -> UnwindConfig {
        self.config
    }

    /// Cancel every waiting order for `instrument`
    ///
    /// An order that filled between listing and cancelling is skipped.
    pub async fn cancel_orders(&self, instrument: &InstrumentId) -> StrategyResult<UnwindReport> {
        let mut report = UnwindReport::new(instrument.clone());
        let waiting = self.gateway.waiting_list().await?;

        for order in waiting.iter().filter(|o| &o.instrument_id == instrument) {
            match self.gateway.submit_cancellation(order).await {
                Ok(()) => {
                    info!("[{}] Cancelled order {}", instrument, order.id);
                    report.cancelled += 1;
                }
                Err(GatewayError::OrderNotFound(id)) => {
                    warn!("[{}] Order {} already gone, skipping", instrument, id);
                }
                Err(e) => return Err(e.into()),
            }
            tokio::time::sleep(self.config.settle_delay).await;
        }

        Ok(report)
    }

    /// Flatten long and short exposure in `instrument`
    ///
    /// Position is read once; fills that fall short (buying power, liquidity)
    /// are not retried and show up as residual position.
    pub async fn close_positions(&self, instrument: &InstrumentId) -> StrategyResult<UnwindReport> {
        let mut report = UnwindReport::new(instrument.clone());
        let item = self.gateway.portfolio_item(instrument).await?;

        if item.long_shares > 0 {
            info!(
                "[{}] Closing long position: {} shares",
                instrument, item.long_shares
            );
            self.flatten(instrument, Side::Sell, item.long_shares, &mut report)
                .await?;
        }

        if item.short_shares > 0 {
            info!(
                "[{}] Closing short position: {} shares",
                instrument, item.short_shares
            );
            self.flatten(instrument, Side::Buy, item.short_shares, &mut report)
                .await?;
        }

        Ok(report)
    }

    async fn flatten(
        &self,
        instrument: &InstrumentId,
        side: Side,
        shares: Shares,
        report: &mut UnwindReport,
    ) -> StrategyResult<()> {
        for lots in plan_lots(shares, self.config.batch_shares) {
            let order = Order::market(side, instrument.clone(), lots);
            info!("[{}] {} {} lots", instrument, side.verb(), lots);
            self.gateway.submit_order(order.clone()).await?;
            report.orders.push(UnwindOrder {
                order,
                shares: lots_to_shares(lots),
            });
            tokio::time::sleep(self.config.settle_delay).await;
        }

        let odd = shares % LOT_SIZE;
        if odd > 0 {
            warn!(
                "[{}] {} odd-lot shares left, orders trade whole lots only",
                instrument, odd
            );
        }
        Ok(())
    }
}
