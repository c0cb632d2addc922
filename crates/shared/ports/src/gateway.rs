use async_trait::async_trait;
use hermes_core::{
    BestPrice, InstrumentId, Order, OrderId, PortfolioItem, PortfolioSummary, Timestamp,
};

use crate::error::GatewayResult;

/// Port for market data and order execution against a venue
///
/// Implementations must serialize concurrent calls themselves: strategy loops
/// for different instruments call into the same gateway from separate tasks
/// without any client-side locking.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Time of the last trade seen by the venue (the session clock)
    async fn last_trade_time(&self) -> GatewayResult<Timestamp>;

    /// Current top of book for an instrument
    async fn best_price(&self, instrument: &InstrumentId) -> GatewayResult<BestPrice>;

    /// Submit an order; the venue owns it afterwards
    async fn submit_order(&self, order: Order) -> GatewayResult<OrderId>;

    /// Request cancellation of a resting order
    async fn submit_cancellation(&self, order: &Order) -> GatewayResult<()>;

    /// Orders submitted but not yet filled or cancelled
    async fn waiting_list(&self) -> GatewayResult<Vec<Order>>;

    /// Position and realized P&L for one instrument
    async fn portfolio_item(&self, instrument: &InstrumentId) -> GatewayResult<PortfolioItem>;

    /// Account-wide realized P&L and buying power
    async fn portfolio_summary(&self) -> GatewayResult<PortfolioSummary>;

    /// Instruments tradeable in this session
    async fn stock_list(&self) -> GatewayResult<Vec<InstrumentId>>;
}
