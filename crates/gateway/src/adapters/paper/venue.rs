use async_trait::async_trait;
use hermes_core::{
    BestPrice, InstrumentId, Order, OrderId, OrderStatus, PortfolioItem, PortfolioSummary, Price,
    Shares, Side, Timestamp, lots_to_shares,
};
use hermes_ports::{Clock, GatewayError, GatewayResult, OrderGateway};
use log::{debug, info, warn};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::PaperVenueConfig;
use super::account::Account;
use super::feed::{QuoteFeed, WalkParams};

/// Terminal record of an order processed by the paper venue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub order: Order,
    pub status: OrderStatus,
    /// Fill price, for filled orders
    pub price: Option<Price>,
    /// Venue time at which the order reached its terminal state
    pub at: Timestamp,
}

#[derive(Debug, Clone)]
struct RestingOrder {
    order: Order,
    due: Timestamp,
}

struct VenueState {
    feeds: BTreeMap<InstrumentId, QuoteFeed>,
    params: WalkParams,
    rng: StdRng,
    account: Account,
    fill_delay: chrono::Duration,
    resting: Vec<RestingOrder>,
    executions: Vec<Execution>,
    /// Number of upcoming calls that fail as if the venue were unreachable
    outage_calls: usize,
}

impl VenueState {
    /// Fill every resting order whose delay has elapsed
    fn settle(&mut self, now: Timestamp) {
        if self.resting.is_empty() {
            return;
        }
        let (due, pending): (Vec<_>, Vec<_>) =
            self.resting.drain(..).partition(|r| r.due <= now);
        self.resting = pending;
        for resting in due {
            self.execute(resting.order, now);
        }
    }

    fn execute(&mut self, order: Order, now: Timestamp) {
        let quote = self
            .feeds
            .get(&order.instrument_id)
            .map(QuoteFeed::current)
            .unwrap_or_default();
        let price = match order.side {
            Side::Buy => quote.ask_price,
            Side::Sell => quote.bid_price,
        };
        let shares: Shares = lots_to_shares(order.lots);

        let (status, price) = match self
            .account
            .fill(&order.instrument_id, order.side, shares, price)
        {
            Ok(()) => {
                debug!(
                    "[paper] Filled {} {} x {} @ {}",
                    order.side, order.instrument_id, order.lots, price
                );
                (OrderStatus::Filled, Some(price))
            }
            Err(reason) => {
                warn!(
                    "[paper] Order {} {} x {} not executed: {}",
                    order.side, order.instrument_id, order.lots, reason
                );
                (OrderStatus::Rejected, None)
            }
        };

        self.executions.push(Execution {
            order,
            status,
            price,
            at: now,
        });
    }

    fn feed_mut(&mut self, instrument: &InstrumentId) -> GatewayResult<&mut QuoteFeed> {
        self.feeds
            .get_mut(instrument)
            .ok_or_else(|| GatewayError::UnknownInstrument(instrument.to_string()))
    }
}

/// In-memory venue implementing [`OrderGateway`]
///
/// All state sits behind one mutex, so concurrent calls from many strategy
/// tasks are serialized. Venue time comes from the injected [`Clock`].
pub struct PaperVenue {
    clock: Arc<dyn Clock>,
    state: Mutex<VenueState>,
}

impl PaperVenue {
    /// Create a venue whose quotes follow a random walk
    pub fn new(config: PaperVenueConfig, clock: Arc<dyn Clock>) -> Self {
        let params = WalkParams {
            volatility: config.volatility,
            half_spread: config.half_spread,
            displayed_size: config.displayed_size,
        };
        let feeds = config
            .instruments
            .iter()
            .map(|seed| {
                (
                    InstrumentId::new(&seed.symbol),
                    QuoteFeed::walk(seed.initial_price, &params),
                )
            })
            .collect();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!(
            "[paper] Venue ready: {} instruments, buying power {}",
            config.instruments.len(),
            config.initial_buying_power
        );

        Self::from_parts(
            clock,
            feeds,
            params,
            rng,
            config.initial_buying_power,
            config.fill_delay_ms,
        )
    }

    /// Create a venue that replays a fixed quote sequence per instrument
    ///
    /// Each `best_price` request moves that instrument to its next quote;
    /// the last quote repeats once the script is exhausted.
    pub fn replay<I, S>(scripts: I, initial_buying_power: Decimal, clock: Arc<dyn Clock>) -> Self
    where
        I: IntoIterator<Item = (S, Vec<BestPrice>)>,
        S: Into<InstrumentId>,
    {
        let defaults = PaperVenueConfig::default();
        let params = WalkParams {
            volatility: defaults.volatility,
            half_spread: defaults.half_spread,
            displayed_size: defaults.displayed_size,
        };
        let feeds = scripts
            .into_iter()
            .map(|(id, quotes)| (id.into(), QuoteFeed::replay(quotes)))
            .collect();

        Self::from_parts(
            clock,
            feeds,
            params,
            StdRng::seed_from_u64(0),
            initial_buying_power,
            0,
        )
    }

    fn from_parts(
        clock: Arc<dyn Clock>,
        feeds: BTreeMap<InstrumentId, QuoteFeed>,
        params: WalkParams,
        rng: StdRng,
        buying_power: Decimal,
        fill_delay_ms: u64,
    ) -> Self {
        Self {
            clock,
            state: Mutex::new(VenueState {
                feeds,
                params,
                rng,
                account: Account::new(buying_power),
                fill_delay: chrono::Duration::milliseconds(fill_delay_ms as i64),
                resting: Vec::new(),
                executions: Vec::new(),
                outage_calls: 0,
            }),
        }
    }

    /// Change how long market orders rest before filling
    pub fn set_fill_delay(&self, delay: chrono::Duration) {
        self.state.lock().fill_delay = delay;
    }

    /// Overwrite the position held in an instrument
    pub fn seed_position(
        &self,
        instrument: impl Into<InstrumentId>,
        long_shares: Shares,
        short_shares: Shares,
        price: Price,
    ) {
        let instrument = instrument.into();
        let mut item = PortfolioItem::flat(instrument);
        item.long_shares = long_shares;
        item.short_shares = short_shares;
        if long_shares > 0 {
            item.long_price = price;
        }
        if short_shares > 0 {
            item.short_price = price;
        }
        self.state.lock().account.set_position(item);
    }

    /// Make the next `calls` gateway calls fail with `GatewayError::Unavailable`
    pub fn inject_outage(&self, calls: usize) {
        self.state.lock().outage_calls = calls;
    }

    /// Every order that reached a terminal state, in processing order
    pub fn executions(&self) -> Vec<Execution> {
        self.state.lock().executions.clone()
    }

    /// Filled orders only
    pub fn fills(&self) -> Vec<Execution> {
        self.executions()
            .into_iter()
            .filter(|e| e.status == OrderStatus::Filled)
            .collect()
    }

    /// Run `op` against settled venue state at the current venue time
    fn with_state<T>(
        &self,
        op: impl FnOnce(&mut VenueState, Timestamp) -> GatewayResult<T>,
    ) -> GatewayResult<T> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        if state.outage_calls > 0 {
            state.outage_calls -= 1;
            return Err(GatewayError::Unavailable("paper venue outage".to_string()));
        }
        state.settle(now);
        op(&mut state, now)
    }
}

#[async_trait]
impl OrderGateway for PaperVenue {
    async fn last_trade_time(&self) -> GatewayResult<Timestamp> {
        self.with_state(|_, now| Ok(now))
    }

    async fn best_price(&self, instrument: &InstrumentId) -> GatewayResult<BestPrice> {
        self.with_state(|state, _| {
            let params = state.params;
            let VenueState { feeds, rng, .. } = state;
            let feed = feeds
                .get_mut(instrument)
                .ok_or_else(|| GatewayError::UnknownInstrument(instrument.to_string()))?;
            Ok(feed.advance(rng, &params))
        })
    }

    async fn submit_order(&self, order: Order) -> GatewayResult<OrderId> {
        self.with_state(|state, now| {
            state.feed_mut(&order.instrument_id)?;
            if order.lots == 0 {
                return Err(GatewayError::Rejected(
                    "order size must be at least one lot".to_string(),
                ));
            }

            let id = order.id;
            if state.fill_delay <= chrono::Duration::zero() {
                state.execute(order, now);
            } else {
                let due = now + state.fill_delay;
                state.resting.push(RestingOrder { order, due });
            }
            Ok(id)
        })
    }

    async fn submit_cancellation(&self, order: &Order) -> GatewayResult<()> {
        self.with_state(|state, now| {
            let index = state
                .resting
                .iter()
                .position(|r| r.order.id == order.id)
                .ok_or(GatewayError::OrderNotFound(order.id))?;
            let resting = state.resting.remove(index);
            state.executions.push(Execution {
                order: resting.order,
                status: OrderStatus::Canceled,
                price: None,
                at: now,
            });
            Ok(())
        })
    }

    async fn waiting_list(&self) -> GatewayResult<Vec<Order>> {
        self.with_state(|state, _| Ok(state.resting.iter().map(|r| r.order.clone()).collect()))
    }

    async fn portfolio_item(&self, instrument: &InstrumentId) -> GatewayResult<PortfolioItem> {
        self.with_state(|state, _| {
            state.feed_mut(instrument)?;
            Ok(state.account.position(instrument))
        })
    }

    async fn portfolio_summary(&self) -> GatewayResult<PortfolioSummary> {
        self.with_state(|state, _| Ok(state.account.summary()))
    }

    async fn stock_list(&self) -> GatewayResult<Vec<InstrumentId>> {
        self.with_state(|state, _| Ok(state.feeds.keys().cloned().collect()))
    }
}
