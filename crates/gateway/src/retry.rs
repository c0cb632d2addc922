//! Retry decorator for transient venue failures
//!
//! Whether a failed call should be repeated is a deployment decision, not a
//! default: the policy's `max_attempts` defaults to 1 (no retry). Only
//! transient errors (`Unavailable`, `Timeout`) are retried; rejections and
//! unknown instruments are returned immediately.
//!
//! Retrying `submit_order` can duplicate an order if the venue accepted the
//! first attempt but the acknowledgement was lost.

use async_trait::async_trait;
use hermes_core::{
    BestPrice, InstrumentId, Order, OrderId, PortfolioItem, PortfolioSummary, Timestamp,
};
use hermes_ports::{GatewayResult, OrderGateway};
use log::warn;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// How often and how patiently to repeat a failed gateway call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first
    pub max_attempts: u32,
    /// Pause between attempts
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            backoff_ms: 500,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff_ms: backoff.as_millis() as u64,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_attempts > 1
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

/// Gateway decorator that repeats calls failing with transient errors
pub struct RetryingGateway {
    inner: Arc<dyn OrderGateway>,
    policy: RetryPolicy,
}

impl RetryingGateway {
    pub fn new(inner: Arc<dyn OrderGateway>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    async fn attempt<T, F, Fut>(&self, op: &str, mut call: F) -> GatewayResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = GatewayResult<T>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match call().await {
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    warn!(
                        "[retry] {} failed (attempt {}/{}): {}",
                        op, attempt, max_attempts, e
                    );
                    tokio::time::sleep(self.policy.backoff()).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

#[async_trait]
impl OrderGateway for RetryingGateway {
    async fn last_trade_time(&self) -> GatewayResult<Timestamp> {
        self.attempt("last_trade_time", || self.inner.last_trade_time())
            .await
    }

    async fn best_price(&self, instrument: &InstrumentId) -> GatewayResult<BestPrice> {
        self.attempt("best_price", || self.inner.best_price(instrument))
            .await
    }

    async fn submit_order(&self, order: Order) -> GatewayResult<OrderId> {
        self.attempt("submit_order", || self.inner.submit_order(order.clone()))
            .await
    }

    async fn submit_cancellation(&self, order: &Order) -> GatewayResult<()> {
        self.attempt("submit_cancellation", || {
            self.inner.submit_cancellation(order)
        })
        .await
    }

    async fn waiting_list(&self) -> GatewayResult<Vec<Order>> {
        self.attempt("waiting_list", || self.inner.waiting_list()).await
    }

    async fn portfolio_item(&self, instrument: &InstrumentId) -> GatewayResult<PortfolioItem> {
        self.attempt("portfolio_item", || self.inner.portfolio_item(instrument))
            .await
    }

    async fn portfolio_summary(&self) -> GatewayResult<PortfolioSummary> {
        self.attempt("portfolio_summary", || self.inner.portfolio_summary())
            .await
    }

    async fn stock_list(&self) -> GatewayResult<Vec<InstrumentId>> {
        self.attempt("stock_list", || self.inner.stock_list()).await
    }
}
