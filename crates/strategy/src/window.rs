//! Rolling window of recent quotes for one instrument

use hermes_core::BestPrice;
use rust_decimal::prelude::ToPrimitive;
use std::collections::VecDeque;

/// Number of samples a window holds before forecasting is allowed
pub const DEFAULT_CAPACITY: usize = 30;

/// One observation of the top of book
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSample {
    pub mid: f64,
    /// Ask minus bid
    pub spread: f64,
}

impl PriceSample {
    /// Sample a quote; `None` unless both sides carry a positive price
    pub fn from_quote(quote: &BestPrice) -> Option<Self> {
        let mid = quote.mid_price()?.to_f64()?;
        let spread = quote.spread().to_f64()?;
        Some(Self { mid, spread })
    }
}

/// Fixed-capacity FIFO of price samples
///
/// Owned by exactly one strategy loop. Pushing past capacity evicts the
/// oldest sample, so `len()` never exceeds `capacity()`.
#[derive(Debug, Clone)]
pub struct PriceWindow {
    samples: VecDeque<PriceSample>,
    capacity: usize,
}

impl Default for PriceWindow {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl PriceWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn push(&mut self, sample: PriceSample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The window is full and may be handed to the oracle
    pub fn is_ready(&self) -> bool {
        self.samples.len() >= self.capacity
    }

    pub fn latest(&self) -> Option<&PriceSample> {
        self.samples.back()
    }

    /// Mid prices, oldest first
    pub fn mid_prices(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.mid).collect()
    }

    pub fn spreads(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.spread).collect()
    }

    /// Natural log of the mid prices, only once the window is full
    pub fn log_series(&self) -> Option<Vec<f64>> {
        if !self.is_ready() {
            return None;
        }
        Some(self.samples.iter().map(|s| s.mid.ln()).collect())
    }
}
