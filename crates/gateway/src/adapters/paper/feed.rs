//! Quote generation for the paper venue

use hermes_core::{BestPrice, Lots, Price};
use rand::Rng;
use rand::rngs::StdRng;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

/// Parameters of the random-walk quote model
#[derive(Debug, Clone, Copy)]
pub(crate) struct WalkParams {
    /// Max relative move per step (e.g. 0.0005 = 0.05%)
    pub volatility: f64,
    pub half_spread: Price,
    pub displayed_size: Lots,
}

/// Source of successive top-of-book quotes for one instrument
#[derive(Debug, Clone)]
pub(crate) enum QuoteFeed {
    /// Mid price follows a bounded random walk
    Walk { mid: Price, current: BestPrice },
    /// Quotes replayed in order; the last quote repeats once exhausted
    Replay {
        quotes: Vec<BestPrice>,
        cursor: usize,
        current: BestPrice,
    },
}

impl QuoteFeed {
    pub fn walk(initial_mid: Price, params: &WalkParams) -> Self {
        Self::Walk {
            mid: initial_mid,
            current: quote_around(initial_mid, params),
        }
    }

    pub fn replay(quotes: Vec<BestPrice>) -> Self {
        let current = quotes.first().copied().unwrap_or_default();
        Self::Replay {
            quotes,
            cursor: 0,
            current,
        }
    }

    /// Quote that fills are executed against
    pub fn current(&self) -> BestPrice {
        match self {
            QuoteFeed::Walk { current, .. } | QuoteFeed::Replay { current, .. } => *current,
        }
    }

    /// Move to the next quote and return it
    pub fn advance(&mut self, rng: &mut StdRng, params: &WalkParams) -> BestPrice {
        match self {
            QuoteFeed::Walk { mid, current } => {
                let step: f64 = rng.gen_range(-1.0..1.0);
                let next = mid
                    .to_f64()
                    .map(|m| m * (1.0 + params.volatility * step))
                    .and_then(Decimal::from_f64)
                    .map(|m| m.round_dp(2))
                    .unwrap_or(*mid);
                // Keep the bid strictly positive
                let floor = params.half_spread + Decimal::new(1, 2);
                *mid = next.max(floor);
                *current = quote_around(*mid, params);
                *current
            }
            QuoteFeed::Replay {
                quotes,
                cursor,
                current,
            } => {
                if let Some(quote) = quotes.get(*cursor) {
                    *current = *quote;
                    *cursor += 1;
                }
                *current
            }
        }
    }
}

fn quote_around(mid: Price, params: &WalkParams) -> BestPrice {
    BestPrice::new(
        mid - params.half_spread,
        mid + params.half_spread,
        params.displayed_size,
        params.displayed_size,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    fn params() -> WalkParams {
        WalkParams {
            volatility: 0.001,
            half_spread: dec!(0.01),
            displayed_size: 10,
        }
    }

    #[test]
    fn test_walk_stays_two_sided() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut feed = QuoteFeed::walk(dec!(100), &params());

        for _ in 0..1_000 {
            let quote = feed.advance(&mut rng, &params());
            assert!(quote.is_two_sided());
            assert_eq!(quote.spread(), dec!(0.02));
        }
    }

    #[test]
    fn test_replay_holds_last_quote() {
        let mut rng = StdRng::seed_from_u64(7);
        let q1 = BestPrice::new(dec!(10.00), dec!(10.02), 1, 1);
        let q2 = BestPrice::new(dec!(10.10), dec!(10.12), 1, 1);
        let mut feed = QuoteFeed::replay(vec![q1, q2]);

        assert_eq!(feed.current(), q1);
        assert_eq!(feed.advance(&mut rng, &params()), q1);
        assert_eq!(feed.advance(&mut rng, &params()), q2);
        assert_eq!(feed.advance(&mut rng, &params()), q2);
        assert_eq!(feed.current(), q2);
    }
}
