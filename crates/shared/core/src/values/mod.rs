use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Price value - uses Decimal for precision
pub type Price = Decimal;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Order quantity in lot units
pub type Lots = u64;

/// Position quantity in shares
pub type Shares = u64;

/// Number of shares in one lot
pub const LOT_SIZE: Shares = 100;

/// Convert a share count to whole lots (rounds down)
pub fn shares_to_lots(shares: Shares) -> Lots {
    shares / LOT_SIZE
}

/// Convert a lot count to shares
pub fn lots_to_shares(lots: Lots) -> Shares {
    lots * LOT_SIZE
}
