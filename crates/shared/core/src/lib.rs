//! Hermes Core Domain
//!
//! Pure domain types for the Hermes trading client.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod instruments;
pub mod session;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{BestPrice, Order, OrderId, OrderStatus, PortfolioItem, PortfolioSummary, Side};
pub use instruments::InstrumentId;
pub use session::SessionWindow;
pub use values::{LOT_SIZE, Lots, Price, Shares, Timestamp, lots_to_shares, shares_to_lots};
