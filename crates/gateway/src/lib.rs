//! Hermes Gateway
//!
//! Gateway layer for the Hermes trading client. Provides:
//! - A paper venue adapter implementing [`OrderGateway`] in memory
//!   (random-walk or replayed quotes, market-order fills, long/short books)
//! - A retrying decorator for transient venue failures
//!
//! ## Architecture
//!
//! ```text
//!   Strategy loops / Orchestrator
//!              │ OrderGateway
//!      ┌───────▼────────┐
//!      │RetryingGateway │  (optional)
//!      └───────┬────────┘
//!              │ OrderGateway
//!      ┌───────▼────────┐
//!      │  PaperVenue    │  or a network client
//!      └────────────────┘
//! ```

pub mod adapters;
pub mod retry;

// Re-export commonly used types
pub use adapters::paper::{Execution, InstrumentSeed, PaperVenue, PaperVenueConfig};
pub use hermes_ports::{GatewayError, GatewayResult, OrderGateway};
pub use retry::{RetryPolicy, RetryingGateway};
