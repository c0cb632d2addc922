//! Hermes Ports
//!
//! Port definitions (traits) for the Hermes trading client.
//! These define the boundaries between the strategy/session logic and the
//! collaborators it drives: the venue, the forecasting model and time.

mod clock;
mod error;
mod gateway;
mod oracle;

pub use clock::Clock;
pub use error::{GatewayError, GatewayResult, OracleError, OracleResult};
pub use gateway::OrderGateway;
pub use oracle::ForecastOracle;
