use hermes_core::OrderId;
use thiserror::Error;

/// Errors surfaced by an order gateway
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Venue unavailable: {0}")]
    Unavailable(String),

    #[error("Timeout waiting for venue response")]
    Timeout,

    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("Order rejected: {0}")]
    Rejected(String),
}

impl GatewayError {
    /// Connectivity-level failures that may succeed when repeated
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Unavailable(_) | GatewayError::Timeout)
    }
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Errors surfaced by a forecast oracle
///
/// Both variants are recoverable: the caller treats them as "no signal".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("Insufficient data: need {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Model did not converge: {0}")]
    NonConvergence(String),
}

pub type OracleResult<T> = std::result::Result<T, OracleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(GatewayError::Unavailable("socket closed".into()).is_transient());
        assert!(GatewayError::Timeout.is_transient());
        assert!(!GatewayError::Rejected("no buying power".into()).is_transient());
        assert!(!GatewayError::UnknownInstrument("XYZ".into()).is_transient());
    }
}
