use hermes_ports::GatewayError;
use thiserror::Error;

/// Errors that end a strategy loop or an unwind
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Invalid loop configuration: {0}")]
    InvalidConfig(String),
}

pub type StrategyResult<T> = std::result::Result<T, StrategyError>;
