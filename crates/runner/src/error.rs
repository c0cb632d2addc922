use hermes_ports::GatewayError;
use hermes_strategy::StrategyError;
use thiserror::Error;

/// Errors that abort a trading session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("No instruments to trade")]
    NoInstruments,

    #[error("Session window out of range: {0}")]
    WindowOutOfRange(String),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;
