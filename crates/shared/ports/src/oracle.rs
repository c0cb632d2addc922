use crate::error::OracleResult;

/// Port for the forecasting model
///
/// Stateless: given a bounded series of log prices (oldest first), produce a
/// one-step-ahead forecast whose sign is the trading direction (positive =
/// buy, negative = sell, zero = no action), or fail.
pub trait ForecastOracle: Send + Sync {
    fn forecast(&self, log_prices: &[f64]) -> OracleResult<f64>;

    /// Model name for logging
    fn name(&self) -> &str {
        "ForecastOracle"
    }
}
