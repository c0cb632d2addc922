//! ARIMA-style forecaster
//!
//! Differences the log-price series `d` times, fits an AR(`p`) model with
//! intercept by ordinary least squares, forecasts one step ahead on the
//! differenced scale and integrates back. The returned value is the
//! predicted change in log price, so its sign is the trading direction.

use hermes_ports::{ForecastOracle, OracleError, OracleResult};
use serde::{Deserialize, Serialize};

/// Direction implied by a forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    /// Positive forecasts buy, negative sell; zero and NaN hold
    pub fn from_forecast(forecast: f64) -> Self {
        if forecast > 0.0 {
            Signal::Buy
        } else if forecast < 0.0 {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}

/// Model order of the ARIMA oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArimaConfig {
    /// Autoregressive order `p`
    pub ar_order: usize,
    /// Differencing order `d`
    pub diff_order: usize,
}

impl Default for ArimaConfig {
    fn default() -> Self {
        Self {
            ar_order: 5,
            diff_order: 2,
        }
    }
}

impl ArimaConfig {
    /// Shortest series the model can be fitted on
    pub fn min_observations(&self) -> usize {
        self.diff_order + 2 * self.ar_order + 1
    }
}

/// Least-squares ARIMA(p, d, 0) forecaster
#[derive(Debug, Clone, Default)]
pub struct ArimaOracle {
    config: ArimaConfig,
}

impl ArimaOracle {
    pub fn new(config: ArimaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> ArimaConfig {
        self.config
    }
}

impl ForecastOracle for ArimaOracle {
    fn forecast(&self, log_prices: &[f64]) -> OracleResult<f64> {
        let p = self.config.ar_order;
        let d = self.config.diff_order;

        let needed = self.config.min_observations();
        if log_prices.len() < needed {
            return Err(OracleError::InsufficientData {
                needed,
                got: log_prices.len(),
            });
        }
        if log_prices.iter().any(|x| !x.is_finite()) {
            return Err(OracleError::NonConvergence(
                "series contains non-finite values".to_string(),
            ));
        }

        // Last value at every differencing level, for integrating back
        let mut lasts = Vec::with_capacity(d);
        let mut series = log_prices.to_vec();
        for _ in 0..d {
            if let Some(&last) = series.last() {
                lasts.push(last);
            }
            series = series.windows(2).map(|w| w[1] - w[0]).collect();
        }

        let coefficients = fit_ar(&series, p)?;
        let n = series.len();
        let mut next = coefficients[0];
        for lag in 1..=p {
            next += coefficients[lag] * series[n - lag];
        }

        let last_level = log_prices[log_prices.len() - 1];
        let next_level = lasts.iter().rev().fold(next, |acc, last| last + acc);

        let change = next_level - last_level;
        if !change.is_finite() {
            return Err(OracleError::NonConvergence(
                "forecast is not finite".to_string(),
            ));
        }
        Ok(change)
    }

    fn name(&self) -> &str {
        "ArimaOracle"
    }
}

/// OLS fit of `y_t = c + a_1 y_{t-1} + ... + a_p y_{t-p}`
///
/// Returns `[c, a_1, ..., a_p]`.
fn fit_ar(series: &[f64], p: usize) -> OracleResult<Vec<f64>> {
    let k = p + 1;
    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];

    let mut row = vec![0.0; k];
    for t in p..series.len() {
        row[0] = 1.0;
        for lag in 1..=p {
            row[lag] = series[t - lag];
        }
        for i in 0..k {
            xty[i] += row[i] * series[t];
            for j in 0..k {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }

    solve(xtx, xty)
}

/// Gaussian elimination with partial pivoting
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> OracleResult<Vec<f64>> {
    let n = b.len();
    let scale = (0..n).map(|i| a[i][i].abs()).fold(0.0, f64::max);
    let tolerance = scale.max(f64::MIN_POSITIVE) * 1e-10;

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() <= tolerance {
            return Err(OracleError::NonConvergence(
                "singular normal equations".to_string(),
            ));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for i in col + 1..n {
            let factor = a[i][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for j in col..n {
                a[i][j] -= factor * a[col][j];
            }
            b[i] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let tail: f64 = (i + 1..n).map(|j| a[i][j] * x[j]).sum();
        x[i] = (b[i] - tail) / a[i][i];
    }

    if x.iter().any(|v| !v.is_finite()) {
        return Err(OracleError::NonConvergence(
            "coefficients are not finite".to_string(),
        ));
    }
    Ok(x)
}
