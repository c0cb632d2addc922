//! Session configuration
//!
//! Loaded from JSON; every field has a default, so a partial file (or `{}`)
//! is valid. The embedded `session_config.json` is used when no path is given.

use hermes_core::{InstrumentId, LOT_SIZE, Lots, Shares};
use hermes_gateway::{PaperVenueConfig, RetryPolicy};
use hermes_strategy::{ArimaConfig, LoopConfig, OracleFailurePolicy, UnwindConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::orchestrator::OrchestratorConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Everything needed to run one trading session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Instruments to trade; empty means every instrument the venue lists
    pub instruments: Vec<String>,
    /// Lots per forecast-driven market order
    pub order_size_lots: Lots,
    /// Pause between strategy ticks
    pub check_freq_ms: u64,
    /// Samples collected before forecasting
    pub window_capacity: usize,
    /// Delay from now until the session opens
    pub start_offset_secs: u64,
    /// Session length
    pub duration_secs: u64,
    /// Venue-time polling interval while waiting for open and close
    pub poll_interval_ms: u64,
    /// Pause between launching consecutive strategy loops
    pub launch_stagger_ms: u64,
    /// How long to wait for each loop once the session is over
    pub join_timeout_ms: u64,
    /// Extra wait for loops after shutdown has been broadcast
    pub cancel_grace_ms: u64,
    /// Pause after each unwind cancellation or submission
    pub settle_delay_ms: u64,
    /// Max shares per flattening order (None = one order per side)
    pub close_batch_shares: Option<Shares>,
    /// Venue time speed-up for paper sessions (1 = real time)
    pub clock_speed: u32,
    pub oracle: ArimaConfig,
    pub oracle_failure_policy: OracleFailurePolicy,
    pub retry: RetryPolicy,
    pub venue: PaperVenueConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            instruments: Vec::new(),
            order_size_lots: 5,
            check_freq_ms: 1_000,
            window_capacity: 30,
            start_offset_secs: 0,
            duration_secs: 600,
            poll_interval_ms: 1_000,
            launch_stagger_ms: 1_000,
            join_timeout_ms: 30_000,
            cancel_grace_ms: 5_000,
            settle_delay_ms: 1_000,
            close_batch_shares: None,
            clock_speed: 1,
            oracle: ArimaConfig::default(),
            oracle_failure_policy: OracleFailurePolicy::default(),
            retry: RetryPolicy::default(),
            venue: PaperVenueConfig::default(),
        }
    }
}

/// Load session configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SessionConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<SessionConfig, ConfigError> {
    let config: SessionConfig = serde_json::from_str(json)?;
    Ok(config)
}

/// Load the default embedded configuration
pub fn load_default_config() -> Result<SessionConfig, ConfigError> {
    let default_config = include_str!("session_config.json");
    load_config_from_str(default_config)
}

/// Longest start offset or session length accepted (one week)
pub const MAX_SESSION_SECS: u64 = 7 * 24 * 60 * 60;

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(reason.into())
}

impl SessionConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.order_size_lots == 0 {
            return Err(invalid("order_size_lots must be at least 1"));
        }
        if self.check_freq_ms == 0 {
            return Err(invalid("check_freq_ms must be positive"));
        }
        if self.poll_interval_ms == 0 {
            return Err(invalid("poll_interval_ms must be positive"));
        }
        if self.join_timeout_ms == 0 {
            return Err(invalid("join_timeout_ms must be positive"));
        }
        if self.clock_speed == 0 {
            return Err(invalid("clock_speed must be at least 1"));
        }
        if let Some(batch) = self.close_batch_shares {
            if batch == 0 || batch % LOT_SIZE != 0 {
                return Err(invalid(format!(
                    "close_batch_shares must be a positive multiple of {}",
                    LOT_SIZE
                )));
            }
        }
        if self.start_offset_secs > MAX_SESSION_SECS || self.duration_secs > MAX_SESSION_SECS {
            return Err(invalid(format!(
                "start_offset_secs and duration_secs must not exceed {}",
                MAX_SESSION_SECS
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(invalid("retry.max_attempts must be at least 1"));
        }

        let needed = self.oracle.min_observations();
        if self.window_capacity < needed {
            return Err(invalid(format!(
                "window_capacity {} is below the {} observations the oracle needs",
                self.window_capacity, needed
            )));
        }

        if self.venue.instruments.is_empty() {
            return Err(invalid("venue lists no instruments"));
        }
        if let Some(unknown) = self
            .instruments
            .iter()
            .find(|symbol| !self.venue.instruments.iter().any(|s| &s.symbol == *symbol))
        {
            return Err(invalid(format!("instrument {} is not listed by the venue", unknown)));
        }
        Ok(())
    }

    pub fn unwind_config(&self) -> UnwindConfig {
        UnwindConfig {
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            batch_shares: self.close_batch_shares,
        }
    }

    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            order_size: self.order_size_lots,
            check_freq: Duration::from_millis(self.check_freq_ms),
            window_capacity: self.window_capacity,
            failure_policy: self.oracle_failure_policy,
            unwind: self.unwind_config(),
        }
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            instruments: self
                .instruments
                .iter()
                .map(|s| InstrumentId::new(s))
                .collect(),
            start_offset: Duration::from_secs(self.start_offset_secs),
            duration: Duration::from_secs(self.duration_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            launch_stagger: Duration::from_millis(self.launch_stagger_ms),
            join_timeout: Duration::from_millis(self.join_timeout_ms),
            cancel_grace: Duration::from_millis(self.cancel_grace_ms),
            strategy: self.loop_config(),
        }
    }
}
