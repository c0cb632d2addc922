//! Hermes Runner - Trading Session Orchestration
//!
//! Runs one trading session end to end:
//!
//! - **Config**: JSON session configuration with embedded defaults
//! - **Bootstrap**: Paper venue, retry decorator and forecaster wiring
//! - **Orchestrator**: Market-open wait, per-instrument loops, bounded join,
//!   safety-net unwind and the session report
//!
//! ## Architecture
//!
//! ```text
//!               ┌───────────────────────┐
//!               │  SessionOrchestrator  │
//!               └───────────┬───────────┘
//!          spawn (staggered)│      shutdown broadcast
//!        ┌──────────────────┼──────────────────┐
//!        ▼                  ▼                  ▼
//!  ┌────────────┐    ┌────────────┐    ┌────────────┐
//!  │ Loop AAPL  │    │  Loop IBM  │    │ Loop MSFT  │
//!  └─────┬──────┘    └─────┬──────┘    └─────┬──────┘
//!        └─────────────────┼─────────────────┘
//!                          │ OrderGateway
//!               ┌──────────▼────────────┐
//!               │ (RetryingGateway)     │
//!               │  PaperVenue           │
//!               └───────────────────────┘
//! ```

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod orchestrator;

// Re-export main types
pub use bootstrap::PaperSession;
pub use config::{
    ConfigError, SessionConfig, load_config, load_config_from_str, load_default_config,
};
pub use error::{SessionError, SessionResult};
pub use orchestrator::{
    LoopReport, LoopStatus, OrchestratorConfig, SessionOrchestrator, SessionReport,
};
