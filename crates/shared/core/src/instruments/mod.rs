//! Instrument identifiers for tradeable stocks

mod instrument;

pub use instrument::InstrumentId;
