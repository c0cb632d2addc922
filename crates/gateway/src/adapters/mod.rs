//! Venue adapters
//!
//! Each adapter implements `OrderGateway` for one kind of venue.

pub mod paper;
