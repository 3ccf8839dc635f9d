//! stratscan: backtest candidate trading strategies per instrument, keep the
//! best one and turn it into a buy/sell/hold call for the latest bar.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
