//! Core domain types and logic.

pub mod bar;
pub mod series;
pub mod indicator;
pub mod strategy;
pub mod position;
pub mod portfolio;
pub mod execution;
pub mod backtest;
pub mod metrics;
pub mod selector;
pub mod signal;
pub mod scan;
pub mod config_validation;
pub mod error;
