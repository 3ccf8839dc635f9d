//! File-backed implementations of the ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod registry_adapter;
pub mod report_adapter;
