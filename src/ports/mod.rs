//! Port traits for the collaborators the core depends on.

pub mod config_port;
pub mod data_port;
pub mod registry_port;
pub mod report_port;
