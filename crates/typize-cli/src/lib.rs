//! Driver, configuration and reporting for the `typize` binary.

pub mod args;
pub mod config;
pub mod driver;
pub mod reporter;
pub mod tracing_config;
