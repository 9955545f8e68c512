// Library root — exposes internal modules for integration tests in `tests/`.
// Production entry point remains `src/main.rs`.

pub mod estimator;
pub mod services;
pub mod stats;

// Process wiring for the `fee-bid-estimator` binary: CLI parsing, config
// resolution, logging setup and the top-level error type.
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
