//! Fee Estimator Module
//!
//! Turns a window of recent blocks into slow/average/fast fee bids:
//! per-block priority-fee percentiles, averaged across the window and
//! added to the pending block's base fee.

pub mod config;
pub mod engine;
pub mod error;
pub mod provider;
pub mod rpc_adapter;
pub mod types;


pub use config::{EmptyBlockPolicy, EstimatorConfig, FetchMode};
pub use engine::FeeEstimator;
pub use error::{EstimatorError, ProviderError};
pub use provider::BlockDataProvider;
pub use rpc_adapter::RpcBlockDataProvider;
pub use types::*;
