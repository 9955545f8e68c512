//! Error types for fee estimation

use thiserror::Error;

use crate::stats::StatsError;

/// Errors that abort an estimation pass
#[derive(Error, Debug)]
pub enum EstimatorError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Data provider error: {source}")]
    ProviderError {
        #[from]
        source: ProviderError,
    },

    #[error("Statistics error: {source}")]
    StatisticsError {
        #[from]
        source: StatsError,
    },

    #[error("Chain has {latest} blocks, fewer than the window of {window_size}")]
    InsufficientHistory { latest: u64, window_size: usize },

    #[error("Invalid block data: {message}")]
    InvalidData { message: String },

    #[error("Numerical overflow in calculation: {operation}")]
    NumericalOverflow { operation: String },
}

/// Errors from block data providers
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Data format error: {message}")]
    FormatError { message: String },

    #[error("Node rejected request ({code}): {message}")]
    RpcError { code: i64, message: String },

    #[error("Authentication error: {message}")]
    AuthError { message: String },

    #[error("Block {number} not found")]
    BlockNotFound { number: u64 },

    #[error("Pending block unavailable: {message}")]
    PendingBlockUnavailable { message: String },

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Service unavailable")]
    ServiceUnavailable,
}

impl EstimatorError {
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError { message: message.into() }
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData { message: message.into() }
    }

    pub fn numerical_overflow(operation: impl Into<String>) -> Self {
        Self::NumericalOverflow { operation: operation.into() }
    }
}

impl ProviderError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError { message: message.into() }
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::FormatError { message: message.into() }
    }
}
