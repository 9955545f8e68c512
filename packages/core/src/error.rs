use std::error::Error;
use std::fmt;

use crate::estimator::EstimatorError;

/// Unified application error.
///
/// Everything the binary can fail on ends up here, so `main` has a single
/// place to log and exit.
#[derive(Debug)]
pub enum AppError {
    Config(String),
    Network(String),
    Parse(String),
    Estimation(EstimatorError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "Config error: {}", msg),
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::Parse(msg) => write!(f, "Parse error: {}", msg),
            AppError::Estimation(err) => write!(f, "Estimation failed: {}", err),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Estimation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EstimatorError> for AppError {
    fn from(err: EstimatorError) -> Self {
        match err {
            EstimatorError::ConfigError { message } => AppError::Config(message),
            other => AppError::Estimation(other),
        }
    }
}
