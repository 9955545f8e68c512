//! Configuration for the fee estimator

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::estimator::error::EstimatorError;

/// Number of confirmed blocks sampled when nothing else is configured.
pub const DEFAULT_WINDOW_SIZE: usize = 4;

/// Quantiles for the slow, average and fast tiers.
pub const DEFAULT_TIER_QUANTILES: [f64; 3] = [0.30, 0.60, 0.90];

/// How a block without fee-market transactions enters the tier means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyBlockPolicy {
    /// Leave the block out of the means.
    #[default]
    Skip,
    /// Count the block as paying zero priority fee.
    Zero,
}

/// Whether per-block fetches run one after another or together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    #[default]
    Sequential,
    Concurrent,
}

/// Configuration for the fee estimator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    pub window_size: usize,
    pub tier_quantiles: [f64; 3],
    pub empty_block_policy: EmptyBlockPolicy,
    pub fetch_mode: FetchMode,
}

impl EstimatorConfig {
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_empty_block_policy(mut self, policy: EmptyBlockPolicy) -> Self {
        self.empty_block_policy = policy;
        self
    }

    pub fn with_fetch_mode(mut self, mode: FetchMode) -> Self {
        self.fetch_mode = mode;
        self
    }

    pub fn with_tier_quantiles(mut self, quantiles: [f64; 3]) -> Self {
        self.tier_quantiles = quantiles;
        self
    }

    /// Reject settings that would make an estimation pass meaningless.
    pub fn validate(&self) -> Result<(), EstimatorError> {
        if self.window_size == 0 {
            return Err(EstimatorError::config_error("window size must be at least 1 block"));
        }

        for q in self.tier_quantiles {
            if !(0.0..=1.0).contains(&q) {
                return Err(EstimatorError::config_error(format!(
                    "tier quantile {} is outside [0, 1]",
                    q
                )));
            }
        }

        let [slow, average, fast] = self.tier_quantiles;
        if slow > average || average > fast {
            return Err(EstimatorError::config_error(format!(
                "tier quantiles must be non-decreasing, got {:?}",
                self.tier_quantiles
            )));
        }

        Ok(())
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            tier_quantiles: DEFAULT_TIER_QUANTILES,
            empty_block_policy: EmptyBlockPolicy::default(),
            fetch_mode: FetchMode::default(),
        }
    }
}

impl FromStr for EmptyBlockPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "zero" => Ok(Self::Zero),
            other => Err(format!("Invalid empty block policy: {} (expected skip or zero)", other)),
        }
    }
}

impl fmt::Display for EmptyBlockPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::Zero => write!(f, "zero"),
        }
    }
}

impl FromStr for FetchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "concurrent" => Ok(Self::Concurrent),
            other => Err(format!(
                "Invalid fetch mode: {} (expected sequential or concurrent)",
                other
            )),
        }
    }
}
