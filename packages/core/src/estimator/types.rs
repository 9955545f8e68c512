//! Core data types for fee estimation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stats::Fractional;

/// EIP-2718 envelope types that carry `maxPriorityFeePerGas`.
pub const FEE_MARKET_TX_TYPES: [u8; 3] = [2, 3, 4];

/// Fee fields of one transaction inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFee {
    pub tx_type: u8,
    pub max_priority_fee_per_gas: Option<u128>,
}

impl TransactionFee {
    /// Priority fee of a fee-market transaction, `None` for legacy and
    /// access-list transactions.
    pub fn priority_fee(&self) -> Option<u128> {
        if FEE_MARKET_TX_TYPES.contains(&self.tx_type) {
            self.max_priority_fee_per_gas
        } else {
            None
        }
    }
}

/// A confirmed block with its transaction list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockWithTransactions {
    pub number: u64,
    pub base_fee_per_gas: u128,
    pub gas_used: u128,
    pub gas_limit: u128,
    pub transactions: Vec<TransactionFee>,
}

/// The not-yet-mined block as seen by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingBlock {
    pub base_fee_per_gas: u128,
}

/// 30th/60th/90th percentile priority fees of one block (by default).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorityFeeTiers {
    pub slow: Fractional,
    pub average: Fractional,
    pub fast: Fractional,
}

/// Per-block summary derived once from raw block data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockFeeSummary {
    pub block_number: u64,
    pub base_fee_per_gas: u128,
    /// `None` when the block holds no fee-market transactions.
    pub priority_fee_tiers: Option<PriorityFeeTiers>,
    pub fill_ratio: f64,
    pub sample_count: usize,
}

/// Window-wide mean of each tier, rounded to whole wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierMeans {
    pub slow: u128,
    pub average: u128,
    pub fast: u128,
}

/// Total fee bids in wei per gas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeEstimate {
    pub slow: u128,
    pub average: u128,
    pub fast: u128,
}

/// Everything a single estimation pass observed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimationReport {
    pub estimate: FeeEstimate,
    pub pending_base_fee_per_gas: u128,
    pub priority_fee_means: TierMeans,
    pub latest_block_number: u64,
    pub blocks: Vec<BlockFeeSummary>,
    /// Blocks that contributed priority-fee samples.
    pub sampled_blocks: usize,
    pub mean_fill_ratio: f64,
    pub estimated_at: DateTime<Utc>,
}
