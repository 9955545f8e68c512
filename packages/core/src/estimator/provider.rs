//! Block Data Provider Interface
//!
//! Decouples the estimator from where block data comes from.

use async_trait::async_trait;

use crate::estimator::{
    error::ProviderError,
    types::{BlockWithTransactions, PendingBlock},
};

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Source of confirmed and pending block data
#[async_trait]
pub trait BlockDataProvider {
    /// Number of the latest confirmed block.
    async fn current_block_number(&self) -> ProviderResult<u64>;

    /// Full block with its transactions. Fails with
    /// [`ProviderError::BlockNotFound`] for unknown or pruned blocks.
    async fn block_with_transactions(&self, number: u64) -> ProviderResult<BlockWithTransactions>;

    /// Header of the next, not-yet-mined block.
    async fn pending_block(&self) -> ProviderResult<PendingBlock>;

    /// Get the name of this provider for logging/debugging
    fn provider_name(&self) -> &str;
}
