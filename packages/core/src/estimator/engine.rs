//! Fee Estimator - turns a block window into fee bids

use std::ops::Range;

use chrono::Utc;
use futures::future::try_join_all;

use crate::estimator::{
    config::{EmptyBlockPolicy, EstimatorConfig, FetchMode},
    error::EstimatorError,
    provider::BlockDataProvider,
    types::*,
};
use crate::stats::{mean_rounded, quantile_exact, sum, Fractional};

/// Single-pass fee estimator over the most recent confirmed blocks
#[derive(Debug, Clone)]
pub struct FeeEstimator {
    config: EstimatorConfig,
}

impl FeeEstimator {
    /// Create an estimator. Invalid configuration is rejected here, before
    /// any provider is touched.
    pub fn new(config: EstimatorConfig) -> Result<Self, EstimatorError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Produce slow/average/fast total fee bids.
    pub async fn estimate<P>(&self, provider: &P) -> Result<FeeEstimate, EstimatorError>
    where
        P: BlockDataProvider + Send + Sync + ?Sized,
    {
        Ok(self.estimate_with_report(provider).await?.estimate)
    }

    /// Run one estimation pass and keep everything it observed.
    ///
    /// 1. Read the latest block number `N`
    /// 2. Fetch blocks `[N - window, N)` and summarize each
    /// 3. Average each priority-fee tier across the window
    /// 4. Add the pending block's base fee to each tier mean
    ///
    /// Any provider failure aborts the pass.
    pub async fn estimate_with_report<P>(
        &self,
        provider: &P,
    ) -> Result<EstimationReport, EstimatorError>
    where
        P: BlockDataProvider + Send + Sync + ?Sized,
    {
        let latest_block_number = provider.current_block_number().await?;
        let range = self.window_range(latest_block_number)?;

        tracing::info!(
            "Sampling blocks {}..{} via {} ({:?} fetch)",
            range.start,
            range.end,
            provider.provider_name(),
            self.config.fetch_mode,
        );

        let blocks = self.fetch_window(provider, range).await?;

        let summaries = blocks
            .iter()
            .map(|block| self.summarize_block(block))
            .collect::<Result<Vec<_>, _>>()?;

        for summary in &summaries {
            match summary.priority_fee_tiers {
                Some(tiers) => tracing::debug!(
                    "Block {}: base fee {}, tiers [{:.0}, {:.0}, {:.0}] from {} txs, fill {:.2}",
                    summary.block_number,
                    summary.base_fee_per_gas,
                    tiers.slow.to_f64(),
                    tiers.average.to_f64(),
                    tiers.fast.to_f64(),
                    summary.sample_count,
                    summary.fill_ratio,
                ),
                None => tracing::debug!(
                    "Block {}: base fee {}, no fee-market transactions, fill {:.2}",
                    summary.block_number,
                    summary.base_fee_per_gas,
                    summary.fill_ratio,
                ),
            }
        }

        let priority_fee_means = self.aggregate_tiers(&summaries)?;

        let pending = provider.pending_block().await?;
        let estimate = combine(pending.base_fee_per_gas, priority_fee_means)?;

        let sampled_blocks = summaries
            .iter()
            .filter(|s| s.priority_fee_tiers.is_some())
            .count();
        let fill_ratios: Vec<f64> = summaries.iter().map(|s| s.fill_ratio).collect();
        let mean_fill_ratio = sum(&fill_ratios) / fill_ratios.len() as f64;

        tracing::info!(
            "Estimate from {}/{} sampled blocks on pending base fee {}: slow {}, average {}, fast {}",
            sampled_blocks,
            summaries.len(),
            pending.base_fee_per_gas,
            estimate.slow,
            estimate.average,
            estimate.fast,
        );

        Ok(EstimationReport {
            estimate,
            pending_base_fee_per_gas: pending.base_fee_per_gas,
            priority_fee_means,
            latest_block_number,
            blocks: summaries,
            sampled_blocks,
            mean_fill_ratio,
            estimated_at: Utc::now(),
        })
    }

    /// Block numbers sampled when the chain head is `latest`.
    ///
    /// The head itself is excluded.
    pub fn window_range(&self, latest: u64) -> Result<Range<u64>, EstimatorError> {
        let window_size = self.config.window_size;
        let start = latest
            .checked_sub(window_size as u64)
            .ok_or(EstimatorError::InsufficientHistory {
                latest,
                window_size,
            })?;

        Ok(start..latest)
    }

    async fn fetch_window<P>(
        &self,
        provider: &P,
        range: Range<u64>,
    ) -> Result<Vec<BlockWithTransactions>, EstimatorError>
    where
        P: BlockDataProvider + Send + Sync + ?Sized,
    {
        let blocks = match self.config.fetch_mode {
            FetchMode::Sequential => {
                let mut blocks = Vec::with_capacity(range.clone().count());
                for number in range.clone() {
                    blocks.push(provider.block_with_transactions(number).await?);
                }
                blocks
            }
            // try_join_all keeps input order and stops at the first error
            FetchMode::Concurrent => {
                try_join_all(range.clone().map(|number| provider.block_with_transactions(number)))
                    .await?
            }
        };

        for (expected, block) in range.zip(&blocks) {
            if block.number != expected {
                return Err(EstimatorError::invalid_data(format!(
                    "requested block {} but provider returned block {}",
                    expected, block.number
                )));
            }
        }

        Ok(blocks)
    }

    /// Derive the fee summary of one block.
    pub fn summarize_block(
        &self,
        block: &BlockWithTransactions,
    ) -> Result<BlockFeeSummary, EstimatorError> {
        if block.gas_limit == 0 {
            return Err(EstimatorError::invalid_data(format!(
                "block {} has a zero gas limit",
                block.number
            )));
        }
        if block.gas_used > block.gas_limit {
            return Err(EstimatorError::invalid_data(format!(
                "block {} used {} gas over its limit of {}",
                block.number, block.gas_used, block.gas_limit
            )));
        }

        let samples: Vec<u128> = block
            .transactions
            .iter()
            .filter_map(TransactionFee::priority_fee)
            .collect();

        let priority_fee_tiers = if samples.is_empty() {
            None
        } else {
            let [slow, average, fast] = self.config.tier_quantiles;
            Some(PriorityFeeTiers {
                slow: quantile_exact(&samples, slow)?,
                average: quantile_exact(&samples, average)?,
                fast: quantile_exact(&samples, fast)?,
            })
        };

        Ok(BlockFeeSummary {
            block_number: block.number,
            base_fee_per_gas: block.base_fee_per_gas,
            priority_fee_tiers,
            fill_ratio: block.gas_used as f64 / block.gas_limit as f64,
            sample_count: samples.len(),
        })
    }

    /// Mean of each tier across the window, following the empty-block policy.
    ///
    /// With [`EmptyBlockPolicy::Skip`] and no sampled block at all, every
    /// tier mean is zero.
    pub fn aggregate_tiers(
        &self,
        summaries: &[BlockFeeSummary],
    ) -> Result<TierMeans, EstimatorError> {
        let tiers: Vec<PriorityFeeTiers> = summaries
            .iter()
            .filter_map(|summary| {
                match (summary.priority_fee_tiers, self.config.empty_block_policy) {
                    (Some(tiers), _) => Some(tiers),
                    (None, EmptyBlockPolicy::Zero) => Some(PriorityFeeTiers {
                        slow: Fractional::ZERO,
                        average: Fractional::ZERO,
                        fast: Fractional::ZERO,
                    }),
                    (None, EmptyBlockPolicy::Skip) => None,
                }
            })
            .collect();

        if tiers.is_empty() {
            tracing::warn!(
                "No fee-market transactions in {} sampled blocks, priority fee tiers default to 0",
                summaries.len()
            );
            return Ok(TierMeans {
                slow: 0,
                average: 0,
                fast: 0,
            });
        }

        let column = |pick: fn(&PriorityFeeTiers) -> Fractional| -> Result<u128, EstimatorError> {
            let values: Vec<Fractional> = tiers.iter().map(pick).collect();
            Ok(mean_rounded(&values)?)
        };

        Ok(TierMeans {
            slow: column(|t| t.slow)?,
            average: column(|t| t.average)?,
            fast: column(|t| t.fast)?,
        })
    }
}

/// Add the pending base fee to each tier mean.
pub fn combine(base_fee_per_gas: u128, means: TierMeans) -> Result<FeeEstimate, EstimatorError> {
    let add = |tier: u128| {
        base_fee_per_gas
            .checked_add(tier)
            .ok_or_else(|| EstimatorError::numerical_overflow("base fee + priority fee"))
    };

    Ok(FeeEstimate {
        slow: add(means.slow)?,
        average: add(means.average)?,
        fast: add(means.fast)?,
    })
}
