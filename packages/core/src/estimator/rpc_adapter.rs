//! JSON-RPC Block Data Provider Adapter
//!
//! Adapts the RpcClient to implement the BlockDataProvider trait

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::estimator::{
    error::ProviderError,
    provider::{BlockDataProvider, ProviderResult},
    types::{BlockWithTransactions, PendingBlock, TransactionFee},
};
use crate::services::quantity::{BlockTag, Quantity};
use crate::services::rpc::{RpcBlock, RpcClient, RpcError, RpcTransaction};

/// Adapter that implements BlockDataProvider for RpcClient
pub struct RpcBlockDataProvider {
    client: RpcClient,
}

impl RpcBlockDataProvider {
    pub fn new(client: RpcClient) -> Self {
        Self { client }
    }

    /// Convert a wire block into the estimator's block type
    fn convert_block(&self, block: RpcBlock) -> ProviderResult<BlockWithTransactions> {
        let number = block.number.to_u64().map_err(ProviderError::format)?;

        let base_fee_per_gas = block
            .base_fee_per_gas
            .ok_or_else(|| {
                ProviderError::format(format!("block {} has no baseFeePerGas (pre-London?)", number))
            })?
            .get();

        let transactions = block
            .transactions
            .into_iter()
            .map(convert_transaction)
            .collect::<ProviderResult<Vec<_>>>()?;

        Ok(BlockWithTransactions {
            number,
            base_fee_per_gas,
            gas_used: block.gas_used.get(),
            gas_limit: block.gas_limit.get(),
            transactions,
        })
    }
}

fn convert_transaction(tx: RpcTransaction) -> ProviderResult<TransactionFee> {
    let tx_type = tx.tx_type.map_or(0, Quantity::get);
    let tx_type = u8::try_from(tx_type)
        .map_err(|_| ProviderError::format(format!("unknown transaction type {}", tx_type)))?;

    Ok(TransactionFee {
        tx_type,
        max_priority_fee_per_gas: tx.max_priority_fee_per_gas.map(Quantity::get),
    })
}

impl From<RpcError> for ProviderError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Transport(message) => ProviderError::NetworkError { message },
            RpcError::Http(status)
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN =>
            {
                ProviderError::AuthError {
                    message: format!("node returned HTTP {}", status),
                }
            }
            RpcError::Http(status) if status == StatusCode::TOO_MANY_REQUESTS => {
                ProviderError::RateLimitExceeded
            }
            RpcError::Http(status) if status.is_server_error() => ProviderError::ServiceUnavailable,
            RpcError::Http(status) => ProviderError::NetworkError {
                message: format!("node returned HTTP {}", status),
            },
            RpcError::Decode { method, message } => ProviderError::FormatError {
                message: format!("{}: {}", method, message),
            },
            RpcError::JsonRpc { code, message } => ProviderError::RpcError { code, message },
        }
    }
}

#[async_trait]
impl BlockDataProvider for RpcBlockDataProvider {
    async fn current_block_number(&self) -> ProviderResult<u64> {
        Ok(self.client.block_number().await?)
    }

    async fn block_with_transactions(&self, number: u64) -> ProviderResult<BlockWithTransactions> {
        let block = self
            .client
            .block_with_transactions(BlockTag::Number(number))
            .await?
            .ok_or(ProviderError::BlockNotFound { number })?;

        self.convert_block(block)
    }

    async fn pending_block(&self) -> ProviderResult<PendingBlock> {
        let header = self
            .client
            .block_header(BlockTag::Pending)
            .await?
            .ok_or_else(|| ProviderError::PendingBlockUnavailable {
                message: "node returned no pending block".to_string(),
            })?;

        let base_fee_per_gas = header
            .base_fee_per_gas
            .ok_or_else(|| ProviderError::PendingBlockUnavailable {
                message: "pending block has no baseFeePerGas".to_string(),
            })?
            .get();

        Ok(PendingBlock { base_fee_per_gas })
    }

    fn provider_name(&self) -> &str {
        self.client.base_url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rpc_tx(tx_type: Option<u128>, priority: Option<u128>) -> RpcTransaction {
        RpcTransaction {
            tx_type: tx_type.map(Quantity::new),
            max_priority_fee_per_gas: priority.map(Quantity::new),
        }
    }

    #[test]
    fn missing_type_means_legacy() {
        let fee = convert_transaction(rpc_tx(None, None)).unwrap();
        assert_eq!(fee.tx_type, 0);
        assert_eq!(fee.priority_fee(), None);
    }

    #[test]
    fn oversized_type_is_a_format_error() {
        let err = convert_transaction(rpc_tx(Some(0x1ff), None)).unwrap_err();
        assert!(matches!(err, ProviderError::FormatError { .. }));
    }

    #[test]
    fn block_without_base_fee_is_rejected() {
        let provider = RpcBlockDataProvider::new(RpcClient::new("http://localhost:8545".to_string()));
        let block = RpcBlock {
            number: Quantity::new(12_000_000),
            base_fee_per_gas: None,
            gas_used: Quantity::new(1),
            gas_limit: Quantity::new(2),
            transactions: vec![],
        };

        assert!(matches!(
            provider.convert_block(block),
            Err(ProviderError::FormatError { .. })
        ));
    }

    #[test]
    fn http_status_mapping() {
        assert!(matches!(
            ProviderError::from(RpcError::Http(StatusCode::TOO_MANY_REQUESTS)),
            ProviderError::RateLimitExceeded
        ));
        assert!(matches!(
            ProviderError::from(RpcError::Http(StatusCode::FORBIDDEN)),
            ProviderError::AuthError { .. }
        ));
        assert!(matches!(
            ProviderError::from(RpcError::Http(StatusCode::BAD_GATEWAY)),
            ProviderError::ServiceUnavailable
        ));
        assert!(matches!(
            ProviderError::from(RpcError::Http(StatusCode::NOT_FOUND)),
            ProviderError::NetworkError { .. }
        ));
    }
}
