use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::quantity::{BlockTag, Quantity};

/// Failures of a single JSON-RPC exchange.
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("node returned HTTP {0}")]
    Http(StatusCode),

    #[error("cannot decode {method} response: {message}")]
    Decode { method: String, message: String },

    #[error("JSON-RPC error {code}: {message}")]
    JsonRpc { code: i64, message: String },
}

/// An envelope for all JSON-RPC requests.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest<T> {
    jsonrpc: &'static str,
    method: &'static str,
    id: u64,
    params: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// An envelope for all JSON-RPC replies.
///
/// `result` is optional because `eth_getBlockByNumber` answers `null` for
/// unknown blocks.
#[derive(Debug, Deserialize)]
pub struct JsonRpcReply<T> {
    pub result: Option<T>,
    pub error: Option<JsonRpcErrorObject>,
}

impl<T> JsonRpcReply<T> {
    pub fn into_result(self) -> Result<Option<T>, RpcError> {
        match self.error {
            Some(JsonRpcErrorObject { code, message }) => Err(RpcError::JsonRpc { code, message }),
            None => Ok(self.result),
        }
    }
}

/// Block as returned by `eth_getBlockByNumber(n, true)`.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcBlock {
    pub number: Quantity,
    #[serde(rename = "baseFeePerGas")]
    pub base_fee_per_gas: Option<Quantity>,
    #[serde(rename = "gasUsed")]
    pub gas_used: Quantity,
    #[serde(rename = "gasLimit")]
    pub gas_limit: Quantity,
    #[serde(default)]
    pub transactions: Vec<RpcTransaction>,
}

/// Fee-relevant subset of a transaction object.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcTransaction {
    /// Absent on pre-Berlin nodes, which only know legacy transactions.
    #[serde(rename = "type", default)]
    pub tx_type: Option<Quantity>,
    #[serde(rename = "maxPriorityFeePerGas", default)]
    pub max_priority_fee_per_gas: Option<Quantity>,
}

/// Header fields of the pending block. Transaction hashes are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcBlockHeader {
    #[serde(rename = "baseFeePerGas")]
    pub base_fee_per_gas: Option<Quantity>,
}

/// Thin Ethereum JSON-RPC client over HTTP.
#[derive(Clone)]
pub struct RpcClient {
    base_url: String,
    http: Client,
    next_id: Arc<AtomicU64>,
}

impl RpcClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            http: Client::new(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Build a client whose requests give up after `timeout`.
    pub fn with_timeout(base_url: String, timeout: Duration) -> Result<Self, RpcError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RpcError::Transport(err.to_string()))?;

        Ok(Self {
            base_url,
            http,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call<P, R>(&self, method: &'static str, params: P) -> Result<Option<R>, RpcError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            params,
        };

        let response = self
            .http
            .post(&self.base_url)
            .json(&request)
            .send()
            .await
            .map_err(|err| RpcError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(RpcError::Http(response.status()));
        }

        let reply = response
            .json::<JsonRpcReply<R>>()
            .await
            .map_err(|err| RpcError::Decode {
                method: method.to_string(),
                message: err.to_string(),
            })?;

        reply.into_result()
    }

    pub async fn block_number(&self) -> Result<u64, RpcError> {
        let number: Option<Quantity> = self.call("eth_blockNumber", [(); 0]).await?;
        let number = number.ok_or_else(|| RpcError::Decode {
            method: "eth_blockNumber".to_string(),
            message: "null result".to_string(),
        })?;

        number.to_u64().map_err(|message| RpcError::Decode {
            method: "eth_blockNumber".to_string(),
            message,
        })
    }

    /// Fetch a block with full transaction objects. `None` when the node
    /// does not know the block.
    pub async fn block_with_transactions(&self, tag: BlockTag) -> Result<Option<RpcBlock>, RpcError> {
        self.call("eth_getBlockByNumber", (tag, true)).await
    }

    /// Fetch a block header, leaving transactions as hashes.
    pub async fn block_header(&self, tag: BlockTag) -> Result<Option<RpcBlockHeader>, RpcError> {
        self.call("eth_getBlockByNumber", (tag, false)).await
    }
}
