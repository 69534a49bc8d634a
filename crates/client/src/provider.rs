//! [`ChainReader`] backed by an alloy [`Provider`].

use crate::reader::{
    BlockHeader, CallRequest, ChainReader, Receipt, RpcError, RpcResult, StorageProof,
};
use alloy_primitives::{Address, Bytes, B256};
use alloy_provider::{network::ReceiptResponse as _, Provider};
use alloy_rpc_types_eth::{BlockId, BlockNumberOrTag, TransactionInput, TransactionRequest};
use alloy_transport::TransportError;
use async_trait::async_trait;
use std::{future::Future, time::Duration};
use tokio_retry::{
    strategy::{jitter, ExponentialBackoff},
    RetryIf,
};
use tracing::debug;

/// Backoff applied to retryable RPC failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// First delay in milliseconds; doubled on every attempt
    pub base_delay_ms: u64,
    /// Retries after the first attempt
    pub max_retries: usize,
    /// Upper bound for a single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        // 100ms, 200ms, 400ms, 800ms, 1.6s
        Self {
            base_delay_ms: 100,
            max_retries: 5,
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Never retry.
    pub const fn none() -> Self {
        Self {
            base_delay_ms: 0,
            max_retries: 0,
            max_delay: Duration::ZERO,
        }
    }

    fn strategy(&self) -> impl Iterator<Item = Duration> {
        // `from_millis(b)` yields b, b^2, ...; factor turns it into a doubling sequence
        ExponentialBackoff::from_millis(2)
            .factor(self.base_delay_ms / 2)
            .max_delay(self.max_delay)
            .map(jitter)
            .take(self.max_retries)
    }
}

/// Alloy-backed reader with retries on transport failures.
#[derive(Debug, Clone)]
pub struct ProviderReader<P> {
    provider: P,
    retry: RetryPolicy,
}

impl<P: Provider> ProviderReader<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            retry: RetryPolicy::default(),
        }
    }

    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The wrapped provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    async fn retrying<T, F, Fut>(&self, method: &'static str, action: F) -> RpcResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RpcResult<T>>,
    {
        RetryIf::spawn(self.retry.strategy(), action, |err: &RpcError| {
            let retry = err.is_retryable();
            if retry {
                debug!(method, error = %err, "Retrying RPC request");
            }
            retry
        })
        .await
    }
}

fn transaction_request(request: &CallRequest) -> TransactionRequest {
    let mut tx = TransactionRequest::default()
        .to(request.to)
        .input(TransactionInput::new(request.data.clone()));
    tx.from = request.from;
    tx
}

fn block_id(block: Option<u64>) -> BlockId {
    block
        .map_or(BlockNumberOrTag::Latest, BlockNumberOrTag::Number)
        .into()
}

impl From<TransportError> for RpcError {
    fn from(err: TransportError) -> Self {
        match &err {
            TransportError::ErrorResp(payload) => match payload.as_revert_data() {
                Some(data) => Self::Revert {
                    data,
                    message: payload.message.to_string(),
                },
                None if payload.message.contains("revert") => Self::Revert {
                    data: Bytes::new(),
                    message: payload.message.to_string(),
                },
                None => Self::Transport(err.to_string()),
            },
            TransportError::NullResp => Self::NotFound(err.to_string()),
            TransportError::SerError(_) | TransportError::DeserError { .. } => {
                Self::InvalidResponse(err.to_string())
            }
            _ => Self::Transport(err.to_string()),
        }
    }
}

#[async_trait]
impl<P: Provider> ChainReader for ProviderReader<P> {
    async fn receipt(&self, tx_hash: B256) -> RpcResult<Option<Receipt>> {
        let receipt = self
            .retrying("eth_getTransactionReceipt", || async {
                self.provider
                    .get_transaction_receipt(tx_hash)
                    .await
                    .map_err(RpcError::from)
            })
            .await?;

        receipt
            .map(|receipt| {
                let block_number = receipt.block_number.ok_or_else(|| {
                    RpcError::InvalidResponse(format!("receipt {tx_hash} has no block number"))
                })?;
                Ok(Receipt {
                    transaction_hash: receipt.transaction_hash,
                    block_number,
                    status: receipt.status(),
                    logs: receipt
                        .inner
                        .logs()
                        .iter()
                        .map(|log| log.inner.clone())
                        .collect(),
                })
            })
            .transpose()
    }

    async fn block(&self, block: BlockNumberOrTag) -> RpcResult<BlockHeader> {
        let block = self
            .retrying("eth_getBlockByNumber", || async {
                self.provider
                    .get_block_by_number(block)
                    .await
                    .map_err(RpcError::from)
            })
            .await?
            .ok_or_else(|| RpcError::NotFound(format!("block {block}")))?;

        Ok(BlockHeader {
            number: block.header.number,
            hash: block.header.hash,
            state_root: block.header.state_root,
            timestamp: block.header.timestamp,
        })
    }

    async fn call(&self, request: CallRequest, block: Option<u64>) -> RpcResult<Bytes> {
        let tx = transaction_request(&request);

        self.retrying("eth_call", || async {
            self.provider
                .call(tx.clone())
                .block(block_id(block))
                .await
                .map_err(RpcError::from)
        })
        .await
    }

    async fn storage_proof(
        &self,
        address: Address,
        slot: B256,
        block: u64,
    ) -> RpcResult<StorageProof> {
        let response = self
            .retrying("eth_getProof", || async {
                self.provider
                    .get_proof(address, vec![slot])
                    .block_id(block_id(Some(block)))
                    .await
                    .map_err(RpcError::from)
            })
            .await?;

        let nodes = response
            .storage_proof
            .into_iter()
            .next()
            .map(|proof| proof.proof)
            .unwrap_or_default();

        Ok(StorageProof {
            storage_hash: response.storage_hash,
            nodes,
        })
    }

    async fn estimate_gas(&self, request: CallRequest) -> RpcResult<u64> {
        let tx = transaction_request(&request);

        self.retrying("eth_estimateGas", || async {
            self.provider
                .estimate_gas(tx.clone())
                .await
                .map_err(RpcError::from)
        })
        .await
    }
}
