//! Read-only chain access used by the withdrawal resolvers.
//!
//! Resolvers only ever see [`ChainReader`]; timeouts and retries belong to the
//! implementation behind it.

use alloy_primitives::{Address, Bytes, Log, B256};
use alloy_rpc_types_eth::BlockNumberOrTag;
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use thiserror::Error;

/// RPC error type shared by every [`ChainReader`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// Network or node failure; the request may succeed if repeated.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The call reverted. `data` holds the raw revert payload, possibly empty.
    #[error("Execution reverted: {message}")]
    Revert { data: Bytes, message: String },

    /// The requested object does not exist on this chain.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The node answered with something that could not be decoded.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl RpcError {
    /// Returns true if this error is transient and the request should be retried.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Result type alias for RPC operations.
pub type RpcResult<T> = Result<T, RpcError>;

/// Transaction receipt reduced to what withdrawal location needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: B256,
    pub block_number: u64,
    /// `false` if the transaction reverted
    pub status: bool,
    /// Logs in emission order
    pub logs: Vec<Log>,
}

/// Block header fields consumed by the resolvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub number: u64,
    pub hash: B256,
    pub state_root: B256,
    pub timestamp: u64,
}

/// `eth_getProof` result for a single storage slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageProof {
    /// Storage root of the account
    pub storage_hash: B256,
    /// Trie nodes from the storage root down to the slot
    pub nodes: Vec<Bytes>,
}

/// A read-only message call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Option<Address>,
    pub to: Address,
    pub data: Bytes,
}

impl CallRequest {
    pub const fn new(to: Address, data: Bytes) -> Self {
        Self {
            from: None,
            to,
            data,
        }
    }

    /// Set the sender used for the call.
    pub const fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Four-byte selector of the calldata, if present.
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.data.get(..4).and_then(|s| s.try_into().ok())
    }
}

/// Read-only RPC access to one chain.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Receipt of a mined transaction, `None` if unknown.
    async fn receipt(&self, tx_hash: B256) -> RpcResult<Option<Receipt>>;

    /// Header of the block at `block`.
    async fn block(&self, block: BlockNumberOrTag) -> RpcResult<BlockHeader>;

    /// Execute a view call, at `block` or latest.
    async fn call(&self, request: CallRequest, block: Option<u64>) -> RpcResult<Bytes>;

    /// Storage proof of `slot` in `address` at `block`.
    async fn storage_proof(
        &self,
        address: Address,
        slot: B256,
        block: u64,
    ) -> RpcResult<StorageProof>;

    /// Gas estimate for a call. Reverts surface as [`RpcError::Revert`].
    async fn estimate_gas(&self, request: CallRequest) -> RpcResult<u64>;
}

/// Run a typed view call through a [`ChainReader`] and decode its return value.
pub async fn call_sol<R, C>(
    reader: &R,
    to: Address,
    call: C,
    block: Option<u64>,
) -> RpcResult<C::Return>
where
    R: ChainReader + ?Sized,
    C: SolCall + Send,
{
    let request = CallRequest::new(to, call.abi_encode().into());
    let output = reader.call(request, block).await?;

    C::abi_decode_returns(&output)
        .map_err(|e| RpcError::InvalidResponse(format!("{}: {}", C::SIGNATURE, e)))
}
