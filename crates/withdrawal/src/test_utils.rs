//! In-memory chain used by the resolver tests.

use alloy_primitives::{Address, Bytes, B256};
use alloy_rpc_types_eth::BlockNumberOrTag;
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use client::{BlockHeader, CallRequest, ChainReader, Receipt, RpcError, RpcResult, StorageProof};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

type CallHandler = Box<dyn Fn(&[u8]) -> RpcResult<Bytes> + Send + Sync>;
type GasHandler = Box<dyn Fn(&CallRequest) -> RpcResult<u64> + Send + Sync>;

/// [`ChainReader`] answering from canned data. View calls are dispatched on
/// `(address, selector)`; unknown calls fail with [`RpcError::NotFound`].
#[derive(Default)]
pub(crate) struct MockChain {
    receipts: HashMap<B256, Receipt>,
    blocks: HashMap<u64, BlockHeader>,
    latest: Option<u64>,
    calls: HashMap<(Address, [u8; 4]), CallHandler>,
    gas: HashMap<(Address, [u8; 4]), GasHandler>,
    storage_proofs: HashMap<(Address, B256, u64), StorageProof>,
    log: Mutex<Vec<CallRequest>>,
}

impl MockChain {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn into_reader(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub(crate) fn with_receipt(&mut self, receipt: Receipt) -> &mut Self {
        self.receipts.insert(receipt.transaction_hash, receipt);
        self
    }

    /// Add a block; the highest block added is `latest`.
    pub(crate) fn with_block(&mut self, number: u64, timestamp: u64) -> &mut Self {
        self.blocks.insert(
            number,
            BlockHeader {
                number,
                hash: B256::with_last_byte(number as u8),
                state_root: B256::repeat_byte(0x5a),
                timestamp,
            },
        );
        self.latest = self.latest.max(Some(number));
        self
    }

    /// Answer typed calls to `C` on `to`.
    pub(crate) fn on<C>(
        &mut self,
        to: Address,
        handler: impl Fn(C) -> RpcResult<C::Return> + Send + Sync + 'static,
    ) -> &mut Self
    where
        C: SolCall + 'static,
    {
        self.calls.insert(
            (to, C::SELECTOR),
            Box::new(move |data: &[u8]| {
                let call = C::abi_decode(data)
                    .map_err(|e| RpcError::InvalidResponse(e.to_string()))?;
                handler(call).map(|ret| C::abi_encode_returns(&ret).into())
            }),
        );
        self
    }

    /// Answer every call to `C` on `to` with the same value.
    pub(crate) fn returning<C>(&mut self, to: Address, ret: C::Return) -> &mut Self
    where
        C: SolCall + 'static,
        C::Return: Clone + Send + Sync,
    {
        self.on::<C>(to, move |_| Ok(ret.clone()))
    }

    /// Make calls to `C` on `to` fail.
    pub(crate) fn failing<C>(&mut self, to: Address, err: RpcError) -> &mut Self
    where
        C: SolCall + 'static,
    {
        self.calls
            .insert((to, C::SELECTOR), Box::new(move |_: &[u8]| Err(err.clone())));
        self
    }

    /// Answer gas estimates for `C` on `to`.
    pub(crate) fn estimating<C>(
        &mut self,
        to: Address,
        handler: impl Fn(&CallRequest) -> RpcResult<u64> + Send + Sync + 'static,
    ) -> &mut Self
    where
        C: SolCall,
    {
        self.gas.insert((to, C::SELECTOR), Box::new(handler));
        self
    }

    pub(crate) fn with_storage_proof(
        &mut self,
        address: Address,
        slot: B256,
        block: u64,
        proof: StorageProof,
    ) -> &mut Self {
        self.storage_proofs.insert((address, slot, block), proof);
        self
    }

    /// Number of view calls made to `C` on `to`.
    pub(crate) fn call_count<C: SolCall>(&self, to: Address) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|req| req.to == to && req.selector() == Some(C::SELECTOR))
            .count()
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn receipt(&self, tx_hash: B256) -> RpcResult<Option<Receipt>> {
        Ok(self.receipts.get(&tx_hash).cloned())
    }

    async fn block(&self, block: BlockNumberOrTag) -> RpcResult<BlockHeader> {
        let number = match block {
            BlockNumberOrTag::Number(n) => Some(n),
            _ => self.latest,
        };
        number
            .and_then(|n| self.blocks.get(&n))
            .copied()
            .ok_or_else(|| RpcError::NotFound(format!("block {block}")))
    }

    async fn call(&self, request: CallRequest, _block: Option<u64>) -> RpcResult<Bytes> {
        self.log.lock().unwrap().push(request.clone());
        let selector = request
            .selector()
            .ok_or_else(|| RpcError::InvalidResponse("empty calldata".into()))?;
        let handler = self
            .calls
            .get(&(request.to, selector))
            .ok_or_else(|| RpcError::NotFound(format!("no handler for {}", request.to)))?;
        handler(&request.data)
    }

    async fn storage_proof(
        &self,
        address: Address,
        slot: B256,
        block: u64,
    ) -> RpcResult<StorageProof> {
        self.storage_proofs
            .get(&(address, slot, block))
            .cloned()
            .ok_or_else(|| RpcError::NotFound(format!("proof for {slot} at {block}")))
    }

    async fn estimate_gas(&self, request: CallRequest) -> RpcResult<u64> {
        let selector = request
            .selector()
            .ok_or_else(|| RpcError::InvalidResponse("empty calldata".into()))?;
        let handler = self
            .gas
            .get(&(request.to, selector))
            .ok_or_else(|| RpcError::NotFound(format!("no gas handler for {}", request.to)))?;
        handler(&request)
    }
}
