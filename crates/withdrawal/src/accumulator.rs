//! Outbox resolution for Arbitrum Nitro chains.
//!
//! A withdrawal is covered by a confirmed rollup node; its proof is a Merkle
//! path in the send accumulator, built by NodeInterface on L2 and checked
//! against the roots the outbox has registered on L1.

use crate::{
    error::{ResolveError, UnresolvedReason},
    finalize::VerificationCall,
    merkle::{calculate_root, is_minimal_path, truncate_index},
    types::{AccumulatorCommitment, Commitment, InclusionProof, MerkleProof, Withdrawal},
};
use alloy_primitives::{Address, B256, U256};
use alloy_rpc_types_eth::BlockNumberOrTag;
use async_trait::async_trait;
use binding::arbitrum::{INodeInterface, IOutbox, IRollupCore};
use client::{call_sol, ChainReader, RpcError, RpcResult};
use config::ArbitrumConfig;
use std::sync::Arc;
use tracing::{debug, warn};

/// Proof returned by the outbox proof service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxProof {
    pub send: B256,
    pub root: B256,
    pub proof: Vec<B256>,
}

/// Builds Merkle proofs of accumulator leaves.
#[async_trait]
pub trait ProofService: Send + Sync {
    async fn build_proof(&self, size: u64, leaf: u64) -> RpcResult<OutboxProof>;
}

/// [`ProofService`] backed by NodeInterface `constructOutboxProof`.
pub struct NodeInterfaceProofService {
    l2: Arc<dyn ChainReader>,
    node_interface: Address,
}

impl NodeInterfaceProofService {
    pub fn new(l2: Arc<dyn ChainReader>, node_interface: Address) -> Self {
        Self { l2, node_interface }
    }
}

#[async_trait]
impl ProofService for NodeInterfaceProofService {
    async fn build_proof(&self, size: u64, leaf: u64) -> RpcResult<OutboxProof> {
        let ret = call_sol(
            self.l2.as_ref(),
            self.node_interface,
            INodeInterface::constructOutboxProofCall { size, leaf },
            None,
        )
        .await?;

        Ok(OutboxProof {
            send: ret.send,
            root: ret.root,
            proof: ret.proof,
        })
    }
}

/// Highest block a rollup node covers, stored in the high 8 bytes of `confirmData`.
pub fn node_block_watermark(node: &IRollupCore::Node) -> u64 {
    let mut high = [0u8; 8];
    high.copy_from_slice(&node.confirmData[..8]);
    u64::from_be_bytes(high)
}

/// Lazy walk from a rollup node back through `prevNum` links.
///
/// Stops after `budget` nodes, at genesis (node 0, never yielded), or when a
/// link does not point to an older node.
pub struct NodeAncestors<'a> {
    l1: &'a dyn ChainReader,
    rollup: Address,
    next: u64,
    remaining: usize,
}

impl<'a> NodeAncestors<'a> {
    pub const fn new(l1: &'a dyn ChainReader, rollup: Address, start: u64, budget: usize) -> Self {
        Self {
            l1,
            rollup,
            next: start,
            remaining: budget,
        }
    }

    /// Start at the latest confirmed node.
    pub async fn from_latest_confirmed(
        l1: &'a dyn ChainReader,
        rollup: Address,
        budget: usize,
    ) -> RpcResult<Self> {
        let latest = call_sol(l1, rollup, IRollupCore::latestConfirmedCall {}, None).await?;
        debug!(latest_confirmed = latest, "Starting node walk");
        Ok(Self::new(l1, rollup, latest, budget))
    }

    pub async fn next(&mut self) -> RpcResult<Option<(u64, IRollupCore::Node)>> {
        if self.remaining == 0 || self.next == 0 {
            return Ok(None);
        }

        let number = self.next;
        let node = call_sol(
            self.l1,
            self.rollup,
            IRollupCore::getNodeCall { nodeNum: number },
            None,
        )
        .await?;

        self.remaining -= 1;
        self.next = if node.prevNum < number {
            node.prevNum
        } else {
            0
        };

        Ok(Some((number, node)))
    }
}

/// Resolves outbox commitments and Merkle proofs.
pub struct MerkleAccumulatorResolver {
    config: ArbitrumConfig,
    l1: Arc<dyn ChainReader>,
    proofs: Arc<dyn ProofService>,
}

impl MerkleAccumulatorResolver {
    pub fn new(config: ArbitrumConfig, l1: Arc<dyn ChainReader>, l2: Arc<dyn ChainReader>) -> Self {
        let proofs = Arc::new(NodeInterfaceProofService::new(l2, config.node_interface));
        Self::with_proof_service(config, l1, proofs)
    }

    pub fn with_proof_service(
        config: ArbitrumConfig,
        l1: Arc<dyn ChainReader>,
        proofs: Arc<dyn ProofService>,
    ) -> Self {
        Self { config, l1, proofs }
    }

    pub const fn config(&self) -> &ArbitrumConfig {
        &self.config
    }

    pub fn l1(&self) -> &dyn ChainReader {
        self.l1.as_ref()
    }

    /// Configured outbox, else the one bound to the rollup.
    pub async fn outbox(&self) -> RpcResult<Address> {
        match self.config.outbox {
            Some(outbox) => Ok(outbox),
            None => call_sol(self.l1(), self.config.rollup, IRollupCore::outboxCall {}, None).await,
        }
    }

    /// First node, walking back from the latest confirmed one, whose watermark covers `l2_block`.
    pub async fn find_confirming_node(
        &self,
        l2_block: u64,
    ) -> RpcResult<Option<(u64, IRollupCore::Node)>> {
        let mut ancestors = NodeAncestors::from_latest_confirmed(
            self.l1(),
            self.config.rollup,
            self.config.max_node_steps,
        )
        .await?;

        while let Some((number, node)) = ancestors.next().await? {
            let watermark = node_block_watermark(&node);
            debug!(node = number, watermark, l2_block, "Checking rollup node");
            if watermark >= l2_block {
                return Ok(Some((number, node)));
            }
        }

        Ok(None)
    }

    /// L2 block hash the outbox registered for `root`, zero if none.
    async fn registered_root(&self, outbox: Address, root: B256) -> RpcResult<B256> {
        call_sol(self.l1(), outbox, IOutbox::rootsCall { root }, None).await
    }

    /// Resolve the accumulator size, its root and the L2 block hash registered for it.
    async fn resolve_size(
        &self,
        outbox: Address,
        leaf: u64,
        hint: Option<u64>,
    ) -> Result<(u64, B256, B256), ResolveError> {
        // A size equal to the leaf cannot contain it
        if let Some(size) = hint.filter(|size| *size > leaf) {
            match self.proofs.build_proof(size, leaf).await {
                Ok(proof) => {
                    let block_hash = self.registered_root(outbox, proof.root).await?;
                    if block_hash == B256::ZERO {
                        debug!(size, root = %proof.root, "Accumulator root not posted to L1");
                        return Err(ResolveError::Unresolved(UnresolvedReason::RootNotPosted {
                            root: proof.root,
                        }));
                    }
                    return Ok((size, proof.root, block_hash));
                }
                Err(RpcError::Revert { message, .. }) => {
                    warn!(size, leaf, %message, "Proof for size hint reverted, probing candidates");
                }
                Err(e) => return Err(e.into()),
            }
        } else if let Some(size) = hint {
            debug!(size, leaf, "Size hint does not cover leaf, probing candidates");
        }

        let candidates = std::iter::once(leaf.saturating_add(1))
            .chain(self.config.size_candidates.iter().copied())
            .filter(|size| *size > leaf);

        for size in candidates {
            let proof = match self.proofs.build_proof(size, leaf).await {
                Ok(proof) => proof,
                Err(e) => {
                    warn!(size, leaf, error = %e, "Proof for size candidate failed");
                    continue;
                }
            };
            match self.registered_root(outbox, proof.root).await {
                Ok(block_hash) if block_hash != B256::ZERO => {
                    debug!(size, root = %proof.root, "Found registered accumulator size");
                    return Ok((size, proof.root, block_hash));
                }
                Ok(_) => debug!(size, root = %proof.root, "Root for size candidate not registered"),
                Err(e) => warn!(size, error = %e, "Root lookup for size candidate failed"),
            }
        }

        Err(ResolveError::Unresolved(UnresolvedReason::SizeUndetermined))
    }

    pub async fn find_commitment(
        &self,
        withdrawal: &Withdrawal,
    ) -> Result<AccumulatorCommitment, ResolveError> {
        let leaf = withdrawal.leaf();
        let hint = withdrawal
            .accumulator_size
            .map(truncate_index)
            .filter(|size| *size != 0);

        if let Some(size) = hint {
            if size < leaf {
                return Err(ResolveError::InvalidProofWindow { size, leaf });
            }
        }

        let (node, created_at_block) =
            match self.find_confirming_node(withdrawal.l2_block_number).await? {
                Some((number, node)) => (number, node.createdAtBlock),
                None => {
                    debug!(
                        l2_block = withdrawal.l2_block_number,
                        steps = self.config.max_node_steps,
                        "No confirmed node covers withdrawal"
                    );
                    return Err(ResolveError::Unresolved(UnresolvedReason::NoConfirmedNode));
                }
            };

        let created_at = self
            .l1
            .block(BlockNumberOrTag::Number(created_at_block))
            .await?
            .timestamp;

        let outbox = self.outbox().await?;
        let (size, root, l2_block_hash) = self.resolve_size(outbox, leaf, hint).await?;

        debug!(node, size, leaf, root = %root, created_at, "Resolved accumulator commitment");

        Ok(AccumulatorCommitment {
            node,
            root,
            size,
            leaf,
            l2_block_hash,
            created_at,
        })
    }

    pub async fn build_proof(
        &self,
        commitment: &AccumulatorCommitment,
        withdrawal: &Withdrawal,
    ) -> Result<MerkleProof, ResolveError> {
        let AccumulatorCommitment { size, leaf, .. } = *commitment;
        if size < leaf {
            return Err(ResolveError::InvalidProofWindow { size, leaf });
        }

        let OutboxProof { send, root, proof } = self.proofs.build_proof(size, leaf).await?;

        if root != commitment.root {
            return Err(ResolveError::WrongProof(format!(
                "proof root {root} differs from commitment root {}",
                commitment.root
            )));
        }
        if send != withdrawal.message_hash {
            return Err(ResolveError::WrongProof(format!(
                "proof item {send} differs from message hash {}",
                withdrawal.message_hash
            )));
        }
        if !is_minimal_path(proof.len(), leaf) {
            return Err(ResolveError::WrongProof(format!(
                "path {leaf} not minimal for {} siblings",
                proof.len()
            )));
        }
        let computed = calculate_root(&proof, leaf, send);
        if computed != root {
            return Err(ResolveError::WrongProof(format!(
                "path folds to {computed}, expected {root}"
            )));
        }

        debug!(leaf, size, siblings = proof.len(), "Built outbox proof");

        Ok(MerkleProof {
            root,
            send,
            path: leaf,
            siblings: proof,
        })
    }

    pub async fn check_spent(&self, withdrawal: &Withdrawal) -> Result<bool, ResolveError> {
        let outbox = self.outbox().await?;
        let index = U256::from(withdrawal.leaf());
        Ok(call_sol(self.l1(), outbox, IOutbox::isSpentCall { index }, None).await?)
    }

    /// `Outbox.executeTransaction` for a proven message.
    pub async fn verification_call(
        &self,
        withdrawal: &Withdrawal,
        proof: &MerkleProof,
    ) -> Result<VerificationCall, ResolveError> {
        let call = IOutbox::executeTransactionCall {
            proof: proof.siblings.clone(),
            index: U256::from(proof.path),
            l2Sender: withdrawal.sender,
            to: withdrawal.target,
            l2Block: U256::from(withdrawal.l2_block_number),
            l1Block: U256::from(withdrawal.l1_block_at_send),
            l2Timestamp: U256::from(withdrawal.timestamp),
            value: withdrawal.value,
            data: withdrawal.calldata.clone(),
        };

        Ok(VerificationCall::new(self.outbox().await?, call))
    }

    pub(crate) fn expect_commitment<'c>(
        commitment: &'c Commitment,
    ) -> Result<&'c AccumulatorCommitment, ResolveError> {
        match commitment {
            Commitment::Accumulator(c) => Ok(c),
            Commitment::DisputeGame(_) => Err(ResolveError::WrongProof(
                "dispute game commitment given to outbox resolver".into(),
            )),
        }
    }

    pub(crate) fn expect_proof(proof: &InclusionProof) -> Result<&MerkleProof, ResolveError> {
        match proof {
            InclusionProof::Merkle(p) => Ok(p),
            InclusionProof::Storage(_) => Err(ResolveError::WrongProof(
                "storage proof given to outbox resolver".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        merkle::tree,
        test_utils::MockChain,
        types::Protocol,
    };
    use alloy_primitives::Bytes;
    use std::sync::Mutex;

    const ROLLUP: Address = Address::repeat_byte(0xaa);
    const OUTBOX: Address = Address::repeat_byte(0xbb);

    #[test]
    fn test_presets_use_nitro_precompiles() {
        use binding::arbitrum::{ARBSYS_ADDRESS, NODE_INTERFACE_ADDRESS};

        for config in [ArbitrumConfig::mainnet(), ArbitrumConfig::sepolia()] {
            assert_eq!(config.node_interface, NODE_INTERFACE_ADDRESS);
            assert_eq!(config.arbsys, ARBSYS_ADDRESS);
        }
    }

    /// Accumulator over fixed items; records every request.
    struct TreeProofs {
        items: Vec<B256>,
        requests: Mutex<Vec<(u64, u64)>>,
    }

    impl TreeProofs {
        fn new(items: Vec<B256>) -> Arc<Self> {
            Arc::new(Self {
                items,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn root(&self, size: u64) -> B256 {
            tree::build(&self.items, size, 0).0
        }

        fn requests(&self) -> Vec<(u64, u64)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProofService for TreeProofs {
        async fn build_proof(&self, size: u64, leaf: u64) -> RpcResult<OutboxProof> {
            self.requests.lock().unwrap().push((size, leaf));
            if size as usize > self.items.len() || leaf >= size {
                return Err(RpcError::Revert {
                    data: Bytes::new(),
                    message: "invalid size".into(),
                });
            }
            let (root, proof) = tree::build(&self.items, size, leaf);
            Ok(OutboxProof {
                send: self.items[leaf as usize],
                root,
                proof,
            })
        }
    }

    fn node(watermark: u64, prev: u64, created_at_block: u64) -> IRollupCore::Node {
        let mut confirm = [0u8; 32];
        confirm[..8].copy_from_slice(&watermark.to_be_bytes());
        IRollupCore::Node {
            stateHash: B256::ZERO,
            challengeHash: B256::ZERO,
            confirmData: B256::from(confirm),
            prevNum: prev,
            deadlineBlock: 0,
            noChildConfirmedBeforeBlock: 0,
            stakerCount: 0,
            childStakerCount: 0,
            firstChildBlock: 0,
            latestChildNumber: 0,
            createdAtBlock: created_at_block,
            nodeHash: B256::ZERO,
        }
    }

    fn withdrawal(leaf: u64, l2_block: u64, send: B256, size: Option<u64>) -> Withdrawal {
        Withdrawal {
            protocol: Protocol::Outbox,
            message_id: U256::from(leaf),
            sender: Address::repeat_byte(1),
            target: Address::repeat_byte(2),
            l2_block_number: l2_block,
            l1_block_at_send: 0,
            timestamp: 0,
            value: U256::ZERO,
            gas_limit: U256::ZERO,
            calldata: Bytes::new(),
            message_hash: send,
            l2_tx_hash: B256::ZERO,
            accumulator_size: size.map(U256::from),
        }
    }

    /// Rollup with nodes 1..=3 (watermarks 100, 200, 300), latest confirmed 3.
    fn rollup_chain(registered: impl Fn(B256) -> B256 + Send + Sync + 'static) -> MockChain {
        let mut chain = MockChain::new();
        chain
            .returning::<IRollupCore::latestConfirmedCall>(ROLLUP, 3)
            .on::<IRollupCore::getNodeCall>(ROLLUP, |call| {
                Ok(match call.nodeNum {
                    1 => node(100, 0, 10),
                    2 => node(200, 1, 20),
                    _ => node(300, 2, 30),
                })
            })
            .returning::<IRollupCore::outboxCall>(ROLLUP, OUTBOX)
            .on::<IOutbox::rootsCall>(OUTBOX, move |call| Ok(registered(call.root)))
            .with_block(10, 1_000)
            .with_block(20, 2_000)
            .with_block(30, 3_000);
        chain
    }

    fn config() -> ArbitrumConfig {
        let mut config = ArbitrumConfig::mainnet();
        config.rollup = ROLLUP;
        config.outbox = None;
        config.size_candidates = vec![6, 8];
        config
    }

    #[tokio::test]
    async fn test_size_below_leaf_never_builds_proof() {
        let proofs = TreeProofs::new(tree::items(4));
        let chain = rollup_chain(|_| B256::ZERO).into_reader();
        let resolver =
            MerkleAccumulatorResolver::with_proof_service(config(), chain.clone(), proofs.clone());

        let w = withdrawal(1000, 50, B256::ZERO, Some(999));
        let err = resolver.find_commitment(&w).await.unwrap_err();

        assert!(matches!(
            err,
            ResolveError::InvalidProofWindow {
                size: 999,
                leaf: 1000
            }
        ));
        assert!(err.to_string().contains("size below leaf"));
        assert!(proofs.requests().is_empty());
        assert_eq!(chain.call_count::<IRollupCore::getNodeCall>(ROLLUP), 0);
    }

    #[tokio::test]
    async fn test_commitment_from_size_hint() {
        let items = tree::items(8);
        let proofs = TreeProofs::new(items.clone());
        let registered = proofs.root(5);
        let chain = rollup_chain(move |root| {
            if root == registered {
                B256::repeat_byte(0xee)
            } else {
                B256::ZERO
            }
        })
        .into_reader();
        let resolver =
            MerkleAccumulatorResolver::with_proof_service(config(), chain.clone(), proofs.clone());

        let w = withdrawal(3, 50, items[3], Some(5));
        let commitment = resolver.find_commitment(&w).await.unwrap();

        // The latest confirmed node already covers block 50
        assert_eq!(commitment.node, 3);
        assert_eq!(commitment.created_at, 3_000);
        assert_eq!(commitment.size, 5);
        assert_eq!(commitment.root, registered);
        assert!(commitment.registered_on_l1());

        let proof = resolver.build_proof(&commitment, &w).await.unwrap();
        assert_eq!(calculate_root(&proof.siblings, proof.path, proof.send), commitment.root);
        assert_eq!(proof.path, 3);
    }

    #[tokio::test]
    async fn test_hint_equal_to_leaf_falls_back_to_candidates() {
        let items = tree::items(8);
        let proofs = TreeProofs::new(items.clone());
        let registered = proofs.root(4);
        let chain = rollup_chain(move |root| {
            if root == registered {
                B256::repeat_byte(1)
            } else {
                B256::ZERO
            }
        })
        .into_reader();
        let resolver = MerkleAccumulatorResolver::with_proof_service(config(), chain, proofs.clone());

        let commitment = resolver
            .find_commitment(&withdrawal(3, 50, items[3], Some(3)))
            .await
            .unwrap();

        assert_eq!(commitment.size, 4);
        assert_eq!(commitment.root, registered);
        // The hint is never sent to the proof service
        assert_eq!(proofs.requests(), vec![(4, 3)]);
    }

    #[tokio::test]
    async fn test_reverted_hint_falls_back_to_candidates() {
        let items = tree::items(8);
        let proofs = TreeProofs::new(items.clone());
        let registered = proofs.root(8);
        let chain = rollup_chain(move |root| {
            if root == registered {
                B256::repeat_byte(1)
            } else {
                B256::ZERO
            }
        })
        .into_reader();
        let resolver = MerkleAccumulatorResolver::with_proof_service(config(), chain, proofs.clone());

        // Size 9 exceeds the tree, so the proof service reverts
        let commitment = resolver
            .find_commitment(&withdrawal(6, 50, items[6], Some(9)))
            .await
            .unwrap();

        assert_eq!(commitment.size, 8);
        assert_eq!(proofs.requests(), vec![(9, 6), (7, 6), (8, 6)]);
    }

    #[tokio::test]
    async fn test_unposted_root_from_hint() {
        let items = tree::items(8);
        let proofs = TreeProofs::new(items.clone());
        let chain = rollup_chain(|_| B256::ZERO).into_reader();
        let resolver = MerkleAccumulatorResolver::with_proof_service(config(), chain, proofs.clone());

        let err = resolver
            .find_commitment(&withdrawal(3, 50, items[3], Some(5)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ResolveError::Unresolved(UnresolvedReason::RootNotPosted { root }) if root == proofs.root(5)
        ));
    }

    #[tokio::test]
    async fn test_probes_candidates_when_size_missing() {
        let items = tree::items(8);
        let proofs = TreeProofs::new(items.clone());
        let registered = proofs.root(8);
        let chain = rollup_chain(move |root| {
            if root == registered {
                B256::repeat_byte(1)
            } else {
                B256::ZERO
            }
        })
        .into_reader();
        let resolver = MerkleAccumulatorResolver::with_proof_service(config(), chain, proofs.clone());

        // Size zero in the receipt is treated as missing
        let commitment = resolver
            .find_commitment(&withdrawal(6, 50, items[6], Some(0)))
            .await
            .unwrap();

        assert_eq!(commitment.size, 8);
        // leaf + 1, then 6 (skipped, below leaf), then 8
        assert_eq!(proofs.requests(), vec![(7, 6), (8, 6)]);
    }

    #[tokio::test]
    async fn test_probing_exhausted_is_unresolved() {
        let items = tree::items(4);
        let proofs = TreeProofs::new(items.clone());
        let chain = rollup_chain(|_| B256::ZERO).into_reader();
        let resolver = MerkleAccumulatorResolver::with_proof_service(config(), chain, proofs.clone());

        let err = resolver
            .find_commitment(&withdrawal(2, 50, items[2], None))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ResolveError::Unresolved(UnresolvedReason::SizeUndetermined)
        ));
        // Sizes 6 and 8 exceed the tree and fail; both are still attempted
        assert_eq!(proofs.requests(), vec![(3, 2), (6, 2), (8, 2)]);
    }

    #[tokio::test]
    async fn test_no_node_covers_block() {
        let proofs = TreeProofs::new(tree::items(4));
        let chain = rollup_chain(|_| B256::repeat_byte(1)).into_reader();
        let resolver =
            MerkleAccumulatorResolver::with_proof_service(config(), chain.clone(), proofs);

        let err = resolver
            .find_commitment(&withdrawal(1, 301, B256::ZERO, Some(2)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ResolveError::Unresolved(UnresolvedReason::NoConfirmedNode)
        ));
        // Nodes 3, 2, 1; genesis is never read
        assert_eq!(chain.call_count::<IRollupCore::getNodeCall>(ROLLUP), 3);
    }

    #[tokio::test]
    async fn test_node_walk_respects_budget() {
        let chain = rollup_chain(|_| B256::ZERO);
        let mut ancestors = NodeAncestors::new(&chain, ROLLUP, 3, 2);

        let mut visited = Vec::new();
        while let Some((number, _)) = ancestors.next().await.unwrap() {
            visited.push(number);
        }
        assert_eq!(visited, vec![3, 2]);
    }

    #[tokio::test]
    async fn test_wrong_send_rejected() {
        let items = tree::items(8);
        let proofs = TreeProofs::new(items.clone());
        let registered = proofs.root(5);
        let chain = rollup_chain(move |root| {
            if root == registered {
                B256::repeat_byte(1)
            } else {
                B256::ZERO
            }
        })
        .into_reader();
        let resolver = MerkleAccumulatorResolver::with_proof_service(config(), chain, proofs);

        // Message hash does not match the accumulator item at the leaf
        let w = withdrawal(3, 50, items[2], Some(5));
        let commitment = resolver.find_commitment(&w).await.unwrap();
        let err = resolver.build_proof(&commitment, &w).await.unwrap_err();
        assert!(matches!(err, ResolveError::WrongProof(_)));
    }

    #[tokio::test]
    async fn test_check_spent_reads_outbox_bitmap() {
        let mut chain = rollup_chain(|_| B256::ZERO);
        chain.on::<IOutbox::isSpentCall>(OUTBOX, |call| Ok(call.index == U256::from(4)));
        let resolver = MerkleAccumulatorResolver::with_proof_service(
            config(),
            chain.into_reader(),
            TreeProofs::new(vec![]),
        );

        assert!(resolver
            .check_spent(&withdrawal(4, 0, B256::ZERO, None))
            .await
            .unwrap());
        assert!(!resolver
            .check_spent(&withdrawal(5, 0, B256::ZERO, None))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_configured_outbox_skips_rollup_lookup() {
        let chain = rollup_chain(|_| B256::ZERO).into_reader();
        let resolver = MerkleAccumulatorResolver::with_proof_service(
            config().with_outbox(Address::repeat_byte(0xcc)),
            chain.clone(),
            TreeProofs::new(vec![]),
        );

        assert_eq!(resolver.outbox().await.unwrap(), Address::repeat_byte(0xcc));
        assert_eq!(chain.call_count::<IRollupCore::outboxCall>(ROLLUP), 0);
    }
}
