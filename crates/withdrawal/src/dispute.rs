//! Dispute game resolution for OP Stack chains with fault proofs.

use crate::{
    error::{ResolveError, UnresolvedReason},
    finalize::VerificationCall,
    proof::{compute_storage_slot, maybe_add_proof_node, output_root_hash},
    types::{
        Commitment, DisputeGameCommitment, InclusionProof, OutputRoot, ProvenWithdrawal,
        StorageInclusionProof, Withdrawal, WithdrawalHash,
    },
};
use alloy_primitives::{Address, B256, U256};
use alloy_rpc_types_eth::BlockNumberOrTag;
use binding::opstack::{
    IAnchorStateRegistry, IDisputeGameFactory, IDisputeGameFactory::GameSearchResult,
    IOptimismPortal2,
};
use client::{call_sol, ChainReader, RpcResult};
use config::OptimismConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Compact view of a game, reported when no game can be used yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub index: U256,
    pub l2_block_number: u64,
    pub timestamp: u64,
    pub root_claim: B256,
}

/// L2 block a game claims, from the first word of its extra data.
pub fn game_l2_block(game: &GameSearchResult) -> Option<u64> {
    let word = game.extraData.get(..32)?;
    let block = U256::from_be_slice(word);
    Some(block.saturating_to())
}

/// A game seen during the backward search, with its decoded L2 block.
#[derive(Debug, Clone)]
struct Candidate {
    index: U256,
    timestamp: u64,
    root_claim: B256,
    l2_block_number: u64,
}

impl Candidate {
    fn summary(&self) -> GameSummary {
        GameSummary {
            index: self.index,
            l2_block_number: self.l2_block_number,
            timestamp: self.timestamp,
            root_claim: self.root_claim,
        }
    }
}

/// Resolves dispute games and storage proofs against OptimismPortal2.
pub struct DisputeGameResolver {
    config: OptimismConfig,
    l1: Arc<dyn ChainReader>,
    l2: Arc<dyn ChainReader>,
}

impl DisputeGameResolver {
    pub fn new(config: OptimismConfig, l1: Arc<dyn ChainReader>, l2: Arc<dyn ChainReader>) -> Self {
        Self { config, l1, l2 }
    }

    pub const fn config(&self) -> &OptimismConfig {
        &self.config
    }

    pub fn l1(&self) -> &dyn ChainReader {
        self.l1.as_ref()
    }

    /// Look up the proxy of a game and check both anchor-state predicates.
    async fn validate(&self, candidate: &Candidate) -> RpcResult<Option<(Address, u32)>> {
        let game = call_sol(
            self.l1(),
            self.config.dispute_game_factory,
            IDisputeGameFactory::gameAtIndexCall {
                _index: candidate.index,
            },
            None,
        )
        .await?;

        let registry = self.config.anchor_state_registry;
        let proper = call_sol(
            self.l1(),
            registry,
            IAnchorStateRegistry::isGameProperCall { _game: game.proxy },
            None,
        )
        .await?;
        if !proper {
            warn!(game_index = %candidate.index, proxy = %game.proxy, "Game is not proper (blacklisted, retired or paused)");
            return Ok(None);
        }

        let respected = call_sol(
            self.l1(),
            registry,
            IAnchorStateRegistry::isGameRespectedCall { _game: game.proxy },
            None,
        )
        .await?;
        if !respected {
            warn!(game_index = %candidate.index, proxy = %game.proxy, "Game is not respected (wrong game type)");
            return Ok(None);
        }

        Ok(Some((game.proxy, game.gameType)))
    }

    async fn accept(&self, candidate: &Candidate) -> RpcResult<Option<DisputeGameCommitment>> {
        let Some((proxy, game_type)) = self.validate(candidate).await? else {
            return Ok(None);
        };

        info!(
            game_index = %candidate.index,
            game_l2_block = candidate.l2_block_number,
            proxy = %proxy,
            "Found dispute game covering withdrawal"
        );

        Ok(Some(DisputeGameCommitment {
            index: candidate.index,
            proxy,
            game_type,
            l2_block_number: candidate.l2_block_number,
            root_claim: candidate.root_claim,
            created_at: candidate.timestamp,
            is_legitimate: true,
        }))
    }

    /// Oldest legitimate game of the respected type whose claim covers `l2_block`.
    ///
    /// Games are read newest first in batches. The running candidate is replaced
    /// by each older game that still covers the block and is not retired; the
    /// first game that fails either condition makes the candidate the boundary.
    /// An illegitimate boundary is discarded and the scan continues.
    pub async fn find_game(&self, l2_block: u64) -> Result<DisputeGameCommitment, ResolveError> {
        let portal = self.config.portal;
        let factory = self.config.dispute_game_factory;

        let game_type =
            call_sol(self.l1(), portal, IOptimismPortal2::respectedGameTypeCall {}, None).await?;
        let game_count =
            call_sol(self.l1(), factory, IDisputeGameFactory::gameCountCall {}, None).await?;
        if game_count.is_zero() {
            return Err(ResolveError::Unresolved(UnresolvedReason::NoDisputeGames));
        }
        let retirement = call_sol(
            self.l1(),
            self.config.anchor_state_registry,
            IAnchorStateRegistry::retirementTimestampCall {},
            None,
        )
        .await?;

        debug!(game_type, game_count = %game_count, retirement, l2_block, "Searching dispute games");

        let batch_size = self.config.game_batch_size;
        let mut cursor = game_count - U256::from(1);
        let mut candidate: Option<Candidate> = None;
        let mut recent = Vec::new();

        for batch in 0..self.config.max_game_batches {
            let games = call_sol(
                self.l1(),
                factory,
                IDisputeGameFactory::findLatestGamesCall {
                    _gameType: game_type,
                    _start: cursor,
                    _n: U256::from(batch_size),
                },
                None,
            )
            .await?;

            debug!(batch, cursor = %cursor, found = games.len(), "Fetched game batch");

            for game in &games {
                let Some(l2_block_number) = game_l2_block(game) else {
                    debug!(game_index = %game.index, "Skipping game without L2 block in extra data");
                    continue;
                };
                let seen = Candidate {
                    index: game.index,
                    timestamp: game.timestamp,
                    root_claim: game.rootClaim,
                    l2_block_number,
                };
                if recent.len() < self.config.recent_games_limit {
                    recent.push(seen.summary());
                }

                if l2_block_number >= l2_block && game.timestamp >= retirement {
                    candidate = Some(seen);
                } else if let Some(boundary) = candidate.take() {
                    if let Some(commitment) = self.accept(&boundary).await? {
                        return Ok(commitment);
                    }
                    debug!(game_index = %boundary.index, "Discarded illegitimate game, continuing search");
                }
            }

            let exhausted = (games.len() as u64) < batch_size;
            match games.last() {
                Some(oldest) if !exhausted && !oldest.index.is_zero() => {
                    cursor = oldest.index - U256::from(1);
                }
                _ => break,
            }
        }

        // Candidate left pending when history or budget ran out
        if let Some(boundary) = candidate {
            if let Some(commitment) = self.accept(&boundary).await? {
                return Ok(commitment);
            }
        }

        debug!(l2_block, recent = recent.len(), "No legitimate game covers withdrawal");
        Err(ResolveError::Unresolved(UnresolvedReason::NoCoveringGame {
            recent_games: recent,
        }))
    }

    pub async fn find_commitment(
        &self,
        withdrawal: &Withdrawal,
    ) -> Result<DisputeGameCommitment, ResolveError> {
        self.find_game(withdrawal.l2_block_number).await
    }

    /// Storage proof of the withdrawal and output root, both at the game's L2 block.
    pub async fn build_proof(
        &self,
        commitment: &DisputeGameCommitment,
        withdrawal: &Withdrawal,
    ) -> Result<StorageInclusionProof, ResolveError> {
        let block = commitment.l2_block_number;
        let slot = compute_storage_slot(withdrawal.message_hash);

        debug!(block, slot = %slot, "Generating storage proof at game's L2 block");

        let (storage, header) = tokio::try_join!(
            self.l2.storage_proof(self.config.message_passer, slot, block),
            self.l2.block(BlockNumberOrTag::Number(block)),
        )?;

        if storage.nodes.is_empty() {
            return Err(ResolveError::Unresolved(UnresolvedReason::EmptyStorageProof));
        }

        let output_root = OutputRoot::v0(header.state_root, storage.storage_hash, header.hash);
        let computed = output_root_hash(&output_root);
        if computed != commitment.root_claim {
            return Err(ResolveError::WrongProof(format!(
                "output root {computed} at block {block} differs from root claim {}",
                commitment.root_claim
            )));
        }

        let nodes = if self.config.patch_terminal_branch {
            maybe_add_proof_node(slot, storage.nodes)
        } else {
            storage.nodes
        };

        debug!(proof_nodes = nodes.len(), "Generated storage proof");

        Ok(StorageInclusionProof { nodes, output_root })
    }

    pub async fn check_spent(&self, withdrawal: &Withdrawal) -> Result<bool, ResolveError> {
        Ok(call_sol(
            self.l1(),
            self.config.portal,
            IOptimismPortal2::finalizedWithdrawalsCall {
                withdrawalHash: withdrawal.message_hash,
            },
            None,
        )
        .await?)
    }

    pub async fn proven_withdrawal(
        &self,
        withdrawal_hash: WithdrawalHash,
        submitter: Address,
    ) -> RpcResult<ProvenWithdrawal> {
        let proven = call_sol(
            self.l1(),
            self.config.portal,
            IOptimismPortal2::provenWithdrawalsCall {
                withdrawalHash: withdrawal_hash,
                proofSubmitter: submitter,
            },
            None,
        )
        .await?;

        Ok(ProvenWithdrawal {
            dispute_game_proxy: proven.disputeGameProxy,
            timestamp: proven.timestamp,
        })
    }

    pub async fn proof_maturity_delay(&self) -> RpcResult<u64> {
        let delay = call_sol(
            self.l1(),
            self.config.portal,
            IOptimismPortal2::proofMaturityDelaySecondsCall {},
            None,
        )
        .await?;
        Ok(delay.saturating_to())
    }

    /// `OptimismPortal2.proveWithdrawalTransaction` for a built proof.
    pub fn verification_call(
        &self,
        withdrawal: &Withdrawal,
        commitment: &DisputeGameCommitment,
        proof: &StorageInclusionProof,
    ) -> VerificationCall {
        VerificationCall::new(
            self.config.portal,
            IOptimismPortal2::proveWithdrawalTransactionCall {
                _tx: withdrawal.withdrawal_transaction(),
                _disputeGameIndex: commitment.index,
                _outputRootProof: proof.output_root.to_proof(),
                _withdrawalProof: proof.nodes.clone(),
            },
        )
    }

    pub(crate) fn expect_commitment(
        commitment: &Commitment,
    ) -> Result<&DisputeGameCommitment, ResolveError> {
        match commitment {
            Commitment::DisputeGame(c) => Ok(c),
            Commitment::Accumulator(_) => Err(ResolveError::WrongProof(
                "accumulator commitment given to dispute game resolver".into(),
            )),
        }
    }

    pub(crate) fn expect_proof(
        proof: &InclusionProof,
    ) -> Result<&StorageInclusionProof, ResolveError> {
        match proof {
            InclusionProof::Storage(p) => Ok(p),
            InclusionProof::Merkle(_) => Err(ResolveError::WrongProof(
                "merkle proof given to dispute game resolver".into(),
            )),
        }
    }
}
