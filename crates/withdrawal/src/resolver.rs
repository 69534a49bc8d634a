//! Protocol-independent view over the two commitment resolvers.

use crate::{
    accumulator::MerkleAccumulatorResolver,
    dispute::DisputeGameResolver,
    error::ResolveError,
    finalize::VerificationCall,
    types::{Commitment, InclusionProof, Protocol, Withdrawal},
};
use alloy_primitives::Address;
use async_trait::async_trait;
use client::ChainReader;
use config::ChainPairConfig;
use std::sync::Arc;

/// Finds the L1 commitment covering a withdrawal and proves the withdrawal against it.
#[async_trait]
pub trait CommitmentResolver: Send + Sync {
    fn protocol(&self) -> Protocol;

    /// L1 reader used for commitment lookups and dry runs.
    fn l1(&self) -> &dyn ChainReader;

    /// Seconds a commitment must age before the withdrawal can be finalized.
    fn challenge_period(&self) -> u64;

    /// Sender for dry runs when the caller does not provide one.
    fn dry_run_caller(&self) -> Address;

    async fn find_commitment(&self, withdrawal: &Withdrawal) -> Result<Commitment, ResolveError>;

    /// Proof valid only against `commitment`.
    async fn build_proof(
        &self,
        commitment: &Commitment,
        withdrawal: &Withdrawal,
    ) -> Result<InclusionProof, ResolveError>;

    /// Whether the withdrawal was already executed on L1.
    async fn check_spent(&self, withdrawal: &Withdrawal) -> Result<bool, ResolveError>;

    async fn verification_call(
        &self,
        withdrawal: &Withdrawal,
        commitment: &Commitment,
        proof: &InclusionProof,
    ) -> Result<VerificationCall, ResolveError>;
}

#[async_trait]
impl CommitmentResolver for MerkleAccumulatorResolver {
    fn protocol(&self) -> Protocol {
        Protocol::Outbox
    }

    fn l1(&self) -> &dyn ChainReader {
        Self::l1(self)
    }

    fn challenge_period(&self) -> u64 {
        self.config().challenge_period_secs
    }

    fn dry_run_caller(&self) -> Address {
        self.config().dry_run_caller
    }

    async fn find_commitment(&self, withdrawal: &Withdrawal) -> Result<Commitment, ResolveError> {
        Self::find_commitment(self, withdrawal)
            .await
            .map(Commitment::Accumulator)
    }

    async fn build_proof(
        &self,
        commitment: &Commitment,
        withdrawal: &Withdrawal,
    ) -> Result<InclusionProof, ResolveError> {
        let commitment = Self::expect_commitment(commitment)?;
        Self::build_proof(self, commitment, withdrawal)
            .await
            .map(InclusionProof::Merkle)
    }

    async fn check_spent(&self, withdrawal: &Withdrawal) -> Result<bool, ResolveError> {
        Self::check_spent(self, withdrawal).await
    }

    async fn verification_call(
        &self,
        withdrawal: &Withdrawal,
        commitment: &Commitment,
        proof: &InclusionProof,
    ) -> Result<VerificationCall, ResolveError> {
        Self::expect_commitment(commitment)?;
        let proof = Self::expect_proof(proof)?;
        Self::verification_call(self, withdrawal, proof).await
    }
}

#[async_trait]
impl CommitmentResolver for DisputeGameResolver {
    fn protocol(&self) -> Protocol {
        Protocol::FaultProof
    }

    fn l1(&self) -> &dyn ChainReader {
        Self::l1(self)
    }

    fn challenge_period(&self) -> u64 {
        self.config().challenge_period_secs
    }

    fn dry_run_caller(&self) -> Address {
        self.config().dry_run_caller
    }

    async fn find_commitment(&self, withdrawal: &Withdrawal) -> Result<Commitment, ResolveError> {
        Self::find_commitment(self, withdrawal)
            .await
            .map(Commitment::DisputeGame)
    }

    async fn build_proof(
        &self,
        commitment: &Commitment,
        withdrawal: &Withdrawal,
    ) -> Result<InclusionProof, ResolveError> {
        let commitment = Self::expect_commitment(commitment)?;
        Self::build_proof(self, commitment, withdrawal)
            .await
            .map(InclusionProof::Storage)
    }

    async fn check_spent(&self, withdrawal: &Withdrawal) -> Result<bool, ResolveError> {
        Self::check_spent(self, withdrawal).await
    }

    async fn verification_call(
        &self,
        withdrawal: &Withdrawal,
        commitment: &Commitment,
        proof: &InclusionProof,
    ) -> Result<VerificationCall, ResolveError> {
        let commitment = Self::expect_commitment(commitment)?;
        let proof = Self::expect_proof(proof)?;
        Ok(Self::verification_call(self, withdrawal, commitment, proof))
    }
}

/// The resolver for one chain pair, chosen once from its configuration.
pub enum Resolver {
    Accumulator(MerkleAccumulatorResolver),
    DisputeGame(DisputeGameResolver),
}

impl Resolver {
    pub fn from_config(
        config: &ChainPairConfig,
        l1: Arc<dyn ChainReader>,
        l2: Arc<dyn ChainReader>,
    ) -> Self {
        match config {
            ChainPairConfig::Arbitrum(c) => {
                Self::Accumulator(MerkleAccumulatorResolver::new(c.clone(), l1, l2))
            }
            ChainPairConfig::Optimism(c) => {
                Self::DisputeGame(DisputeGameResolver::new(c.clone(), l1, l2))
            }
        }
    }

    fn inner(&self) -> &dyn CommitmentResolver {
        match self {
            Self::Accumulator(r) => r,
            Self::DisputeGame(r) => r,
        }
    }
}

#[async_trait]
impl CommitmentResolver for Resolver {
    fn protocol(&self) -> Protocol {
        self.inner().protocol()
    }

    fn l1(&self) -> &dyn ChainReader {
        self.inner().l1()
    }

    fn challenge_period(&self) -> u64 {
        self.inner().challenge_period()
    }

    fn dry_run_caller(&self) -> Address {
        self.inner().dry_run_caller()
    }

    async fn find_commitment(&self, withdrawal: &Withdrawal) -> Result<Commitment, ResolveError> {
        self.inner().find_commitment(withdrawal).await
    }

    async fn build_proof(
        &self,
        commitment: &Commitment,
        withdrawal: &Withdrawal,
    ) -> Result<InclusionProof, ResolveError> {
        self.inner().build_proof(commitment, withdrawal).await
    }

    async fn check_spent(&self, withdrawal: &Withdrawal) -> Result<bool, ResolveError> {
        self.inner().check_spent(withdrawal).await
    }

    async fn verification_call(
        &self,
        withdrawal: &Withdrawal,
        commitment: &Commitment,
        proof: &InclusionProof,
    ) -> Result<VerificationCall, ResolveError> {
        self.inner()
            .verification_call(withdrawal, commitment, proof)
            .await
    }
}
