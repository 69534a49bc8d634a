//! Withdrawal status derivation.
//!
//! [`evaluate`] maps an [`Observation`] to a [`Status`] without touching the
//! network. [`StatusEngine`] gathers the observation lazily, skipping every
//! query an earlier rule already made irrelevant.

use crate::{
    error::{Failure, FailureKind, ResolveError, UnresolvedReason},
    event::EventLocator,
    finalize::{FinalizationCall, FinalizationTxBuilder, GasEstimate},
    resolver::{CommitmentResolver, Resolver},
    types::{Commitment, Withdrawal},
};
use alloy_primitives::{Address, B256};
use alloy_rpc_types_eth::BlockNumberOrTag;
use client::ChainReader;
use config::ChainPairConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Finalization status of a withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// No L1 commitment covers the withdrawal yet
    NotSent { reason: UnresolvedReason },
    InChallenge { seconds_remaining: u64 },
    /// The verification call dry-runs successfully
    Ready { gas: u64 },
    Executed,
    Error(Failure),
}

impl Status {
    /// Name of the state, as serialized.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NotSent { .. } => "NOT_SENT",
            Self::InChallenge { .. } => "IN_CHALLENGE",
            Self::Ready { .. } => "READY",
            Self::Executed => "EXECUTED",
            Self::Error(_) => "ERROR",
        }
    }

    /// Nothing left to do for this withdrawal.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Executed)
    }
}

/// What commitment lookup produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitmentOutcome {
    /// Seconds since the commitment was recorded on L1
    Found { elapsed: u64 },
    Missing(UnresolvedReason),
    Invalid(Failure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DryRun {
    Succeeded { gas: u64 },
    Failed(Failure),
}

/// Inputs to [`evaluate`]. Fields after the first rule that fires are left unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub spent: bool,
    pub commitment: Option<CommitmentOutcome>,
    pub challenge_period: u64,
    pub dry_run: Option<DryRun>,
}

impl Observation {
    pub const fn new(challenge_period: u64) -> Self {
        Self {
            spent: false,
            commitment: None,
            challenge_period,
            dry_run: None,
        }
    }
}

/// Derive the status of a withdrawal from what was observed about it.
pub fn evaluate(observation: &Observation) -> Status {
    if observation.spent {
        return Status::Executed;
    }

    let elapsed = match &observation.commitment {
        Some(CommitmentOutcome::Found { elapsed }) => *elapsed,
        Some(CommitmentOutcome::Missing(reason)) => {
            return Status::NotSent {
                reason: reason.clone(),
            }
        }
        Some(CommitmentOutcome::Invalid(failure)) => return Status::Error(failure.clone()),
        None => {
            return Status::Error(Failure::new(
                FailureKind::Unclassified,
                "commitment not observed",
            ))
        }
    };

    if elapsed < observation.challenge_period {
        return Status::InChallenge {
            seconds_remaining: observation.challenge_period.saturating_sub(elapsed),
        };
    }

    match &observation.dry_run {
        Some(DryRun::Succeeded { gas }) => Status::Ready { gas: *gas },
        Some(DryRun::Failed(failure)) => Status::Error(failure.clone()),
        None => Status::Error(Failure::new(
            FailureKind::Unclassified,
            "verification call not dry-run",
        )),
    }
}

/// "2d 3h 4m", leaving out zero components; minutes are kept when nothing else is.
pub fn format_time_remaining(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;

    let mut parts = Vec::with_capacity(3);
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 || parts.is_empty() {
        parts.push(format!("{minutes}m"));
    }
    parts.join(" ")
}

/// Everything learned while resolving one withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub tx_hash: B256,
    pub withdrawal: Withdrawal,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commitment: Option<Commitment>,
    /// Verification call, present once the challenge period is over
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call: Option<FinalizationCall>,
}

/// Resolves L2 transactions to withdrawal statuses for one chain pair.
pub struct StatusEngine<R = Resolver> {
    l2: Arc<dyn ChainReader>,
    locator: EventLocator,
    resolver: R,
    builder: FinalizationTxBuilder,
}

impl StatusEngine<Resolver> {
    pub fn from_config(
        config: &ChainPairConfig,
        l1: Arc<dyn ChainReader>,
        l2: Arc<dyn ChainReader>,
    ) -> Self {
        let resolver = Resolver::from_config(config, l1, l2.clone());
        Self::new(l2, EventLocator::from_config(config), resolver)
    }
}

impl<R: CommitmentResolver> StatusEngine<R> {
    pub fn new(l2: Arc<dyn ChainReader>, locator: EventLocator, resolver: R) -> Self {
        let builder = FinalizationTxBuilder::new(resolver.dry_run_caller());
        Self {
            l2,
            locator,
            resolver,
            builder,
        }
    }

    /// Dry-run finalization calls from `caller` instead of the configured sender.
    pub fn with_caller(mut self, caller: Address) -> Self {
        self.builder = FinalizationTxBuilder::new(caller);
        self
    }

    pub const fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Resolve the withdrawal emitted by L2 transaction `tx_hash`.
    ///
    /// Classified resolution failures end up in the returned status; RPC
    /// failures and transactions that are not withdrawals are errors.
    pub async fn resolve(&self, tx_hash: B256) -> Result<StatusReport, ResolveError> {
        let receipt = self
            .l2
            .receipt(tx_hash)
            .await?
            .ok_or(ResolveError::TransactionNotFound(tx_hash))?;
        let withdrawal = self.locator.locate(&receipt)?;

        debug!(
            tx_hash = %tx_hash,
            message_id = %withdrawal.message_id,
            l2_block = withdrawal.l2_block_number,
            "Located withdrawal"
        );

        let mut observation = Observation::new(self.resolver.challenge_period());
        let mut report = StatusReport {
            tx_hash,
            withdrawal,
            status: Status::Executed,
            commitment: None,
            call: None,
        };

        observation.spent = self.resolver.check_spent(&report.withdrawal).await?;
        if observation.spent {
            return Ok(finish(report, &observation));
        }

        let commitment = match self.resolver.find_commitment(&report.withdrawal).await {
            Ok(commitment) => commitment,
            Err(e) => {
                observation.commitment = Some(outcome_of(e)?);
                return Ok(finish(report, &observation));
            }
        };

        let now = self.resolver.l1().block(BlockNumberOrTag::Latest).await?.timestamp;
        let elapsed = now.saturating_sub(commitment.created_at());
        debug!(created_at = commitment.created_at(), now, elapsed, "Commitment age");
        observation.commitment = Some(CommitmentOutcome::Found { elapsed });

        if elapsed < observation.challenge_period {
            report.commitment = Some(commitment);
            return Ok(finish(report, &observation));
        }

        match self.build_call(&report.withdrawal, &commitment).await {
            Ok(call) => {
                observation.dry_run = Some(match &call.gas {
                    GasEstimate::Known(gas) => DryRun::Succeeded { gas: *gas },
                    GasEstimate::Unknown { revert } => DryRun::Failed(revert.clone()),
                });
                report.call = Some(call);
            }
            Err(e) => match outcome_of(e)? {
                CommitmentOutcome::Invalid(failure) => {
                    observation.dry_run = Some(DryRun::Failed(failure));
                }
                missing => observation.commitment = Some(missing),
            },
        }
        report.commitment = Some(commitment);

        Ok(finish(report, &observation))
    }

    async fn build_call(
        &self,
        withdrawal: &Withdrawal,
        commitment: &Commitment,
    ) -> Result<FinalizationCall, ResolveError> {
        let proof = self.resolver.build_proof(commitment, withdrawal).await?;
        self.builder
            .build(&self.resolver, withdrawal, commitment, &proof)
            .await
    }
}

/// Sort a resolution error into a commitment outcome; unclassified errors propagate.
fn outcome_of(err: ResolveError) -> Result<CommitmentOutcome, ResolveError> {
    if let ResolveError::Unresolved(reason) = err {
        return Ok(CommitmentOutcome::Missing(reason));
    }
    match err.as_failure() {
        Some(failure) => Ok(CommitmentOutcome::Invalid(failure)),
        None => Err(err),
    }
}

fn finish(mut report: StatusReport, observation: &Observation) -> StatusReport {
    report.status = evaluate(observation);
    info!(tx_hash = %report.tx_hash, status = ?report.status, "Resolved withdrawal status");
    report
}
