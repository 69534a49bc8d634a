//! Unsigned finalization call descriptors.
//!
//! Nothing here signs or broadcasts; callers hand the descriptor to whatever
//! wallet or relayer they use.

use crate::{
    dispute::DisputeGameResolver,
    error::{Failure, FailureKind, ResolveError},
    resolver::CommitmentResolver,
    types::{Commitment, InclusionProof, Withdrawal},
};
use alloy_primitives::{Address, Bytes, Selector, U256};
use alloy_sol_types::SolCall;
use binding::opstack::IOptimismPortal2;
use client::{CallRequest, ChainReader, RpcError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Percentage added on top of the estimate when suggesting a gas limit.
const GAS_BUFFER_PERCENT: u64 = 20;

/// Encoded call to the L1 verification entrypoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCall {
    pub to: Address,
    pub function: String,
    pub selector: Selector,
    pub data: Bytes,
}

impl VerificationCall {
    pub fn new<C: SolCall>(to: Address, call: C) -> Self {
        Self {
            to,
            function: C::SIGNATURE.to_string(),
            selector: C::SELECTOR.into(),
            data: call.abi_encode().into(),
        }
    }
}

/// Outcome of dry-running the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GasEstimate {
    Known(u64),
    Unknown { revert: Failure },
}

/// Ready-to-sign description of a finalization transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizationCall {
    pub from: Address,
    pub to: Address,
    pub function: String,
    pub selector: Selector,
    pub data: Bytes,
    pub value: U256,
    pub gas: GasEstimate,
}

impl FinalizationCall {
    /// Estimated gas plus a 20% buffer, `None` when the dry run reverted.
    pub fn gas_limit_with_buffer(&self) -> Option<u64> {
        match &self.gas {
            GasEstimate::Known(gas) => {
                Some(gas.saturating_add(gas.saturating_mul(GAS_BUFFER_PERCENT) / 100))
            }
            GasEstimate::Unknown { .. } => None,
        }
    }

    pub fn revert(&self) -> Option<&Failure> {
        match &self.gas {
            GasEstimate::Known(_) => None,
            GasEstimate::Unknown { revert } => Some(revert),
        }
    }
}

/// Builds finalization calls and dry-runs them from a fixed caller.
#[derive(Debug, Clone, Copy)]
pub struct FinalizationTxBuilder {
    caller: Address,
}

impl FinalizationTxBuilder {
    pub const fn new(caller: Address) -> Self {
        Self { caller }
    }

    pub const fn caller(&self) -> Address {
        self.caller
    }

    /// Estimate gas for `call` on L1.
    ///
    /// The descriptor is always returned; a failed estimate only leaves the gas
    /// unknown. Reverts are classified, other failures are unclassified.
    async fn dry_run(&self, l1: &dyn ChainReader, call: VerificationCall) -> FinalizationCall {
        let request = CallRequest::new(call.to, call.data.clone()).from(self.caller);
        let gas = match l1.estimate_gas(request).await {
            Ok(gas) => GasEstimate::Known(gas),
            Err(RpcError::Revert { data, message }) => {
                let revert = Failure::from_revert(&data, &message);
                debug!(kind = ?revert.kind, detail = %revert.detail, "Dry run reverted");
                GasEstimate::Unknown { revert }
            }
            Err(e) => {
                warn!(to = %call.to, function = %call.function, error = %e, "Gas estimation failed");
                GasEstimate::Unknown {
                    revert: Failure::new(FailureKind::Unclassified, e.to_string()),
                }
            }
        };

        FinalizationCall {
            from: self.caller,
            to: call.to,
            function: call.function,
            selector: call.selector,
            data: call.data,
            value: U256::ZERO,
            gas,
        }
    }

    /// Verification call for a built proof, dry-run from the caller.
    pub async fn build<R>(
        &self,
        resolver: &R,
        withdrawal: &Withdrawal,
        commitment: &Commitment,
        proof: &InclusionProof,
    ) -> Result<FinalizationCall, ResolveError>
    where
        R: CommitmentResolver + ?Sized,
    {
        let call = resolver
            .verification_call(withdrawal, commitment, proof)
            .await?;
        info!(to = %call.to, function = %call.function, "Built verification call");
        Ok(self.dry_run(resolver.l1(), call).await)
    }

    /// `finalizeWithdrawalTransactionExternalProof` for a withdrawal the caller proved.
    ///
    /// Fails with [`ResolveError::NotConfirmed`] until the proof exists and the
    /// portal's maturity delay has passed at `now`.
    pub async fn build_finalize_proven(
        &self,
        resolver: &DisputeGameResolver,
        withdrawal: &Withdrawal,
        now: u64,
    ) -> Result<FinalizationCall, ResolveError> {
        let proven = resolver
            .proven_withdrawal(withdrawal.message_hash, self.caller)
            .await?;
        if !proven.exists() {
            return Err(ResolveError::NotConfirmed(format!(
                "withdrawal {} not proven by {}",
                withdrawal.message_hash, self.caller
            )));
        }

        let delay = resolver.proof_maturity_delay().await?;
        let matures_at = proven.timestamp.saturating_add(delay);
        if now < matures_at {
            return Err(ResolveError::NotConfirmed(format!(
                "proof matures in {}",
                crate::status::format_time_remaining(matures_at - now)
            )));
        }

        let call = VerificationCall::new(
            resolver.config().portal,
            IOptimismPortal2::finalizeWithdrawalTransactionExternalProofCall {
                _tx: withdrawal.withdrawal_transaction(),
                _proofSubmitter: self.caller,
            },
        );
        Ok(self.dry_run(resolver.l1(), call).await)
    }
}
