//! Error taxonomy for withdrawal resolution and classification of dry-run reverts.

use crate::dispute::GameSummary;
use alloy_primitives::{Bytes, B256};
use alloy_sol_types::{Revert, SolError};
use binding::{arbitrum::IOutbox, opstack::IOptimismPortal2};
use client::RpcError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while decoding a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocateError {
    #[error("Transaction {0} emitted no withdrawal event")]
    NotAWithdrawal(B256),
}

/// Why no usable commitment was found. Retrying later may succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// No confirmed rollup node covers the withdrawal block within the step budget
    NoConfirmedNode,
    /// The accumulator root exists on L2 but has not been posted to the outbox
    RootNotPosted { root: B256 },
    /// No probed accumulator size yields a root registered on L1
    SizeUndetermined,
    /// The factory holds no games of the respected type
    NoDisputeGames,
    /// No legitimate game covers the withdrawal block within the search budget
    NoCoveringGame { recent_games: Vec<GameSummary> },
    /// The node returned no storage proof for the withdrawal slot
    EmptyStorageProof,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoConfirmedNode => f.write_str("no confirmed node covers the withdrawal"),
            Self::RootNotPosted { root } => write!(f, "root {root} not posted to L1"),
            Self::SizeUndetermined => f.write_str("accumulator size could not be determined"),
            Self::NoDisputeGames => f.write_str("no dispute games exist"),
            Self::NoCoveringGame { .. } => {
                f.write_str("no legitimate dispute game covers the withdrawal")
            }
            Self::EmptyStorageProof => f.write_str("empty storage proof"),
        }
    }
}

/// Category of a failed finalization attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Accumulator size is below the leaf index
    InvalidProofWindow,
    /// The commitment is not final yet
    NotConfirmed,
    /// The message was executed concurrently
    AlreadySpent,
    /// The proof does not match the commitment
    WrongProof,
    Unclassified,
}

/// A classified failure with the detail it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub detail: String,
}

impl Failure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Classify a reverted dry run.
    pub fn from_revert(data: &Bytes, message: &str) -> Self {
        let kind = classify_revert(data, message);
        let detail = error_name(data)
            .map(str::to_string)
            .or_else(|| Revert::abi_decode(data).ok().map(|r| r.reason))
            .unwrap_or_else(|| message.to_string());

        Self { kind, detail }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Transaction {0} not found")]
    TransactionNotFound(B256),

    #[error("Transaction {0} emitted no withdrawal event")]
    NotAWithdrawal(B256),

    #[error("Unresolved: {0}")]
    Unresolved(UnresolvedReason),

    #[error("size below leaf: size {size}, leaf {leaf}")]
    InvalidProofWindow { size: u64, leaf: u64 },

    #[error("Not confirmed: {0}")]
    NotConfirmed(String),

    #[error("Already spent")]
    AlreadySpent,

    #[error("Wrong proof: {0}")]
    WrongProof(String),

    #[error(transparent)]
    Rpc(#[from] RpcError),
}

impl From<LocateError> for ResolveError {
    fn from(err: LocateError) -> Self {
        match err {
            LocateError::NotAWithdrawal(tx_hash) => Self::NotAWithdrawal(tx_hash),
        }
    }
}

impl ResolveError {
    /// Failure carried into a status, for errors that are not retryable with the same inputs.
    pub fn as_failure(&self) -> Option<Failure> {
        let kind = match self {
            Self::InvalidProofWindow { .. } => FailureKind::InvalidProofWindow,
            Self::NotConfirmed(_) => FailureKind::NotConfirmed,
            Self::AlreadySpent => FailureKind::AlreadySpent,
            Self::WrongProof(_) => FailureKind::WrongProof,
            _ => return None,
        };
        Some(Failure::new(kind, self.to_string()))
    }
}

const NOT_CONFIRMED: &[[u8; 4]] = &[
    IOutbox::UnknownRoot::SELECTOR,
    IOptimismPortal2::OptimismPortal_ProofNotOldEnough::SELECTOR,
    IOptimismPortal2::OptimismPortal_Unproven::SELECTOR,
    IOptimismPortal2::OptimismPortal_InvalidProofTimestamp::SELECTOR,
    IOptimismPortal2::ProofNotOldEnough::SELECTOR,
    IOptimismPortal2::Unproven::SELECTOR,
];

const ALREADY_SPENT: &[[u8; 4]] = &[
    IOutbox::AlreadySpent::SELECTOR,
    IOptimismPortal2::OptimismPortal_AlreadyFinalized::SELECTOR,
    IOptimismPortal2::AlreadyFinalized::SELECTOR,
];

const WRONG_PROOF: &[[u8; 4]] = &[
    IOutbox::ProofTooLong::SELECTOR,
    IOutbox::PathNotMinimal::SELECTOR,
    IOptimismPortal2::OptimismPortal_InvalidMerkleProof::SELECTOR,
    IOptimismPortal2::OptimismPortal_InvalidOutputRootProof::SELECTOR,
    IOptimismPortal2::OptimismPortal_InvalidRootClaim::SELECTOR,
    IOptimismPortal2::OptimismPortal_InvalidDisputeGame::SELECTOR,
    IOptimismPortal2::OptimismPortal_ImproperDisputeGame::SELECTOR,
    IOptimismPortal2::InvalidMerkleProof::SELECTOR,
    IOptimismPortal2::InvalidDisputeGame::SELECTOR,
    IOptimismPortal2::InvalidGameType::SELECTOR,
];

/// Classify revert data from a dry run by custom-error selector, then by revert string.
pub fn classify_revert(data: &Bytes, message: &str) -> FailureKind {
    if let Some(selector) = data.get(..4).and_then(|s| <[u8; 4]>::try_from(s).ok()) {
        if NOT_CONFIRMED.contains(&selector) {
            return FailureKind::NotConfirmed;
        }
        if ALREADY_SPENT.contains(&selector) {
            return FailureKind::AlreadySpent;
        }
        if WRONG_PROOF.contains(&selector) {
            return FailureKind::WrongProof;
        }
    }

    let reason = Revert::abi_decode(data)
        .map(|r| r.reason)
        .unwrap_or_else(|_| message.to_string());
    classify_reason(&reason)
}

fn classify_reason(reason: &str) -> FailureKind {
    let reason = reason.to_ascii_uppercase();
    if reason.contains("NOT_CONFIRMED") {
        FailureKind::NotConfirmed
    } else if reason.contains("ALREADY_SPENT") {
        FailureKind::AlreadySpent
    } else if reason.contains("WRONG_MERKLE") || reason.contains("INVALID MERKLE") {
        FailureKind::WrongProof
    } else {
        FailureKind::Unclassified
    }
}

const OUTBOX_ERRORS: &[([u8; 4], &str)] = &[
    (IOutbox::UnknownRoot::SELECTOR, IOutbox::UnknownRoot::SIGNATURE),
    (IOutbox::AlreadySpent::SELECTOR, IOutbox::AlreadySpent::SIGNATURE),
    (IOutbox::ProofTooLong::SELECTOR, IOutbox::ProofTooLong::SIGNATURE),
    (IOutbox::PathNotMinimal::SELECTOR, IOutbox::PathNotMinimal::SIGNATURE),
    (IOutbox::BridgeCallFailed::SELECTOR, IOutbox::BridgeCallFailed::SIGNATURE),
];

fn error_name(data: &Bytes) -> Option<&'static str> {
    let selector: [u8; 4] = data.get(..4)?.try_into().ok()?;
    if let Some((_, name)) = OUTBOX_ERRORS.iter().find(|(s, _)| *s == selector) {
        return Some(name);
    }

    if NOT_CONFIRMED.contains(&selector) {
        Some("NotConfirmed")
    } else if ALREADY_SPENT.contains(&selector) {
        Some("AlreadyFinalized")
    } else if WRONG_PROOF.contains(&selector) {
        Some("InvalidProof")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    fn custom_error<E: SolError>(err: E) -> Bytes {
        err.abi_encode().into()
    }

    #[test]
    fn test_classify_custom_errors() {
        let unknown_root = custom_error(IOutbox::UnknownRoot { root: B256::ZERO });
        assert_eq!(classify_revert(&unknown_root, ""), FailureKind::NotConfirmed);

        let spent = custom_error(IOutbox::AlreadySpent {
            index: U256::from(3),
        });
        assert_eq!(classify_revert(&spent, ""), FailureKind::AlreadySpent);

        let too_long = custom_error(IOutbox::ProofTooLong {
            proofLength: U256::from(300),
        });
        assert_eq!(classify_revert(&too_long, ""), FailureKind::WrongProof);

        let unproven = custom_error(IOptimismPortal2::OptimismPortal_Unproven {});
        assert_eq!(classify_revert(&unproven, ""), FailureKind::NotConfirmed);

        let bad_claim = custom_error(IOptimismPortal2::OptimismPortal_InvalidRootClaim {});
        assert_eq!(classify_revert(&bad_claim, ""), FailureKind::WrongProof);
    }

    #[test]
    fn test_classify_revert_strings() {
        let data: Bytes = Revert { reason: "NOT_CONFIRMED".into() }.abi_encode().into();
        assert_eq!(classify_revert(&data, ""), FailureKind::NotConfirmed);

        let data: Bytes = Revert { reason: "ALREADY_SPENT".into() }.abi_encode().into();
        assert_eq!(classify_revert(&data, ""), FailureKind::AlreadySpent);

        assert_eq!(
            classify_revert(&Bytes::new(), "execution reverted: WRONG_MERKLE"),
            FailureKind::WrongProof
        );
        assert_eq!(
            classify_revert(&Bytes::new(), "execution reverted"),
            FailureKind::Unclassified
        );
    }

    #[test]
    fn test_wrong_proof_never_folds_into_not_confirmed() {
        for selector in WRONG_PROOF {
            assert!(!NOT_CONFIRMED.contains(selector));
            let data = Bytes::from(selector.to_vec());
            assert_eq!(classify_revert(&data, "NOT_CONFIRMED"), FailureKind::WrongProof);
        }
    }

    #[test]
    fn test_failure_detail_names_error() {
        let data = custom_error(IOutbox::UnknownRoot { root: B256::ZERO });
        let failure = Failure::from_revert(&data, "execution reverted");
        assert_eq!(failure.kind, FailureKind::NotConfirmed);
        assert_eq!(failure.detail, "UnknownRoot(bytes32)");

        let failure = Failure::from_revert(&Bytes::new(), "execution reverted");
        assert_eq!(failure.detail, "execution reverted");
    }

    #[test]
    fn test_resolve_error_failures() {
        let err = ResolveError::InvalidProofWindow { size: 999, leaf: 1000 };
        let failure = err.as_failure().unwrap();
        assert_eq!(failure.kind, FailureKind::InvalidProofWindow);
        assert!(failure.detail.contains("size below leaf"));

        assert!(ResolveError::Unresolved(UnresolvedReason::NoConfirmedNode)
            .as_failure()
            .is_none());
        assert!(ResolveError::Rpc(RpcError::Transport("timeout".into()))
            .as_failure()
            .is_none());
    }
}
