//! L2→L1 withdrawal resolution and proof construction.
//!
//! This crate takes an L2 transaction hash and works out where its withdrawal
//! stands on L1:
//! - locating the withdrawal event in the receipt ([`EventLocator`])
//! - finding the L1 commitment covering it, a confirmed rollup node
//!   ([`MerkleAccumulatorResolver`]) or a dispute game ([`DisputeGameResolver`])
//! - building the inclusion proof against that commitment
//! - deriving a [`Status`] and an unsigned [`FinalizationCall`]

pub mod accumulator;
pub mod dispute;
pub mod error;
pub mod event;
pub mod finalize;
pub mod hash;
pub mod merkle;
pub mod proof;
pub mod resolver;
pub mod status;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

pub use accumulator::{MerkleAccumulatorResolver, NodeAncestors, NodeInterfaceProofService, ProofService};
pub use dispute::{DisputeGameResolver, GameSummary};
pub use error::{Failure, FailureKind, LocateError, ResolveError, UnresolvedReason};
pub use event::EventLocator;
pub use finalize::{FinalizationCall, FinalizationTxBuilder, GasEstimate, VerificationCall};
pub use resolver::{CommitmentResolver, Resolver};
pub use status::{evaluate, format_time_remaining, Observation, Status, StatusEngine, StatusReport};
pub use types::{Commitment, InclusionProof, Protocol, Withdrawal, WithdrawalHash};
