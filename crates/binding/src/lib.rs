//! Contract bindings for the rollup bridge contracts.
//!
//! This crate consolidates the Solidity interfaces read by the withdrawal resolvers:
//! - Arbitrum Nitro contracts (ArbSys, NodeInterface, RollupCore, Outbox)
//! - OP Stack contracts (L2ToL1MessagePasser, OptimismPortal2, DisputeGameFactory,
//!   AnchorStateRegistry)
//!
//! All bindings are generated using alloy's `sol!` macro. Calls are encoded with
//! [`alloy_sol_types::SolCall`] and sent through a chain reader, so no provider-bound
//! instances are generated.

pub mod arbitrum;
pub mod opstack;
