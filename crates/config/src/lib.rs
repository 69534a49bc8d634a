//! Configuration types for the withdrawal resolver.
//!
//! This crate provides:
//! - Chain-pair configurations (Arbitrum outbox, OP Stack fault proofs)
//! - Contract addresses and search budgets for known networks
//! - Configuration loading and validation

pub mod network;

pub use network::{
    ArbitrumConfig, ChainPairConfig, ConfigError, Network, OptimismConfig, Protocol,
};
