//! Chain-pair configuration for withdrawal resolution.
//!
//! Provides chain-specific addresses, challenge periods and search budgets for
//! the two supported proof systems. Every resolver instance receives its own
//! configuration value; nothing here is read from globals.

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for this schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is present but unusable
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Proof system used to settle L2→L1 messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    /// Arbitrum Nitro style Merkle accumulator settled through the outbox.
    Outbox,
    /// OP Stack style dispute games settled through the portal.
    FaultProof,
}

/// Known chain pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    ArbitrumOne,
    ArbitrumSepolia,
    OptimismMainnet,
}

impl Network {
    /// Default configuration for this network.
    pub fn config(self) -> ChainPairConfig {
        match self {
            Self::ArbitrumOne => ChainPairConfig::Arbitrum(ArbitrumConfig::mainnet()),
            Self::ArbitrumSepolia => ChainPairConfig::Arbitrum(ArbitrumConfig::sepolia()),
            Self::OptimismMainnet => ChainPairConfig::Optimism(OptimismConfig::mainnet()),
        }
    }
}

/// Arbitrum (outbox) chain-pair configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbitrumConfig {
    /// L1 chain ID
    pub l1_chain_id: u64,
    /// L2 chain ID
    pub l2_chain_id: u64,
    /// Rollup proxy on L1
    pub rollup: Address,
    /// Outbox on L1; read from the rollup when absent
    #[serde(default)]
    pub outbox: Option<Address>,
    /// ArbSys precompile on L2
    pub arbsys: Address,
    /// NodeInterface virtual contract on L2
    pub node_interface: Address,
    /// L1 destinations preferred when a receipt holds several withdrawal events
    #[serde(default)]
    pub gateways: Vec<Address>,
    /// Seconds a node must age before messages against it can execute
    pub challenge_period_secs: u64,
    /// Maximum rollup nodes visited when walking back from the latest confirmed node
    pub max_node_steps: usize,
    /// Accumulator sizes probed after `leaf + 1` when the receipt reports no size
    pub size_candidates: Vec<u64>,
    /// `from` address used for dry runs
    #[serde(default)]
    pub dry_run_caller: Address,
}

impl ArbitrumConfig {
    /// Arbitrum One on Ethereum mainnet.
    pub fn mainnet() -> Self {
        Self {
            l1_chain_id: 1,
            l2_chain_id: 42161,
            // https://etherscan.io/address/0x5eF0D09d1E6204141B4d37530808eD19f60FBa35
            rollup: address!("0x5eF0D09d1E6204141B4d37530808eD19f60FBa35"),
            outbox: None,
            arbsys: address!("0x0000000000000000000000000000000000000064"),
            node_interface: address!("0x00000000000000000000000000000000000000C8"),
            gateways: vec![
                // L1 ERC20 gateway
                address!("0xa3A7B6F88361F48403514059F1F16C8E78d60EeC"),
                // L1 gateway router
                address!("0x72Ce9c846789fdB6fC1f34aC4AD25Dd9ef7031ef"),
            ],
            challenge_period_secs: 7 * 24 * 60 * 60,
            max_node_steps: 256,
            size_candidates: default_size_candidates(),
            dry_run_caller: Address::ZERO,
        }
    }

    /// Arbitrum Sepolia on Ethereum Sepolia.
    pub fn sepolia() -> Self {
        Self {
            l1_chain_id: 11155111,
            l2_chain_id: 421614,
            rollup: address!("0xd80810638dbDF9081b72C1B33c65375e807281C8"),
            outbox: Some(address!("0x65f07C7D521164a4d5DaC6eB8Fac8DA067A3B78F")),
            arbsys: address!("0x0000000000000000000000000000000000000064"),
            node_interface: address!("0x00000000000000000000000000000000000000C8"),
            gateways: vec![
                address!("0x902b3E5f8F19571859F4AB1003B960a5dF693aFF"),
                address!("0xcE18836b233C83325Cc8848CA4487e94C6288264"),
            ],
            // 150 L1 blocks
            challenge_period_secs: 150 * 12,
            max_node_steps: 256,
            size_candidates: default_size_candidates(),
            dry_run_caller: Address::ZERO,
        }
    }

    /// Override the outbox address.
    pub const fn with_outbox(mut self, outbox: Address) -> Self {
        self.outbox = Some(outbox);
        self
    }

    /// Override the gateway allow-list.
    pub fn with_gateways(mut self, gateways: Vec<Address>) -> Self {
        self.gateways = gateways;
        self
    }

    /// Override the challenge period.
    pub const fn with_challenge_period(mut self, secs: u64) -> Self {
        self.challenge_period_secs = secs;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.rollup == Address::ZERO {
            return Err(ConfigError::Invalid("rollup must not be zero".into()));
        }
        if self.max_node_steps == 0 {
            return Err(ConfigError::Invalid("max_node_steps must be positive".into()));
        }
        Ok(())
    }
}

fn default_size_candidates() -> Vec<u64> {
    vec![150_000, 200_000, 250_000, 300_000, 400_000, 500_000]
}

/// OP Stack (fault proof) chain-pair configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimismConfig {
    /// L1 chain ID
    pub l1_chain_id: u64,
    /// L2 chain ID
    pub l2_chain_id: u64,
    /// OptimismPortal2 on L1
    pub portal: Address,
    /// DisputeGameFactory on L1
    pub dispute_game_factory: Address,
    /// AnchorStateRegistry on L1
    pub anchor_state_registry: Address,
    /// L2ToL1MessagePasser predeploy on L2
    pub message_passer: Address,
    /// L1 targets preferred when a receipt holds several withdrawal events
    #[serde(default)]
    pub gateways: Vec<Address>,
    /// Seconds a game must age before it is treated as out of its challenge window
    pub challenge_period_secs: u64,
    /// Games requested per `findLatestGames` page
    pub game_batch_size: u64,
    /// Maximum pages scanned before giving up
    pub max_game_batches: usize,
    /// Recent games kept for diagnostics when no game covers the withdrawal
    pub recent_games_limit: usize,
    /// Append the terminal branch child to storage proofs that stop at a branch node
    pub patch_terminal_branch: bool,
    /// `from` address used for dry runs
    #[serde(default)]
    pub dry_run_caller: Address,
}

impl OptimismConfig {
    /// OP Mainnet on Ethereum mainnet.
    pub fn mainnet() -> Self {
        Self {
            l1_chain_id: 1,
            l2_chain_id: 10,
            // https://etherscan.io/address/0xbEb5Fc579115071764c7423A4f12eDde41f106Ed
            portal: address!("0xbEb5Fc579115071764c7423A4f12eDde41f106Ed"),
            dispute_game_factory: address!("0xe5965Ab5962eDc7477C8520243A95517CD252fA9"),
            anchor_state_registry: address!("0x23B2C62946350F4246f9f9D027e071f0264FD113"),
            message_passer: address!("0x4200000000000000000000000000000000000016"),
            gateways: vec![
                // L1CrossDomainMessenger
                address!("0x25ace71c97B33Cc4729CF772ae268934F7ab5fA1"),
            ],
            // Maximum clock duration of a fault dispute game (3.5 days)
            challenge_period_secs: 302_400,
            game_batch_size: 100,
            max_game_batches: 20,
            recent_games_limit: 5,
            patch_terminal_branch: true,
            dry_run_caller: Address::ZERO,
        }
    }

    /// Override the challenge period.
    pub const fn with_challenge_period(mut self, secs: u64) -> Self {
        self.challenge_period_secs = secs;
        self
    }

    /// Override the pagination budget.
    pub const fn with_search_budget(mut self, batch_size: u64, max_batches: usize) -> Self {
        self.game_batch_size = batch_size;
        self.max_game_batches = max_batches;
        self
    }

    /// Enable or disable the terminal branch patch for storage proofs.
    pub const fn with_terminal_branch_patch(mut self, enabled: bool) -> Self {
        self.patch_terminal_branch = enabled;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, addr) in [
            ("portal", self.portal),
            ("dispute_game_factory", self.dispute_game_factory),
            ("anchor_state_registry", self.anchor_state_registry),
        ] {
            if addr == Address::ZERO {
                return Err(ConfigError::Invalid(format!("{name} must not be zero")));
            }
        }
        if self.game_batch_size == 0 || self.max_game_batches == 0 {
            return Err(ConfigError::Invalid("game search budget must be positive".into()));
        }
        Ok(())
    }
}

/// Configuration of one L1/L2 chain pair, selecting the proof system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "protocol", rename_all = "snake_case")]
pub enum ChainPairConfig {
    Arbitrum(ArbitrumConfig),
    Optimism(OptimismConfig),
}

impl ChainPairConfig {
    /// Load a chain-pair configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;

        Ok(config)
    }

    /// Check addresses and budgets.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Arbitrum(config) => config.validate(),
            Self::Optimism(config) => config.validate(),
        }
    }

    /// Proof system of this chain pair.
    pub const fn protocol(&self) -> Protocol {
        match self {
            Self::Arbitrum(_) => Protocol::Outbox,
            Self::Optimism(_) => Protocol::FaultProof,
        }
    }

    /// Challenge period in seconds.
    pub const fn challenge_period_secs(&self) -> u64 {
        match self {
            Self::Arbitrum(config) => config.challenge_period_secs,
            Self::Optimism(config) => config.challenge_period_secs,
        }
    }

    /// Chain ID of the settlement layer.
    pub const fn l1_chain_id(&self) -> u64 {
        match self {
            Self::Arbitrum(config) => config.l1_chain_id,
            Self::Optimism(config) => config.l1_chain_id,
        }
    }
}
