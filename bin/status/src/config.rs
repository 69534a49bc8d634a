use client::RetryPolicy;
use config::{ChainPairConfig, Network};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_rpc_max_retries() -> usize {
    RetryPolicy::default().max_retries
}

/// Top-level CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// L1 RPC endpoint url
    pub l1_rpc_url: String,

    /// L2 RPC endpoint url
    pub l2_rpc_url: String,

    /// Preset chain pair, used when no `[chain]` table is given
    #[serde(default)]
    pub network: Option<Network>,

    /// Full chain-pair configuration, overrides `network`
    #[serde(default)]
    pub chain: Option<ChainPairConfig>,

    /// Retries for transport failures on each RPC call
    #[serde(default = "default_rpc_max_retries")]
    pub rpc_max_retries: usize,

    /// Prometheus exporter port for `watch`
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;

        Ok(config)
    }

    /// Chain pair to resolve against, validated.
    pub fn chain_config(&self) -> eyre::Result<ChainPairConfig> {
        let chain = match (&self.chain, self.network) {
            (Some(chain), _) => chain.clone(),
            (None, Some(network)) => network.config(),
            (None, None) => eyre::bail!("config needs either `network` or a `[chain]` table"),
        };
        chain.validate()?;

        Ok(chain)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.rpc_max_retries,
            ..RetryPolicy::default()
        }
    }
}
