mod provider;
pub mod reader;

use alloy_provider::{Provider, ProviderBuilder};
pub use provider::{ProviderReader, RetryPolicy};
pub use reader::{
    call_sol, BlockHeader, CallRequest, ChainReader, Receipt, RpcError, RpcResult, StorageProof,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Error parsing or validating URLs
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),
}

/// Convenience function to create an ethereum rpc provider from url.
pub fn create_provider(rpc_url: &str) -> Result<impl Provider + Clone, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;
    let provider = ProviderBuilder::new().connect_http(url);

    Ok(provider)
}

/// Create a retrying [`ChainReader`] for the chain behind `rpc_url`.
pub fn create_reader(
    rpc_url: &str,
    retry: RetryPolicy,
) -> Result<ProviderReader<impl Provider + Clone>, ClientError> {
    Ok(ProviderReader::new(create_provider(rpc_url)?).with_retry(retry))
}
