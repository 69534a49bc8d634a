pub mod config;
pub mod metrics;

use crate::{config::Config, metrics::Metrics};
use alloy_primitives::B256;
use client::ChainReader;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::{task::JoinSet, time};
use tracing::{error, info, warn};
use withdrawal::{format_time_remaining, ResolveError, Status, StatusEngine, StatusReport};

/// Connect both chains and build the engine for the configured chain pair.
pub fn build_engine(config: &Config) -> eyre::Result<StatusEngine> {
    let chain = config.chain_config()?;
    let retry = config.retry_policy();

    let l1: Arc<dyn ChainReader> = Arc::new(client::create_reader(&config.l1_rpc_url, retry)?);
    let l2: Arc<dyn ChainReader> = Arc::new(client::create_reader(&config.l2_rpc_url, retry)?);

    info!(
        protocol = ?chain.protocol(),
        l1_chain_id = chain.l1_chain_id(),
        challenge_period = chain.challenge_period_secs(),
        "Built status engine"
    );
    Ok(StatusEngine::from_config(&chain, l1, l2))
}

/// Resolve every transaction concurrently, results in input order.
///
/// The engine holds no per-resolution state, so every task shares it.
/// A task that panics or is cancelled yields an error for its transaction.
pub async fn resolve_all(
    engine: Arc<StatusEngine>,
    tx_hashes: &[B256],
) -> Vec<(B256, eyre::Result<StatusReport>)> {
    let mut tasks = JoinSet::new();
    for (position, &tx_hash) in tx_hashes.iter().enumerate() {
        let engine = Arc::clone(&engine);
        tasks.spawn(async move { (position, engine.resolve(tx_hash).await) });
    }

    collect_ordered(tasks, tx_hashes.len())
        .await
        .into_iter()
        .zip(tx_hashes)
        .map(|(result, &tx_hash)| {
            let result = match result {
                Some(Ok(report)) => Ok(report),
                Some(Err(e)) => Err(e.into()),
                None => Err(eyre::eyre!("resolution task for {tx_hash} did not complete")),
            };
            (tx_hash, result)
        })
        .collect()
}

/// Drain `tasks` into a vector indexed by the position each task reports.
///
/// Slots of tasks that failed to join stay `None`.
async fn collect_ordered<T: Send + 'static>(
    mut tasks: JoinSet<(usize, T)>,
    len: usize,
) -> Vec<Option<T>> {
    let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(len).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((position, value)) => {
                if let Some(slot) = slots.get_mut(position) {
                    *slot = Some(value);
                }
            }
            Err(e) => error!("Resolution task failed: {}", e),
        }
    }
    slots
}

/// Human-readable one-liner for a status.
pub fn describe(status: &Status) -> String {
    match status {
        Status::NotSent { reason } => format!("not sent to L1 yet ({reason})"),
        Status::InChallenge { seconds_remaining } => format!(
            "in challenge period, {} remaining",
            format_time_remaining(*seconds_remaining)
        ),
        Status::Ready { gas } => format!("ready to finalize (~{gas} gas)"),
        Status::Executed => "already executed".to_string(),
        Status::Error(failure) => format!("error ({:?}): {}", failure.kind, failure.detail),
    }
}

/// Re-resolve `tx_hash` every `interval` until it is executed or ctrl-c.
pub async fn watch(
    engine: &StatusEngine,
    tx_hash: B256,
    interval: Duration,
    metrics: &Metrics,
) -> eyre::Result<()> {
    let label = tx_hash.to_string();
    let mut ticker = time::interval(interval);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received ctrl-c, stopping watch");
                return Ok(());
            }
            _ = ticker.tick() => {}
        }

        let start = Instant::now();
        match engine.resolve(tx_hash).await {
            Ok(report) => {
                metrics.record_resolution(&label, &report.status, start.elapsed());
                info!(tx = %tx_hash, state = report.status.label(), "{}", describe(&report.status));

                if report.status.is_terminal() {
                    info!(tx = %tx_hash, "Withdrawal executed, stopping watch");
                    return Ok(());
                }
            }
            Err(e @ (ResolveError::NotAWithdrawal(_) | ResolveError::TransactionNotFound(_))) => {
                return Err(e.into());
            }
            Err(e) => {
                metrics.record_failure(start.elapsed());
                warn!(tx = %tx_hash, "Resolution failed, retrying next tick: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use withdrawal::{Failure, FailureKind, UnresolvedReason};

    #[tokio::test]
    async fn test_failed_task_keeps_its_slot() {
        let mut tasks = JoinSet::new();
        tasks.spawn(async { (0usize, "first") });
        tasks.spawn(async {
            if true {
                panic!("resolver crashed");
            }
            (1usize, "second")
        });
        tasks.spawn(async { (2usize, "third") });

        let slots = collect_ordered(tasks, 3).await;
        assert_eq!(slots, vec![Some("first"), None, Some("third")]);
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            describe(&Status::InChallenge {
                seconds_remaining: 2 * 86_400 + 3 * 3_600 + 4 * 60
            }),
            "in challenge period, 2d 3h 4m remaining"
        );
        assert_eq!(
            describe(&Status::Ready { gas: 120_000 }),
            "ready to finalize (~120000 gas)"
        );
        assert!(describe(&Status::NotSent {
            reason: UnresolvedReason::NoDisputeGames
        })
        .starts_with("not sent to L1 yet"));
        assert_eq!(
            describe(&Status::Error(Failure::new(FailureKind::WrongProof, "InvalidMerkleProof"))),
            "error (WrongProof): InvalidMerkleProof"
        );
    }
}
