use crate::setup::{load_test_config, load_tx_hashes};
use alloy_primitives::B256;
use std::sync::Arc;
use withdrawal::{ResolveError, Status};
use withdrawal_status::{build_engine, describe, resolve_all};


#[tokio::test]
#[ignore = "requires RPC access"]
async fn test_resolve_configured_withdrawals() {
    let config = load_test_config();
    let tx_hashes = load_tx_hashes();
    if tx_hashes.is_empty() {
        return;
    }

    let engine = Arc::new(build_engine(&config).expect("Failed to build engine"));
    let results = resolve_all(engine, &tx_hashes).await;
    assert_eq!(results.len(), tx_hashes.len());

    for ((tx_hash, result), expected) in results.into_iter().zip(&tx_hashes) {
        assert_eq!(tx_hash, *expected);
        let report = result.expect("Failed to resolve withdrawal");
        println!("{}: {}", tx_hash, describe(&report.status));

        assert_eq!(report.tx_hash, tx_hash);
        assert_eq!(report.withdrawal.l2_tx_hash, tx_hash);
        match &report.status {
            Status::InChallenge { .. } | Status::Ready { .. } => {
                assert!(report.commitment.is_some());
            }
            Status::NotSent { .. } | Status::Executed | Status::Error(_) => {}
        }
        if let Status::Ready { .. } = report.status {
            assert!(report.call.as_ref().unwrap().gas_limit_with_buffer().is_some());
        }
    }
}

#[tokio::test]
#[ignore = "requires RPC access"]
async fn test_unknown_transaction() {
    let config = load_test_config();
    let engine = build_engine(&config).expect("Failed to build engine");

    let err = engine.resolve(B256::repeat_byte(0xde)).await.unwrap_err();
    assert!(matches!(err, ResolveError::TransactionNotFound(_)));
}
