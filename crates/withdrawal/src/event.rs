//! Locates the withdrawal event in an L2 receipt.
//!
//! Both event layouts are accepted: indexed fields carried in topics, or every
//! field packed into the data section.

use crate::{
    error::LocateError,
    hash::message_hash,
    types::{Protocol, Withdrawal},
};
use alloy_primitives::{Address, Bytes, Log, B256, U256};
use alloy_sol_types::{SolEvent, SolValue};
use binding::{arbitrum::IArbSys, opstack::IL2ToL1MessagePasser};
use client::Receipt;
use config::ChainPairConfig;
use tracing::{debug, warn};

/// Decodes withdrawal events emitted by one L2 contract.
#[derive(Debug, Clone)]
pub struct EventLocator {
    protocol: Protocol,
    emitter: Address,
    gateways: Vec<Address>,
}

/// Event fields decoded from one log, before the withdrawal is assembled.
struct Decoded {
    withdrawal: Withdrawal,
    /// Hash carried by the event itself
    event_hash: B256,
}

impl EventLocator {
    pub const fn new(protocol: Protocol, emitter: Address, gateways: Vec<Address>) -> Self {
        Self {
            protocol,
            emitter,
            gateways,
        }
    }

    pub fn from_config(config: &ChainPairConfig) -> Self {
        match config {
            ChainPairConfig::Arbitrum(c) => {
                Self::new(Protocol::Outbox, c.arbsys, c.gateways.clone())
            }
            ChainPairConfig::Optimism(c) => {
                Self::new(Protocol::FaultProof, c.message_passer, c.gateways.clone())
            }
        }
    }

    /// Extract the withdrawal from a receipt.
    ///
    /// With several withdrawal events, the first one targeting a known gateway wins,
    /// otherwise the first in log order.
    pub fn locate(&self, receipt: &Receipt) -> Result<Withdrawal, LocateError> {
        let mut candidates = receipt
            .logs
            .iter()
            .enumerate()
            .filter(|(_, log)| log.address == self.emitter)
            .filter_map(|(index, log)| {
                let decoded = match self.protocol {
                    Protocol::Outbox => decode_l2_to_l1_tx(log, receipt),
                    Protocol::FaultProof => decode_message_passed(log, receipt),
                };
                if decoded.is_none() && log.topics().first() == Some(&self.topic()) {
                    warn!(
                        log_index = index,
                        tx_hash = %receipt.transaction_hash,
                        "Malformed withdrawal event skipped"
                    );
                }
                decoded
            })
            .map(|decoded| {
                if decoded.event_hash != decoded.withdrawal.message_hash {
                    warn!(
                        event_hash = %decoded.event_hash,
                        computed_hash = %decoded.withdrawal.message_hash,
                        "Withdrawal event hash differs from recomputed hash"
                    );
                }
                decoded.withdrawal
            })
            .collect::<Vec<_>>();

        if self.protocol == Protocol::Outbox {
            let size = accumulator_size_hint(&receipt.logs, self.emitter);
            for withdrawal in &mut candidates {
                withdrawal.accumulator_size = size;
            }
        }

        debug!(
            tx_hash = %receipt.transaction_hash,
            matches = candidates.len(),
            "Scanned receipt for withdrawal events"
        );

        if candidates.is_empty() {
            return Err(LocateError::NotAWithdrawal(receipt.transaction_hash));
        }

        let position = candidates
            .iter()
            .position(|w| self.gateways.contains(&w.target))
            .unwrap_or(0);
        Ok(candidates.swap_remove(position))
    }

    const fn topic(&self) -> B256 {
        match self.protocol {
            Protocol::Outbox => IArbSys::L2ToL1Tx::SIGNATURE_HASH,
            Protocol::FaultProof => IL2ToL1MessagePasser::MessagePassed::SIGNATURE_HASH,
        }
    }
}

fn decode_l2_to_l1_tx(log: &Log, receipt: &Receipt) -> Option<Decoded> {
    let topics = log.topics();
    if topics.first() != Some(&IArbSys::L2ToL1Tx::SIGNATURE_HASH) {
        return None;
    }

    let event = match topics.len() {
        4 => IArbSys::L2ToL1Tx::decode_log_data(&log.data).ok()?,
        1 => {
            let (caller, destination, hash, position, arb_block, eth_block, timestamp, value, data) =
                <(Address, Address, U256, U256, U256, U256, U256, U256, Bytes)>::abi_decode_params(
                    log.data.data.as_ref(),
                )
                .ok()?;
            IArbSys::L2ToL1Tx {
                caller,
                destination,
                hash,
                position,
                arbBlockNum: arb_block,
                ethBlockNum: eth_block,
                timestamp,
                callvalue: value,
                data,
            }
        }
        _ => return None,
    };

    let mut withdrawal = Withdrawal {
        protocol: Protocol::Outbox,
        message_id: event.position,
        sender: event.caller,
        target: event.destination,
        l2_block_number: event.arbBlockNum.saturating_to(),
        l1_block_at_send: event.ethBlockNum.saturating_to(),
        timestamp: event.timestamp.saturating_to(),
        value: event.callvalue,
        gas_limit: U256::ZERO,
        calldata: event.data,
        message_hash: B256::ZERO,
        l2_tx_hash: receipt.transaction_hash,
        accumulator_size: None,
    };
    withdrawal.message_hash = message_hash(&withdrawal);

    Some(Decoded {
        withdrawal,
        event_hash: B256::from(event.hash.to_be_bytes::<32>()),
    })
}

fn decode_message_passed(log: &Log, receipt: &Receipt) -> Option<Decoded> {
    let topics = log.topics();
    if topics.first() != Some(&IL2ToL1MessagePasser::MessagePassed::SIGNATURE_HASH) {
        return None;
    }

    let event = match topics.len() {
        4 => IL2ToL1MessagePasser::MessagePassed::decode_log_data(&log.data).ok()?,
        1 => {
            let (nonce, sender, target, value, gas_limit, data, withdrawal_hash) =
                <(U256, Address, Address, U256, U256, Bytes, B256)>::abi_decode_params(
                    log.data.data.as_ref(),
                )
                .ok()?;
            IL2ToL1MessagePasser::MessagePassed {
                nonce,
                sender,
                target,
                value,
                gasLimit: gas_limit,
                data,
                withdrawalHash: withdrawal_hash,
            }
        }
        _ => return None,
    };

    let mut withdrawal = Withdrawal {
        protocol: Protocol::FaultProof,
        message_id: event.nonce,
        sender: event.sender,
        target: event.target,
        l2_block_number: receipt.block_number,
        l1_block_at_send: 0,
        timestamp: 0,
        value: event.value,
        gas_limit: event.gasLimit,
        calldata: event.data,
        message_hash: B256::ZERO,
        l2_tx_hash: receipt.transaction_hash,
        accumulator_size: None,
    };
    withdrawal.message_hash = message_hash(&withdrawal);

    Some(Decoded {
        withdrawal,
        event_hash: event.withdrawalHash,
    })
}

/// Accumulator size reported by the last `SendMerkleUpdate` in `logs`.
///
/// The size is topic 3 when the event is fully indexed, or the third data word
/// when it is packed.
pub fn accumulator_size_hint(logs: &[Log], arbsys: Address) -> Option<U256> {
    logs.iter()
        .filter(|log| log.address == arbsys)
        .filter(|log| log.topics().first() == Some(&IArbSys::SendMerkleUpdate::SIGNATURE_HASH))
        .filter_map(|log| match log.topics().len() {
            4 => Some(U256::from_be_bytes(log.topics()[3].0)),
            1 => log
                .data
                .data
                .get(64..96)
                .map(U256::from_be_slice),
            _ => None,
        })
        .last()
}
