//! Storage and output-root proof helpers for OP Stack withdrawals.

use crate::types::{OutputRoot, WithdrawalHash};
use alloy_primitives::{keccak256, Bytes, B256};
use alloy_rlp::Header;
use tracing::{debug, warn};

/// Compute the storage slot for a withdrawal hash in the L2ToL1MessagePasser contract.
///
/// The storage layout is: `mapping(bytes32 => bool) public sentMessages`
/// Solidity storage slot = keccak256(key || slot_index)
/// For our mapping at slot 0: keccak256(withdrawalHash || 0)
pub fn compute_storage_slot(withdrawal_hash: WithdrawalHash) -> B256 {
    let mut data = [0u8; 64];
    data[0..32].copy_from_slice(withdrawal_hash.as_slice());
    // data[32..64] is already zeros (mapping is at slot 0)
    keccak256(data)
}

/// `keccak256(version || stateRoot || messagePasserStorageRoot || latestBlockhash)`
pub fn output_root_hash(root: &OutputRoot) -> B256 {
    let mut data = [0u8; 128];
    data[0..32].copy_from_slice(root.version.as_slice());
    data[32..64].copy_from_slice(root.state_root.as_slice());
    data[64..96].copy_from_slice(root.message_passer_storage_root.as_slice());
    data[96..128].copy_from_slice(root.latest_block_hash.as_slice());
    keccak256(data)
}

/// Raw RLP items of a list, headers included.
fn list_items(mut encoded: &[u8]) -> alloy_rlp::Result<Vec<&[u8]>> {
    let header = Header::decode(&mut encoded)?;
    if !header.list {
        return Err(alloy_rlp::Error::UnexpectedString);
    }
    let mut payload = encoded
        .get(..header.payload_length)
        .ok_or(alloy_rlp::Error::InputTooShort)?;

    let mut items = Vec::new();
    while !payload.is_empty() {
        let start = payload;
        let item = Header::decode(&mut payload)?;
        let len = start.len() - payload.len() + item.payload_length;
        let raw = start.get(..len).ok_or(alloy_rlp::Error::InputTooShort)?;
        items.push(raw);
        payload = &start[len..];
    }
    Ok(items)
}

/// Append the child of a terminal branch node that leads to `slot`.
///
/// When the last node of a storage proof is a 17-item branch whose child at the
/// slot's final nibble is non-empty, the portal's trie verifier needs that
/// child as one more proof node. Proofs that do not end in such a branch are
/// returned unchanged, as are nodes that fail to decode.
pub fn maybe_add_proof_node(slot: B256, mut nodes: Vec<Bytes>) -> Vec<Bytes> {
    let Some(last) = nodes.last() else {
        return nodes;
    };

    let items = match list_items(last) {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "Could not decode terminal proof node");
            return nodes;
        }
    };
    if items.len() != 17 {
        return nodes;
    }

    let nibble = (slot[31] & 0x0f) as usize;
    let child = items[nibble];
    // 0x80 is the empty string
    if child.is_empty() || child == [alloy_rlp::EMPTY_STRING_CODE] {
        return nodes;
    }

    debug!(nibble, child_len = child.len(), "Appending terminal branch child to proof");
    let child = Bytes::copy_from_slice(child);
    nodes.push(child);
    nodes
}
