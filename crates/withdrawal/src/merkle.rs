//! Outbox accumulator arithmetic.

use alloy_primitives::{keccak256, B256, U256};

/// Longest proof the outbox accepts.
pub const MAX_PROOF_LENGTH: usize = 256;

/// Mask an index to the 64 bits the outbox and NodeInterface work with.
///
/// Applied to both the accumulator size and the leaf before building a proof.
pub const fn truncate_index(index: U256) -> u64 {
    index.as_limbs()[0]
}

/// Root of the accumulator containing `item` at `path`, folding `proof` bottom-up.
///
/// Matches `Outbox.calculateMerkleRoot`: the leaf is `keccak256(item)` and bit `i` of
/// `path` selects whether `proof[i]` is the right (0) or left (1) sibling.
pub fn calculate_root(proof: &[B256], path: u64, item: B256) -> B256 {
    let mut node = keccak256(item);
    for (i, sibling) in proof.iter().enumerate() {
        let left = i < 64 && path & (1 << i) != 0;
        node = if left {
            hash_pair(*sibling, node)
        } else {
            hash_pair(node, *sibling)
        };
    }
    node
}

/// Whether the outbox would accept `path` with a proof of `proof_len` siblings.
pub const fn is_minimal_path(proof_len: usize, path: u64) -> bool {
    if proof_len >= MAX_PROOF_LENGTH {
        return false;
    }
    proof_len >= 64 || path < (1u64 << proof_len)
}

pub(crate) fn hash_pair(left: B256, right: B256) -> B256 {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(left.as_slice());
    buf[32..].copy_from_slice(right.as_slice());
    keccak256(buf)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_for_all_leaves() {
        let items = tree::items(13);
        for size in 1..=13u64 {
            for leaf in 0..size {
                let (root, proof) = tree::build(&items, size, leaf);
                assert_eq!(
                    calculate_root(&proof, leaf, items[leaf as usize]),
                    root,
                    "size {size} leaf {leaf}"
                );
                assert!(is_minimal_path(proof.len(), leaf));
            }
        }
    }

    #[test]
    fn test_wrong_path_changes_root() {
        let items = tree::items(8);
        let (root, proof) = tree::build(&items, 8, 5);
        assert_ne!(calculate_root(&proof, 4, items[5]), root);
        assert_ne!(calculate_root(&proof, 5, items[4]), root);
    }

    #[test]
    fn test_single_leaf_root_is_leaf_hash() {
        let item = B256::repeat_byte(7);
        assert_eq!(calculate_root(&[], 0, item), keccak256(item));
    }

    #[test]
    fn test_truncate_index_idempotent() {
        let values = [
            U256::ZERO,
            U256::from(1000),
            U256::from(u64::MAX),
            U256::from(u64::MAX) + U256::from(1),
            U256::MAX,
            (U256::from(1) << 200) | U256::from(42),
        ];
        for value in values {
            let once = truncate_index(value);
            assert_eq!(truncate_index(U256::from(once)), once);
        }
        assert_eq!(truncate_index((U256::from(1) << 200) | U256::from(42)), 42);
        assert_eq!(truncate_index(U256::MAX), u64::MAX);
    }

    #[test]
    fn test_minimal_path() {
        assert!(is_minimal_path(0, 0));
        assert!(!is_minimal_path(0, 1));
        assert!(is_minimal_path(3, 7));
        assert!(!is_minimal_path(3, 8));
        assert!(!is_minimal_path(MAX_PROOF_LENGTH, 0));
    }
}
