use crate::types::{Protocol, Withdrawal, WithdrawalHash};
use alloy_primitives::{keccak256, Address, Bytes, U256};
use alloy_sol_types::SolValue;
use binding::opstack::WithdrawalTransaction;

/// Hash identifying an OP Stack withdrawal in the message passer and the portal.
pub fn compute_withdrawal_hash(tx: &WithdrawalTransaction) -> WithdrawalHash {
    // Hashing.hashWithdrawal:
    // keccak256(abi.encode(_tx.nonce, _tx.sender, _tx.target, _tx.value, _tx.gasLimit, _tx.data))
    // abi_encode_sequence encodes the fields directly, without a tuple offset
    let encoded = (
        &tx.nonce,
        &tx.sender,
        &tx.target,
        &tx.value,
        &tx.gasLimit,
        &tx.data,
    )
        .abi_encode_sequence();

    keccak256(encoded)
}

/// Fields hashed into a Nitro outbox accumulator item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendFields<'a> {
    pub sender: Address,
    pub destination: Address,
    pub l2_block: U256,
    pub l1_block: U256,
    pub timestamp: U256,
    pub value: U256,
    pub data: &'a Bytes,
}

/// Accumulator item of a Nitro L2→L1 message.
///
/// `keccak256(abi.encodePacked(sender, destination, l2Block, l1Block, timestamp, value, data))`
pub fn compute_send_hash(fields: &SendFields<'_>) -> WithdrawalHash {
    let packed = (
        &fields.sender,
        &fields.destination,
        &fields.l2_block,
        &fields.l1_block,
        &fields.timestamp,
        &fields.value,
        fields.data,
    )
        .abi_encode_packed();

    keccak256(packed)
}

/// Recompute the message hash of a decoded withdrawal from its other fields.
pub fn message_hash(withdrawal: &Withdrawal) -> WithdrawalHash {
    match withdrawal.protocol {
        Protocol::Outbox => compute_send_hash(&SendFields {
            sender: withdrawal.sender,
            destination: withdrawal.target,
            l2_block: U256::from(withdrawal.l2_block_number),
            l1_block: U256::from(withdrawal.l1_block_at_send),
            timestamp: U256::from(withdrawal.timestamp),
            value: withdrawal.value,
            data: &withdrawal.calldata,
        }),
        Protocol::FaultProof => compute_withdrawal_hash(&withdrawal.withdrawal_transaction()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{hex, B256};

    #[test]
    fn test_compute_withdrawal_hash_deterministic() {
        let tx = WithdrawalTransaction {
            nonce: U256::from(1),
            sender: Address::from([0x01; 20]),
            target: Address::from([0x02; 20]),
            value: U256::from(1_000_000),
            gasLimit: U256::from(100_000),
            data: Bytes::from(vec![0xaa, 0xbb, 0xcc]),
        };

        let hash1 = compute_withdrawal_hash(&tx);
        let hash2 = compute_withdrawal_hash(&tx);

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, B256::ZERO);
    }

    #[test]
    fn test_compute_withdrawal_hash_known_value() {
        // Unichain Mainnet withdrawal
        // TX: 0x91b374b5403401198a892f62db8843b60125cfb3e28ec1664089d9158424dc4a
        let tx = WithdrawalTransaction {
            nonce: U256::from_be_bytes(hex!(
                "0001000000000000000000000000000000000000000000000000000000000818"
            )),
            sender: Address::from_slice(&hex!("000040D6c85A13a1AA74565FDe87e499dC023C6f")),
            target: Address::from_slice(&hex!("B03eEF386A61b5b462051636001485FFfdD3d843")),
            value: U256::ZERO,
            gasLimit: U256::from(200_000),
            data: Bytes::from(hex!(
                "095ea7b3000000000000000000000000000040d6c85a13a1aa74565fde87e499dc023c6fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
            )),
        };

        let expected = B256::from_slice(&hex!(
            "49c43b60ec99e99046b54aec4c90419ff194300e567de63423c3b974ae46bd28"
        ));

        assert_eq!(compute_withdrawal_hash(&tx), expected);
    }

    #[test]
    fn test_send_hash_is_packed_encoding() {
        let data = Bytes::from(vec![0xde, 0xad]);
        let fields = SendFields {
            sender: Address::repeat_byte(0x11),
            destination: Address::repeat_byte(0x22),
            l2_block: U256::from(100),
            l1_block: U256::from(50),
            timestamp: U256::from(1_700_000_000u64),
            value: U256::from(7),
            data: &data,
        };

        let mut expected = Vec::new();
        expected.extend_from_slice(&[0x11; 20]);
        expected.extend_from_slice(&[0x22; 20]);
        expected.extend_from_slice(&U256::from(100).to_be_bytes::<32>());
        expected.extend_from_slice(&U256::from(50).to_be_bytes::<32>());
        expected.extend_from_slice(&U256::from(1_700_000_000u64).to_be_bytes::<32>());
        expected.extend_from_slice(&U256::from(7).to_be_bytes::<32>());
        expected.extend_from_slice(&[0xde, 0xad]);

        assert_eq!(compute_send_hash(&fields), keccak256(&expected));
        // 2 addresses + 4 words + data
        assert_eq!(expected.len(), 40 + 128 + 2);
    }

    #[test]
    fn test_message_hash_depends_on_protocol_fields() {
        let mut withdrawal = Withdrawal {
            protocol: Protocol::Outbox,
            message_id: U256::from(5),
            sender: Address::repeat_byte(1),
            target: Address::repeat_byte(2),
            l2_block_number: 10,
            l1_block_at_send: 3,
            timestamp: 99,
            value: U256::ZERO,
            gas_limit: U256::ZERO,
            calldata: Bytes::new(),
            message_hash: B256::ZERO,
            l2_tx_hash: B256::ZERO,
            accumulator_size: None,
        };
        let outbox = message_hash(&withdrawal);

        // The position is not part of the send hash
        withdrawal.message_id = U256::from(6);
        assert_eq!(message_hash(&withdrawal), outbox);

        // Timestamps are not part of the OP withdrawal hash
        withdrawal.protocol = Protocol::FaultProof;
        let op = message_hash(&withdrawal);
        withdrawal.timestamp = 100;
        assert_eq!(message_hash(&withdrawal), op);
        assert_ne!(op, outbox);
    }
}
