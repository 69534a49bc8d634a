use alloy_primitives::{Address, Bytes, B256, U256};
use binding::opstack::{OutputRootProof, WithdrawalTransaction, OUTPUT_VERSION_V0};
use serde::{Deserialize, Serialize};

pub use config::Protocol;

pub type WithdrawalHash = B256;

/// An L2→L1 message decoded from a single withdrawal event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub protocol: Protocol,
    /// Accumulator position (outbox) or message nonce (message passer)
    pub message_id: U256,
    pub sender: Address,
    pub target: Address,
    pub l2_block_number: u64,
    /// L1 block number seen by L2 when the message was sent; zero when the event does not carry it
    pub l1_block_at_send: u64,
    /// L2 timestamp of the message; zero when the event does not carry it
    pub timestamp: u64,
    pub value: U256,
    pub gas_limit: U256,
    pub calldata: Bytes,
    pub message_hash: WithdrawalHash,
    pub l2_tx_hash: B256,
    /// Accumulator size from a `SendMerkleUpdate` in the same receipt (outbox only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accumulator_size: Option<U256>,
}

impl Withdrawal {
    /// Accumulator leaf index, masked to the outbox index width.
    pub fn leaf(&self) -> u64 {
        crate::merkle::truncate_index(self.message_id)
    }

    /// The message as `OptimismPortal2` expects it.
    pub fn withdrawal_transaction(&self) -> WithdrawalTransaction {
        WithdrawalTransaction {
            nonce: self.message_id,
            sender: self.sender,
            target: self.target,
            value: self.value,
            gasLimit: self.gas_limit,
            data: self.calldata.clone(),
        }
    }
}

/// A confirmed rollup node together with the accumulator state it commits to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccumulatorCommitment {
    pub node: u64,
    pub root: B256,
    pub size: u64,
    pub leaf: u64,
    /// L2 block hash registered for `root` in the outbox; zero if not registered
    pub l2_block_hash: B256,
    /// L1 timestamp of the block the node was created in
    pub created_at: u64,
}

impl AccumulatorCommitment {
    pub fn registered_on_l1(&self) -> bool {
        self.l2_block_hash != B256::ZERO
    }
}

/// A dispute game whose root claim covers the withdrawal block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeGameCommitment {
    pub index: U256,
    pub proxy: Address,
    pub game_type: u32,
    pub l2_block_number: u64,
    pub root_claim: B256,
    /// L1 timestamp the game was created at
    pub created_at: u64,
    pub is_legitimate: bool,
}

/// L1-recorded snapshot of L2 history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Commitment {
    Accumulator(AccumulatorCommitment),
    DisputeGame(DisputeGameCommitment),
}

impl Commitment {
    pub const fn created_at(&self) -> u64 {
        match self {
            Self::Accumulator(c) => c.created_at,
            Self::DisputeGame(c) => c.created_at,
        }
    }

    pub const fn protocol(&self) -> Protocol {
        match self {
            Self::Accumulator(_) => Protocol::Outbox,
            Self::DisputeGame(_) => Protocol::FaultProof,
        }
    }
}

/// Output root preimage of an OP Stack L2 block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRoot {
    pub version: B256,
    pub state_root: B256,
    pub message_passer_storage_root: B256,
    pub latest_block_hash: B256,
}

impl OutputRoot {
    pub const fn v0(state_root: B256, storage_root: B256, block_hash: B256) -> Self {
        Self {
            version: OUTPUT_VERSION_V0,
            state_root,
            message_passer_storage_root: storage_root,
            latest_block_hash: block_hash,
        }
    }

    pub const fn to_proof(&self) -> OutputRootProof {
        OutputRootProof {
            version: self.version,
            stateRoot: self.state_root,
            messagePasserStorageRoot: self.message_passer_storage_root,
            latestBlockhash: self.latest_block_hash,
        }
    }
}

/// Merkle path of an outbox message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    pub root: B256,
    /// Accumulator item (send hash) of the message
    pub send: B256,
    pub path: u64,
    pub siblings: Vec<B256>,
}

/// Storage inclusion proof of a withdrawal in the message passer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageInclusionProof {
    pub nodes: Vec<Bytes>,
    pub output_root: OutputRoot,
}

/// Proof of a withdrawal against the commitment it was built for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InclusionProof {
    Merkle(MerkleProof),
    Storage(StorageInclusionProof),
}

/// Withdrawal proven on OptimismPortal2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenWithdrawal {
    pub dispute_game_proxy: Address,
    pub timestamp: u64,
}

impl ProvenWithdrawal {
    /// `false` when no proof has been submitted by the queried submitter.
    pub fn exists(&self) -> bool {
        self.timestamp != 0
    }
}
