//! Arbitrum Nitro contract bindings.
//!
//! Includes contracts for L2→L1 messages settled through the outbox:
//! - ArbSys (L2 precompile emitting `L2ToL1Tx` / `SendMerkleUpdate`)
//! - NodeInterface (L2 virtual contract building outbox proofs)
//! - RollupCore (L1 rollup nodes)
//! - Outbox (L1 root registry, spent bitmap, execution entrypoint)

use alloy_primitives::{address, Address};
use alloy_sol_types::sol;

/// ArbSys precompile address on every Nitro chain.
pub const ARBSYS_ADDRESS: Address = address!("0x0000000000000000000000000000000000000064");

/// NodeInterface virtual contract address on every Nitro chain.
pub const NODE_INTERFACE_ADDRESS: Address =
    address!("0x00000000000000000000000000000000000000C8");

sol! {
    /// ArbSys - L2 precompile used to send messages to L1
    /// Address: 0x0000000000000000000000000000000000000064
    interface IArbSys {
        /// Emitted when a message is sent to L1
        event L2ToL1Tx(
            address caller,
            address indexed destination,
            uint256 indexed hash,
            uint256 indexed position,
            uint256 arbBlockNum,
            uint256 ethBlockNum,
            uint256 timestamp,
            uint256 callvalue,
            bytes data
        );

        /// Emitted when the send merkle accumulator is updated
        event SendMerkleUpdate(
            uint256 indexed reserved,
            bytes32 indexed hash,
            uint256 indexed position
        );
    }

    /// NodeInterface - virtual contract only reachable through eth_call
    /// Address: 0x00000000000000000000000000000000000000C8
    interface INodeInterface {
        /// Build a proof of leaf `leaf` against the accumulator of `size` leaves
        function constructOutboxProof(uint64 size, uint64 leaf)
            external view returns (bytes32 send, bytes32 root, bytes32[] memory proof);
    }

    /// RollupCore - L1 rollup contract holding the node (assertion) chain
    interface IRollupCore {
        /// Rollup node as stored on L1
        #[derive(Debug, PartialEq, Eq)]
        struct Node {
            bytes32 stateHash;
            bytes32 challengeHash;
            bytes32 confirmData;
            uint64 prevNum;
            uint64 deadlineBlock;
            uint64 noChildConfirmedBeforeBlock;
            uint64 stakerCount;
            uint64 childStakerCount;
            uint64 firstChildBlock;
            uint64 latestChildNumber;
            uint64 createdAtBlock;
            bytes32 nodeHash;
        }

        /// Index of the latest confirmed node
        function latestConfirmed() external view returns (uint64);

        /// Get a node by index
        function getNode(uint64 nodeNum) external view returns (Node memory);

        /// Outbox contract bound to this rollup
        function outbox() external view returns (address);
    }

    /// Outbox - L1 contract executing L2→L1 messages
    interface IOutbox {
        error ProofTooLong(uint256 proofLength);
        error PathNotMinimal(uint256 index, uint256 maxIndex);
        error UnknownRoot(bytes32 root);
        error AlreadySpent(uint256 index);
        error BridgeCallFailed();

        /// L2 block hash registered for a confirmed send root (zero if unknown)
        function roots(bytes32 root) external view returns (bytes32);

        /// Whether the message at `index` was already executed
        function isSpent(uint256 index) external view returns (bool);

        /// Execute an L2→L1 message (requires merkle proof)
        function executeTransaction(
            bytes32[] calldata proof,
            uint256 index,
            address l2Sender,
            address to,
            uint256 l2Block,
            uint256 l1Block,
            uint256 l2Timestamp,
            uint256 value,
            bytes calldata data
        ) external;
    }
}
