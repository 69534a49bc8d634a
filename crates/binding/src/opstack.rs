//! OP Stack contract bindings.
//!
//! Includes contracts for L2→L1 withdrawals:
//! - L2ToL1MessagePasser (L2 predeploy)
//! - OptimismPortal2 (L1 contract)
//! - DisputeGameFactory (L1 contract)
//! - AnchorStateRegistry (L1 contract)

use alloy_primitives::{address, b256, Address, B256};
use alloy_sol_types::sol;

/// L2ToL1MessagePasser predeploy address on every OP Stack chain.
pub const MESSAGE_PASSER_ADDRESS: Address =
    address!("0x4200000000000000000000000000000000000016");

/// Output root version understood by OptimismPortal2.
pub const OUTPUT_VERSION_V0: B256 =
    b256!("0x0000000000000000000000000000000000000000000000000000000000000000");

sol! {
    /// L2ToL1MessagePasser - L2 predeploy contract for initiating withdrawals
    /// Address: 0x4200000000000000000000000000000000000016 (on all OP Stack chains)
    interface IL2ToL1MessagePasser {
        /// Emitted when a withdrawal is initiated on L2
        event MessagePassed(
            uint256 indexed nonce,
            address indexed sender,
            address indexed target,
            uint256 value,
            uint256 gasLimit,
            bytes data,
            bytes32 withdrawalHash
        );

        /// Check if a withdrawal message has been sent
        function sentMessages(bytes32) external view returns (bool);
    }

    /// OptimismPortal2 - Main L1 contract for withdrawal proving and finalization
    interface IOptimismPortal2 {
        /// Proven withdrawal data stored on L1
        #[derive(Debug)]
        struct ProvenWithdrawal {
            address disputeGameProxy;
            uint64 timestamp;
        }

        error OptimismPortal_AlreadyFinalized();
        error OptimismPortal_ProofNotOldEnough();
        error OptimismPortal_Unproven();
        error OptimismPortal_InvalidProofTimestamp();
        error OptimismPortal_InvalidMerkleProof();
        error OptimismPortal_InvalidOutputRootProof();
        error OptimismPortal_InvalidRootClaim();
        error OptimismPortal_InvalidDisputeGame();
        error OptimismPortal_ImproperDisputeGame();

        // Names used by portal releases predating the prefixed errors.
        error AlreadyFinalized();
        error ProofNotOldEnough();
        error Unproven();
        error InvalidMerkleProof();
        error InvalidDisputeGame();
        error InvalidGameType();

        /// Query proven withdrawals by hash and proof submitter
        function provenWithdrawals(bytes32 withdrawalHash, address proofSubmitter)
            external view returns (ProvenWithdrawal memory);

        /// Query if a withdrawal has been finalized
        function finalizedWithdrawals(bytes32 withdrawalHash)
            external view returns (bool);

        /// Get the proof maturity delay (usually 7 days = 604800 seconds)
        function proofMaturityDelaySeconds()
            external view returns (uint256);

        /// Get the respected game type for filtering dispute games
        function respectedGameType()
            external view returns (uint32);

        /// Prove a withdrawal transaction (requires merkle proof)
        function proveWithdrawalTransaction(
            WithdrawalTransaction calldata _tx,
            uint256 _disputeGameIndex,
            OutputRootProof calldata _outputRootProof,
            bytes[] calldata _withdrawalProof
        ) external;

        /// Finalize a withdrawal transaction using external proof
        function finalizeWithdrawalTransactionExternalProof(
            WithdrawalTransaction calldata _tx,
            address _proofSubmitter
        ) external;
    }

    /// DisputeGameFactory - Used to find dispute games for proof generation
    interface IDisputeGameFactory {
        /// Dispute game search result
        #[derive(Debug, PartialEq, Eq)]
        struct GameSearchResult {
            uint256 index;
            bytes32 metadata;
            uint64 timestamp;
            bytes32 rootClaim;
            bytes extraData;
        }

        /// Get the total number of dispute games created
        function gameCount() external view returns (uint256 gameCount_);

        /// Find up to `_n` latest games of a given type, searching backwards from `_start`
        function findLatestGames(
            uint32 _gameType,
            uint256 _start,
            uint256 _n
        ) external view returns (GameSearchResult[] memory games_);

        /// Get a dispute game by index
        function gameAtIndex(uint256 _index) external view returns (
            uint32 gameType,
            uint64 timestamp,
            address proxy
        );
    }

    /// AnchorStateRegistry - legitimacy predicates for dispute games
    interface IAnchorStateRegistry {
        /// False when the game is blacklisted, retired or the system is paused
        function isGameProper(address _game) external view returns (bool);

        /// True when the game was created with the respected game type
        function isGameRespected(address _game) external view returns (bool);

        /// Games created before this timestamp are retired
        function retirementTimestamp() external view returns (uint64);
    }

    /// Output root proof structure (used in proving withdrawals)
    #[derive(Debug, PartialEq, Eq)]
    struct OutputRootProof {
        bytes32 version;
        bytes32 stateRoot;
        bytes32 messagePasserStorageRoot;
        bytes32 latestBlockhash;
    }

    /// Withdrawal transaction structure (shared across contracts)
    #[derive(Debug, PartialEq, Eq)]
    struct WithdrawalTransaction {
        uint256 nonce;
        address sender;
        address target;
        uint256 value;
        uint256 gasLimit;
        bytes data;
    }
}
