//! OP Stack contract bindings.
//!
//! Includes contracts for L2→L1 withdrawals on Bedrock deployments:
//! - L2ToL1MessagePasser (L2 predeploy)
//! - L2OutputOracle (L1 contract)
//! - OptimismPortal (L1 contract)

use alloy_primitives::{address, Address};
use alloy_sol_types::sol;

/// L2ToL1MessagePasser predeploy (same address on all OP Stack chains).
pub const MESSAGE_PASSER_ADDRESS: Address = address!("4200000000000000000000000000000000000016");

sol! {
    /// L2ToL1MessagePasser - L2 predeploy contract for initiating withdrawals
    /// Address: 0x4200000000000000000000000000000000000016 (on all OP Stack chains)
    #[sol(rpc)]
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
    }

    /// L2OutputOracle - L1 contract holding the history of proposed output roots
    #[sol(rpc)]
    interface IL2OutputOracle {
        /// Output proposal as stored by the oracle
        #[derive(Debug)]
        struct OutputProposal {
            bytes32 outputRoot;
            uint128 timestamp;
            uint128 l2BlockNumber;
        }

        /// Index of the first output whose L2 block number is >= the given block
        function getL2OutputIndexAfter(uint256 _l2BlockNumber)
            external view returns (uint256);

        /// Output proposal stored at the given index
        function getL2Output(uint256 _l2OutputIndex)
            external view returns (OutputProposal memory);

        /// L2 block number of the most recent output (0 when none was proposed)
        function latestBlockNumber() external view returns (uint256);
    }

    /// OptimismPortal - Main L1 contract for withdrawal finalization
    #[sol(rpc)]
    interface IOptimismPortal {
        /// Query if a withdrawal has been finalized
        function finalizedWithdrawals(bytes32 withdrawalHash)
            external view returns (bool);

        /// Finalize a withdrawal transaction
        function finalizeWithdrawalTransaction(
            WithdrawalTransaction calldata _tx
        ) external;
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
