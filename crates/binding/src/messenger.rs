//! Cross-domain messenger bindings.
//!
//! The L2 messenger emits `SentMessage` for every outgoing message and, since
//! Bedrock, a `SentMessageExtension1` right after it carrying the ETH value.
//! The two `relayMessage` layouts are what the L1 messenger expects as the
//! `data` of a finalized withdrawal.

use alloy_primitives::{address, Address};
use alloy_sol_types::sol;

/// L2CrossDomainMessenger predeploy (same address on all OP Stack chains).
pub const L2_CROSS_DOMAIN_MESSENGER_ADDRESS: Address =
    address!("4200000000000000000000000000000000000007");

sol! {
    /// L2CrossDomainMessenger - L2 predeploy that sends messages to L1
    #[sol(rpc)]
    interface IL2CrossDomainMessenger {
        /// Emitted whenever a message is sent to the other chain
        event SentMessage(
            address indexed target,
            address sender,
            bytes message,
            uint256 messageNonce,
            uint256 gasLimit
        );

        /// Emitted right after SentMessage with the value sent along
        event SentMessageExtension1(
            address indexed sender,
            uint256 value
        );
    }

    /// Pre-Bedrock messenger relay call (version 0 messages)
    interface ILegacyCrossDomainMessenger {
        function relayMessage(
            address _target,
            address _sender,
            bytes _message,
            uint256 _messageNonce
        ) external;
    }

    /// Bedrock messenger relay call (version 1 messages)
    interface ICrossDomainMessenger {
        function relayMessage(
            uint256 _nonce,
            address _sender,
            address _target,
            uint256 _value,
            uint256 _minGasLimit,
            bytes _message
        ) external payable;
    }
}
