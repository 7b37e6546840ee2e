//! Relay call encoding for cross-domain messages.
//!
//! The L1 messenger receives a withdrawal as a `relayMessage` call. Legacy
//! (version 0) messages use the pre-Bedrock layout without a value; version 1
//! messages carry value and minimum gas limit.

use crate::{
    error::ResolveError,
    message::CrossDomainMessage,
    nonce::{MESSAGE_VERSION_V0, MESSAGE_VERSION_V1},
};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use binding::messenger::{ICrossDomainMessenger, ILegacyCrossDomainMessenger};

/// `relayMessage(address,address,bytes,uint256)` calldata.
pub fn encode_message_v0(target: Address, sender: Address, message: Bytes, nonce: U256) -> Bytes {
    ILegacyCrossDomainMessenger::relayMessageCall {
        _target: target,
        _sender: sender,
        _message: message,
        _messageNonce: nonce,
    }
    .abi_encode()
    .into()
}

/// `relayMessage(uint256,address,address,uint256,uint256,bytes)` calldata.
pub fn encode_message_v1(
    nonce: U256,
    sender: Address,
    target: Address,
    value: U256,
    min_gas_limit: U256,
    message: Bytes,
) -> Bytes {
    ICrossDomainMessenger::relayMessageCall {
        _nonce: nonce,
        _sender: sender,
        _target: target,
        _value: value,
        _minGasLimit: min_gas_limit,
        _message: message,
    }
    .abi_encode()
    .into()
}

/// Encode `message` in the layout of the given version.
pub fn encode_message_as(message: &CrossDomainMessage, version: u16) -> Result<Bytes, ResolveError> {
    match version {
        MESSAGE_VERSION_V0 => {
            if !message.value.is_zero() {
                return Err(ResolveError::LegacyMessageValue(message.value));
            }
            Ok(encode_message_v0(
                message.target,
                message.sender,
                message.message.clone(),
                message.versioned_nonce().sequence,
            ))
        }
        MESSAGE_VERSION_V1 => Ok(encode_message_v1(
            message.nonce,
            message.sender,
            message.target,
            message.value,
            message.min_gas_limit,
            message.message.clone(),
        )),
        other => Err(ResolveError::UnsupportedMessageVersion(other)),
    }
}

/// Encode `message` in the layout its own nonce version selects.
pub fn encode_message(message: &CrossDomainMessage) -> Result<Bytes, ResolveError> {
    encode_message_as(message, message.versioned_nonce().version)
}
