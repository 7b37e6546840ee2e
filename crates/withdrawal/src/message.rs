//! Cross-domain message extraction from receipt logs.
//!
//! A message is described by the messenger's `SentMessage` event. Since
//! Bedrock the messenger emits `SentMessageExtension1` immediately afterwards
//! with the ETH value; older messages have no extension and carry no value.

use crate::{
    error::ResolveError,
    logs::{classify_event, next_log_from},
    nonce::VersionedNonce,
};
use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_rpc_types_eth::Log;
use alloy_sol_types::SolEvent;
use binding::messenger::IL2CrossDomainMessenger::{SentMessage, SentMessageExtension1};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Which way a message travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageDirection {
    L1ToL2,
    L2ToL1,
}

/// A message sent through the cross-domain messenger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossDomainMessage {
    pub direction: MessageDirection,
    pub sender: Address,
    pub target: Address,
    /// ETH value, zero when no extension log follows the message
    pub value: U256,
    /// Versioned messenger nonce
    pub nonce: U256,
    pub min_gas_limit: U256,
    /// Calldata executed on the target
    pub message: Bytes,
    pub log_index: Option<u64>,
    pub block_number: Option<u64>,
    pub transaction_hash: Option<TxHash>,
}

impl CrossDomainMessage {
    /// The message nonce split into sequence and version.
    pub fn versioned_nonce(&self) -> VersionedNonce {
        VersionedNonce::decode(self.nonce)
    }
}

/// What to do when a receipt carries more than one `SentMessage`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiMessagePolicy {
    /// Fail with [`ResolveError::MultipleMessages`]
    #[default]
    Reject,
    /// Resolve the first message by log index and ignore the rest
    First,
}

/// Recovers [`CrossDomainMessage`]s from the logs of a single receipt.
#[derive(Debug, Clone, Copy)]
pub struct MessageExtractor {
    messenger: Address,
    policy: MultiMessagePolicy,
}

impl MessageExtractor {
    pub const fn new(messenger: Address, policy: MultiMessagePolicy) -> Self {
        Self { messenger, policy }
    }

    /// Decode every `SentMessage` emitted by the messenger, in log order.
    pub fn extract_all(&self, logs: &[Log]) -> Result<Vec<CrossDomainMessage>, ResolveError> {
        classify_event::<SentMessage>(logs, self.messenger)
            .into_iter()
            .map(|log| extract_message(log, logs, self.messenger))
            .collect()
    }

    /// Decode the single message of the receipt.
    ///
    /// Under [`MultiMessagePolicy::First`] only the first message is decoded.
    pub fn extract(&self, logs: &[Log]) -> Result<CrossDomainMessage, ResolveError> {
        let sent = classify_event::<SentMessage>(logs, self.messenger);

        match (sent.as_slice(), self.policy) {
            ([], _) => Err(ResolveError::NoMessageFound),
            ([only], _) => extract_message(only, logs, self.messenger),
            (all, MultiMessagePolicy::Reject) => Err(ResolveError::MultipleMessages(all.len())),
            ([first, ..], MultiMessagePolicy::First) => {
                warn!(
                    count = sent.len(),
                    "Receipt has several SentMessage events, resolving the first"
                );
                extract_message(first, logs, self.messenger)
            }
        }
    }
}

/// Decode one `SentMessage` log, merging the value of an adjacent extension log.
pub fn extract_message(
    sent_log: &Log,
    all_logs: &[Log],
    messenger: Address,
) -> Result<CrossDomainMessage, ResolveError> {
    let sent = SentMessage::decode_log_data(sent_log.data()).map_err(|e| {
        ResolveError::MalformedLog {
            event: "SentMessage",
            log_index: sent_log.log_index,
            reason: e.to_string(),
        }
    })?;

    let value = match next_log_from(all_logs, sent_log, messenger) {
        Some(next) if next.topic0() == Some(&SentMessageExtension1::SIGNATURE_HASH) => {
            SentMessageExtension1::decode_log_data(next.data())
                .map_err(|e| ResolveError::MalformedLog {
                    event: "SentMessageExtension1",
                    log_index: next.log_index,
                    reason: e.to_string(),
                })?
                .value
        }
        _ => U256::ZERO,
    };

    debug!(
        log_index = ?sent_log.log_index,
        target = %sent.target,
        sender = %sent.sender,
        nonce = %sent.messageNonce,
        %value,
        "Decoded SentMessage"
    );

    Ok(CrossDomainMessage {
        direction: MessageDirection::L2ToL1,
        sender: sent.sender,
        target: sent.target,
        value,
        nonce: sent.messageNonce,
        min_gas_limit: sent.gasLimit,
        message: sent.message,
        log_index: sent_log.log_index,
        block_number: sent_log.block_number,
        transaction_hash: sent_log.transaction_hash,
    })
}
