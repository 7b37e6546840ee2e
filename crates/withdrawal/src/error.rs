use alloy_primitives::{TxHash, U256};
use thiserror::Error;

/// Reasons a resolution attempt can fail.
///
/// Every variant is terminal for the attempt that produced it; callers decide
/// whether to retry using [`ResolveError::is_retryable`].
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The L2 receipt is not available (yet)
    #[error("Receipt not found for transaction {0}")]
    ReceiptNotFound(TxHash),

    /// The receipt has no SentMessage event from the messenger
    #[error("No SentMessage event found in receipt")]
    NoMessageFound,

    /// The receipt has several SentMessage events and the policy rejects that
    #[error("Found {0} SentMessage events in receipt, only one is supported")]
    MultipleMessages(usize),

    /// The receipt has no MessagePassed event from the message passer
    #[error("No withdrawals found in receipt")]
    NoWithdrawalFound,

    /// The receipt has several MessagePassed events
    #[error("Found {0} withdrawals in receipt, multiple withdrawals are not supported")]
    AmbiguousWithdrawal(usize),

    /// The message nonce carries a version this resolver cannot encode
    #[error("Unsupported message version: {0}")]
    UnsupportedMessageVersion(u16),

    /// Version 0 messages have no value field
    #[error("Version 0 messages cannot carry value (got {0})")]
    LegacyMessageValue(U256),

    /// No output proposal covers the L2 block yet
    #[error("No output proposal covers L2 block {0} yet")]
    CheckpointNotFound(u64),

    /// A log matched by address and topic but could not be decoded
    #[error("Malformed {event} log at index {log_index:?}: {reason}")]
    MalformedLog {
        event: &'static str,
        log_index: Option<u64>,
        reason: String,
    },

    /// An external call failed or timed out
    #[error("{call} failed: {reason}")]
    CollaboratorUnavailable { call: &'static str, reason: String },

    /// A contract call reverted
    #[error("{call} reverted: {reason}")]
    CallReverted { call: &'static str, reason: String },
}

impl ResolveError {
    /// Whether polling again later may succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ReceiptNotFound(_)
                | Self::CheckpointNotFound(_)
                | Self::CollaboratorUnavailable { .. }
        )
    }

    /// Short label for metrics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ReceiptNotFound(_) => "receipt_not_found",
            Self::NoMessageFound => "no_message",
            Self::MultipleMessages(_) => "multiple_messages",
            Self::NoWithdrawalFound => "no_withdrawal",
            Self::AmbiguousWithdrawal(_) => "ambiguous_withdrawal",
            Self::UnsupportedMessageVersion(_) => "unsupported_version",
            Self::LegacyMessageValue(_) => "legacy_value",
            Self::CheckpointNotFound(_) => "checkpoint_not_found",
            Self::MalformedLog { .. } => "malformed_log",
            Self::CollaboratorUnavailable { .. } => "rpc_unavailable",
            Self::CallReverted { .. } => "call_reverted",
        }
    }
}
