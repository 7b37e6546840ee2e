//! Locates the low-level withdrawal record of a transaction.
//!
//! The message passer's `MessagePassed` event is the record the portal proves
//! and finalizes against. Its nonce and gas limit are authoritative for the
//! final withdrawal tuple.

use crate::{error::ResolveError, logs::classify_event, types::WithdrawalHash};
use alloy_primitives::{Address, U256};
use alloy_rpc_types_eth::Log;
use alloy_sol_types::SolEvent;
use binding::opstack::IL2ToL1MessagePasser::MessagePassed;
use tracing::debug;

/// The fields of a `MessagePassed` record the finalization tuple takes over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassedWithdrawal {
    pub nonce: U256,
    pub gas_limit: U256,
    /// Hash the message passer committed to
    pub withdrawal_hash: WithdrawalHash,
    pub log_index: Option<u64>,
}

/// Find the single `MessagePassed` emitted by `message_passer` in the receipt logs.
pub fn locate_withdrawal(
    logs: &[Log],
    message_passer: Address,
) -> Result<PassedWithdrawal, ResolveError> {
    let passed = classify_event::<MessagePassed>(logs, message_passer);

    let log = match passed.as_slice() {
        [] => return Err(ResolveError::NoWithdrawalFound),
        [log] => *log,
        // TODO: support transactions that initiate several withdrawals
        many => return Err(ResolveError::AmbiguousWithdrawal(many.len())),
    };

    let event = MessagePassed::decode_log_data(log.data()).map_err(|e| {
        ResolveError::MalformedLog {
            event: "MessagePassed",
            log_index: log.log_index,
            reason: e.to_string(),
        }
    })?;

    debug!(
        log_index = ?log.log_index,
        nonce = %event.nonce,
        gas_limit = %event.gasLimit,
        withdrawal_hash = %event.withdrawalHash,
        "Located MessagePassed record"
    );

    Ok(PassedWithdrawal {
        nonce: event.nonce,
        gas_limit: event.gasLimit,
        withdrawal_hash: event.withdrawalHash,
        log_index: log.log_index,
    })
}
