//! Receipt log classification.
//!
//! Classification is purely structural: a log matches when it was emitted by
//! the expected contract and its first topic is the expected event signature.
//! Field values are never inspected here.

use alloy_primitives::{Address, B256};
use alloy_rpc_types_eth::Log;
use alloy_sol_types::SolEvent;

/// Logs emitted by `emitter` whose first topic is `selector`, ordered by log index.
pub fn classify<'a>(logs: &'a [Log], emitter: Address, selector: B256) -> Vec<&'a Log> {
    let mut matched: Vec<&Log> = logs
        .iter()
        .filter(|log| log.address() == emitter && log.topic0() == Some(&selector))
        .collect();

    // Stable sort keeps receipt order for logs without an index.
    matched.sort_by_key(|log| log.log_index);
    matched
}

/// [`classify`] keyed by a `sol!` event type.
pub fn classify_event<'a, E: SolEvent>(logs: &'a [Log], emitter: Address) -> Vec<&'a Log> {
    classify(logs, emitter, E::SIGNATURE_HASH)
}

/// The log emitted by `emitter` directly after `log` in the receipt.
///
/// Searches the unfiltered receipt for the next log index; receipts without
/// log indices fall back to the next position in the slice.
pub fn next_log_from<'a>(logs: &'a [Log], log: &Log, emitter: Address) -> Option<&'a Log> {
    let next = match log.log_index {
        Some(index) => {
            let following = index.checked_add(1)?;
            logs.iter().find(|l| l.log_index == Some(following))
        }
        None => logs
            .iter()
            .position(|l| std::ptr::eq(l, log))
            .and_then(|pos| logs.get(pos + 1)),
    };

    next.filter(|l| l.address() == emitter)
}
