//! Withdrawal message resolution for L2→L1 finalization.
//!
//! Turns the receipt of an L2 transaction that sent a cross-domain message
//! into the [`WithdrawalTransaction`](binding::opstack::WithdrawalTransaction)
//! the OptimismPortal expects:
//! 1. Classify receipt logs by emitter and event ([`logs`])
//! 2. Recover the `SentMessage` and its optional value extension ([`message`])
//! 3. Locate the single `MessagePassed` record ([`locator`])
//! 4. Find the output proposal covering the L2 block ([`checkpoint`])
//! 5. Re-encode the message as a v1 relay call ([`encode`])
//! 6. Assemble the final tuple ([`assemble`])

pub mod assemble;
pub mod checkpoint;
pub mod encode;
pub mod error;
pub mod hash;
pub mod locator;
pub mod logs;
pub mod message;
pub mod nonce;
pub mod rpc;
pub mod source;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

pub use assemble::{FinalizationAssembler, Resolution};
pub use error::ResolveError;
pub use types::WithdrawalHash;
