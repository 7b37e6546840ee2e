//! Chain data the resolver depends on.
//!
//! The resolver only sees these traits; [`crate::rpc`] implements them on top
//! of alloy providers and tests implement them in memory.

use crate::{checkpoint::OutputProposal, error::ResolveError};
use alloy_primitives::{TxHash, U256};
use alloy_rpc_types_eth::Log;
use std::future::Future;

/// The parts of an L2 transaction receipt the resolver needs.
#[derive(Debug, Clone, Default)]
pub struct ReceiptLogs {
    /// L2 block the transaction was included in
    pub block_number: u64,
    /// All logs of the receipt, unfiltered
    pub logs: Vec<Log>,
}

/// Source of L2 transaction receipts.
pub trait ReceiptSource: Send + Sync {
    /// Fetch the receipt of an L2 transaction.
    ///
    /// Fails with [`ResolveError::ReceiptNotFound`] if the transaction is unknown or pending.
    fn receipt(&self, tx_hash: TxHash)
        -> impl Future<Output = Result<ReceiptLogs, ResolveError>> + Send;
}

/// Read access to the L1 output proposal history.
pub trait OutputOracle: Send + Sync {
    /// Index of the first output whose L2 block number is >= `l2_block`.
    ///
    /// Returns `None` while no output covers the block.
    fn output_index_after(
        &self,
        l2_block: u64,
    ) -> impl Future<Output = Result<Option<U256>, ResolveError>> + Send;

    /// The output proposal stored at `index`.
    fn output_at(
        &self,
        index: U256,
    ) -> impl Future<Output = Result<OutputProposal, ResolveError>> + Send;
}
