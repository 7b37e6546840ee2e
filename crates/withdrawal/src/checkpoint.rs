//! Output checkpoint resolution.
//!
//! A withdrawal can only be finalized against an output proposal whose L2
//! block number is at or past the block that initiated it. The oracle keeps
//! proposals ordered by L2 block, so the covering checkpoint is the first one
//! with `l2_block_number >= block`.

use crate::{error::ResolveError, source::OutputOracle};
use alloy_primitives::{B256, U256};
use tracing::debug;

/// An output root posted to the L2OutputOracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputProposal {
    /// Position in the oracle's output history
    pub index: U256,
    pub output_root: B256,
    /// L1 timestamp of the proposal
    pub l1_timestamp: u64,
    pub l2_block_number: u64,
}

impl OutputProposal {
    /// Whether this proposal finalizes `l2_block`.
    pub const fn covers(&self, l2_block: u64) -> bool {
        self.l2_block_number >= l2_block
    }
}

/// Finds the output proposal covering an L2 block.
#[derive(Debug, Clone)]
pub struct CheckpointResolver<O> {
    oracle: O,
}

impl<O> CheckpointResolver<O>
where
    O: OutputOracle,
{
    pub const fn new(oracle: O) -> Self {
        Self { oracle }
    }

    /// The first proposal whose L2 block number is >= `l2_block`.
    ///
    /// Fails with [`ResolveError::CheckpointNotFound`] while no proposal covers it.
    pub async fn resolve_checkpoint(&self, l2_block: u64) -> Result<OutputProposal, ResolveError> {
        let index = self
            .oracle
            .output_index_after(l2_block)
            .await?
            .ok_or(ResolveError::CheckpointNotFound(l2_block))?;

        let proposal = self.oracle.output_at(index).await?;

        // The oracle can lag behind the index we got from a different node
        if !proposal.covers(l2_block) {
            return Err(ResolveError::CheckpointNotFound(l2_block));
        }

        debug!(
            l2_block,
            output_index = %proposal.index,
            output_root = %proposal.output_root,
            output_l2_block = proposal.l2_block_number,
            "Resolved covering output proposal"
        );

        Ok(proposal)
    }
}
