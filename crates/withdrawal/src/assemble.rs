//! Assembly of the finalization tuple.
//!
//! Resolution runs in two phases once the receipt is known: the checkpoint
//! lookup on L1 and the log decoding of the receipt are independent and run
//! concurrently, then the results are joined into a [`WithdrawalTransaction`].
//!
//! The message nonce version is only used to interpret the original message.
//! The finalized payload always wraps the message in the current (v1) relay
//! encoding, whatever version the message was sent with.

use crate::{
    checkpoint::{CheckpointResolver, OutputProposal},
    encode::encode_message_as,
    error::ResolveError,
    hash::compute_withdrawal_hash,
    locator::{locate_withdrawal, PassedWithdrawal},
    message::{CrossDomainMessage, MessageExtractor, MultiMessagePolicy},
    nonce::{MESSAGE_VERSION_V0, MESSAGE_VERSION_V1},
    source::{OutputOracle, ReceiptSource},
    types::WithdrawalHash,
};
use alloy_primitives::{Address, Bytes, TxHash};
use binding::opstack::WithdrawalTransaction;
use config::ContractAddresses;
use tracing::{debug, info, warn};

/// Everything learned while resolving one L2 transaction.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Argument for `finalizeWithdrawalTransaction`
    pub withdrawal: WithdrawalTransaction,
    /// Hash of `withdrawal` as tracked by the portal
    pub withdrawal_hash: WithdrawalHash,
    /// The message as sent on L2
    pub message: CrossDomainMessage,
    /// Version decoded from the original message nonce
    pub message_version: u16,
    /// The MessagePassed record the tuple takes its nonce and gas limit from
    pub passed: PassedWithdrawal,
    /// Output proposal covering the L2 block
    pub checkpoint: OutputProposal,
    /// L2 block of the transaction
    pub l2_block: u64,
}

/// Re-encode a sent message as the v1 relay payload finalized on L1.
///
/// Decodes the original nonce version first; only versions 0 and 1 can be interpreted.
pub fn wrap_for_finalization(message: &CrossDomainMessage) -> Result<Bytes, ResolveError> {
    match message.versioned_nonce().version {
        MESSAGE_VERSION_V0 | MESSAGE_VERSION_V1 => encode_message_as(message, MESSAGE_VERSION_V1),
        other => Err(ResolveError::UnsupportedMessageVersion(other)),
    }
}

/// Build the withdrawal tuple from a decoded message and its MessagePassed record.
///
/// Nonce and gas limit come from the record; value comes from the message.
pub fn assemble_withdrawal(
    message: &CrossDomainMessage,
    passed: &PassedWithdrawal,
    l2_messenger: Address,
    l1_messenger: Address,
) -> Result<WithdrawalTransaction, ResolveError> {
    Ok(WithdrawalTransaction {
        nonce: passed.nonce,
        sender: l2_messenger,
        target: l1_messenger,
        value: message.value,
        gasLimit: passed.gas_limit,
        data: wrap_for_finalization(message)?,
    })
}

/// Resolves L2 transactions into finalizable withdrawals.
#[derive(Debug, Clone)]
pub struct FinalizationAssembler<R, O> {
    receipts: R,
    checkpoints: CheckpointResolver<O>,
    extractor: MessageExtractor,
    addresses: ContractAddresses,
}

impl<R, O> FinalizationAssembler<R, O>
where
    R: ReceiptSource,
    O: OutputOracle,
{
    pub const fn new(
        receipts: R,
        oracle: O,
        addresses: ContractAddresses,
        policy: MultiMessagePolicy,
    ) -> Self {
        Self {
            receipts,
            checkpoints: CheckpointResolver::new(oracle),
            extractor: MessageExtractor::new(addresses.l2_cross_domain_messenger, policy),
            addresses,
        }
    }

    /// Contract addresses this assembler resolves against.
    pub const fn addresses(&self) -> &ContractAddresses {
        &self.addresses
    }

    pub const fn receipts(&self) -> &R {
        &self.receipts
    }

    /// Resolve the withdrawal initiated by the L2 transaction `tx_hash`.
    ///
    /// Either returns a complete [`Resolution`] or the first error hit.
    pub async fn resolve(&self, tx_hash: TxHash) -> Result<Resolution, ResolveError> {
        let receipt = self.receipts.receipt(tx_hash).await?;
        let l2_block = receipt.block_number;

        debug!(%tx_hash, l2_block, logs = receipt.logs.len(), "Resolving withdrawal");

        let decode_logs = async {
            let message = self.extractor.extract(&receipt.logs)?;
            let passed =
                locate_withdrawal(&receipt.logs, self.addresses.l2_to_l1_message_passer)?;
            Ok::<_, ResolveError>((message, passed))
        };

        let (checkpoint, (message, passed)) =
            tokio::try_join!(self.checkpoints.resolve_checkpoint(l2_block), decode_logs)?;

        let message_version = message.versioned_nonce().version;
        let withdrawal = assemble_withdrawal(
            &message,
            &passed,
            self.addresses.l2_cross_domain_messenger,
            self.addresses.l1_cross_domain_messenger,
        )?;
        let withdrawal_hash = compute_withdrawal_hash(&withdrawal);

        if withdrawal_hash != passed.withdrawal_hash {
            warn!(
                computed_hash = %withdrawal_hash,
                withdrawal_hash = %passed.withdrawal_hash,
                "Assembled withdrawal does not hash to the MessagePassed commitment"
            );
        }

        info!(
            %tx_hash,
            %withdrawal_hash,
            message_version,
            output_index = %checkpoint.index,
            output_l2_block = checkpoint.l2_block_number,
            "Resolved withdrawal"
        );

        Ok(Resolution {
            withdrawal,
            withdrawal_hash,
            message,
            message_version,
            passed,
            checkpoint,
            l2_block,
        })
    }
}
