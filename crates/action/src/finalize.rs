//! Finalize withdrawal action.
//!
//! Resolves the withdrawal initiated by an L2 transaction and finalizes it on
//! L1 through the OptimismPortal, executing the relayed message.

use crate::{Action, SignerFn};
use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::Provider;
use binding::opstack::IOptimismPortal;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use withdrawal::{
    source::{OutputOracle, ReceiptSource},
    FinalizationAssembler, Resolution, ResolveError, WithdrawalHash,
};

/// Input data for finalizing a withdrawal on L1.
#[derive(Clone, Debug)]
pub struct Finalize {
    /// OptimismPortal contract address on L1
    pub portal_address: Address,
    /// L2 transaction that sent the cross-domain message
    pub l2_tx_hash: TxHash,
    /// Address that will submit the finalize transaction
    pub from: Address,
}

/// Action to finalize a withdrawal on L1.
pub struct FinalizeAction<P, R, O> {
    l1_provider: P,
    assembler: FinalizationAssembler<R, O>,
    signer: SignerFn,
    action: Finalize,
    resolution: OnceCell<Resolution>,
}

impl<P, R, O> FinalizeAction<P, R, O>
where
    P: Provider + Clone,
    R: ReceiptSource,
    O: OutputOracle,
{
    pub fn new(
        l1_provider: P,
        assembler: FinalizationAssembler<R, O>,
        signer: SignerFn,
        action: Finalize,
    ) -> Self {
        Self {
            l1_provider,
            assembler,
            signer,
            action,
            resolution: OnceCell::new(),
        }
    }

    /// Reuse a resolution of `l2_tx_hash` obtained elsewhere instead of resolving again.
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = OnceCell::new_with(Some(resolution));
        self
    }

    /// The resolution this action finalizes, once known.
    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.get()
    }

    /// Resolve the withdrawal on first use and keep the result.
    ///
    /// Failed attempts are not cached.
    pub async fn resolve(&self) -> Result<&Resolution, ResolveError> {
        self.resolution
            .get_or_try_init(|| self.assembler.resolve(self.action.l2_tx_hash))
            .await
    }

    /// Resolve the withdrawal, mapping "not there yet" conditions to `None`.
    async fn try_resolve(&self) -> eyre::Result<Option<&Resolution>> {
        match self.resolve().await {
            Ok(resolution) => Ok(Some(resolution)),
            Err(e @ (ResolveError::ReceiptNotFound(_) | ResolveError::CheckpointNotFound(_))) => {
                debug!(l2_tx_hash = %self.action.l2_tx_hash, reason = %e, "Withdrawal not resolvable yet");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check if the portal already finalized the withdrawal.
    async fn check_is_finalized(&self, hash: WithdrawalHash) -> eyre::Result<bool> {
        let portal = IOptimismPortal::new(self.action.portal_address, &self.l1_provider);
        let finalized = portal.finalizedWithdrawals(hash).call().await?;
        Ok(finalized)
    }
}

impl<P, R, O> Action for FinalizeAction<P, R, O>
where
    P: Provider + Clone,
    R: ReceiptSource,
    O: OutputOracle,
{
    async fn is_ready(&self) -> eyre::Result<bool> {
        // Not ready until an output proposal covers the withdrawal block
        let Some(resolution) = self.try_resolve().await? else {
            return Ok(false);
        };

        Ok(!self.check_is_finalized(resolution.withdrawal_hash).await?)
    }

    async fn is_completed(&self) -> eyre::Result<bool> {
        let Some(resolution) = self.try_resolve().await? else {
            return Ok(false);
        };

        self.check_is_finalized(resolution.withdrawal_hash).await
    }

    async fn execute(&mut self) -> eyre::Result<crate::Result> {
        let resolution = self.resolve().await?;

        if self.check_is_finalized(resolution.withdrawal_hash).await? {
            eyre::bail!("Withdrawal already finalized")
        }

        info!(
            withdrawal_hash = %resolution.withdrawal_hash,
            nonce = %resolution.withdrawal.nonce,
            gas_limit = %resolution.withdrawal.gasLimit,
            output_index = %resolution.checkpoint.index,
            "Finalizing withdrawal"
        );

        // Build the transaction request
        let portal = IOptimismPortal::new(self.action.portal_address, &self.l1_provider);
        let call = portal.finalizeWithdrawalTransaction(resolution.withdrawal.clone());
        let tx_request = call.into_transaction_request().from(self.action.from);

        // Sign externally (the signer fills nonce, gas and fees)
        let signed_tx = (self.signer)(tx_request).await?;

        // Broadcast the signed transaction
        let pending = self.l1_provider.send_raw_transaction(&signed_tx).await?;
        let receipt = pending.get_receipt().await?;

        info!(
            tx_hash = %receipt.transaction_hash,
            block_number = receipt.block_number,
            gas_used = receipt.gas_used,
            withdrawal_hash = %resolution.withdrawal_hash,
            "Withdrawal finalized on L1"
        );

        Ok(crate::Result {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: Some(U256::from(receipt.gas_used)),
        })
    }

    fn description(&self) -> String {
        format!(
            "Finalizing withdrawal from L2 transaction {} on L1",
            self.action.l2_tx_hash
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{mock_signer, MockProvider};
    use alloy_primitives::{address, b256, Bytes, LogData, B256};
    use alloy_rpc_types_eth::Log;
    use alloy_sol_types::SolEvent;
    use binding::{
        messenger::{IL2CrossDomainMessenger::SentMessage, L2_CROSS_DOMAIN_MESSENGER_ADDRESS},
        opstack::{IL2ToL1MessagePasser::MessagePassed, MESSAGE_PASSER_ADDRESS},
    };
    use config::ContractAddresses;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use withdrawal::{
        checkpoint::OutputProposal,
        message::MultiMessagePolicy,
        nonce::{VersionedNonce, MESSAGE_VERSION_V1},
        source::ReceiptLogs,
    };

    const L2_TX_HASH: TxHash =
        b256!("1111111111111111111111111111111111111111111111111111111111111111");
    const L2_BLOCK: u64 = 150;

    /// L2 node that has not seen any transaction yet.
    struct EmptyChain;

    impl ReceiptSource for EmptyChain {
        async fn receipt(&self, tx_hash: TxHash) -> Result<ReceiptLogs, ResolveError> {
            Err(ResolveError::ReceiptNotFound(tx_hash))
        }
    }

    impl OutputOracle for EmptyChain {
        async fn output_index_after(&self, _l2_block: u64) -> Result<Option<U256>, ResolveError> {
            Ok(None)
        }

        async fn output_at(&self, index: U256) -> Result<OutputProposal, ResolveError> {
            Err(ResolveError::CollaboratorUnavailable {
                call: "getL2Output",
                reason: format!("no output at {index}"),
            })
        }
    }

    fn create_test_finalize_action() -> FinalizeAction<MockProvider, EmptyChain, EmptyChain> {
        let addresses = ContractAddresses::devnet();
        let finalize = Finalize {
            portal_address: addresses.optimism_portal,
            l2_tx_hash: L2_TX_HASH,
            from: address!("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1"),
        };
        let assembler =
            FinalizationAssembler::new(EmptyChain, EmptyChain, addresses, MultiMessagePolicy::Reject);

        FinalizeAction::new(MockProvider, assembler, mock_signer(), finalize)
    }

    #[test]
    fn test_finalize_action_description() {
        let action = create_test_finalize_action();
        let desc = action.description();
        assert!(desc.contains("Finalizing withdrawal"));
        assert!(desc.contains("1111111111111111111111111111111111111111111111111111111111111111"));
    }

    #[tokio::test]
    async fn test_not_ready_without_receipt() {
        let action = create_test_finalize_action();
        assert!(!action.is_ready().await.unwrap());
        assert!(!action.is_completed().await.unwrap());
        assert!(action.resolution().is_none());
    }

    #[tokio::test]
    async fn test_execute_fails_without_receipt() {
        let mut action = create_test_finalize_action();
        let err = action.execute().await.err().unwrap();
        assert!(err.to_string().contains("Receipt not found"));
    }

    fn log_at(index: u64, address: Address, data: LogData) -> Log {
        Log {
            inner: alloy_primitives::Log { address, data },
            block_number: Some(L2_BLOCK),
            transaction_hash: Some(L2_TX_HASH),
            log_index: Some(index),
            ..Default::default()
        }
    }

    /// L2 node holding one withdrawal receipt, counting lookups.
    #[derive(Default)]
    struct CountingChain {
        lookups: AtomicUsize,
    }

    impl ReceiptSource for CountingChain {
        async fn receipt(&self, _tx_hash: TxHash) -> Result<ReceiptLogs, ResolveError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);

            let nonce = VersionedNonce::new(U256::from(4), MESSAGE_VERSION_V1)
                .unwrap()
                .encode();
            let sent = SentMessage {
                target: Address::repeat_byte(0x11),
                sender: Address::repeat_byte(0x22),
                message: Bytes::new(),
                messageNonce: nonce,
                gasLimit: U256::from(21_000),
            };
            let passed = MessagePassed {
                nonce,
                sender: L2_CROSS_DOMAIN_MESSENGER_ADDRESS,
                target: Address::repeat_byte(0x33),
                value: U256::ZERO,
                gasLimit: U256::from(50_000),
                data: Bytes::new(),
                withdrawalHash: B256::ZERO,
            };

            Ok(ReceiptLogs {
                block_number: L2_BLOCK,
                logs: vec![
                    log_at(0, MESSAGE_PASSER_ADDRESS, passed.encode_log_data()),
                    log_at(1, L2_CROSS_DOMAIN_MESSENGER_ADDRESS, sent.encode_log_data()),
                ],
            })
        }
    }

    impl OutputOracle for CountingChain {
        async fn output_index_after(&self, _l2_block: u64) -> Result<Option<U256>, ResolveError> {
            Ok(Some(U256::ZERO))
        }

        async fn output_at(&self, index: U256) -> Result<OutputProposal, ResolveError> {
            Ok(OutputProposal {
                index,
                output_root: B256::repeat_byte(0x44),
                l1_timestamp: 1_700_000_000,
                l2_block_number: 200,
            })
        }
    }

    fn counting_action() -> FinalizeAction<MockProvider, CountingChain, CountingChain> {
        let addresses = ContractAddresses::devnet();
        let finalize = Finalize {
            portal_address: addresses.optimism_portal,
            l2_tx_hash: L2_TX_HASH,
            from: address!("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1"),
        };
        let assembler = FinalizationAssembler::new(
            CountingChain::default(),
            CountingChain::default(),
            addresses,
            MultiMessagePolicy::Reject,
        );

        FinalizeAction::new(MockProvider, assembler, mock_signer(), finalize)
    }

    #[tokio::test]
    async fn test_resolves_once() {
        let action = counting_action();

        let first = action.resolve().await.unwrap().clone();
        let second = action.resolve().await.unwrap();

        assert_eq!(action.assembler.receipts().lookups.load(Ordering::SeqCst), 1);
        assert_eq!(first.withdrawal, second.withdrawal);
        assert_eq!(first.withdrawal.gasLimit, U256::from(50_000));
        assert_eq!(action.resolution().map(|r| r.withdrawal_hash), Some(first.withdrawal_hash));
    }

    #[tokio::test]
    async fn test_seeded_resolution_is_reused() {
        let resolution = counting_action().resolve().await.unwrap().clone();

        let action = counting_action().with_resolution(resolution.clone());
        let reused = action.resolve().await.unwrap();

        assert_eq!(action.assembler.receipts().lookups.load(Ordering::SeqCst), 0);
        assert_eq!(reused.withdrawal_hash, resolution.withdrawal_hash);
    }
}
