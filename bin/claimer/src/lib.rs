pub mod config;
pub mod metrics;

use crate::{config::Config, metrics::Metrics};
use alloy_primitives::TxHash;
use alloy_provider::Provider;
use alloy_rpc_types_eth::BlockNumberOrTag;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use withdrawal::{
    rpc::{RpcOutputOracle, RpcReceiptSource},
    source::{OutputOracle, ReceiptSource},
    FinalizationAssembler, Resolution,
};

/// Assembler reading receipts from L2 and output proposals from L1.
pub type RpcAssembler<L1, L2> = FinalizationAssembler<RpcReceiptSource<L2>, RpcOutputOracle<L1>>;

/// Wire the resolver to the configured providers and deployment.
pub fn build_assembler<L1, L2>(
    l1_provider: L1,
    l2_provider: L2,
    config: &Config,
) -> eyre::Result<RpcAssembler<L1, L2>>
where
    L1: Provider + Clone,
    L2: Provider + Clone,
{
    let addresses = config.contract_addresses()?;
    let settings = config.rpc.settings();

    Ok(FinalizationAssembler::new(
        RpcReceiptSource::new(l2_provider, settings),
        RpcOutputOracle::new(l1_provider, addresses.l2_output_oracle, settings),
        addresses,
        config.multi_message_policy,
    ))
}

/// Resolve a withdrawal, optionally polling until it becomes resolvable.
///
/// With `poll_interval` set, retryable failures (missing receipt, no covering
/// output proposal, unavailable RPC) are retried after sleeping. Any other
/// failure is returned immediately.
pub async fn resolve_withdrawal<R, O>(
    assembler: &FinalizationAssembler<R, O>,
    tx_hash: TxHash,
    poll_interval: Option<Duration>,
    metrics: &Metrics,
) -> eyre::Result<Resolution>
where
    R: ReceiptSource,
    O: OutputOracle,
{
    loop {
        let start = Instant::now();
        match assembler.resolve(tx_hash).await {
            Ok(resolution) => {
                metrics.record_resolution_success(start.elapsed());
                return Ok(resolution);
            }
            Err(e) => {
                metrics.record_resolution_failure(e.kind(), start.elapsed());

                let Some(interval) = poll_interval.filter(|_| e.is_retryable()) else {
                    return Err(e.into());
                };

                info!(
                    %tx_hash,
                    reason = %e,
                    retry_in = ?interval,
                    "Withdrawal not resolvable yet, waiting"
                );
                tokio::time::sleep(interval).await;
            }
        }
    }
}

/// Log the resolved withdrawal tuple.
pub fn log_resolution(resolution: &Resolution) {
    let withdrawal = &resolution.withdrawal;
    info!(
        withdrawal_hash = %resolution.withdrawal_hash,
        nonce = %withdrawal.nonce,
        sender = %withdrawal.sender,
        target = %withdrawal.target,
        value = %withdrawal.value,
        gas_limit = %withdrawal.gasLimit,
        data = %withdrawal.data,
        message_version = resolution.message_version,
        "Withdrawal transaction"
    );
    info!(
        output_index = %resolution.checkpoint.index,
        output_root = %resolution.checkpoint.output_root,
        output_l2_block = resolution.checkpoint.l2_block_number,
        l1_timestamp = resolution.checkpoint.l1_timestamp,
        withdrawal_l2_block = resolution.l2_block,
        "Covering output proposal"
    );
}

/// Log the L2 header at the checkpoint block.
///
/// Informational only; the withdrawal tuple does not depend on it.
pub async fn log_checkpoint_block<P>(l2_provider: &P, l2_block: u64) -> eyre::Result<()>
where
    P: Provider,
{
    let Some(block) = l2_provider
        .get_block_by_number(BlockNumberOrTag::Number(l2_block))
        .await?
    else {
        warn!(l2_block, "Checkpoint block not available on L2");
        return Ok(());
    };

    info!(
        l2_block,
        block_hash = %block.header.hash,
        state_root = %block.header.state_root,
        "Checkpoint block"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{b256, Address, Bytes, LogData, B256, U256};
    use alloy_rpc_types_eth::Log;
    use alloy_sol_types::SolEvent;
    use binding::{
        messenger::{IL2CrossDomainMessenger::SentMessage, L2_CROSS_DOMAIN_MESSENGER_ADDRESS},
        opstack::{IL2ToL1MessagePasser::MessagePassed, MESSAGE_PASSER_ADDRESS},
    };
    use ::config::ContractAddresses;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use withdrawal::{
        checkpoint::OutputProposal,
        message::MultiMessagePolicy,
        nonce::{VersionedNonce, MESSAGE_VERSION_V1},
        source::ReceiptLogs,
        ResolveError,
    };

    const TX_HASH: TxHash =
        b256!("2222222222222222222222222222222222222222222222222222222222222222");
    const BLOCK: u64 = 150;

    fn log_at(index: u64, address: Address, data: LogData) -> Log {
        Log {
            inner: alloy_primitives::Log { address, data },
            block_number: Some(BLOCK),
            transaction_hash: Some(TX_HASH),
            log_index: Some(index),
            ..Default::default()
        }
    }

    fn withdrawal_logs() -> Vec<Log> {
        let nonce = VersionedNonce::new(U256::from(7), MESSAGE_VERSION_V1)
            .unwrap()
            .encode();
        let sent = SentMessage {
            target: Address::repeat_byte(0x11),
            sender: Address::repeat_byte(0x22),
            message: Bytes::from_static(&[0xde, 0xad]),
            messageNonce: nonce,
            gasLimit: U256::from(21_000),
        };
        let passed = MessagePassed {
            nonce,
            sender: L2_CROSS_DOMAIN_MESSENGER_ADDRESS,
            target: Address::repeat_byte(0x33),
            value: U256::ZERO,
            gasLimit: U256::from(100_000),
            data: Bytes::new(),
            withdrawalHash: B256::ZERO,
        };

        vec![
            log_at(0, MESSAGE_PASSER_ADDRESS, passed.encode_log_data()),
            log_at(1, L2_CROSS_DOMAIN_MESSENGER_ADDRESS, sent.encode_log_data()),
        ]
    }

    struct FixedReceipt(Vec<Log>);

    impl ReceiptSource for FixedReceipt {
        async fn receipt(&self, _tx_hash: TxHash) -> Result<ReceiptLogs, ResolveError> {
            Ok(ReceiptLogs {
                block_number: BLOCK,
                logs: self.0.clone(),
            })
        }
    }

    /// Oracle that publishes a covering proposal after `pending` lookups.
    struct SlowOracle {
        pending: usize,
        lookups: AtomicUsize,
    }

    impl SlowOracle {
        fn new(pending: usize) -> Self {
            Self {
                pending,
                lookups: AtomicUsize::new(0),
            }
        }
    }

    impl OutputOracle for SlowOracle {
        async fn output_index_after(&self, _l2_block: u64) -> Result<Option<U256>, ResolveError> {
            let seen = self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok((seen >= self.pending).then_some(U256::from(3)))
        }

        async fn output_at(&self, index: U256) -> Result<OutputProposal, ResolveError> {
            Ok(OutputProposal {
                index,
                output_root: B256::repeat_byte(0x44),
                l1_timestamp: 1_700_000_000,
                l2_block_number: 180,
            })
        }
    }

    fn assembler(
        receipt: FixedReceipt,
        oracle: SlowOracle,
    ) -> FinalizationAssembler<FixedReceipt, SlowOracle> {
        FinalizationAssembler::new(
            receipt,
            oracle,
            ContractAddresses::devnet(),
            MultiMessagePolicy::Reject,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_checkpoint() {
        let assembler = assembler(FixedReceipt(withdrawal_logs()), SlowOracle::new(2));

        let resolution = resolve_withdrawal(
            &assembler,
            TX_HASH,
            Some(Duration::from_secs(30)),
            &Metrics::new(),
        )
        .await
        .unwrap();

        assert_eq!(resolution.checkpoint.index, U256::from(3));
        assert_eq!(resolution.l2_block, BLOCK);
        assert_eq!(resolution.withdrawal.gasLimit, U256::from(100_000));
    }

    #[tokio::test]
    async fn test_no_wait_returns_first_error() {
        let assembler = assembler(FixedReceipt(withdrawal_logs()), SlowOracle::new(1));

        let err = resolve_withdrawal(&assembler, TX_HASH, None, &Metrics::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No output proposal covers L2 block 150"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_error_not_retried() {
        let assembler = assembler(FixedReceipt(Vec::new()), SlowOracle::new(0));

        let err = resolve_withdrawal(
            &assembler,
            TX_HASH,
            Some(Duration::from_secs(30)),
            &Metrics::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ResolveError>(),
            Some(ResolveError::NoMessageFound)
        ));
    }
}
