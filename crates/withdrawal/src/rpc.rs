//! Provider-backed implementations of the resolver's data sources.
//!
//! Every external call is bounded by a timeout and retried with exponential
//! backoff before it is reported as [`ResolveError::CollaboratorUnavailable`].
//! Contract reverts are not retried.

use crate::{
    checkpoint::OutputProposal,
    error::ResolveError,
    source::{OutputOracle, ReceiptLogs, ReceiptSource},
};
use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::Provider;
use binding::opstack::IL2OutputOracle;
use std::{fmt::Display, future::Future, time::Duration};
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};
use tracing::{debug, warn};

/// Timeout and retry budget applied to each external call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RpcSettings {
    /// Upper bound for a single attempt
    pub timeout: Duration,
    /// Retries after the first failed attempt
    pub max_retries: usize,
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 3,
        }
    }
}

/// Run `f` with a per-attempt timeout, retrying failed attempts.
pub async fn call_with_retry<T, E, F, Fut>(
    call: &'static str,
    settings: RpcSettings,
    f: F,
) -> Result<T, ResolveError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    call_with_retry_if(call, settings, f, |_: &E| true).await
}

/// [`call_with_retry`] that only retries errors accepted by `is_transient`.
///
/// Any other error fails at once with [`ResolveError::CallReverted`].
pub async fn call_with_retry_if<T, E, F, Fut, C>(
    call: &'static str,
    settings: RpcSettings,
    mut f: F,
    is_transient: C,
) -> Result<T, ResolveError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    C: Fn(&E) -> bool,
{
    // Exponential backoff: 100ms, 200ms, 400ms, ... capped at 5s
    let retry_strategy = ExponentialBackoff::from_millis(2)
        .factor(50)
        .max_delay(Duration::from_secs(5))
        .take(settings.max_retries);

    let is_transient = &is_transient;
    let mut attempt = 0;

    RetryIf::spawn(
        retry_strategy,
        || {
            attempt += 1;
            let attempt = attempt;
            let pending = f();
            async move {
                let reason = match tokio::time::timeout(settings.timeout, pending).await {
                    Ok(Ok(value)) => return Ok(value),
                    Ok(Err(e)) if !is_transient(&e) => {
                        warn!(call, error = %e, "External call reverted");
                        return Err(ResolveError::CallReverted {
                            call,
                            reason: e.to_string(),
                        });
                    }
                    Ok(Err(e)) => e.to_string(),
                    Err(_) => format!("timed out after {:?}", settings.timeout),
                };

                if retries_left(attempt, settings.max_retries) {
                    warn!(call, attempt, error = %reason, "External call failed, retrying");
                } else {
                    warn!(call, attempt, error = %reason, "External call failed, giving up");
                }
                Err(ResolveError::CollaboratorUnavailable { call, reason })
            }
        },
        |e: &ResolveError| matches!(e, ResolveError::CollaboratorUnavailable { .. }),
    )
    .await
}

/// Whether another attempt follows a failed `attempt` (1-based).
const fn retries_left(attempt: usize, max_retries: usize) -> bool {
    attempt <= max_retries
}

/// Contract calls are retried unless the node answered with a revert.
fn is_transient_call(e: &alloy_contract::Error) -> bool {
    e.as_revert_data().is_none()
}

/// Narrow a `uint128` oracle field, rejecting values that do not fit.
fn narrow(call: &'static str, field: &str, value: u128) -> Result<u64, ResolveError> {
    u64::try_from(value).map_err(|_| ResolveError::CollaboratorUnavailable {
        call,
        reason: format!("{field} {value} does not fit in u64"),
    })
}

/// Reads L2 receipts through an alloy provider.
#[derive(Debug, Clone)]
pub struct RpcReceiptSource<P> {
    provider: P,
    settings: RpcSettings,
}

impl<P> RpcReceiptSource<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P, settings: RpcSettings) -> Self {
        Self { provider, settings }
    }
}

impl<P> ReceiptSource for RpcReceiptSource<P>
where
    P: Provider + Clone,
{
    async fn receipt(&self, tx_hash: TxHash) -> Result<ReceiptLogs, ResolveError> {
        let provider = &self.provider;
        let receipt = call_with_retry("eth_getTransactionReceipt", self.settings, move || async move {
            provider.get_transaction_receipt(tx_hash).await
        })
        .await?
        .ok_or(ResolveError::ReceiptNotFound(tx_hash))?;

        let block_number = receipt
            .block_number
            .ok_or(ResolveError::ReceiptNotFound(tx_hash))?;

        debug!(
            %tx_hash,
            block_number,
            logs = receipt.logs().len(),
            "Fetched L2 receipt"
        );

        Ok(ReceiptLogs {
            block_number,
            logs: receipt.logs().to_vec(),
        })
    }
}

/// Reads the L2OutputOracle through an alloy provider.
#[derive(Debug, Clone)]
pub struct RpcOutputOracle<P> {
    provider: P,
    oracle_address: Address,
    settings: RpcSettings,
}

impl<P> RpcOutputOracle<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P, oracle_address: Address, settings: RpcSettings) -> Self {
        Self {
            provider,
            oracle_address,
            settings,
        }
    }
}

impl<P> OutputOracle for RpcOutputOracle<P>
where
    P: Provider + Clone,
{
    async fn output_index_after(&self, l2_block: u64) -> Result<Option<U256>, ResolveError> {
        let oracle = IL2OutputOracle::new(self.oracle_address, &self.provider);
        let oracle = &oracle;

        // getL2OutputIndexAfter reverts for blocks past the latest output
        let latest = call_with_retry_if(
            "latestBlockNumber",
            self.settings,
            move || async move { oracle.latestBlockNumber().call().await },
            is_transient_call,
        )
        .await?;

        if latest < U256::from(l2_block) {
            debug!(l2_block, latest_output_block = %latest, "L2 block not proposed yet");
            return Ok(None);
        }

        let index = call_with_retry_if(
            "getL2OutputIndexAfter",
            self.settings,
            move || async move { oracle.getL2OutputIndexAfter(U256::from(l2_block)).call().await },
            is_transient_call,
        )
        .await?;

        Ok(Some(index))
    }

    async fn output_at(&self, index: U256) -> Result<OutputProposal, ResolveError> {
        let oracle = IL2OutputOracle::new(self.oracle_address, &self.provider);
        let oracle = &oracle;

        let proposal = call_with_retry_if(
            "getL2Output",
            self.settings,
            move || async move { oracle.getL2Output(index).call().await },
            is_transient_call,
        )
        .await?;

        Ok(OutputProposal {
            index,
            output_root: proposal.outputRoot,
            l1_timestamp: narrow("getL2Output", "timestamp", proposal.timestamp)?,
            l2_block_number: narrow("getL2Output", "l2BlockNumber", proposal.l2BlockNumber)?,
        })
    }
}
