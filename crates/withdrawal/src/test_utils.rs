//! In-memory receipts and oracle for resolver tests.

use crate::{
    checkpoint::OutputProposal,
    error::ResolveError,
    source::{OutputOracle, ReceiptLogs, ReceiptSource},
};
use alloy_primitives::{address, b256, Address, Bytes, LogData, TxHash, B256, U256};
use alloy_rpc_types_eth::Log;
use alloy_sol_types::SolEvent;
use binding::{
    messenger::{
        IL2CrossDomainMessenger::{SentMessage, SentMessageExtension1},
        L2_CROSS_DOMAIN_MESSENGER_ADDRESS,
    },
    opstack::{IL2ToL1MessagePasser::MessagePassed, MESSAGE_PASSER_ADDRESS},
};
use std::collections::HashMap;

pub const SENDER: Address = address!("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1");
pub const TARGET: Address = address!("B03eEF386A61b5b462051636001485FFfdD3d843");
pub const OTHER: Address = address!("00000000000000000000000000000000000000aa");
pub const TX_HASH: TxHash =
    b256!("91b374b5403401198a892f62db8843b60125cfb3e28ec1664089d9158424dc4a");
pub const BLOCK: u64 = 150;
pub const MIN_GAS: u64 = 21_000;

pub fn make_log(index: u64, address: Address, data: LogData) -> Log {
    Log {
        inner: alloy_primitives::Log { address, data },
        block_number: Some(BLOCK),
        transaction_hash: Some(TX_HASH),
        log_index: Some(index),
        ..Default::default()
    }
}

/// `SentMessage` from [`SENDER`] to [`TARGET`] with a [`MIN_GAS`] gas limit.
pub fn sent_message_log(index: u64, nonce: U256, message: Bytes) -> Log {
    let event = SentMessage {
        target: TARGET,
        sender: SENDER,
        message,
        messageNonce: nonce,
        gasLimit: U256::from(MIN_GAS),
    };
    make_log(index, L2_CROSS_DOMAIN_MESSENGER_ADDRESS, event.encode_log_data())
}

pub fn value_extension_log(index: u64, value: U256) -> Log {
    let event = SentMessageExtension1 {
        sender: SENDER,
        value,
    };
    make_log(index, L2_CROSS_DOMAIN_MESSENGER_ADDRESS, event.encode_log_data())
}

pub fn message_passed_log(index: u64, nonce: U256, gas_limit: U256) -> Log {
    message_passed_log_with_hash(index, nonce, gas_limit, B256::ZERO)
}

pub fn message_passed_log_with_hash(
    index: u64,
    nonce: U256,
    gas_limit: U256,
    withdrawal_hash: B256,
) -> Log {
    let event = MessagePassed {
        nonce,
        sender: L2_CROSS_DOMAIN_MESSENGER_ADDRESS,
        target: OTHER,
        value: U256::ZERO,
        gasLimit: gas_limit,
        data: Bytes::new(),
        withdrawalHash: withdrawal_hash,
    };
    make_log(index, MESSAGE_PASSER_ADDRESS, event.encode_log_data())
}

#[derive(Debug, Clone, Default)]
pub struct MockReceipts {
    pub receipts: HashMap<TxHash, ReceiptLogs>,
}

impl MockReceipts {
    pub fn single(logs: Vec<Log>) -> Self {
        let mut receipts = HashMap::new();
        receipts.insert(
            TX_HASH,
            ReceiptLogs {
                block_number: BLOCK,
                logs,
            },
        );
        Self { receipts }
    }
}

impl ReceiptSource for MockReceipts {
    async fn receipt(&self, tx_hash: TxHash) -> Result<ReceiptLogs, ResolveError> {
        self.receipts
            .get(&tx_hash)
            .cloned()
            .ok_or(ResolveError::ReceiptNotFound(tx_hash))
    }
}

/// Output history with one proposal per listed L2 block, in order.
#[derive(Debug, Clone, Default)]
pub struct MockOracle {
    pub blocks: Vec<u64>,
    /// Answer every index query with this index
    pub index_override: Option<U256>,
}

impl MockOracle {
    pub fn with_blocks(blocks: &[u64]) -> Self {
        Self {
            blocks: blocks.to_vec(),
            index_override: None,
        }
    }
}

impl OutputOracle for MockOracle {
    async fn output_index_after(&self, l2_block: u64) -> Result<Option<U256>, ResolveError> {
        if let Some(index) = self.index_override {
            return Ok(Some(index));
        }
        Ok(self
            .blocks
            .iter()
            .position(|&block| block >= l2_block)
            .map(U256::from))
    }

    async fn output_at(&self, index: U256) -> Result<OutputProposal, ResolveError> {
        let position = index.to::<usize>();
        let l2_block_number = *self.blocks.get(position).ok_or_else(|| {
            ResolveError::CollaboratorUnavailable {
                call: "getL2Output",
                reason: format!("index {index} out of range"),
            }
        })?;

        Ok(OutputProposal {
            index,
            output_root: B256::with_last_byte(position as u8 + 1),
            l1_timestamp: 1_700_000_000 + position as u64 * 3_600,
            l2_block_number,
        })
    }
}
