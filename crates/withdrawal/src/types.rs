use alloy_primitives::B256;

pub type WithdrawalHash = B256;
