use crate::types::WithdrawalHash;
use alloy_primitives::keccak256;
use alloy_sol_types::SolValue;
use binding::opstack::WithdrawalTransaction;

/// Hash under which the portal tracks a withdrawal.
///
/// Matches `Hashing.hashWithdrawal`:
/// `keccak256(abi.encode(nonce, sender, target, value, gasLimit, data))`.
pub fn compute_withdrawal_hash(tx: &WithdrawalTransaction) -> WithdrawalHash {
    // Fields are encoded as a flat sequence, not as a single tuple with an offset
    let encoded = (
        &tx.nonce,
        &tx.sender,
        &tx.target,
        &tx.value,
        &tx.gasLimit,
        &tx.data,
    )
        .abi_encode_sequence();

    keccak256(encoded)
}
