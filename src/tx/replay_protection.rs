//! Transaction Replay Protection
//!
//! EIP-155 folds the chain id into `v` so a signature made for one chain
//! is invalid on every other.

use crate::error::{CardResult, CardSignError};
use crate::types::RecoveryId;

/// Offset of pre-EIP-155 `v` values
pub const LEGACY_V_OFFSET: u8 = 27;

/// Offset of EIP-155 `v` values before the `2 * chain_id` term
pub const EIP155_V_OFFSET: u64 = 35;

/// Networks the card signer is configured against
pub mod chain_ids {
    pub const ETHEREUM: u64 = 1;
    pub const ROPSTEN: u64 = 3;
    pub const SEPOLIA: u64 = 11155111;
}

/// `recovery_id + 27`, the chain-agnostic `v` carried by a signature tuple
pub fn legacy_v(recovery_id: RecoveryId) -> u8 {
    recovery_id.value() + LEGACY_V_OFFSET
}

/// `recovery_id + 35 + 2 * chain_id`
pub fn eip155_v(recovery_id: RecoveryId, chain_id: u64) -> CardResult<u64> {
    chain_id
        .checked_mul(2)
        .and_then(|doubled| doubled.checked_add(EIP155_V_OFFSET + recovery_id.value() as u64))
        .ok_or_else(|| CardSignError::invalid_input(format!("chain id {} too large for EIP-155", chain_id)))
}

/// Convert a tuple's legacy `v` into its EIP-155 form for `chain_id`
pub fn eip155_v_from_legacy(v: u8, chain_id: u64) -> CardResult<u64> {
    let recovery_id = v
        .checked_sub(LEGACY_V_OFFSET)
        .ok_or_else(|| CardSignError::invalid_input(format!("legacy v must be at least 27, got {}", v)))
        .and_then(RecoveryId::new)?;
    eip155_v(recovery_id, chain_id)
}
