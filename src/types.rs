//! Shared types for the card signer
//!
//! Value objects that flow through the signing pipeline. Each stage
//! consumes one of these and produces a new one; none is mutated after
//! it has been handed on.

use ethers_core::types::{Address, Bytes, I256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CardResult, CardSignError};

// =============================================================================
// Transaction Types
// =============================================================================

/// Unsigned legacy transaction, created per send request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub nonce: U256,
    pub gas_price: U256,
    pub gas_limit: U256,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

impl RawTransaction {
    pub fn new(
        nonce: U256,
        gas_price: U256,
        gas_limit: U256,
        to: Address,
        value: U256,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            data: data.into(),
        }
    }
}

/// Caller input for a complete send; the nonce is fetched from the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub gas_price: U256,
    pub gas_limit: U256,
    #[serde(default)]
    pub data: Bytes,
}

/// Block tag used for ledger reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockSelector {
    /// Latest finalized state
    Latest,
    /// State including transactions still in the mempool
    Pending,
}

impl BlockSelector {
    pub fn as_tag(&self) -> &'static str {
        match self {
            BlockSelector::Latest => "latest",
            BlockSelector::Pending => "pending",
        }
    }
}

impl fmt::Display for BlockSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

// =============================================================================
// Signature Types
// =============================================================================

/// Raw `r` and `s` as unsigned big-endian bytes without leading zeros
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureComponents {
    pub r: Vec<u8>,
    pub s: Vec<u8>,
}

impl SignatureComponents {
    pub fn new(r: Vec<u8>, s: Vec<u8>) -> Self {
        Self { r, s }
    }

    pub fn r_u256(&self) -> U256 {
        U256::from_big_endian(&self.r)
    }

    pub fn s_u256(&self) -> U256 {
        U256::from_big_endian(&self.s)
    }

    /// 64-byte `r || s` with each half left-padded to 32 bytes
    pub fn to_compact(&self) -> CardResult<[u8; 64]> {
        if self.r.len() > 32 || self.s.len() > 32 {
            return Err(CardSignError::decoding("signature component wider than 32 bytes"));
        }
        let mut compact = [0u8; 64];
        compact[32 - self.r.len()..32].copy_from_slice(&self.r);
        compact[64 - self.s.len()..].copy_from_slice(&self.s);
        Ok(compact)
    }
}

/// Recovery identifier in `0..=3`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RecoveryId(u8);

impl RecoveryId {
    pub const MAX: u8 = 3;

    pub fn new(id: u8) -> CardResult<Self> {
        if id > Self::MAX {
            return Err(CardSignError::invalid_input(format!(
                "recovery id must be in 0..=3, got {}",
                id
            )));
        }
        Ok(Self(id))
    }

    /// All four candidates in search order
    pub fn candidates() -> impl Iterator<Item = RecoveryId> {
        (0..=Self::MAX).map(RecoveryId)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for RecoveryId {
    type Error = CardSignError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        RecoveryId::new(id)
    }
}

impl From<RecoveryId> for u8 {
    fn from(id: RecoveryId) -> u8 {
        id.0
    }
}

/// Signature ready for the codec.
///
/// `v` is `recovery_id + 27`; the codec folds the chain id in when it
/// encodes the signed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureTuple {
    pub v: u8,
    pub r: Vec<u8>,
    pub s: Vec<u8>,
}

/// Output of the assembler, ready for the broadcaster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// Signed RLP bytes
    pub raw: Vec<u8>,
    /// keccak256 of `raw`
    pub hash: [u8; 32],
    pub signature: SignatureTuple,
}

impl SignedTransaction {
    pub fn raw_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw))
    }

    pub fn hash_hex(&self) -> String {
        format!("0x{}", hex::encode(self.hash))
    }
}

/// Hash returned by the node for an accepted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub transaction_hash: String,
}

// =============================================================================
// Balance Types
// =============================================================================

/// Confirmed balance plus the not-yet-confirmed change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub confirmed_wei: U256,
    pub confirmed_ether: String,
    /// `pending - confirmed`, negative while outgoing transfers are unconfirmed
    #[serde(with = "signed_decimal")]
    pub pending_delta_wei: I256,
    pub pending_delta_ether: String,
}

/// Signed wei amounts travel as decimal strings
mod signed_decimal {
    use ethers_core::types::I256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &I256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<I256, D::Error> {
        let text = String::deserialize(deserializer)?;
        I256::from_dec_str(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_id_bounds() {
        assert!(RecoveryId::new(3).is_ok());
        assert!(RecoveryId::new(4).is_err());
        let ids: Vec<u8> = RecoveryId::candidates().map(|id| id.value()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_compact_pads_short_components() {
        let components = SignatureComponents::new(vec![0x01], vec![0x02, 0x03]);
        let compact = components.to_compact().unwrap();
        assert_eq!(compact[31], 0x01);
        assert_eq!(&compact[62..], &[0x02, 0x03]);
        assert!(compact[..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_compact_rejects_wide_component() {
        let components = SignatureComponents::new(vec![1u8; 33], vec![1]);
        assert!(components.to_compact().is_err());
    }

    #[test]
    fn test_snapshot_delta_serializes_as_decimal() {
        let snapshot = BalanceSnapshot {
            confirmed_wei: U256::from(10),
            confirmed_ether: "0.00000000000000001".into(),
            pending_delta_wei: I256::from(-4),
            pending_delta_ether: "-0.000000000000000004".into(),
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["pending_delta_wei"], "-4");

        let back: BalanceSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_block_selector_tags() {
        assert_eq!(BlockSelector::Latest.as_tag(), "latest");
        assert_eq!(BlockSelector::Pending.to_string(), "pending");
    }
}
