//! Recovery Id Resolution
//!
//! A DER signature from the card carries no recovery id, so the id is
//! found by trying all four and keeping the one that recovers the key the
//! card is known to hold.

use ethers_core::types::Address;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId as SecpRecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1};

use crate::error::{CardResult, CardSignError};
use crate::types::{RecoveryId, SignatureComponents};
use crate::utils::crypto::keccak256;

/// The identity a recovered key must match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedSigner {
    PublicKey(PublicKey),
    Address(Address),
}

impl ExpectedSigner {
    pub fn address(&self) -> Address {
        match self {
            ExpectedSigner::PublicKey(key) => public_key_to_address(key),
            ExpectedSigner::Address(address) => *address,
        }
    }

    fn matches(&self, recovered: &PublicKey) -> bool {
        match self {
            ExpectedSigner::PublicKey(key) => key == recovered,
            ExpectedSigner::Address(address) => public_key_to_address(recovered) == *address,
        }
    }
}

impl From<PublicKey> for ExpectedSigner {
    fn from(key: PublicKey) -> Self {
        ExpectedSigner::PublicKey(key)
    }
}

impl From<Address> for ExpectedSigner {
    fn from(address: Address) -> Self {
        ExpectedSigner::Address(address)
    }
}

/// Find the recovery id under which `(r, s)` over `hash` recovers `expected`
pub fn resolve_recovery_id(
    components: &SignatureComponents,
    hash: &[u8; 32],
    expected: &ExpectedSigner,
) -> CardResult<RecoveryId> {
    let compact = components.to_compact()?;
    let secp = Secp256k1::verification_only();
    let message = Message::from_digest(*hash);

    for candidate in RecoveryId::candidates() {
        // A candidate whose point is not on the curve simply does not match
        let Ok(id) = SecpRecoveryId::from_i32(candidate.value() as i32) else {
            continue;
        };
        let Ok(signature) = RecoverableSignature::from_compact(&compact, id) else {
            continue;
        };
        let Ok(recovered) = secp.recover_ecdsa(&message, &signature) else {
            continue;
        };

        if expected.matches(&recovered) {
            return Ok(candidate);
        }
    }

    Err(CardSignError::RecoveryExhausted)
}

/// Parse the card's public key.
///
/// Accepts the 64-byte raw `x || y` export, 65-byte uncompressed and
/// 33-byte compressed SEC1 encodings, with or without a `0x` prefix.
pub fn parse_public_key(hex_key: &str) -> CardResult<PublicKey> {
    let bytes = hex::decode(hex_key.trim().trim_start_matches("0x"))?;

    let sec1 = match bytes.len() {
        64 => {
            let mut prefixed = Vec::with_capacity(65);
            prefixed.push(0x04);
            prefixed.extend_from_slice(&bytes);
            prefixed
        }
        33 | 65 => bytes,
        other => {
            return Err(CardSignError::invalid_input(format!(
                "public key must be 33, 64 or 65 bytes, got {}",
                other
            )))
        }
    };

    PublicKey::from_slice(&sec1)
        .map_err(|e| CardSignError::invalid_input(format!("invalid public key: {}", e)))
}

/// Ethereum address of a secp256k1 public key
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    // Hash the uncompressed key without its 0x04 prefix, keep the last 20 bytes
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    Address::from_slice(&hash[12..])
}
