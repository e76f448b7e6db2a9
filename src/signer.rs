//! Hardware Signer Capability
//!
//! The card is only ever seen through [`CardSigner`]: hand it a 32-byte
//! hash and a key slot, get DER bytes back. Pairing, transport and the
//! card's own command set live outside this crate.

use thiserror::Error;

use crate::error::CardSignError;

/// Why the card did not produce a signature
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerFailure {
    #[error("signer unavailable: {0}")]
    Unavailable(String),

    #[error("signing cancelled by user")]
    Cancelled,

    #[error("signer reported tampering: {0}")]
    Tampered(String),

    #[error("{0}")]
    Other(String),
}

impl From<SignerFailure> for CardSignError {
    fn from(failure: SignerFailure) -> Self {
        CardSignError::Signer(failure.to_string())
    }
}

/// External signer holding the private key.
///
/// Calls block until the device answers; timeouts are the implementor's
/// concern.
pub trait CardSigner {
    /// Sign `hash` with the key in `key_slot`, returning a DER signature
    fn sign(&self, key_slot: u8, hash: &[u8; 32]) -> Result<Vec<u8>, SignerFailure>;
}

impl<T: CardSigner + ?Sized> CardSigner for &T {
    fn sign(&self, key_slot: u8, hash: &[u8; 32]) -> Result<Vec<u8>, SignerFailure> {
        (**self).sign(key_slot, hash)
    }
}

impl<T: CardSigner + ?Sized> CardSigner for Box<T> {
    fn sign(&self, key_slot: u8, hash: &[u8; 32]) -> Result<Vec<u8>, SignerFailure> {
        (**self).sign(key_slot, hash)
    }
}
