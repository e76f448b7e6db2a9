//! Signature Math
//!
//! Turns the card's DER output into Ethereum signature components:
//! - **der**: DER parsing into raw `r` and `s`
//! - **canonical**: low-S normalization
//! - **recovery**: recovery id search against the card's public key

pub mod canonical;
pub mod der;
pub mod recovery;

pub use canonical::{canonicalize, is_canonical, CURVE_ORDER, HALF_CURVE_ORDER};
pub use der::{encode_der, extract_components};
pub use recovery::{parse_public_key, public_key_to_address, resolve_recovery_id, ExpectedSigner};
