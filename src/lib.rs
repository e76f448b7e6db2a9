//! Card Ethereum Signer
//!
//! Signs Ethereum transactions with a hardware card that only returns
//! DER-encoded ECDSA signatures.
//!
//! # Architecture
//!
//! This crate provides:
//! - **crypto**: DER extraction, low-S canonicalization, recovery id search
//! - **tx**: Transaction assembly, EIP-155 encoding, broadcasting
//! - **balances**: Confirmed balance and pending delta
//! - **ledger**: JSON-RPC node access behind the `LedgerClient` trait
//! - **signer**: The `CardSigner` capability the card driver implements
//! - **utils**: Keccak, addresses, configuration, logging
//!
//! # Example
//!
//! ```rust,ignore
//! use card_eth_signer::{JsonRpcLedger, SignerConfig, TransactionAssembler};
//!
//! let config = SignerConfig::from_env()?;
//! let ledger = JsonRpcLedger::from_config(&config)?;
//! let assembler = TransactionAssembler::new(ledger, card, config.signing_settings()?)?;
//! let result = assembler.send_transaction(&request)?;
//! println!("Transaction hash: {}", result.transaction_hash);
//! ```

pub mod balances;
pub mod crypto;
pub mod error;
pub mod ledger;
pub mod signer;
pub mod tx;
pub mod types;
pub mod utils;

// Re-export key types for convenience
pub use error::{CardResult, CardSignError, ErrorCode, ErrorReport};
pub use types::*;

pub use balances::BalanceQuery;
pub use crypto::{
    canonicalize, encode_der, extract_components, parse_public_key, public_key_to_address,
    resolve_recovery_id, ExpectedSigner,
};
pub use ledger::{JsonRpcLedger, LedgerClient, NodeError, SendOutcome};
pub use signer::{CardSigner, SignerFailure};
pub use tx::{Broadcaster, LegacyEip155Codec, SigningSettings, TransactionAssembler, TransactionCodec};

// Re-export crypto utilities for binaries
pub use utils::crypto::{keccak256, parse_address, to_checksum_address};
pub use utils::SignerConfig;
