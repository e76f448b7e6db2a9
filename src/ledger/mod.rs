//! Remote Ledger Capability
//!
//! The three node calls the signer needs. Everything above this module
//! talks to [`LedgerClient`]; [`JsonRpcLedger`] is the HTTP implementation.

mod json_rpc;

pub use json_rpc::*;

use ethers_core::types::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::CardResult;
use crate::types::BlockSelector;

/// Error object reported by the node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeError {
    #[serde(default)]
    pub code: i64,
    pub message: String,
}

/// Reply to a raw transaction submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOutcome {
    pub transaction_hash: Option<String>,
    pub error: Option<NodeError>,
}

/// Blocking access to an Ethereum node
pub trait LedgerClient {
    /// Balance in wei; `None` when the node returns a null result
    fn get_balance(&self, address: Address, block: BlockSelector) -> CardResult<Option<U256>>;

    fn get_transaction_count(&self, address: Address, block: BlockSelector) -> CardResult<U256>;

    /// Submit `0x`-prefixed signed transaction hex
    fn send_raw_transaction(&self, signed_hex: &str) -> CardResult<SendOutcome>;
}

impl<T: LedgerClient + ?Sized> LedgerClient for &T {
    fn get_balance(&self, address: Address, block: BlockSelector) -> CardResult<Option<U256>> {
        (**self).get_balance(address, block)
    }

    fn get_transaction_count(&self, address: Address, block: BlockSelector) -> CardResult<U256> {
        (**self).get_transaction_count(address, block)
    }

    fn send_raw_transaction(&self, signed_hex: &str) -> CardResult<SendOutcome> {
        (**self).send_raw_transaction(signed_hex)
    }
}
