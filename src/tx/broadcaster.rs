//! Transaction Broadcaster
//!
//! Submits signed transactions and separates node rejections (bad nonce,
//! insufficient funds) from transport failures.

use crate::error::{CardResult, CardSignError};
use crate::ledger::LedgerClient;
use crate::types::TransactionResult;
use crate::utils::logging::redact_hash;

pub struct Broadcaster<L> {
    ledger: L,
}

impl<L: LedgerClient> Broadcaster<L> {
    pub fn new(ledger: L) -> Self {
        Self { ledger }
    }

    /// Submit signed bytes, returning the node's transaction hash
    pub fn submit(&self, signed: &[u8]) -> CardResult<TransactionResult> {
        let payload = format!("0x{}", hex::encode(signed));
        let outcome = self.ledger.send_raw_transaction(&payload)?;

        if let Some(error) = outcome.error {
            tracing::error!(code = error.code, message = %error.message, "transaction rejected by node");
            return Err(CardSignError::remote_transaction(error.message));
        }

        let transaction_hash = outcome
            .transaction_hash
            .ok_or_else(|| CardSignError::network("no transaction hash in response"))?;

        tracing::info!(tx_hash = %redact_hash(&transaction_hash), "transaction accepted");
        Ok(TransactionResult { transaction_hash })
    }
}
