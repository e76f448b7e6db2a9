//! Transaction Codec
//!
//! Byte layout of unsigned and signed transactions. The signer never
//! builds RLP itself; it goes through [`TransactionCodec`], and the
//! default [`LegacyEip155Codec`] delegates to `ethers-core`.

use ethers_core::types::{Signature, TransactionRequest, U256};

use super::replay_protection::eip155_v_from_legacy;
use crate::error::{CardResult, CardSignError};
use crate::types::{RawTransaction, SignatureTuple};

/// Encoding capability for the signing pipeline
pub trait TransactionCodec {
    /// Bytes whose keccak256 is the signing hash
    fn encode_unsigned(&self, tx: &RawTransaction, chain_id: u64) -> CardResult<Vec<u8>>;

    /// Broadcast-ready bytes; `signature.v` is the legacy `recovery_id + 27`
    fn encode_signed(
        &self,
        tx: &RawTransaction,
        signature: &SignatureTuple,
        chain_id: u64,
    ) -> CardResult<Vec<u8>>;
}

/// Legacy (type 0) transactions with EIP-155 replay protection
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyEip155Codec;

impl LegacyEip155Codec {
    fn request(tx: &RawTransaction, chain_id: u64) -> TransactionRequest {
        TransactionRequest::new()
            .nonce(tx.nonce)
            .gas_price(tx.gas_price)
            .gas(tx.gas_limit)
            .to(tx.to)
            .value(tx.value)
            .data(tx.data.clone())
            .chain_id(chain_id)
    }
}

impl TransactionCodec for LegacyEip155Codec {
    fn encode_unsigned(&self, tx: &RawTransaction, chain_id: u64) -> CardResult<Vec<u8>> {
        // With a chain id set this is rlp([nonce, gasPrice, gas, to, value, data, chainId, 0, 0])
        Ok(Self::request(tx, chain_id).rlp().to_vec())
    }

    fn encode_signed(
        &self,
        tx: &RawTransaction,
        signature: &SignatureTuple,
        chain_id: u64,
    ) -> CardResult<Vec<u8>> {
        if signature.r.len() > 32 || signature.s.len() > 32 {
            return Err(CardSignError::invalid_input("signature component wider than 32 bytes"));
        }

        let signature = Signature {
            r: U256::from_big_endian(&signature.r),
            s: U256::from_big_endian(&signature.s),
            v: eip155_v_from_legacy(signature.v, chain_id)?,
        };

        Ok(Self::request(tx, chain_id).rlp_signed(&signature).to_vec())
    }
}
