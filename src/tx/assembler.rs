//! Transaction Assembler
//!
//! Drives one send end to end: nonce, signing hash, card signature,
//! DER → canonical → recovery id, codec, and finally the broadcaster.
//! Every stage blocks on the one before it.

use ethers_core::types::{Address, U256};

use super::broadcaster::Broadcaster;
use super::codec::{LegacyEip155Codec, TransactionCodec};
use super::replay_protection::{eip155_v, legacy_v};
use crate::crypto::{canonicalize, extract_components, resolve_recovery_id, ExpectedSigner};
use crate::error::{CardResult, CardSignError};
use crate::ledger::LedgerClient;
use crate::signer::CardSigner;
use crate::types::{
    BlockSelector, RawTransaction, RecoveryId, SignatureTuple, SignedTransaction, TransactionResult,
    TransferRequest,
};
use crate::utils::crypto::keccak256;
use crate::utils::logging::{redact_address, redact_hash};

/// Chain and key parameters for signing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigningSettings {
    pub chain_id: u64,
    pub key_slot: u8,
    /// Key the card is expected to sign with
    pub expected_signer: ExpectedSigner,
}

impl SigningSettings {
    /// Reject chain ids that cannot be folded into an EIP-155 `v`
    pub fn validate(&self) -> CardResult<()> {
        if self.chain_id == 0 {
            return Err(CardSignError::config("chain id must be non-zero"));
        }
        eip155_v(RecoveryId::new(RecoveryId::MAX)?, self.chain_id)
            .map_err(|e| CardSignError::config(e.to_string()))?;
        Ok(())
    }
}

/// Builds, signs and encodes transactions through a hardware signer
pub struct TransactionAssembler<L, S, C = LegacyEip155Codec> {
    ledger: L,
    signer: S,
    codec: C,
    settings: SigningSettings,
}

impl<L, S> TransactionAssembler<L, S>
where
    L: LedgerClient,
    S: CardSigner,
{
    pub fn new(ledger: L, signer: S, settings: SigningSettings) -> CardResult<Self> {
        Self::with_codec(ledger, signer, LegacyEip155Codec, settings)
    }
}

impl<L, S, C> TransactionAssembler<L, S, C>
where
    L: LedgerClient,
    S: CardSigner,
    C: TransactionCodec,
{
    pub fn with_codec(ledger: L, signer: S, codec: C, settings: SigningSettings) -> CardResult<Self> {
        settings.validate()?;
        Ok(Self {
            ledger,
            signer,
            codec,
            settings,
        })
    }

    pub fn settings(&self) -> &SigningSettings {
        &self.settings
    }

    /// Next nonce for `address`, counting transactions still in the mempool
    pub fn next_nonce(&self, address: Address) -> CardResult<U256> {
        let nonce = self.ledger.get_transaction_count(address, BlockSelector::Pending)?;
        tracing::debug!(address = %redact_address(&address), %nonce, "next nonce");
        Ok(nonce)
    }

    /// Unsigned transaction for `request` with a freshly fetched nonce
    pub fn build_transaction(&self, request: &TransferRequest) -> CardResult<RawTransaction> {
        let nonce = self.next_nonce(request.from)?;
        Ok(RawTransaction::new(
            nonce,
            request.gas_price,
            request.gas_limit,
            request.to,
            request.value,
            request.data.clone(),
        ))
    }

    /// Sign `tx` on the card and encode it for broadcast
    pub fn sign_and_encode(&self, tx: &RawTransaction) -> CardResult<SignedTransaction> {
        let chain_id = self.settings.chain_id;

        let unsigned = self.codec.encode_unsigned(tx, chain_id)?;
        let hash = keccak256(&unsigned);

        let der = self.signer.sign(self.settings.key_slot, &hash)?;
        tracing::debug!(der = %hex::encode(&der), "card signature");

        let components = extract_components(&der)?;
        tracing::debug!(r = %hex::encode(&components.r), s = %hex::encode(&components.s), "extracted signature");

        let components = canonicalize(components)?;
        tracing::debug!(s = %hex::encode(&components.s), "canonical s");

        let recovery_id = resolve_recovery_id(&components, &hash, &self.settings.expected_signer)?;
        let signature = SignatureTuple {
            v: legacy_v(recovery_id),
            r: components.r,
            s: components.s,
        };
        tracing::debug!(v = signature.v, chain_id, "recovered v");

        let raw = self.codec.encode_signed(tx, &signature, chain_id)?;
        let signed = SignedTransaction {
            hash: keccak256(&raw),
            raw,
            signature,
        };
        tracing::debug!(raw = %signed.raw_hex(), "signed transaction");

        Ok(signed)
    }

    /// Fetch the nonce, sign on the card and submit
    pub fn send_transaction(&self, request: &TransferRequest) -> CardResult<TransactionResult> {
        let tx = self.build_transaction(request)?;
        let signed = self.sign_and_encode(&tx)?;

        tracing::info!(
            from = %redact_address(&request.from),
            tx_hash = %redact_hash(&signed.hash_hex()),
            "submitting card-signed transaction"
        );
        Broadcaster::new(&self.ledger).submit(&signed.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{encode_der, public_key_to_address};
    use crate::ledger::SendOutcome;
    use crate::signer::SignerFailure;
    use crate::types::SignatureComponents;
    use crate::tx::chain_ids;
    use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
    use std::cell::Cell;

    struct FixedNonceLedger {
        nonce: u64,
        count_calls: Cell<u32>,
    }

    impl LedgerClient for FixedNonceLedger {
        fn get_balance(&self, _address: Address, _block: BlockSelector) -> CardResult<Option<U256>> {
            Ok(None)
        }

        fn get_transaction_count(&self, _address: Address, block: BlockSelector) -> CardResult<U256> {
            assert_eq!(block, BlockSelector::Pending);
            self.count_calls.set(self.count_calls.get() + 1);
            Ok(U256::from(self.nonce))
        }

        fn send_raw_transaction(&self, _signed_hex: &str) -> CardResult<SendOutcome> {
            Ok(SendOutcome {
                transaction_hash: Some("0xabc".into()),
                error: None,
            })
        }
    }

    /// Software stand-in for the card that emits high-S DER signatures
    struct HighSCard {
        secret: SecretKey,
    }

    impl CardSigner for HighSCard {
        fn sign(&self, _key_slot: u8, hash: &[u8; 32]) -> Result<Vec<u8>, SignerFailure> {
            let secp = Secp256k1::new();
            let sig = secp.sign_ecdsa(&Message::from_digest(*hash), &self.secret);
            let compact = sig.serialize_compact();
            let s = crate::crypto::CURVE_ORDER - U256::from_big_endian(&compact[32..]);
            let components = SignatureComponents::new(
                compact[..32].to_vec(),
                crate::crypto::canonical::to_trimmed_bytes(s),
            );
            Ok(encode_der(&components).unwrap())
        }
    }

    struct RemovedCard;

    impl CardSigner for RemovedCard {
        fn sign(&self, _key_slot: u8, _hash: &[u8; 32]) -> Result<Vec<u8>, SignerFailure> {
            Err(SignerFailure::Cancelled)
        }
    }

    fn fixture() -> (SecretKey, SigningSettings) {
        let secret = SecretKey::from_slice(&[0x42; 32]).unwrap();
        let public = PublicKey::from_secret_key(&Secp256k1::new(), &secret);
        let settings = SigningSettings {
            chain_id: chain_ids::ROPSTEN,
            key_slot: 1,
            expected_signer: ExpectedSigner::PublicKey(public),
        };
        (secret, settings)
    }

    fn request(from: Address) -> TransferRequest {
        TransferRequest {
            from,
            to: Address::repeat_byte(0x11),
            value: U256::from(1_000u64),
            gas_price: U256::from(1_000_000_000u64),
            gas_limit: U256::from(21_000u64),
            data: Default::default(),
        }
    }

    #[test]
    fn test_high_s_card_output_is_canonicalized() {
        let (secret, settings) = fixture();
        let ledger = FixedNonceLedger { nonce: 7, count_calls: Cell::new(0) };
        let assembler = TransactionAssembler::new(&ledger, HighSCard { secret }, settings).unwrap();

        let from = settings.expected_signer.address();
        let tx = assembler.build_transaction(&request(from)).unwrap();
        assert_eq!(tx.nonce, U256::from(7));

        let signed = assembler.sign_and_encode(&tx).unwrap();
        assert!(crate::crypto::is_canonical(U256::from_big_endian(&signed.signature.s)));
        assert!(signed.signature.v == 27 || signed.signature.v == 28);
        assert_eq!(signed.hash, keccak256(&signed.raw));
    }

    #[test]
    fn test_send_transaction_fetches_nonce_once() {
        let (secret, settings) = fixture();
        let ledger = FixedNonceLedger { nonce: 0, count_calls: Cell::new(0) };
        let assembler = TransactionAssembler::new(&ledger, HighSCard { secret }, settings).unwrap();

        let public = match settings.expected_signer {
            ExpectedSigner::PublicKey(key) => key,
            ExpectedSigner::Address(_) => unreachable!(),
        };
        let result = assembler.send_transaction(&request(public_key_to_address(&public))).unwrap();
        assert_eq!(result.transaction_hash, "0xabc");
        assert_eq!(ledger.count_calls.get(), 1);
    }

    #[test]
    fn test_signer_failure_surfaces() {
        let (_, settings) = fixture();
        let ledger = FixedNonceLedger { nonce: 0, count_calls: Cell::new(0) };
        let assembler = TransactionAssembler::new(&ledger, RemovedCard, settings).unwrap();

        let tx = RawTransaction::new(
            U256::zero(),
            U256::one(),
            U256::from(21_000u64),
            Address::zero(),
            U256::zero(),
            Vec::new(),
        );
        let err = assembler.sign_and_encode(&tx).unwrap_err();
        assert!(matches!(err, CardSignError::Signer(_)));
    }

    #[test]
    fn test_zero_chain_id_rejected() {
        let (secret, mut settings) = fixture();
        settings.chain_id = 0;
        let ledger = FixedNonceLedger { nonce: 0, count_calls: Cell::new(0) };

        let err = TransactionAssembler::new(&ledger, HighSCard { secret }, settings).err();
        assert!(matches!(err, Some(CardSignError::Config(_))));
    }

    #[test]
    fn test_oversized_chain_id_rejected() {
        let (secret, mut settings) = fixture();
        settings.chain_id = u64::MAX / 2;
        let ledger = FixedNonceLedger { nonce: 0, count_calls: Cell::new(0) };

        assert!(TransactionAssembler::new(&ledger, HighSCard { secret }, settings).is_err());
    }

    #[test]
    fn test_wrong_card_key_is_fatal() {
        let (_, settings) = fixture();
        let other = SecretKey::from_slice(&[0x43; 32]).unwrap();
        let ledger = FixedNonceLedger { nonce: 0, count_calls: Cell::new(0) };
        let assembler = TransactionAssembler::new(&ledger, HighSCard { secret: other }, settings).unwrap();

        let tx = RawTransaction::new(
            U256::zero(),
            U256::one(),
            U256::from(21_000u64),
            Address::zero(),
            U256::zero(),
            Vec::new(),
        );
        assert_eq!(
            assembler.sign_and_encode(&tx).unwrap_err(),
            CardSignError::RecoveryExhausted
        );
    }
}
