//! Signer Configuration
//!
//! Endpoint, chain id, key slot and the card's public key. These are
//! passed explicitly into the assembler and the balance query; nothing
//! here is process-wide state.
//!
//! Endpoint validation:
//! - URL format validation
//! - HTTPS required except for local development hosts

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::crypto::recovery::{parse_public_key, ExpectedSigner};
use crate::error::{CardResult, CardSignError};
use crate::tx::SigningSettings;

/// Environment variable prefix used by [`SignerConfig::from_env`]
pub const ENV_PREFIX: &str = "CARD_SIGNER_";

const DEFAULT_KEY_SLOT: u8 = 1;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_key_slot() -> u8 {
    DEFAULT_KEY_SLOT
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Runtime configuration for one signer/ledger pairing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerConfig {
    /// JSON-RPC endpoint of the node
    pub rpc_url: String,
    /// EIP-155 chain id
    pub chain_id: u64,
    /// Key slot on the card
    #[serde(default = "default_key_slot")]
    pub key_slot: u8,
    /// Hex public key of the card's key; required for signing only
    #[serde(default)]
    pub signer_public_key: Option<String>,
    /// Per-request timeout for ledger calls
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl SignerConfig {
    pub fn new(rpc_url: impl Into<String>, chain_id: u64) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            chain_id,
            key_slot: DEFAULT_KEY_SLOT,
            signer_public_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_public_key(mut self, public_key_hex: impl Into<String>) -> Self {
        self.signer_public_key = Some(public_key_hex.into());
        self
    }

    pub fn with_key_slot(mut self, key_slot: u8) -> Self {
        self.key_slot = key_slot;
        self
    }

    /// Load from a JSON document and validate
    pub fn from_json(json: &str) -> CardResult<Self> {
        let config: SignerConfig = serde_json::from_str(json)
            .map_err(|e| CardSignError::config(format!("invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `CARD_SIGNER_*` environment variables and validate
    pub fn from_env() -> CardResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CardResult<Self> {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        let rpc_url = var("RPC_URL")
            .ok_or_else(|| CardSignError::config(format!("{}RPC_URL is not set", ENV_PREFIX)))?;
        let chain_id = var("CHAIN_ID")
            .ok_or_else(|| CardSignError::config(format!("{}CHAIN_ID is not set", ENV_PREFIX)))?;

        let config = SignerConfig {
            rpc_url,
            chain_id: parse_number(&chain_id, "CHAIN_ID")?,
            key_slot: var("KEY_SLOT")
                .map(|v| parse_number(&v, "KEY_SLOT"))
                .transpose()?
                .unwrap_or(DEFAULT_KEY_SLOT),
            signer_public_key: var("PUBLIC_KEY"),
            timeout_secs: var("TIMEOUT_SECS")
                .map(|v| parse_number(&v, "TIMEOUT_SECS"))
                .transpose()?
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CardResult<()> {
        if self.chain_id == 0 {
            return Err(CardSignError::config("chain id must be non-zero"));
        }
        if self.timeout_secs == 0 {
            return Err(CardSignError::config("timeout must be non-zero"));
        }
        self.rpc_url()?;
        if let Some(key) = &self.signer_public_key {
            parse_public_key(key)
                .map_err(|e| CardSignError::config(format!("signer public key: {}", e)))?;
        }
        Ok(())
    }

    /// Parsed and validated RPC endpoint
    pub fn rpc_url(&self) -> CardResult<Url> {
        validate_endpoint(&self.rpc_url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn expected_signer(&self) -> CardResult<ExpectedSigner> {
        let key = self
            .signer_public_key
            .as_deref()
            .ok_or_else(|| CardSignError::config("signer public key is required for signing"))?;
        Ok(ExpectedSigner::PublicKey(parse_public_key(key)?))
    }

    /// Settings the assembler needs to sign for this configuration
    pub fn signing_settings(&self) -> CardResult<SigningSettings> {
        Ok(SigningSettings {
            chain_id: self.chain_id,
            key_slot: self.key_slot,
            expected_signer: self.expected_signer()?,
        })
    }
}

/// Validate an RPC endpoint URL
pub fn validate_endpoint(url: &str) -> CardResult<Url> {
    let parsed = Url::parse(url)?;

    match parsed.scheme() {
        "https" => {}
        "http" => {
            // Allow HTTP only for localhost/development
            let host = parsed.host_str().unwrap_or_default();
            if !is_local_host(host) {
                return Err(CardSignError::config(format!(
                    "HTTPS required for remote endpoint {}",
                    host
                )));
            }
        }
        other => {
            return Err(CardSignError::config(format!("unsupported URL scheme: {}", other)));
        }
    }

    if parsed.host_str().is_none() {
        return Err(CardSignError::config("RPC URL has no host"));
    }

    Ok(parsed)
}

fn is_local_host(host: &str) -> bool {
    host == "localhost" || host == "127.0.0.1" || host == "[::1]" || host.starts_with("192.168.")
}

fn parse_number<T: std::str::FromStr>(value: &str, name: &str) -> CardResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CardSignError::config(format!("{}{} is not a number: {}", ENV_PREFIX, name, value)))
}
