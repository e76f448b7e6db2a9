//! Unified error types for the card signer
//!
//! Every failure in the signing and ledger pipeline is one of the
//! variants below, so callers can tell a bad card response apart from
//! a node rejection without string matching.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for all card signer operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardSignError {
    /// The DER signature returned by the card could not be parsed
    #[error("malformed DER signature: {0}")]
    Decoding(String),

    /// None of the four recovery ids reproduced the expected signer
    #[error("no recovery id recovers the expected signer")]
    RecoveryExhausted,

    /// The hardware signer failed or was unavailable
    #[error("signer failure: {0}")]
    Signer(String),

    /// A remote ledger call failed or returned something unreadable
    #[error("ledger request failed: {0}")]
    Network(String),

    /// The node accepted the request but rejected the transaction
    #[error("transaction rejected: {0}")]
    RemoteTransaction(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CardSignError {
    // Convenience constructors
    pub fn decoding(msg: impl Into<String>) -> Self {
        Self::Decoding(msg.into())
    }

    pub fn signer(msg: impl Into<String>) -> Self {
        Self::Signer(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn remote_transaction(msg: impl Into<String>) -> Self {
        Self::RemoteTransaction(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Flat category for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Decoding(_) => ErrorCode::DecodingError,
            Self::RecoveryExhausted => ErrorCode::RecoveryExhausted,
            Self::Signer(_) => ErrorCode::SignerError,
            Self::Network(_) => ErrorCode::NetworkError,
            Self::RemoteTransaction(_) => ErrorCode::RemoteTransactionError,
            Self::InvalidInput(_) => ErrorCode::InvalidInput,
            Self::Config(_) => ErrorCode::ConfigError,
        }
    }

    /// Whether the current flow must be abandoned rather than retried by the caller
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::RecoveryExhausted | Self::Decoding(_))
    }

    /// Serializable form for callers that report errors as JSON
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Signature errors
    DecodingError,
    RecoveryExhausted,
    SignerError,

    // Ledger errors
    NetworkError,
    RemoteTransactionError,

    // Caller errors
    InvalidInput,
    ConfigError,
}

/// JSON-friendly error payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
}

/// Result type alias for card signer operations
pub type CardResult<T> = Result<T, CardSignError>;

// Conversions from common error types

impl From<serde_json::Error> for CardSignError {
    fn from(e: serde_json::Error) -> Self {
        CardSignError::Network(format!("invalid JSON-RPC payload: {}", e))
    }
}

impl From<hex::FromHexError> for CardSignError {
    fn from(e: hex::FromHexError) -> Self {
        CardSignError::InvalidInput(format!("invalid hex: {}", e))
    }
}

impl From<url::ParseError> for CardSignError {
    fn from(e: url::ParseError) -> Self {
        CardSignError::Config(format!("invalid RPC URL: {}", e))
    }
}

impl From<reqwest::Error> for CardSignError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CardSignError::Network("request timed out".to_string())
        } else if e.is_connect() {
            CardSignError::Network("connection failed".to_string())
        } else {
            CardSignError::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = CardSignError::remote_transaction("nonce too low");

        let json = serde_json::to_string(&err.to_report()).unwrap();
        assert!(json.contains("remote_transaction_error"));
        assert!(json.contains("nonce too low"));
    }

    #[test]
    fn test_fatal_kinds() {
        assert!(CardSignError::RecoveryExhausted.is_fatal());
        assert!(CardSignError::decoding("truncated").is_fatal());
        assert!(!CardSignError::network("timeout").is_fatal());
        assert!(!CardSignError::signer("card removed").is_fatal());
    }

    #[test]
    fn test_hex_error_is_input_error() {
        let err: CardSignError = hex::decode("zz").unwrap_err().into();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
    }
}
