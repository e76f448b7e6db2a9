//! JSON-RPC Ledger Client
//!
//! Blocking HTTP client for `eth_getBalance`, `eth_getTransactionCount`
//! and `eth_sendRawTransaction`.

use std::time::Duration;

use ethers_core::types::{Address, U256};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{LedgerClient, NodeError, SendOutcome};
use crate::error::{CardResult, CardSignError};
use crate::types::BlockSelector;
use crate::utils::logging::redact_address;
use crate::utils::network_config::SignerConfig;

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: serde_json::Value,
    id: u32,
}

/// Envelope of a JSON-RPC 2.0 reply
#[derive(Debug, Deserialize)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<NodeError>,
}

/// Ledger client speaking JSON-RPC over HTTP
pub struct JsonRpcLedger {
    client: Client,
    rpc_url: Url,
}

impl std::fmt::Debug for JsonRpcLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcLedger")
            .field("rpc_url", &self.rpc_url.as_str())
            .finish()
    }
}

impl JsonRpcLedger {
    pub fn new(rpc_url: Url, timeout: Duration) -> CardResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent("card-eth-signer/0.1")
            .build()
            .map_err(|e| CardSignError::network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, rpc_url })
    }

    pub fn from_config(config: &SignerConfig) -> CardResult<Self> {
        Self::new(config.rpc_url()?, config.timeout())
    }

    fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> CardResult<RpcResponse<T>> {
        tracing::trace!(method, "json-rpc call");

        let response = self
            .client
            .post(self.rpc_url.clone())
            .json(&RpcRequest {
                jsonrpc: "2.0",
                method,
                params,
                id: 1,
            })
            .send()?;

        let status = response.status();
        let body = response.text()?;
        parse_response(status, &body)
    }
}

impl LedgerClient for JsonRpcLedger {
    fn get_balance(&self, address: Address, block: BlockSelector) -> CardResult<Option<U256>> {
        tracing::debug!(address = %redact_address(&address), %block, "eth_getBalance");
        let response = self.call::<String>(
            "eth_getBalance",
            serde_json::json!([format!("{:?}", address), block.as_tag()]),
        )?;
        decode_balance(response)
    }

    fn get_transaction_count(&self, address: Address, block: BlockSelector) -> CardResult<U256> {
        tracing::debug!(address = %redact_address(&address), %block, "eth_getTransactionCount");
        let response = self.call::<String>(
            "eth_getTransactionCount",
            serde_json::json!([format!("{:?}", address), block.as_tag()]),
        )?;
        decode_transaction_count(response)
    }

    fn send_raw_transaction(&self, signed_hex: &str) -> CardResult<SendOutcome> {
        let payload = if signed_hex.starts_with("0x") {
            signed_hex.to_string()
        } else {
            format!("0x{}", signed_hex)
        };

        let response = self.call::<String>("eth_sendRawTransaction", serde_json::json!([payload]))?;
        Ok(decode_send_outcome(response))
    }
}

// =============================================================================
// Response Decoding
// =============================================================================

/// Parse a reply body, attributing unreadable bodies to the HTTP status
pub fn parse_response<T: DeserializeOwned>(status: StatusCode, body: &str) -> CardResult<RpcResponse<T>> {
    match serde_json::from_str::<RpcResponse<T>>(body) {
        Ok(response) => Ok(response),
        Err(_) if !status.is_success() => Err(CardSignError::network(format!(
            "node returned HTTP {}",
            status
        ))),
        Err(e) => Err(e.into()),
    }
}

pub fn decode_balance(response: RpcResponse<String>) -> CardResult<Option<U256>> {
    if let Some(error) = response.error {
        return Err(CardSignError::network(error.message));
    }
    response.result.as_deref().map(parse_quantity).transpose()
}

pub fn decode_transaction_count(response: RpcResponse<String>) -> CardResult<U256> {
    if let Some(error) = response.error {
        return Err(CardSignError::network(error.message));
    }
    let count = response
        .result
        .ok_or_else(|| CardSignError::network("no transaction count in response"))?;
    parse_quantity(&count)
}

pub fn decode_send_outcome(response: RpcResponse<String>) -> SendOutcome {
    SendOutcome {
        transaction_hash: response.result,
        error: response.error,
    }
}

/// Decode a JSON-RPC hex quantity such as `0x1bc16d674ec80000`
pub fn parse_quantity(quantity: &str) -> CardResult<U256> {
    let digits = quantity
        .strip_prefix("0x")
        .ok_or_else(|| CardSignError::network(format!("quantity without 0x prefix: {}", quantity)))?;

    if digits.is_empty() || digits.len() > 64 {
        return Err(CardSignError::network(format!("invalid quantity: {}", quantity)));
    }

    U256::from_str_radix(digits, 16)
        .map_err(|_| CardSignError::network(format!("invalid quantity: {}", quantity)))
}
