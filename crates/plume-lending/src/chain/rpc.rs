//! Ethereum JSON-RPC client
//!
//! Uses `eth_call`, `eth_sendTransaction` and `eth_getTransactionReceipt`.
//! Transactions are signed by the node or by an external signer exposing the
//! same endpoint; no key material is handled here.

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use plume_common::error::ChainError;
use plume_common::{PlumeError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{ChainClient, TransactionReceipt};
use crate::{DEFAULT_RECEIPT_POLL_MS, DEFAULT_RECEIPT_TIMEOUT_MS};

/// JSON-RPC response envelope
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Receipt fields we read, as returned by the node
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: String,
    #[serde(default)]
    block_number: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

impl RawReceipt {
    fn into_receipt(self) -> Result<TransactionReceipt> {
        let transaction_hash = B256::from_str(&self.transaction_hash)
            .map_err(|e| ChainError::MalformedResponse(format!("transactionHash: {}", e)))?;
        let block_number = self.block_number.as_deref().map(parse_quantity).transpose()?;
        // Pre-Byzantium receipts carry no status; treat as success
        let success = match self.status.as_deref() {
            Some(status) => parse_quantity(status)? == 1,
            None => true,
        };

        Ok(TransactionReceipt {
            transaction_hash,
            block_number,
            success,
        })
    }
}

/// Ethereum JSON-RPC client over HTTP
pub struct JsonRpcClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
    poll_interval: Duration,
    receipt_timeout: Duration,
}

impl JsonRpcClient {
    /// Create a client for a node URL
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PlumeError::Config(format!("Failed to create RPC HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
            poll_interval: Duration::from_millis(DEFAULT_RECEIPT_POLL_MS),
            receipt_timeout: Duration::from_millis(DEFAULT_RECEIPT_TIMEOUT_MS),
        })
    }

    /// Set the interval between receipt polls
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the overall receipt wait limit
    pub fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue a request whose result may legitimately be `null`
    async fn request_opt<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Option<T>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PlumeError::Network(format!("{} request failed: {}", method, e)))?
            .error_for_status()
            .map_err(|e| PlumeError::Network(format!("{} returned error status: {}", method, e)))?;

        let envelope: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| ChainError::MalformedResponse(format!("{}: {}", method, e)))?;

        parse_envelope(envelope)
    }

    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        self.request_opt(method, params)
            .await?
            .ok_or_else(|| {
                ChainError::MalformedResponse(format!("{}: missing result", method)).into()
            })
    }

    async fn get_receipt(&self, tx_hash: B256) -> Result<Option<TransactionReceipt>> {
        let raw: Option<RawReceipt> = self
            .request_opt("eth_getTransactionReceipt", json!([tx_hash.to_string()]))
            .await?;
        raw.map(RawReceipt::into_receipt).transpose()
    }
}

#[async_trait]
impl ChainClient for JsonRpcClient {
    #[instrument(skip(self, data))]
    async fn static_call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>> {
        let result: String = self
            .request(
                "eth_call",
                json!([{ "to": to.to_string(), "data": encode_hex(&data) }, "latest"]),
            )
            .await?;
        decode_hex(&result)
    }

    #[instrument(skip(self, data))]
    async fn send_transaction(&self, from: Address, to: Address, data: Vec<u8>) -> Result<B256> {
        let result: String = self
            .request(
                "eth_sendTransaction",
                json!([{
                    "from": from.to_string(),
                    "to": to.to_string(),
                    "data": encode_hex(&data),
                }]),
            )
            .await?;
        let tx_hash = B256::from_str(&result)
            .map_err(|e| ChainError::MalformedResponse(format!("eth_sendTransaction: {}", e)))?;
        debug!(%tx_hash, "Transaction submitted");
        Ok(tx_hash)
    }

    #[instrument(skip(self))]
    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt> {
        let poll = async {
            loop {
                if let Some(receipt) = self.get_receipt(tx_hash).await? {
                    return Ok::<_, PlumeError>(receipt);
                }
                tokio::time::sleep(self.poll_interval).await;
            }
        };

        match tokio::time::timeout(self.receipt_timeout, poll).await {
            Ok(result) => result,
            Err(_) => {
                warn!(%tx_hash, "Timed out waiting for receipt");
                Err(ChainError::ReceiptTimeout {
                    tx_hash: tx_hash.to_string(),
                    waited_ms: self.receipt_timeout.as_millis() as u64,
                }
                .into())
            }
        }
    }
}

fn parse_envelope<T>(envelope: RpcResponse<T>) -> Result<Option<T>> {
    if let Some(err) = envelope.error {
        return Err(ChainError::Rpc {
            code: err.code,
            message: err.message,
        }
        .into());
    }
    Ok(envelope.result)
}

fn encode_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

fn decode_hex(value: &str) -> Result<Vec<u8>> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(digits)
        .map_err(|e| ChainError::MalformedResponse(format!("hex data: {}", e)).into())
}

fn parse_quantity(value: &str) -> Result<u64> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    u64::from_str_radix(digits, 16)
        .map_err(|e| ChainError::MalformedResponse(format!("quantity {}: {}", value, e)).into())
}
