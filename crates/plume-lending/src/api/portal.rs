//! Portal balance API client
//!
//! `GET {base}/wallet-balance?walletAddress=<address>` over reqwest.

use async_trait::async_trait;
use plume_common::{PlumeError, Result};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, instrument};

use super::TokenApi;
use crate::DEFAULT_PORTAL_API_URL;

/// HTTP client for the portal's balance-indexing API
#[derive(Debug, Clone)]
pub struct PortalApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl PortalApiClient {
    /// Create a client for an API base such as `https://portal-api.plume.org/api/v1`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PlumeError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn wallet_balance_url(&self) -> String {
        format!("{}/wallet-balance", self.base_url)
    }
}

impl Default for PortalApiClient {
    fn default() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_PORTAL_API_URL.to_string(),
        }
    }
}

#[async_trait]
impl TokenApi for PortalApiClient {
    #[instrument(skip(self))]
    async fn wallet_balance_raw(&self, wallet: &str) -> Result<Value> {
        let url = self.wallet_balance_url();
        debug!(%url, "Fetching wallet balance");

        let response = self
            .http
            .get(&url)
            .query(&[("walletAddress", wallet)])
            .send()
            .await
            .map_err(|e| {
                error!("Failed to fetch tokens: {}", e);
                PlumeError::Network(format!("wallet-balance request failed: {}", e))
            })?;

        let response = response.error_for_status().map_err(|e| {
            error!("Failed to fetch tokens: {}", e);
            PlumeError::Network(format!("wallet-balance returned error status: {}", e))
        })?;

        response.json::<Value>().await.map_err(|e| {
            PlumeError::Serialization(format!("wallet-balance body is not JSON: {}", e))
        })
    }
}
