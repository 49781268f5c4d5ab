//! Dashboard configuration

use alloy_primitives::Address;
use anyhow::{anyhow, Context, Result};
use plume_common::PLUME_MAINNET;
use plume_lending::{DEFAULT_PORTAL_API_URL, DEFAULT_RECEIPT_POLL_MS, DEFAULT_RECEIPT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Dashboard service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Service host
    pub host: String,
    /// Service port
    pub port: u16,
    /// Contract addresses
    pub contracts: ContractSettings,
    /// Node and receipt settings
    pub chain: ChainSettings,
    /// Balance-indexing API base URL
    pub portal_api_url: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            contracts: ContractSettings::default(),
            chain: ChainSettings::default(),
            portal_api_url: DEFAULT_PORTAL_API_URL.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from `.env` and the process environment
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Self::default();

        // Platform PORT first, PLUME_PORT wins if both are set
        if let Some(port) = lookup("PORT").and_then(|p| p.parse::<u16>().ok()) {
            cfg.port = port;
        }
        if let Some(host) = lookup("PLUME_HOST") {
            cfg.host = host;
        }
        if let Some(port) = lookup("PLUME_PORT").and_then(|p| p.parse::<u16>().ok()) {
            cfg.port = port;
        }

        // Contract addresses, with the frontend's variable names as fallback
        cfg.contracts.lending_contract =
            lookup("PLUME_LENDING_CONTRACT").or_else(|| lookup("VITE_PLUME_PAWN_CONTRACT"));
        cfg.contracts.repayment_token =
            lookup("PLUME_REPAYMENT_TOKEN").or_else(|| lookup("VITE_TOKEN_CONTRACT"));

        // Chain settings
        if let Some(url) = lookup("PLUME_RPC_URL") {
            cfg.chain.rpc_url = url;
        }
        if let Some(v) = lookup("PLUME_RECEIPT_POLL_MS").and_then(|v| v.parse().ok()) {
            cfg.chain.receipt_poll_ms = v;
        }
        if let Some(v) = lookup("PLUME_RECEIPT_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            cfg.chain.receipt_timeout_ms = v;
        }

        if let Some(url) = lookup("PLUME_PORTAL_API_URL") {
            cfg.portal_api_url = url;
        }

        Ok(cfg)
    }

    /// Parsed `(lending contract, repayment token)`; both are required
    pub fn contract_addresses(&self) -> Result<(Address, Address)> {
        let lending =
            parse_required("lending contract", self.contracts.lending_contract.as_deref())?;
        let token = parse_required("repayment token", self.contracts.repayment_token.as_deref())?;
        Ok((lending, token))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_required(name: &str, value: Option<&str>) -> Result<Address> {
    let value = value.ok_or_else(|| anyhow!("{} address is not configured", name))?;
    Address::from_str(value.trim()).with_context(|| format!("Invalid {} address: {}", name, value))
}

/// On-chain contract addresses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractSettings {
    /// Pawn contract (loan book, allowance spender)
    pub lending_contract: Option<String>,
    /// Token loans are disbursed and repaid in
    pub repayment_token: Option<String>,
}

/// Node settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSettings {
    /// JSON-RPC endpoint; must be able to sign for the borrower
    pub rpc_url: String,
    /// Interval between receipt polls
    pub receipt_poll_ms: u64,
    /// Give up waiting for a receipt after this long
    pub receipt_timeout_ms: u64,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            rpc_url: PLUME_MAINNET.rpc.clone(),
            receipt_poll_ms: DEFAULT_RECEIPT_POLL_MS,
            receipt_timeout_ms: DEFAULT_RECEIPT_TIMEOUT_MS,
        }
    }
}
