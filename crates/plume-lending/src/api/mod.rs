//! Token balance API
//!
//! The balance-indexing service returns every token a wallet holds, including
//! the native-currency placeholder and NFTs. Only priced ERC-20 positions are
//! usable as loan collateral, so the raw response is filtered into
//! [`RwaHolding`]s before anything else sees it.

pub mod portal;

use alloy_primitives::Address;
use async_trait::async_trait;
use plume_common::{PlumeError, Result, RwaHolding, DEFAULT_TOKEN_DECIMALS};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use tracing::{debug, instrument, warn};

/// Token standard accepted as collateral
pub const FUNGIBLE_TOKEN_TYPE: &str = "erc20";

/// Source of wallet token balances
#[async_trait]
pub trait TokenApi: Send + Sync {
    /// Raw `wallet-balance` JSON for a wallet
    async fn wallet_balance_raw(&self, wallet: &str) -> Result<Value>;

    /// Typed `wallet-balance` response
    async fn wallet_balance(&self, wallet: Address) -> Result<WalletBalanceResponse> {
        let raw = self.wallet_balance_raw(&wallet.to_string()).await?;
        serde_json::from_value(raw).map_err(|e| {
            PlumeError::Serialization(format!("Malformed wallet-balance response: {}", e))
        })
    }
}

/// `GET /wallet-balance` response body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalanceResponse {
    #[serde(default)]
    pub wallet_token_balance_info_arr: Vec<TokenBalanceInfo>,
}

/// One token position
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenBalanceInfo {
    #[serde(default)]
    pub token: Option<TokenInfo>,
    #[serde(default)]
    pub holdings: Option<TokenHoldings>,
}

/// Token metadata; numeric fields may arrive as strings or numbers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "priceUSD")]
    pub price_usd: Option<Value>,
    #[serde(default)]
    pub image_small_url: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub decimals: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHoldings {
    #[serde(default)]
    pub token_balance: Option<Value>,
}

impl TokenBalanceInfo {
    /// Convert to a holding, `None` for entries that cannot be collateral
    pub fn to_holding(&self) -> Option<RwaHolding> {
        let token = self.token.as_ref()?;

        let address = Address::from_str(token.address.as_deref()?.trim()).ok()?;
        if address == Address::ZERO {
            return None;
        }

        let price = token.price_usd.as_ref().and_then(value_to_decimal)?;
        if price.is_zero() {
            return None;
        }

        let quantity = self
            .holdings
            .as_ref()?
            .token_balance
            .as_ref()
            .and_then(value_to_decimal)?;

        if !token
            .token_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(FUNGIBLE_TOKEN_TYPE))
        {
            return None;
        }

        let decimals = token
            .decimals
            .as_ref()
            .and_then(value_to_u8)
            .unwrap_or(DEFAULT_TOKEN_DECIMALS);

        Some(RwaHolding::new(
            address,
            token.symbol.clone().unwrap_or_default(),
            token.name.clone().unwrap_or_default(),
            token.image_small_url.as_deref(),
            quantity,
            price,
            decimals,
        ))
    }
}

/// Keep priced ERC-20 positions, dropping the native placeholder and NFTs
pub fn filter_holdings(response: &WalletBalanceResponse) -> Vec<RwaHolding> {
    let holdings: Vec<RwaHolding> = response
        .wallet_token_balance_info_arr
        .iter()
        .filter_map(TokenBalanceInfo::to_holding)
        .collect();

    debug!(
        total = response.wallet_token_balance_info_arr.len(),
        kept = holdings.len(),
        "Filtered wallet holdings"
    );
    holdings
}

/// Fetch and filter holdings, propagating API failures
#[instrument(skip(api))]
pub async fn fetch_holdings(api: &dyn TokenApi, wallet: Address) -> Result<Vec<RwaHolding>> {
    let response = api.wallet_balance(wallet).await?;
    Ok(filter_holdings(&response))
}

/// Fetch and filter holdings, degrading to an empty list on failure
pub async fn fetch_holdings_or_empty(api: &dyn TokenApi, wallet: Address) -> Vec<RwaHolding> {
    match fetch_holdings(api, wallet).await {
        Ok(holdings) => holdings,
        Err(e) => {
            warn!(%wallet, error = %e, "Error fetching token holdings");
            Vec::new()
        }
    }
}

fn value_to_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn value_to_u8(value: &Value) -> Option<u8> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|d| u8::try_from(d).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
