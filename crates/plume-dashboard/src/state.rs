//! Shared application state

use alloy_primitives::Address;
use dashmap::DashMap;
use plume_common::{ChainConfig, RwaHolding, WalletBalanceState, PLUME_MAINNET};
use plume_lending::{fetch_holdings, LendingContract, TokenApi};
use std::sync::Arc;
use tracing::{debug, warn};

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub contract: LendingContract,
    pub api: Arc<dyn TokenApi>,
    pub balance: Arc<WalletBalanceState>,
    /// Last successfully fetched holdings per wallet
    pub holdings: Arc<DashMap<Address, Vec<RwaHolding>>>,
    pub chain: Arc<ChainConfig>,
}

impl AppState {
    pub fn new(contract: LendingContract, api: Arc<dyn TokenApi>) -> Self {
        Self {
            contract,
            api,
            balance: Arc::new(WalletBalanceState::new()),
            holdings: Arc::new(DashMap::new()),
            chain: Arc::new(PLUME_MAINNET.clone()),
        }
    }

    /// Fetch holdings and cache them; on failure fall back to the cache, then empty
    pub async fn refresh_holdings(&self, wallet: Address) -> Vec<RwaHolding> {
        match fetch_holdings(self.api.as_ref(), wallet).await {
            Ok(holdings) => {
                self.holdings.insert(wallet, holdings.clone());
                holdings
            }
            Err(e) => {
                warn!(%wallet, error = %e, "Error fetching token holdings");
                self.holdings
                    .get(&wallet)
                    .map(|cached| cached.value().clone())
                    .unwrap_or_default()
            }
        }
    }

    /// Holdings for a wallet, fetched only if not cached yet
    pub async fn holdings_for(&self, wallet: Address) -> Vec<RwaHolding> {
        if let Some(cached) = self.holdings.get(&wallet) {
            debug!(%wallet, "Using cached holdings");
            return cached.value().clone();
        }
        self.refresh_holdings(wallet).await
    }

    /// Drop cached holdings so the next lookup re-fetches them
    pub fn invalidate_holdings(&self, wallet: Address) {
        if self.holdings.remove(&wallet).is_some() {
            debug!(%wallet, "Holdings cache invalidated");
        }
    }

    /// One holding of a wallet by token address
    pub async fn holding(&self, wallet: Address, token: Address) -> Option<RwaHolding> {
        self.holdings_for(wallet)
            .await
            .into_iter()
            .find(|holding| holding.address == token)
    }
}
