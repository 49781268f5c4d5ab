//! Target network description

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Native currency of a chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Static description of an EVM network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// EIP-155 chain id
    pub id: u64,
    /// Display name
    pub name: String,
    /// Default JSON-RPC endpoint
    pub rpc: String,
    /// Native gas currency
    pub native_currency: NativeCurrency,
    /// Block explorer base URL
    pub explorer_url: String,
}

lazy_static! {
    /// Plume mainnet
    pub static ref PLUME_MAINNET: ChainConfig = ChainConfig {
        id: 98866,
        name: "Plume".to_string(),
        rpc: "https://rpc.plume.org".to_string(),
        native_currency: NativeCurrency {
            name: "PLUME".to_string(),
            symbol: "$PLUME".to_string(),
            decimals: 18,
        },
        explorer_url: "https://explorer.plume.org".to_string(),
    };
}
