//! RWA token holdings
//!
//! A holding is derived per request from the balance-indexing API and never
//! persisted. Prices are rounded to 3 decimal places for display and preview.

use alloy_primitives::Address;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::PLACEHOLDER_IMAGE_URL;

/// Decimal places kept for unit price and position value
pub const PRICE_DISPLAY_DP: u32 = 3;

/// A real-world-asset token held by a wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RwaHolding {
    /// Token contract address
    pub address: Address,

    /// Ticker symbol
    pub symbol: String,

    /// Full token name
    pub name: String,

    /// Image URL (https only, placeholder otherwise)
    pub image: String,

    /// Held quantity in whole tokens
    pub quantity: Decimal,

    /// USD price per token, 3 dp
    pub unit_price: Decimal,

    /// quantity × price, 3 dp
    pub value: Decimal,

    /// ERC-20 decimals
    pub decimals: u8,
}

impl RwaHolding {
    /// Build a holding from raw API values, applying display rounding
    pub fn new(
        address: Address,
        symbol: impl Into<String>,
        name: impl Into<String>,
        image: Option<&str>,
        quantity: Decimal,
        price_usd: Decimal,
        decimals: u8,
    ) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            name: name.into(),
            image: Self::display_image(image),
            quantity,
            unit_price: round_display(price_usd),
            value: round_display(quantity * price_usd),
            decimals,
        }
    }

    /// Only https images are shown
    pub fn display_image(image: Option<&str>) -> String {
        match image {
            Some(url) if url.starts_with("https") => url.to_string(),
            _ => PLACEHOLDER_IMAGE_URL.to_string(),
        }
    }

    /// A zero-value position cannot be pledged
    pub fn is_selectable(&self) -> bool {
        !self.value.is_zero()
    }

    /// Label used in asset pickers, e.g. `Gold Token (12.345$)`
    pub fn label(&self) -> String {
        format!("{} ({}$)", self.name, self.unit_price.normalize())
    }
}

fn round_display(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PRICE_DISPLAY_DP, RoundingStrategy::MidpointAwayFromZero)
}
