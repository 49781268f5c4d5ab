//! # Plume Common
//!
//! Shared types, errors, and unit codecs for the Plume RWA lending dashboard.
//!
//! ## Core Types
//!
//! - [`Loan`]: on-chain loan record as returned by `getLoansByUser`
//! - [`LoanStatus`]: Active / Repaid / Overdue derived from the contract flags
//! - [`RwaHolding`]: a real-world-asset token held by a wallet, priced in USD
//! - [`LoanDuration`] / [`LoanPreview`]: advisory loan terms shown before submission
//! - [`WalletBalanceState`]: versioned cache of the wallet's repayment-token balance
//! - [`ChainConfig`]: static description of the target network
//!
//! ## Units
//!
//! - [`units::parse_units`]: human decimal string to base units
//! - [`units::format_units`]: base units to a trimmed human decimal string

pub mod chain;
pub mod error;
pub mod notification;
pub mod types;
pub mod units;

// Re-export commonly used types at crate root
pub use chain::{ChainConfig, NativeCurrency, PLUME_MAINNET};
pub use error::{PlumeError, Result};
pub use notification::{Notification, NotificationKind};
pub use types::{
    balance::{BalanceError, BalanceSnapshot, WalletBalanceState},
    holding::RwaHolding,
    loan::{Loan, LoanStatus},
    preview::{LoanDuration, LoanPreview},
};

pub use alloy_primitives::{Address, B256, U256};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Decimals of the repayment token (pUSD)
pub const REPAYMENT_TOKEN_DECIMALS: u8 = 6;

/// Display suffix for repayment-token amounts
pub const REPAYMENT_TOKEN_SUFFIX: &str = "$pUSD";

/// Decimals assumed for a collateral token that is not in the wallet's holdings
pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;

/// Share of collateral value offered as principal in the loan preview (70%)
pub const LTV_PREVIEW_RATIO: rust_decimal::Decimal =
    rust_decimal::Decimal::from_parts(7, 0, 0, false, 1);

/// Image shown for tokens without a usable https image
pub const PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/40x40?text=RWA";

/// Seconds in a day, for loan durations
pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;
