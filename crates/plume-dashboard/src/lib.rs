//! # Plume Dashboard
//!
//! HTTP service for borrowers: wallet holdings, pUSD balance, loan preview,
//! loan requests and repayments against the Plume pawn contract.
//!
//! ## Routes
//!
//! | Method | Path | |
//! |---|---|---|
//! | GET | `/health` | liveness |
//! | GET | `/api/v1/version` | service version |
//! | GET | `/api/v1/chain` | network descriptor |
//! | GET | `/api/v1/ltv` | on-chain `LTV()` |
//! | GET | `/api/v1/wallets/:address/holdings` | collateral candidates |
//! | GET | `/api/v1/wallets/:address/balance` | pUSD balance, refreshed from chain |
//! | GET | `/api/v1/wallets/:address/loans` | active loans and history |
//! | POST | `/api/v1/loans/preview` | advisory loan terms |
//! | POST | `/api/v1/loans` | request a loan |
//! | POST | `/api/v1/loans/:loan_id/repay` | repay a loan |
//! | GET | `/api/plume-api/wallet-balance` | balance API passthrough |

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::DashboardConfig;
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;

/// Service name reported by `/api/v1/version`
pub const SERVICE_NAME: &str = "plume-dashboard";

/// Dashboard version
pub const DASHBOARD_VERSION: &str = env!("CARGO_PKG_VERSION");
