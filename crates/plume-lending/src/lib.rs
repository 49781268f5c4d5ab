//! # Plume Lending
//!
//! Borrower-side client for the Plume pawn contract.
//!
//! ## Layers
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        flows                             │
//! │  request_loan   repay_loan   load_loan_book   preview    │
//! │         │            │              │                    │
//! │  ┌──────┴────────────┴───┐   ┌──────┴───────┐            │
//! │  │   ensure_allowance    │   │  TokenApi    │            │
//! │  └──────────┬────────────┘   │ (holdings)   │            │
//! │  ┌──────────┴────────────┐   └──────────────┘            │
//! │  │   LendingContract     │  ABI bindings (sol!)          │
//! │  └──────────┬────────────┘                               │
//! │  ┌──────────┴────────────┐                               │
//! │  │     ChainClient       │  JSON-RPC node / signer       │
//! │  └───────────────────────┘                               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The wallet node and the balance-indexing API are external capability
//! providers behind the [`ChainClient`] and [`TokenApi`] traits.

pub mod api;
pub mod chain;
pub mod deploy;
pub mod flows;

pub use api::{
    fetch_holdings, fetch_holdings_or_empty, filter_holdings, portal::PortalApiClient, TokenApi,
    WalletBalanceResponse,
};
pub use chain::{
    bindings::LendingContract, rpc::JsonRpcClient, ChainClient, TransactionReceipt, WalletAccount,
};
pub use deploy::DeploymentModule;
pub use flows::{
    allowance::{ensure_allowance, AllowanceOutcome},
    listing::{build_loan_views, load_loan_book, load_loan_book_with, LoanBook, LoanView},
    repay::{find_active_loan, repay_loan, submit_repayment, RepaymentOutcome},
    request::{
        request_loan, submit_loan_request, validate_quantity, LoanRequest, LoanRequestForm,
        LoanRequestOutcome,
    },
};

/// Default balance-indexing API base (the portal's `/api/v1`)
pub const DEFAULT_PORTAL_API_URL: &str = "https://portal-api.plume.org/api/v1";

/// Default interval between receipt polls in milliseconds
pub const DEFAULT_RECEIPT_POLL_MS: u64 = 1_000;

/// Default time to wait for a receipt in milliseconds
pub const DEFAULT_RECEIPT_TIMEOUT_MS: u64 = 120_000;
