//! Error types for the lending dashboard
//!
//! Provides a unified error type and domain-specific error variants

use thiserror::Error;

/// Result type alias using PlumeError
pub type Result<T> = std::result::Result<T, PlumeError>;

/// Unified error type for dashboard operations
#[derive(Debug, Error)]
pub enum PlumeError {
    // Chain / contract errors
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    // Loan flow errors
    #[error("Loan error: {0}")]
    Loan(#[from] LoanError),

    // Unit conversion errors
    #[error("Units error: {0}")]
    Units(#[from] UnitsError),

    // Cached balance errors
    #[error("Balance error: {0}")]
    Balance(#[from] crate::types::balance::BalanceError),

    // Network errors (balance API, RPC transport)
    #[error("Network error: {0}")]
    Network(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Contract call and transaction errors
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("ABI decode failed for {method}: {reason}")]
    AbiDecode { method: String, reason: String },

    #[error("Transaction reverted: {tx_hash}")]
    Reverted { tx_hash: String },

    #[error("Receipt not found for {tx_hash} after {waited_ms}ms")]
    ReceiptTimeout { tx_hash: String, waited_ms: u64 },

    #[error("Malformed RPC response: {0}")]
    MalformedResponse(String),
}

/// Loan request and repayment validation errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LoanError {
    #[error("Select asset first")]
    AssetNotSelected,

    #[error("Must be at least 1")]
    QuantityNotPositive,

    #[error("Max is {max}")]
    QuantityExceedsBalance { max: String },

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Unsupported loan duration: {days} days")]
    UnsupportedDuration { days: u64 },

    #[error("You must agree to the terms")]
    TermsNotAccepted,

    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("Loan not found: {loan_id}")]
    LoanNotFound { loan_id: String },

    #[error("Loan {loan_id} is not active")]
    LoanNotActive { loan_id: String },
}

/// Unit conversion errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UnitsError {
    #[error("Invalid decimal string: {0}")]
    InvalidNumber(String),

    #[error("Fractional component exceeds {decimals} decimals: {value}")]
    TooManyDecimals { value: String, decimals: u8 },

    #[error("Value overflows 256 bits: {0}")]
    Overflow(String),

    #[error("Value does not fit a decimal: {0}")]
    DecimalRange(String),
}

// Implement From for common external error types
impl From<serde_json::Error> for PlumeError {
    fn from(err: serde_json::Error) -> Self {
        PlumeError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for PlumeError {
    fn from(err: anyhow::Error) -> Self {
        PlumeError::Internal(err.to_string())
    }
}
