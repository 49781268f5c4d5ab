//! Wallet balance state - cached repayment-token balance
//!
//! The dashboard shows the connected wallet's pUSD balance and adjusts it
//! optimistically after a loan is requested or repaid, before the chain is
//! read again. The cache is an explicit state object rather than a global:
//! - Every mutation bumps `version`
//! - Writers holding a stale snapshot are rejected with `VersionConflict`
//! - `None` until the first read from chain completes

use alloy_primitives::Address;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Balance state errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BalanceError {
    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Version conflict: expected {expected}, found {found}")]
    VersionConflict { expected: u64, found: u64 },

    #[error("Balance tracked for {tracked}, not {requested}")]
    WalletMismatch { tracked: Address, requested: Address },
}

/// Point-in-time view of the cached balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    /// Wallet whose balance is tracked
    pub wallet: Option<Address>,
    /// Cached pUSD balance, `None` until loaded
    pub balance: Option<Decimal>,
    /// True while a chain read is outstanding
    pub loading: bool,
    /// Monotonic version, bumped on every change
    pub version: u64,
    /// Timestamp of last modification (Unix milliseconds)
    pub updated_at: i64,
}

impl BalanceSnapshot {
    fn empty() -> Self {
        Self {
            wallet: None,
            balance: None,
            loading: true,
            version: 0,
            updated_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Shared, versioned balance cache
#[derive(Debug)]
pub struct WalletBalanceState {
    inner: RwLock<BalanceSnapshot>,
}

impl Default for WalletBalanceState {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletBalanceState {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BalanceSnapshot::empty()),
        }
    }

    /// Current state
    pub fn snapshot(&self) -> BalanceSnapshot {
        self.inner.read().clone()
    }

    /// Cached balance for `wallet`, if that wallet is the one tracked
    pub fn balance_for(&self, wallet: Address) -> Option<Decimal> {
        let guard = self.inner.read();
        match guard.wallet {
            Some(tracked) if tracked == wallet => guard.balance,
            _ => None,
        }
    }

    /// Mark a chain read as outstanding
    pub fn set_loading(&self, loading: bool) {
        let mut guard = self.inner.write();
        guard.loading = loading;
        touch(&mut guard);
    }

    /// Replace the balance with a value read from chain
    ///
    /// Switching to another wallet discards the previous wallet's balance.
    pub fn set(&self, wallet: Address, balance: Decimal) -> u64 {
        let mut guard = self.inner.write();
        guard.wallet = Some(wallet);
        guard.balance = Some(balance);
        guard.loading = false;
        touch(&mut guard);
        debug!(%wallet, %balance, version = guard.version, "Balance set");
        guard.version
    }

    /// Replace the balance only if nothing changed since `expected`
    pub fn set_if_version(
        &self,
        wallet: Address,
        balance: Decimal,
        expected: u64,
    ) -> Result<u64, BalanceError> {
        let mut guard = self.inner.write();
        if guard.version != expected {
            return Err(BalanceError::VersionConflict {
                expected,
                found: guard.version,
            });
        }
        guard.wallet = Some(wallet);
        guard.balance = Some(balance);
        guard.loading = false;
        touch(&mut guard);
        Ok(guard.version)
    }

    /// Optimistic increase after a loan is disbursed
    pub fn credit(&self, wallet: Address, amount: Decimal) -> Result<u64, BalanceError> {
        self.adjust(wallet, amount, true)
    }

    /// Optimistic decrease after a repayment
    pub fn debit(&self, wallet: Address, amount: Decimal) -> Result<u64, BalanceError> {
        self.adjust(wallet, amount, false)
    }

    fn adjust(
        &self,
        wallet: Address,
        amount: Decimal,
        increase: bool,
    ) -> Result<u64, BalanceError> {
        if amount <= Decimal::ZERO {
            return Err(BalanceError::InvalidAmount);
        }

        let mut guard = self.inner.write();
        let tracked_wallet = guard.wallet;
        match tracked_wallet {
            Some(tracked) if tracked != wallet => {
                return Err(BalanceError::WalletMismatch {
                    tracked,
                    requested: wallet,
                });
            }
            Some(_) => {}
            None => guard.wallet = Some(wallet),
        }

        // An unloaded balance counts as zero
        let current = guard.balance.unwrap_or(Decimal::ZERO);
        guard.balance = Some(if increase { current + amount } else { current - amount });
        touch(&mut guard);
        debug!(%wallet, %amount, increase, version = guard.version, "Balance adjusted");
        Ok(guard.version)
    }

    /// Check a snapshot version against the current one
    pub fn check_version(&self, expected: u64) -> Result<(), BalanceError> {
        let found = self.inner.read().version;
        if found != expected {
            return Err(BalanceError::VersionConflict { expected, found });
        }
        Ok(())
    }
}

fn touch(snapshot: &mut BalanceSnapshot) {
    snapshot.version += 1;
    snapshot.updated_at = chrono::Utc::now().timestamp_millis();
}
