//! Loan - on-chain loan record
//!
//! The lending contract is the source of truth. This is a read-only projection
//! of the 10-field tuple returned by `getLoansByUser`; the dashboard never
//! creates or deletes loans locally.

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Loan status derived from the contract's two boolean flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanStatus {
    Active,
    Repaid,
    Overdue,
}

impl LoanStatus {
    /// Repaid wins over overdue
    pub fn from_flags(repaid: bool, overdue: bool) -> Self {
        if repaid {
            LoanStatus::Repaid
        } else if overdue {
            LoanStatus::Overdue
        } else {
            LoanStatus::Active
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "Active",
            LoanStatus::Repaid => "Repaid",
            LoanStatus::Overdue => "Overdue",
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, LoanStatus::Active)
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A loan as reported by the lending contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    /// Borrower wallet
    pub borrower: Address,

    /// Contract-assigned loan id
    pub loan_id: U256,

    /// ERC-20 token pledged as collateral
    pub collateral_token: Address,

    /// Collateral in the token's base units
    pub collateral_amount: U256,

    /// Principal in repayment-token base units
    pub amount: U256,

    /// Amount due at repayment (principal + fee), repayment-token base units
    pub repay_amount: U256,

    /// Fee component of `repay_amount`
    pub fee_amount: U256,

    /// Due date (Unix seconds)
    pub due_date: U256,

    pub repaid: bool,
    pub overdue: bool,
}

impl Loan {
    pub fn status(&self) -> LoanStatus {
        LoanStatus::from_flags(self.repaid, self.overdue)
    }

    /// Due date as a UTC timestamp, `None` if out of range
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        let secs: i64 = self.due_date.try_into().ok()?;
        DateTime::from_timestamp(secs, 0)
    }

    /// Due date rendered as a calendar date
    pub fn due_date_display(&self) -> String {
        self.due_at()
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}
