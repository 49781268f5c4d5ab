//! Loan terms preview
//!
//! Advisory figures shown before a loan request is submitted:
//!
//! ```text
//! principal = quantity × unit_price × 0.7
//! interest  = principal × rate / 100
//! total     = principal + interest
//! ```
//!
//! The lending contract is the authority on what it accepts; nothing here is
//! checked against the on-chain `LTV()`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LoanError;
use crate::{LTV_PREVIEW_RATIO, SECONDS_PER_DAY};

/// Offered loan durations with their flat interest tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum LoanDuration {
    /// 1 month, 6%
    Days30,
    /// 3 months, 9%
    Days90,
    /// 6 months, 12%
    Days180,
}

impl LoanDuration {
    pub const ALL: [LoanDuration; 3] = [
        LoanDuration::Days30,
        LoanDuration::Days90,
        LoanDuration::Days180,
    ];

    pub fn days(&self) -> u64 {
        match self {
            LoanDuration::Days30 => 30,
            LoanDuration::Days90 => 90,
            LoanDuration::Days180 => 180,
        }
    }

    /// Flat interest in percent of principal
    pub fn interest_rate(&self) -> Decimal {
        match self {
            LoanDuration::Days30 => Decimal::from(6),
            LoanDuration::Days90 => Decimal::from(9),
            LoanDuration::Days180 => Decimal::from(12),
        }
    }

    /// Duration passed to `requestLoan`
    pub fn as_seconds(&self) -> u64 {
        self.days() * SECONDS_PER_DAY
    }

    pub fn label(&self) -> String {
        let months = self.days() / 30;
        let unit = if months == 1 { "Month" } else { "Months" };
        format!("{} {} ({}%)", months, unit, self.interest_rate())
    }
}

impl Default for LoanDuration {
    fn default() -> Self {
        LoanDuration::Days30
    }
}

impl TryFrom<u64> for LoanDuration {
    type Error = LoanError;

    fn try_from(days: u64) -> Result<Self, Self::Error> {
        match days {
            30 => Ok(LoanDuration::Days30),
            90 => Ok(LoanDuration::Days90),
            180 => Ok(LoanDuration::Days180),
            other => Err(LoanError::UnsupportedDuration { days: other }),
        }
    }
}

impl From<LoanDuration> for u64 {
    fn from(duration: LoanDuration) -> Self {
        duration.days()
    }
}

impl std::str::FromStr for LoanDuration {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let days: u64 = s
            .trim()
            .parse()
            .map_err(|_| LoanError::UnsupportedDuration { days: 0 })?;
        LoanDuration::try_from(days)
    }
}

/// Advisory loan figures in pUSD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPreview {
    /// 70% of collateral value
    pub principal: Decimal,
    /// Flat interest for the duration
    pub interest: Decimal,
    /// principal + interest
    pub total: Decimal,
    /// Interest rate in percent
    pub rate: Decimal,
}

impl LoanPreview {
    /// `None` unless quantity is positive
    pub fn calculate(
        quantity: Decimal,
        unit_price: Decimal,
        duration: LoanDuration,
    ) -> Option<Self> {
        if quantity <= Decimal::ZERO {
            return None;
        }

        let principal = Self::principal(quantity, unit_price);
        let rate = duration.interest_rate();
        let interest = principal * rate / Decimal::ONE_HUNDRED;

        Some(Self {
            principal,
            interest,
            total: principal + interest,
            rate,
        })
    }

    /// Principal offered for a quantity, the form's auto-filled loan amount
    pub fn principal(quantity: Decimal, unit_price: Decimal) -> Decimal {
        quantity * unit_price * LTV_PREVIEW_RATIO
    }
}
