//! Loan repayment flow
//!
//! Same gate-then-submit shape as a loan request, but the allowance is on the
//! fixed repayment token and the amount is the contract-reported repay amount.

use alloy_primitives::U256;
use plume_common::error::LoanError;
use plume_common::units::to_decimal;
use plume_common::{Loan, Notification, Result, WalletBalanceState, REPAYMENT_TOKEN_DECIMALS};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use super::allowance::{ensure_allowance, AllowanceOutcome};
use crate::chain::{bindings::LendingContract, TransactionReceipt, WalletAccount};

/// Result of a confirmed repayment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepaymentOutcome {
    pub approval: AllowanceOutcome,
    pub receipt: TransactionReceipt,
    pub loan_id: U256,
    /// pUSD taken from the cached balance, zero when none was taken
    pub repaid: Decimal,
    pub notification: Notification,
}

/// Pick an active loan out of a borrower's loans
pub fn find_active_loan(loans: &[Loan], loan_id: U256) -> std::result::Result<&Loan, LoanError> {
    let loan = loans
        .iter()
        .find(|loan| loan.loan_id == loan_id)
        .ok_or_else(|| LoanError::LoanNotFound {
            loan_id: loan_id.to_string(),
        })?;

    if !loan.status().is_active() {
        return Err(LoanError::LoanNotActive {
            loan_id: loan_id.to_string(),
        });
    }
    Ok(loan)
}

/// Approve the repayment token if needed, repay, and debit the cached balance
#[instrument(skip(contract, balance))]
pub async fn repay_loan(
    contract: &LendingContract,
    balance: &WalletBalanceState,
    account: &WalletAccount,
    loan_id: U256,
    repay_amount: U256,
) -> Result<RepaymentOutcome> {
    let approval =
        ensure_allowance(contract, account, contract.repayment_token(), repay_amount).await?;
    let receipt = contract.repay_loan(account, loan_id).await?;

    let repaid = to_decimal(repay_amount, REPAYMENT_TOKEN_DECIMALS).unwrap_or_else(|e| {
        warn!(error = %e, "Repay amount does not fit the cached balance");
        Decimal::ZERO
    });
    if repaid > Decimal::ZERO {
        if let Err(e) = balance.debit(account.address, repaid) {
            warn!(error = %e, "Could not debit cached balance");
        }
    }

    info!(tx_hash = %receipt.transaction_hash, %loan_id, %repaid, "Loan repaid");
    let notification = Notification::success(
        "Loan repaid",
        format!("Transaction: {}", receipt.transaction_hash),
    );

    Ok(RepaymentOutcome {
        approval,
        receipt,
        loan_id,
        repaid,
        notification,
    })
}

/// Run [`repay_loan`] and report the outcome as a notification
pub async fn submit_repayment(
    contract: &LendingContract,
    balance: &WalletBalanceState,
    account: &WalletAccount,
    loan_id: U256,
    repay_amount: U256,
) -> Notification {
    match repay_loan(contract, balance, account, loan_id, repay_amount).await {
        Ok(outcome) => outcome.notification,
        Err(e) => {
            error!(%loan_id, error = %e, "Repayment failed");
            Notification::from_error("Repayment failed", &e, "Failed to repay loan")
        }
    }
}
