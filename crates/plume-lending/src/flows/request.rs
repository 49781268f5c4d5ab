//! Loan request flow
//!
//! ```text
//! LoanRequestForm ──validate──▶ LoanRequest ──▶ ensure_allowance(collateral)
//!                                                      │
//!                                                      ▼
//!                                  requestLoan(token, amount, loan, secs)
//!                                                      │
//!                                                      ▼
//!                                       credit balance, notify user
//! ```
//!
//! The preview is advisory. Whatever loan amount the form carries is what
//! gets submitted; when it is left empty the preview principal is used.

use alloy_primitives::{Address, U256};
use plume_common::error::LoanError;
use plume_common::units::{parse_units, to_decimal};
use plume_common::{
    LoanDuration, LoanPreview, Notification, Result, RwaHolding, WalletBalanceState,
    REPAYMENT_TOKEN_DECIMALS,
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{error, info, instrument, warn};

use super::allowance::{ensure_allowance, AllowanceOutcome};
use crate::chain::{bindings::LendingContract, TransactionReceipt, WalletAccount};

/// What the user filled in
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanRequestForm {
    /// Selected collateral
    pub holding: Option<RwaHolding>,
    /// Collateral quantity as typed
    pub quantity: String,
    /// Loan amount in pUSD; empty means the preview principal
    #[serde(default)]
    pub loan_amount: Option<String>,
    #[serde(default)]
    pub duration: LoanDuration,
    /// Terms checkbox
    #[serde(default)]
    pub agreed: bool,
}

impl LoanRequestForm {
    /// Preview for the current inputs, if quantity parses and is positive
    pub fn preview(&self) -> Option<LoanPreview> {
        let holding = self.holding.as_ref()?;
        let quantity = Decimal::from_str(self.quantity.trim()).ok()?;
        LoanPreview::calculate(quantity, holding.unit_price, self.duration)
    }

    /// Validate the form into a submittable request
    pub fn into_request(self) -> std::result::Result<LoanRequest, LoanError> {
        let holding = self.holding.ok_or(LoanError::AssetNotSelected)?;
        let quantity = validate_quantity(&self.quantity, &holding)?;
        if !self.agreed {
            return Err(LoanError::TermsNotAccepted);
        }

        let loan_amount = match self.loan_amount.as_deref().map(str::trim) {
            Some(amount) if !amount.is_empty() => amount.to_string(),
            _ => default_loan_amount(quantity, holding.unit_price),
        };

        Ok(LoanRequest {
            collateral_token: holding.address,
            quantity: self.quantity.trim().to_string(),
            loan_amount,
            decimals: holding.decimals,
            duration: self.duration,
        })
    }
}

/// Quantity must be positive and within the held balance
pub fn validate_quantity(
    quantity: &str,
    holding: &RwaHolding,
) -> std::result::Result<Decimal, LoanError> {
    let value = Decimal::from_str(quantity.trim())
        .map_err(|_| LoanError::InvalidQuantity(quantity.to_string()))?;
    if value > holding.quantity {
        return Err(LoanError::QuantityExceedsBalance {
            max: holding.quantity.normalize().to_string(),
        });
    }
    if value <= Decimal::ZERO {
        return Err(LoanError::QuantityNotPositive);
    }
    Ok(value)
}

/// Preview principal truncated to the repayment token's precision
fn default_loan_amount(quantity: Decimal, unit_price: Decimal) -> String {
    LoanPreview::principal(quantity, unit_price)
        .round_dp_with_strategy(REPAYMENT_TOKEN_DECIMALS as u32, RoundingStrategy::ToZero)
        .normalize()
        .to_string()
}

/// A validated loan request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub collateral_token: Address,
    /// Human collateral quantity
    pub quantity: String,
    /// Human pUSD amount
    pub loan_amount: String,
    /// Collateral token decimals
    pub decimals: u8,
    pub duration: LoanDuration,
}

/// Result of a confirmed loan request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRequestOutcome {
    pub approval: AllowanceOutcome,
    pub receipt: TransactionReceipt,
    pub collateral_amount: U256,
    pub loan_amount: U256,
    pub notification: Notification,
}

/// Approve collateral if needed, request the loan, and credit the cached balance
#[instrument(skip(contract, balance), fields(token = %request.collateral_token))]
pub async fn request_loan(
    contract: &LendingContract,
    balance: &WalletBalanceState,
    account: &WalletAccount,
    request: &LoanRequest,
) -> Result<LoanRequestOutcome> {
    let collateral_amount = parse_units(&request.quantity, request.decimals)?;
    let loan_amount = parse_units(&request.loan_amount, REPAYMENT_TOKEN_DECIMALS)?;

    let approval =
        ensure_allowance(contract, account, request.collateral_token, collateral_amount).await?;

    let receipt = contract
        .request_loan(
            account,
            request.collateral_token,
            collateral_amount,
            loan_amount,
            request.duration.as_seconds(),
        )
        .await?;

    // The loan is on chain either way; a stale cache is only logged
    match to_decimal(loan_amount, REPAYMENT_TOKEN_DECIMALS) {
        Ok(credited) if credited > Decimal::ZERO => {
            if let Err(e) = balance.credit(account.address, credited) {
                warn!(error = %e, "Could not credit cached balance");
            }
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "Loan amount does not fit the cached balance"),
    }

    info!(tx_hash = %receipt.transaction_hash, %loan_amount, "Loan requested");
    let notification = Notification::success(
        "Loan requested",
        format!(
            "Successfully requested {} loan: {}",
            request.loan_amount, receipt.transaction_hash
        ),
    );

    Ok(LoanRequestOutcome {
        approval,
        receipt,
        collateral_amount,
        loan_amount,
        notification,
    })
}

/// Run [`request_loan`] and report the outcome as a notification
pub async fn submit_loan_request(
    contract: &LendingContract,
    balance: &WalletBalanceState,
    account: &WalletAccount,
    request: &LoanRequest,
) -> Notification {
    match request_loan(contract, balance, account, request).await {
        Ok(outcome) => outcome.notification,
        Err(e) => {
            error!(error = %e, "Loan request failed");
            Notification::from_error("Transaction Failed", &e, "Failed to request loan")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::abi::IPlumePawn;
    use crate::chain::MockChainClient;
    use alloy_primitives::B256;
    use alloy_sol_types::{SolCall, SolValue};
    use mockall::Sequence;
    use plume_common::{NotificationKind, PlumeError};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    const PAWN: Address = Address::repeat_byte(0xa0);
    const PUSD: Address = Address::repeat_byte(0xb0);
    const GOLD: Address = Address::repeat_byte(0x0c);

    fn gold() -> RwaHolding {
        RwaHolding::new(GOLD, "GLD", "Gold Token", None, dec!(100), dec!(2.0), 18)
    }

    fn form(quantity: &str) -> LoanRequestForm {
        LoanRequestForm {
            holding: Some(gold()),
            quantity: quantity.to_string(),
            loan_amount: None,
            duration: LoanDuration::Days90,
            agreed: true,
        }
    }

    fn mined(hash: B256) -> Result<TransactionReceipt> {
        Ok(TransactionReceipt {
            transaction_hash: hash,
            block_number: Some(1),
            success: true,
        })
    }

    #[test]
    fn test_form_preview() {
        let preview = form("100").preview().unwrap();
        assert_eq!(preview.principal, dec!(140));
        assert_eq!(preview.interest, dec!(12.6));
        assert_eq!(preview.total, dec!(152.6));

        assert!(form("0").preview().is_none());
        assert!(form("abc").preview().is_none());
    }

    #[test]
    fn test_validate_quantity() {
        let holding = gold();
        assert_eq!(validate_quantity("12.5", &holding).unwrap(), dec!(12.5));
        assert_eq!(validate_quantity("0", &holding), Err(LoanError::QuantityNotPositive));
        assert_eq!(validate_quantity("-3", &holding), Err(LoanError::QuantityNotPositive));
        assert_eq!(
            validate_quantity("101", &holding),
            Err(LoanError::QuantityExceedsBalance { max: "100".to_string() })
        );
        assert!(matches!(
            validate_quantity("ten", &holding),
            Err(LoanError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn test_into_request_autofills_principal() {
        let request = form("100").into_request().unwrap();
        assert_eq!(request.loan_amount, "140");
        assert_eq!(request.collateral_token, GOLD);
        assert_eq!(request.decimals, 18);
        assert_eq!(request.duration.as_seconds(), 90 * 86_400);
    }

    #[test]
    fn test_into_request_keeps_edited_amount() {
        let mut edited = form("100");
        edited.loan_amount = Some(" 50.5 ".to_string());
        assert_eq!(edited.into_request().unwrap().loan_amount, "50.5");
    }

    #[test]
    fn test_autofill_truncates_to_six_decimals() {
        // 1 × 0.1234567 × 0.7 = 0.08641969
        assert_eq!(default_loan_amount(dec!(1), dec!(0.1234567)), "0.086419");
    }

    #[test]
    fn test_into_request_rejections() {
        let mut no_asset = form("1");
        no_asset.holding = None;
        assert_eq!(no_asset.into_request(), Err(LoanError::AssetNotSelected));

        let mut not_agreed = form("1");
        not_agreed.agreed = false;
        assert_eq!(not_agreed.into_request(), Err(LoanError::TermsNotAccepted));
    }

    #[tokio::test]
    async fn test_request_loan_approves_then_requests() {
        let approve_hash = B256::repeat_byte(0x0a);
        let loan_hash = B256::repeat_byte(0x0b);
        let mut seq = Sequence::new();

        let mut mock = MockChainClient::new();
        mock.expect_static_call()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(U256::ZERO.abi_encode()));
        mock.expect_send_transaction()
            .withf(|_, to, _| *to == GOLD)
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _, _| Ok(approve_hash));
        mock.expect_wait_for_receipt()
            .times(1)
            .in_sequence(&mut seq)
            .returning(mined);
        mock.expect_send_transaction()
            .withf(|_, to, data| {
                *to == PAWN
                    && IPlumePawn::requestLoanCall::abi_decode(data, true).is_ok_and(|call| {
                        call.collateralToken == GOLD
                            && call.collateralAmount == U256::from(10u64).pow(U256::from(20u64))
                            && call.loanAmount == U256::from(140_000_000u64)
                            && call.duration == U256::from(90u64 * 86_400)
                    })
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _, _| Ok(loan_hash));
        mock.expect_wait_for_receipt()
            .times(1)
            .in_sequence(&mut seq)
            .returning(mined);

        let contract = LendingContract::new(Arc::new(mock), PAWN, PUSD);
        let balance = WalletBalanceState::new();
        let account = WalletAccount::new(Address::repeat_byte(0x01));
        balance.set(account.address, dec!(10));

        let request = form("100").into_request().unwrap();
        let outcome = request_loan(&contract, &balance, &account, &request).await.unwrap();

        assert_eq!(outcome.approval.approval_tx(), Some(approve_hash));
        assert_eq!(outcome.receipt.transaction_hash, loan_hash);
        assert_eq!(outcome.notification.kind, NotificationKind::Success);
        assert_eq!(outcome.notification.message, "Loan requested");
        assert!(outcome
            .notification
            .description
            .starts_with("Successfully requested 140 loan: 0x0b0b"));
        assert_eq!(balance.balance_for(account.address), Some(dec!(150)));
    }

    #[tokio::test]
    async fn test_failed_request_notifies_and_keeps_balance() {
        let mut mock = MockChainClient::new();
        mock.expect_static_call()
            .returning(|_, _| Ok(U256::MAX.abi_encode()));
        mock.expect_send_transaction()
            .returning(|_, _, _| Err(PlumeError::Network("user rejected".to_string())));

        let contract = LendingContract::new(Arc::new(mock), PAWN, PUSD);
        let balance = WalletBalanceState::new();
        let account = WalletAccount::new(Address::repeat_byte(0x01));
        balance.set(account.address, dec!(10));
        let version = balance.snapshot().version;

        let request = form("1").into_request().unwrap();
        let notification = submit_loan_request(&contract, &balance, &account, &request).await;

        assert!(notification.is_error());
        assert_eq!(notification.message, "Transaction Failed");
        assert!(notification.description.contains("user rejected"));
        assert_eq!(balance.balance_for(account.address), Some(dec!(10)));
        assert!(balance.check_version(version).is_ok());
    }

    #[tokio::test]
    async fn test_mined_loan_with_oversized_amount_succeeds() {
        let mut mock = MockChainClient::new();
        mock.expect_static_call()
            .returning(|_, _| Ok(U256::MAX.abi_encode()));
        mock.expect_send_transaction()
            .times(1)
            .returning(|_, _, _| Ok(B256::repeat_byte(0x0e)));
        mock.expect_wait_for_receipt().times(1).returning(mined);

        let contract = LendingContract::new(Arc::new(mock), PAWN, PUSD);
        let balance = WalletBalanceState::new();
        let account = WalletAccount::new(Address::repeat_byte(0x01));
        balance.set(account.address, dec!(10));

        // 1e32 pUSD is beyond what a Decimal holds
        let request = LoanRequest {
            collateral_token: GOLD,
            quantity: "1".to_string(),
            loan_amount: format!("1{}", "0".repeat(32)),
            decimals: 18,
            duration: LoanDuration::Days30,
        };
        let notification = submit_loan_request(&contract, &balance, &account, &request).await;

        assert_eq!(notification.kind, NotificationKind::Success);
        assert_eq!(notification.message, "Loan requested");
        assert_eq!(balance.balance_for(account.address), Some(dec!(10)));
    }

    #[tokio::test]
    async fn test_unparseable_amount_sends_nothing() {
        let mut mock = MockChainClient::new();
        mock.expect_static_call().never();
        mock.expect_send_transaction().never();

        let contract = LendingContract::new(Arc::new(mock), PAWN, PUSD);
        let request = LoanRequest {
            collateral_token: GOLD,
            quantity: "1".to_string(),
            loan_amount: "1.0000001".to_string(),
            decimals: 18,
            duration: LoanDuration::Days30,
        };

        let result = request_loan(
            &contract,
            &WalletBalanceState::new(),
            &WalletAccount::new(Address::repeat_byte(0x01)),
            &request,
        )
        .await;
        assert!(matches!(result, Err(PlumeError::Units(_))));
    }
}
