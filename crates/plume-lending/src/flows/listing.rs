//! Loan listing
//!
//! Loans come from the contract; symbol, image and decimals come from the
//! wallet's holdings. Loans whose collateral the wallet no longer holds fall
//! back to a truncated address and 18 decimals.

use alloy_primitives::{Address, U256};
use plume_common::units::format_units;
use plume_common::{
    Loan, LoanStatus, RwaHolding, DEFAULT_TOKEN_DECIMALS, PLACEHOLDER_IMAGE_URL,
    REPAYMENT_TOKEN_DECIMALS, REPAYMENT_TOKEN_SUFFIX,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{instrument, warn};

use crate::api::{fetch_holdings_or_empty, TokenApi};
use crate::chain::bindings::LendingContract;

/// A loan ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanView {
    pub loan_id: U256,
    /// Stable row key
    pub key: String,
    /// Collateral symbol
    pub asset: String,
    pub image: String,
    /// Collateral in whole tokens
    pub collateral_amount: String,
    /// e.g. `1.0 $pUSD`
    pub loan_amount: String,
    /// e.g. `1.25 $pUSD`
    pub repay_amount: String,
    /// Base units passed to the repayment flow
    pub repay_amount_raw: U256,
    pub due_date: String,
    pub status: LoanStatus,
}

impl LoanView {
    fn new(loan: &Loan, holding: Option<&RwaHolding>) -> Self {
        let asset = holding
            .map(|h| h.symbol.clone())
            .filter(|symbol| !symbol.is_empty())
            .unwrap_or_else(|| truncated_address(&loan.collateral_token));
        let decimals = holding.map(|h| h.decimals).unwrap_or(DEFAULT_TOKEN_DECIMALS);
        let image = holding
            .map(|h| h.image.clone())
            .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string());

        Self {
            loan_id: loan.loan_id,
            key: loan.loan_id.to_string(),
            asset,
            image,
            collateral_amount: format_units(loan.collateral_amount, decimals),
            loan_amount: repayment_amount(loan.amount),
            repay_amount: repayment_amount(loan.repay_amount),
            repay_amount_raw: loan.repay_amount,
            due_date: loan.due_date_display(),
            status: loan.status(),
        }
    }
}

/// A borrower's loans split for display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanBook {
    /// Loans that can still be repaid
    pub active: Vec<LoanView>,
    /// Repaid and overdue loans
    pub history: Vec<LoanView>,
}

impl LoanBook {
    pub fn from_views(views: Vec<LoanView>) -> Self {
        let (active, history): (Vec<_>, Vec<_>) =
            views.into_iter().partition(|view| view.status.is_active());
        Self { active, history }
    }

    pub fn len(&self) -> usize {
        self.active.len() + self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Join loans with holdings by collateral address
pub fn build_loan_views(loans: &[Loan], holdings: &[RwaHolding]) -> Vec<LoanView> {
    let by_address: HashMap<Address, &RwaHolding> =
        holdings.iter().map(|h| (h.address, h)).collect();
    loans
        .iter()
        .map(|loan| LoanView::new(loan, by_address.get(&loan.collateral_token).copied()))
        .collect()
}

/// Load and split a borrower's loans, degrading failed reads to empty lists
#[instrument(skip(contract, api))]
pub async fn load_loan_book(
    contract: &LendingContract,
    api: &dyn TokenApi,
    user: Address,
) -> LoanBook {
    let holdings = fetch_holdings_or_empty(api, user).await;
    load_loan_book_with(contract, &holdings, user).await
}

/// Same as [`load_loan_book`] with holdings the caller already has
pub async fn load_loan_book_with(
    contract: &LendingContract,
    holdings: &[RwaHolding],
    user: Address,
) -> LoanBook {
    let loans = match contract.loans_by_user(user).await {
        Ok(loans) => loans,
        Err(e) => {
            warn!(%user, error = %e, "Failed to get loans by user");
            Vec::new()
        }
    };
    LoanBook::from_views(build_loan_views(&loans, holdings))
}

/// `0x` and the first four hex digits
fn truncated_address(address: &Address) -> String {
    let digits = hex::encode(address.as_slice());
    format!("0x{}...", &digits[..4])
}

fn repayment_amount(value: U256) -> String {
    format!("{} {}", format_units(value, REPAYMENT_TOKEN_DECIMALS), REPAYMENT_TOKEN_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::abi::{IPlumePawn, LoanRecord};
    use crate::chain::MockChainClient;
    use alloy_sol_types::SolCall;
    use async_trait::async_trait;
    use plume_common::{PlumeError, Result};
    use rust_decimal_macros::dec;
    use serde_json::Value;
    use std::sync::Arc;

    const PAWN: Address = Address::repeat_byte(0xa0);
    const PUSD: Address = Address::repeat_byte(0xb0);
    const GOLD: Address = Address::repeat_byte(0x0c);

    fn loan(id: u64, token: Address, repaid: bool, overdue: bool) -> Loan {
        Loan {
            borrower: Address::repeat_byte(0x01),
            loan_id: U256::from(id),
            collateral_token: token,
            collateral_amount: U256::from(2_500_000_000_000_000_000u64),
            amount: U256::from(1_000_000u64),
            repay_amount: U256::from(1_250_000u64),
            fee_amount: U256::from(250_000u64),
            // 2024-01-01T00:00:00Z
            due_date: U256::from(1_704_067_200u64),
            repaid,
            overdue,
        }
    }

    fn gold() -> RwaHolding {
        RwaHolding::new(
            GOLD,
            "GLD",
            "Gold Token",
            Some("https://cdn.example/gld.png"),
            dec!(3),
            dec!(2),
            18,
        )
    }

    struct DownApi;

    #[async_trait]
    impl TokenApi for DownApi {
        async fn wallet_balance_raw(&self, _wallet: &str) -> Result<Value> {
            Err(PlumeError::Network("503".to_string()))
        }
    }

    #[test]
    fn test_view_joins_holding() {
        let views = build_loan_views(&[loan(1, GOLD, false, false)], &[gold()]);
        let view = &views[0];

        assert_eq!(view.key, "1");
        assert_eq!(view.asset, "GLD");
        assert_eq!(view.image, "https://cdn.example/gld.png");
        assert_eq!(view.collateral_amount, "2.5");
        assert_eq!(view.loan_amount, "1.0 $pUSD");
        assert_eq!(view.repay_amount, "1.25 $pUSD");
        assert_eq!(view.repay_amount_raw, U256::from(1_250_000u64));
        assert_eq!(view.due_date, "2024-01-01");
        assert_eq!(view.status, LoanStatus::Active);
    }

    #[test]
    fn test_unmatched_collateral_fallbacks() {
        let token: Address = "0xabcdef0000000000000000000000000000000001".parse().unwrap();
        let views = build_loan_views(&[loan(2, token, false, false)], &[gold()]);
        let view = &views[0];

        assert_eq!(view.asset, "0xabcd...");
        assert_eq!(view.image, PLACEHOLDER_IMAGE_URL);
        assert_eq!(view.collateral_amount, "2.5");
    }

    #[test]
    fn test_book_split() {
        let loans = vec![
            loan(1, GOLD, false, false),
            loan(2, GOLD, true, false),
            loan(3, GOLD, false, true),
            loan(4, GOLD, true, true),
        ];
        let book = LoanBook::from_views(build_loan_views(&loans, &[]));

        assert_eq!(book.len(), 4);
        assert_eq!(book.active.len(), 1);
        assert_eq!(book.active[0].key, "1");
        let statuses: Vec<LoanStatus> = book.history.iter().map(|v| v.status).collect();
        assert_eq!(statuses, vec![LoanStatus::Repaid, LoanStatus::Overdue, LoanStatus::Repaid]);
    }

    #[tokio::test]
    async fn test_load_degrades_on_holdings_failure() {
        let record = LoanRecord {
            borrower: Address::repeat_byte(0x01),
            loanId: U256::from(5u64),
            collateralToken: GOLD,
            collateralAmount: U256::from(10u64).pow(U256::from(18u64)),
            amount: U256::from(1_000_000u64),
            repayAmount: U256::from(1_060_000u64),
            feeAmount: U256::from(60_000u64),
            dueDate: U256::from(1_704_067_200u64),
            repaid: false,
            overdue: false,
        };
        let encoded = IPlumePawn::getLoansByUserCall::abi_encode_returns(&(vec![record],));

        let mut mock = MockChainClient::new();
        mock.expect_static_call()
            .returning(move |_, _| Ok(encoded.clone()));

        let contract = LendingContract::new(Arc::new(mock), PAWN, PUSD);
        let book = load_loan_book(&contract, &DownApi, Address::repeat_byte(0x01)).await;

        assert_eq!(book.active.len(), 1);
        assert_eq!(book.active[0].asset, "0x0c0c...");
        assert_eq!(book.active[0].repay_amount, "1.06 $pUSD");
    }

    #[tokio::test]
    async fn test_load_degrades_on_contract_failure() {
        let mut mock = MockChainClient::new();
        mock.expect_static_call()
            .returning(|_, _| Err(PlumeError::Network("down".to_string())));

        let contract = LendingContract::new(Arc::new(mock), PAWN, PUSD);
        let book = load_loan_book_with(&contract, &[gold()], Address::repeat_byte(0x01)).await;
        assert!(book.is_empty());
    }
}
