//! Borrower flow integration tests
//!
//! Runs the request → list → repay cycle against an in-memory chain that keeps
//! ERC-20 allowances and the pawn contract's loan table, and a canned balance
//! API response.

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use parking_lot::Mutex;
use plume_common::error::ChainError;
use plume_common::{LoanDuration, LoanStatus, PlumeError, Result, WalletBalanceState};
use plume_lending::chain::abi::{IPlumePawn, LoanRecord, IERC20};
use plume_lending::{
    fetch_holdings, find_active_loan, load_loan_book, repay_loan, request_loan, ChainClient,
    LendingContract, LoanRequestForm, TokenApi, TransactionReceipt, WalletAccount,
};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

const PAWN: Address = Address::repeat_byte(0xa0);
const PUSD: Address = Address::repeat_byte(0xb0);
const GOLD: Address = Address::repeat_byte(0x0c);
const BORROWER: Address = Address::repeat_byte(0x01);

/// Method names of every submitted transaction, in order
type SentLog = Vec<&'static str>;

#[derive(Default)]
struct LedgerState {
    allowances: HashMap<(Address, Address), U256>,
    loans: Vec<LoanRecord>,
    sent: SentLog,
    next_tx: u8,
}

/// In-memory pawn contract plus ERC-20 allowances
#[derive(Default)]
struct InMemoryChain {
    state: Mutex<LedgerState>,
}

impl InMemoryChain {
    fn sent(&self) -> SentLog {
        self.state.lock().sent.clone()
    }

    fn allowance(&self, token: Address, owner: Address) -> U256 {
        self.state
            .lock()
            .allowances
            .get(&(token, owner))
            .copied()
            .unwrap_or(U256::ZERO)
    }
}

#[async_trait]
impl ChainClient for InMemoryChain {
    async fn static_call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>> {
        let state = self.state.lock();
        let selector: [u8; 4] = data[..4].try_into().unwrap();
        match selector {
            s if s == IERC20::allowanceCall::SELECTOR => {
                let call = IERC20::allowanceCall::abi_decode(&data, true).unwrap();
                assert_eq!(call.spender, PAWN);
                let value = state.allowances.get(&(to, call.owner)).copied().unwrap_or(U256::ZERO);
                Ok(IERC20::allowanceCall::abi_encode_returns(&(value,)))
            }
            s if s == IPlumePawn::getLoansByUserCall::SELECTOR => {
                let call = IPlumePawn::getLoansByUserCall::abi_decode(&data, true).unwrap();
                let loans: Vec<LoanRecord> = state
                    .loans
                    .iter()
                    .filter(|loan| loan.borrower == call.user)
                    .cloned()
                    .collect();
                Ok(IPlumePawn::getLoansByUserCall::abi_encode_returns(&(loans,)))
            }
            s if s == IPlumePawn::LTVCall::SELECTOR => {
                Ok(IPlumePawn::LTVCall::abi_encode_returns(&(U256::from(70u64),)))
            }
            other => Err(ChainError::Rpc {
                code: -32601,
                message: format!("unknown selector {:?}", other),
            }
            .into()),
        }
    }

    async fn send_transaction(&self, from: Address, to: Address, data: Vec<u8>) -> Result<B256> {
        let mut state = self.state.lock();
        let selector: [u8; 4] = data[..4].try_into().unwrap();
        match selector {
            s if s == IERC20::approveCall::SELECTOR => {
                let call = IERC20::approveCall::abi_decode(&data, true).unwrap();
                state.allowances.insert((to, from), call.amount);
                state.sent.push("approve");
            }
            s if s == IPlumePawn::requestLoanCall::SELECTOR => {
                let call = IPlumePawn::requestLoanCall::abi_decode(&data, true).unwrap();
                let key = (call.collateralToken, from);
                let allowed = state.allowances.get(&key).copied().unwrap_or(U256::ZERO);
                if allowed < call.collateralAmount {
                    return Err(ChainError::Rpc {
                        code: 3,
                        message: "execution reverted: insufficient allowance".to_string(),
                    }
                    .into());
                }
                state.allowances.insert(key, allowed - call.collateralAmount);

                let days = call.duration / U256::from(86_400u64);
                let rate = match days.to::<u64>() {
                    30 => 6u64,
                    90 => 9,
                    _ => 12,
                };
                let fee = call.loanAmount * U256::from(rate) / U256::from(100u64);
                let loan_id = U256::from(state.loans.len() + 1);
                state.loans.push(LoanRecord {
                    borrower: from,
                    loanId: loan_id,
                    collateralToken: call.collateralToken,
                    collateralAmount: call.collateralAmount,
                    amount: call.loanAmount,
                    repayAmount: call.loanAmount + fee,
                    feeAmount: fee,
                    dueDate: U256::from(1_704_067_200u64) + call.duration,
                    repaid: false,
                    overdue: false,
                });
                state.sent.push("requestLoan");
            }
            s if s == IPlumePawn::repayLoanCall::SELECTOR => {
                let call = IPlumePawn::repayLoanCall::abi_decode(&data, true).unwrap();
                let repay_amount = state
                    .loans
                    .iter()
                    .find(|loan| loan.loanId == call.loanId)
                    .map(|loan| loan.repayAmount)
                    .unwrap();
                let key = (PUSD, from);
                let allowed = state.allowances.get(&key).copied().unwrap_or(U256::ZERO);
                assert!(allowed >= repay_amount, "repayment pulled without allowance");
                state.allowances.insert(key, allowed - repay_amount);

                if let Some(loan) = state.loans.iter_mut().find(|loan| loan.loanId == call.loanId) {
                    loan.repaid = true;
                }
                state.sent.push("repayLoan");
            }
            other => panic!("unexpected transaction selector {:?}", other),
        }

        state.next_tx += 1;
        Ok(B256::repeat_byte(state.next_tx))
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt> {
        Ok(TransactionReceipt {
            transaction_hash: tx_hash,
            block_number: Some(100),
            success: true,
        })
    }
}

/// Balance API returning one gold position plus entries that must be dropped
struct CannedApi;

#[async_trait]
impl TokenApi for CannedApi {
    async fn wallet_balance_raw(&self, _wallet: &str) -> Result<Value> {
        Ok(json!({
            "walletTokenBalanceInfoArr": [
                {
                    "token": {
                        "address": "0x0000000000000000000000000000000000000000",
                        "symbol": "PLUME", "priceUSD": "0.1", "tokenType": "erc20", "decimals": 18
                    },
                    "holdings": { "tokenBalance": "50" }
                },
                {
                    "token": {
                        "address": format!("{}", GOLD),
                        "symbol": "GLD", "name": "Gold Token", "priceUSD": "2.5",
                        "imageSmallUrl": "https://cdn.example/gld.png",
                        "tokenType": "ERC20", "decimals": "18"
                    },
                    "holdings": { "tokenBalance": "10" }
                },
                {
                    "token": {
                        "address": "0x00000000000000000000000000000000000000ff",
                        "symbol": "DEED", "priceUSD": 400, "tokenType": "erc721", "decimals": 0
                    },
                    "holdings": { "tokenBalance": "1" }
                }
            ]
        }))
    }
}

struct TestHarness {
    chain: Arc<InMemoryChain>,
    contract: LendingContract,
    balance: WalletBalanceState,
    account: WalletAccount,
}

impl TestHarness {
    fn new() -> Self {
        let chain = Arc::new(InMemoryChain::default());
        let contract = LendingContract::new(chain.clone(), PAWN, PUSD);
        let balance = WalletBalanceState::new();
        balance.set(BORROWER, dec!(100));

        Self {
            chain,
            contract,
            balance,
            account: WalletAccount::new(BORROWER),
        }
    }

    async fn request(&self, quantity: &str) -> Result<()> {
        let holdings = fetch_holdings(&CannedApi, BORROWER).await?;
        let form = LoanRequestForm {
            holding: holdings.into_iter().find(|h| h.address == GOLD),
            quantity: quantity.to_string(),
            loan_amount: None,
            duration: LoanDuration::Days90,
            agreed: true,
        };
        let request = form.into_request().map_err(PlumeError::from)?;
        request_loan(&self.contract, &self.balance, &self.account, &request).await?;
        Ok(())
    }
}

mod request_tests {
    use super::*;

    #[tokio::test]
    async fn test_first_request_approves_collateral() {
        let harness = TestHarness::new();
        harness.request("4").await.unwrap();

        assert_eq!(harness.chain.sent(), vec!["approve", "requestLoan"]);
        // Exact approval, fully consumed by the pull
        assert_eq!(harness.chain.allowance(GOLD, BORROWER), U256::ZERO);
        // 4 × 2.5 × 0.7
        assert_eq!(harness.balance.balance_for(BORROWER), Some(dec!(107)));
    }

    #[tokio::test]
    async fn test_standing_allowance_skips_approval() {
        let harness = TestHarness::new();
        harness
            .chain
            .state
            .lock()
            .allowances
            .insert((GOLD, BORROWER), U256::MAX);

        harness.request("1").await.unwrap();
        assert_eq!(harness.chain.sent(), vec!["requestLoan"]);
    }

    #[tokio::test]
    async fn test_over_balance_request_sends_nothing() {
        let harness = TestHarness::new();
        let result = harness.request("11").await;

        assert!(matches!(result, Err(PlumeError::Loan(_))));
        assert!(harness.chain.sent().is_empty());
        assert_eq!(harness.balance.balance_for(BORROWER), Some(dec!(100)));
    }
}

mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_request_list_repay_cycle() {
        let harness = TestHarness::new();
        harness.request("4").await.unwrap();

        let book = load_loan_book(&harness.contract, &CannedApi, BORROWER).await;
        assert_eq!(book.active.len(), 1);
        assert!(book.history.is_empty());

        let view = &book.active[0];
        assert_eq!(view.asset, "GLD");
        assert_eq!(view.collateral_amount, "4.0");
        assert_eq!(view.loan_amount, "7.0 $pUSD");
        // 9% over 90 days
        assert_eq!(view.repay_amount, "7.63 $pUSD");

        let loans = harness.contract.loans_by_user(BORROWER).await.unwrap();
        let loan = find_active_loan(&loans, view.loan_id).unwrap();
        assert_eq!(loan.repay_amount, view.repay_amount_raw);

        let outcome = repay_loan(
            &harness.contract,
            &harness.balance,
            &harness.account,
            loan.loan_id,
            loan.repay_amount,
        )
        .await
        .unwrap();
        assert!(outcome.approval.approval_tx().is_some());
        assert_eq!(harness.balance.balance_for(BORROWER), Some(dec!(99.37)));

        assert_eq!(harness.chain.sent(), vec!["approve", "requestLoan", "approve", "repayLoan"]);

        let book = load_loan_book(&harness.contract, &CannedApi, BORROWER).await;
        assert!(book.active.is_empty());
        assert_eq!(book.history.len(), 1);
        assert_eq!(book.history[0].status, LoanStatus::Repaid);
    }

    #[tokio::test]
    async fn test_ltv_read() {
        let harness = TestHarness::new();
        assert_eq!(harness.contract.ltv_display().await, "70");
    }
}
