//! Lending contract bindings
//!
//! Thin typed functions over the pawn contract and the ERC-20 tokens it
//! moves. Reads go through `eth_call`; writes are submitted from the
//! connected wallet and confirmed by receipt before returning.

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use plume_common::error::ChainError;
use plume_common::units::to_decimal;
use plume_common::{Loan, Result, REPAYMENT_TOKEN_DECIMALS};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use super::abi::{IPlumePawn, IERC20};
use super::{ChainClient, TransactionReceipt, WalletAccount};

/// Pawn contract plus the fixed repayment token
#[derive(Clone)]
pub struct LendingContract {
    client: Arc<dyn ChainClient>,
    /// Lending (pawn) contract, also the allowance spender
    address: Address,
    /// Token loans are disbursed and repaid in (pUSD)
    repayment_token: Address,
}

impl LendingContract {
    pub fn new(client: Arc<dyn ChainClient>, address: Address, repayment_token: Address) -> Self {
        Self {
            client,
            address,
            repayment_token,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn repayment_token(&self) -> Address {
        self.repayment_token
    }

    /// On-chain loan-to-value parameter
    #[instrument(skip(self))]
    pub async fn ltv(&self) -> Result<U256> {
        let ret = self.read(self.address, IPlumePawn::LTVCall {}).await?;
        Ok(ret._0)
    }

    /// `LTV()` as text, `-` when the read fails
    pub async fn ltv_display(&self) -> String {
        match self.ltv().await {
            Ok(ltv) => ltv.to_string(),
            Err(e) => {
                error!("Failed to fetch LTV: {}", e);
                "-".to_string()
            }
        }
    }

    /// All loans recorded for a borrower
    #[instrument(skip(self))]
    pub async fn loans_by_user(&self, user: Address) -> Result<Vec<Loan>> {
        let ret = self
            .read(self.address, IPlumePawn::getLoansByUserCall { user })
            .await?;
        let loans: Vec<Loan> = ret._0.into_iter().map(Loan::from).collect();
        debug!(count = loans.len(), "Loaded loans");
        Ok(loans)
    }

    /// Amount of `token` the lending contract may pull from `owner`
    #[instrument(skip(self))]
    pub async fn allowance(&self, token: Address, owner: Address) -> Result<U256> {
        let ret = self
            .read(
                token,
                IERC20::allowanceCall {
                    owner,
                    spender: self.address,
                },
            )
            .await?;
        Ok(ret._0)
    }

    /// Token balance in base units
    #[instrument(skip(self))]
    pub async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        let ret = self.read(token, IERC20::balanceOfCall { account: owner }).await?;
        Ok(ret._0)
    }

    /// Repayment-token balance in whole pUSD
    pub async fn repayment_token_balance(&self, owner: Address) -> Result<Decimal> {
        let raw = self.balance_of(self.repayment_token, owner).await?;
        Ok(to_decimal(raw, REPAYMENT_TOKEN_DECIMALS)?)
    }

    /// Let the lending contract spend `amount` of `token`
    #[instrument(skip(self))]
    pub async fn approve(
        &self,
        account: &WalletAccount,
        token: Address,
        amount: U256,
    ) -> Result<TransactionReceipt> {
        let call = IERC20::approveCall {
            spender: self.address,
            amount,
        };
        self.send_and_confirm(account, token, call.abi_encode(), "approve").await
    }

    /// Open a loan against `collateral_amount` of `collateral_token`
    #[instrument(skip(self))]
    pub async fn request_loan(
        &self,
        account: &WalletAccount,
        collateral_token: Address,
        collateral_amount: U256,
        loan_amount: U256,
        duration_secs: u64,
    ) -> Result<TransactionReceipt> {
        let call = IPlumePawn::requestLoanCall {
            collateralToken: collateral_token,
            collateralAmount: collateral_amount,
            loanAmount: loan_amount,
            duration: U256::from(duration_secs),
        };
        self.send_and_confirm(account, self.address, call.abi_encode(), "requestLoan")
            .await
    }

    /// Repay a loan in full
    #[instrument(skip(self))]
    pub async fn repay_loan(
        &self,
        account: &WalletAccount,
        loan_id: U256,
    ) -> Result<TransactionReceipt> {
        let call = IPlumePawn::repayLoanCall { loanId: loan_id };
        self.send_and_confirm(account, self.address, call.abi_encode(), "repayLoan")
            .await
    }

    async fn read<C: SolCall>(&self, to: Address, call: C) -> Result<C::Return> {
        let data = self.client.static_call(to, call.abi_encode()).await?;
        C::abi_decode_returns(&data, true).map_err(|e| {
            ChainError::AbiDecode {
                method: C::SIGNATURE.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    async fn send_and_confirm(
        &self,
        account: &WalletAccount,
        to: Address,
        data: Vec<u8>,
        label: &str,
    ) -> Result<TransactionReceipt> {
        let tx_hash = self.client.send_transaction(account.address, to, data).await?;
        info!(%tx_hash, method = label, "Transaction sent, waiting for receipt");

        let receipt = self.client.wait_for_receipt(tx_hash).await?.ensure_success()?;
        info!(%tx_hash, block = ?receipt.block_number, method = label, "Transaction confirmed");
        Ok(receipt)
    }
}

impl std::fmt::Debug for LendingContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LendingContract")
            .field("address", &self.address)
            .field("repayment_token", &self.repayment_token)
            .finish()
    }
}
