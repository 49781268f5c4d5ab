//! Allowance gate
//!
//! Before a token-consuming transaction, make sure the lending contract may
//! pull the required amount. If not, approve exactly that amount and wait for
//! the approval receipt. There is no rollback: an approval that succeeds stays
//! in place even if the transaction it was meant for later fails.

use alloy_primitives::{Address, B256, U256};
use plume_common::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::chain::{bindings::LendingContract, WalletAccount};

/// What the gate had to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AllowanceOutcome {
    /// Existing allowance already covers the amount
    Sufficient { allowance: U256 },
    /// An approval was mined first
    Approved { tx_hash: B256 },
}

impl AllowanceOutcome {
    pub fn approval_tx(&self) -> Option<B256> {
        match self {
            AllowanceOutcome::Approved { tx_hash } => Some(*tx_hash),
            AllowanceOutcome::Sufficient { .. } => None,
        }
    }
}

/// Approve `required` of `token` for the lending contract if needed
#[instrument(skip(contract))]
pub async fn ensure_allowance(
    contract: &LendingContract,
    account: &WalletAccount,
    token: Address,
    required: U256,
) -> Result<AllowanceOutcome> {
    let allowance = contract.allowance(token, account.address).await?;
    if allowance >= required {
        return Ok(AllowanceOutcome::Sufficient { allowance });
    }

    info!(%allowance, %required, "Allowance too low, approving");
    let receipt = contract.approve(account, token, required).await?;
    Ok(AllowanceOutcome::Approved {
        tx_hash: receipt.transaction_hash,
    })
}
