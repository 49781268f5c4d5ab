//! Chain access
//!
//! - [`ChainClient`]: the node/wallet capability (read calls, transaction
//!   submission, receipts)
//! - [`rpc::JsonRpcClient`]: Ethereum JSON-RPC implementation
//! - [`abi`]: contract interfaces
//! - [`bindings::LendingContract`]: typed functions over the pawn contract

pub mod abi;
pub mod bindings;
pub mod rpc;

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use plume_common::error::{ChainError, LoanError};
use plume_common::Result;
use serde::{Deserialize, Serialize};

/// Node / wallet operations the contract bindings need
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Execute a read-only call and return the raw ABI-encoded result
    async fn static_call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>>;

    /// Submit a transaction signed on behalf of `from`
    async fn send_transaction(&self, from: Address, to: Address, data: Vec<u8>) -> Result<B256>;

    /// Block until the transaction is mined
    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt>;
}

/// Mined transaction outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    /// False if the transaction reverted
    pub success: bool,
}

impl TransactionReceipt {
    /// Turn a reverted receipt into an error
    pub fn ensure_success(self) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(ChainError::Reverted {
                tx_hash: self.transaction_hash.to_string(),
            }
            .into())
        }
    }
}

/// The connected wallet that signs and pays for transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WalletAccount {
    pub address: Address,
}

impl WalletAccount {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// Require a connected wallet
    pub fn connected(address: Option<Address>) -> std::result::Result<Self, LoanError> {
        address.map(Self::new).ok_or(LoanError::WalletNotConnected)
    }
}
