//! Deployment descriptors
//!
//! Each module deploys one contract whose only constructor argument is the
//! stablecoin it settles in.

use alloy_primitives::{address, Address};
use alloy_sol_types::SolValue;
use serde::Serialize;

/// A single-contract deployment module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeploymentModule {
    pub module_id: &'static str,
    pub contract_name: &'static str,
    /// Stablecoin passed to the constructor
    pub stablecoin: Address,
}

impl DeploymentModule {
    pub const PLUME_PAWN: DeploymentModule = DeploymentModule {
        module_id: "PlumePawnModule",
        contract_name: "PlumePawn",
        stablecoin: address!("1E0E030AbCb4f07de629DCCEa458a271e0E82624"),
    };

    pub const PLUME_RWA_MARKETPLACE: DeploymentModule = DeploymentModule {
        module_id: "PlumeRWAMarketplaceModule",
        contract_name: "PlumeRWAMarketplace",
        stablecoin: address!("dddD73F5Df1F0DC31373357beAC77545dC5A6f3F"),
    };

    pub fn all() -> [DeploymentModule; 2] {
        [Self::PLUME_PAWN, Self::PLUME_RWA_MARKETPLACE]
    }

    pub fn by_id(module_id: &str) -> Option<DeploymentModule> {
        Self::all().into_iter().find(|m| m.module_id == module_id)
    }

    /// ABI-encoded constructor arguments, appended to the creation bytecode
    pub fn constructor_args(&self) -> Vec<u8> {
        (self.stablecoin,).abi_encode_params()
    }
}
