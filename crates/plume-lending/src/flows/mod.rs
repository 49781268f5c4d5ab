//! Borrower flows
//!
//! Each flow awaits its calls one after another; nothing runs in parallel
//! within a flow and nothing is retried.

pub mod allowance;
pub mod listing;
pub mod repay;
pub mod request;
