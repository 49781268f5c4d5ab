//! Core data types for the lending dashboard

pub mod balance;
pub mod holding;
pub mod loan;
pub mod preview;
