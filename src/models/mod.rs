//! Domain models for the Vestra backend.
//!
//! This module contains all database-backed models representing
//! the core entities of the investment platform.

pub mod balance;
pub mod investment;
pub mod plan;

// Re-export all models for convenient access
pub use balance::{BalanceSummary, BalanceTransaction, TransactionType, UserBalance};
pub use investment::{Investment, InvestmentCompound, InvestmentStatus, InvestmentView};
pub use plan::InvestmentPlan;
