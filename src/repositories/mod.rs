pub mod balance_repository;
pub mod investment_repository;
pub mod plan_repository;

// Re-export all repositories for convenient access
pub use balance_repository::{BalanceRepository, DeductionReceipt, EarlyWithdrawalCredit};
pub use investment_repository::{
    ActiveAggregates, DueInvestment, InvestmentRepository, NewInvestment,
};
pub use plan_repository::PlanRepository;
