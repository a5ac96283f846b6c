pub mod balance_service;
pub mod compounding;
pub mod investment_service;

pub use balance_service::BalanceService;
pub use compounding::CompoundingScheduler;
pub use investment_service::{
    CompoundingReport, InvestmentService, MaturityPayout, ReinvestPortion,
};
