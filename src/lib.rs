//! Vestra Backend Library
//!
//! Investment and balance accounting engine for the Vestra platform:
//! a two-bucket balance ledger with an append-only audit trail, and the
//! investment lifecycle state machine (creation, weekly compounding,
//! early withdrawal, maturity, reinvestment) built on top of it.

pub mod config;
pub mod database;
pub mod error;
pub mod finance;
pub mod format;
pub mod models;
pub mod repositories;
pub mod services;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult, InvestmentError};

use database::Database;
use repositories::*;
use services::{BalanceService, InvestmentService};
use std::sync::Arc;
use std::time::Duration;

/// Application state containing all repositories and services
pub struct AppState {
    pub database: Database,
    pub balance_repo: Arc<BalanceRepository>,
    pub plan_repo: Arc<PlanRepository>,
    pub investment_repo: Arc<InvestmentRepository>,
    pub balance_service: Arc<BalanceService>,
    pub investment_service: Arc<InvestmentService>,
}

impl AppState {
    /// Create a new AppState with initialized repositories and services
    pub fn new(pool: sqlx::PgPool, summary_timeout: Duration) -> Self {
        let database = Database::new(pool.clone());

        let balance_repo = Arc::new(BalanceRepository::new(pool.clone()));
        let plan_repo = Arc::new(PlanRepository::new(pool.clone()));
        let investment_repo = Arc::new(InvestmentRepository::new(pool.clone()));

        let balance_service = Arc::new(BalanceService::new(
            balance_repo.clone(),
            investment_repo.clone(),
            summary_timeout,
        ));
        let investment_service = Arc::new(InvestmentService::new(
            pool,
            plan_repo.clone(),
            investment_repo.clone(),
            balance_repo.clone(),
        ));

        Self {
            database,
            balance_repo,
            plan_repo,
            investment_repo,
            balance_service,
            investment_service,
        }
    }
}
