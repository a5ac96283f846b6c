//! Vestra Backend Service
//!
//! Main entry point for the Vestra investment platform backend.
//! This service provides:
//! - The balance ledger and investment lifecycle engine (as a library)
//! - A background scheduler applying weekly compounding

use std::sync::Arc;
use tracing::{error, info};
use vestra_backend::config::AppConfig;
use vestra_backend::database::{create_pool, run_migrations};
use vestra_backend::error::{AppError, AppResult};
use vestra_backend::services::CompoundingScheduler;
use vestra_backend::AppState;

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    // Initialize tracing/logging with config
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("vestra_backend={},sqlx=warn", config.log_level).into()
            }),
        )
        .init();

    info!("Vestra backend service starting");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);

    // =========================================================================
    // DATABASE SETUP
    // =========================================================================
    info!("Connecting to database...");

    let pool = create_pool(&config.database).await.map_err(|e| {
        error!("Failed to create database pool: {}", e);
        AppError::Database(e)
    })?;

    info!("Database connection pool created successfully");
    info!("Max connections: {}", config.database.max_connections);

    // Run migrations
    info!("Running database migrations...");
    run_migrations(&pool, None).await.map_err(|e| {
        error!("Database migration failed: {}", e);
        AppError::Database(e)
    })?;

    info!("Database migrations completed successfully");

    // =========================================================================
    // CORE SERVICES INITIALIZATION
    // =========================================================================
    let app_state = Arc::new(AppState::new(pool, config.summary_timeout()));
    info!("Application state initialized with repositories and services");

    // =========================================================================
    // BACKGROUND TASKS
    // =========================================================================
    let scheduler = CompoundingScheduler::new(
        app_state.investment_service.clone(),
        config.compound_poll_interval(),
    );

    let scheduler_handle = tokio::spawn(async move {
        scheduler.start().await;
    });
    info!(
        "Compounding scheduler started ({}s interval)",
        config.compound_poll_interval_secs
    );

    info!("Vestra backend service ready; press Ctrl+C to shut down");

    // =========================================================================
    // SHUTDOWN HANDLING
    // =========================================================================
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down gracefully...");
        }
        _ = scheduler_handle => {
            error!("Compounding scheduler exited unexpectedly");
        }
    }

    info!("Vestra backend service shutdown complete");
    Ok(())
}
