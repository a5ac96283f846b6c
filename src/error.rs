use crate::database::DatabaseError;
use rust_decimal::Decimal;
use sqlx::Error as SqlxError;
use thiserror::Error;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database errors
    #[error("SQL error: {0}")]
    Sqlx(#[from] SqlxError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Typed investment/ledger domain failures
    #[error(transparent)]
    Investment(#[from] InvestmentError),

    /// Business logic errors
    #[error("Business logic error: {0}")]
    BusinessLogic(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// UUID parsing errors
    #[error("Invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    /// Generic error with message
    #[error("{0}")]
    Message(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Check if error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::NotFound(_) | AppError::Investment(InvestmentError::PlanNotFound)
        )
    }

    /// Whether the caller should retry the operation as-is
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Investment(InvestmentError::BalanceConflict))
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::NotFound(_) => 404,
            AppError::Validation(_) => 400,
            AppError::Investment(e) => e.status_code(),
            AppError::Config(_) => 500,
            AppError::Database(_) | AppError::Sqlx(_) => 500,
            _ => 500,
        }
    }
}

/// Typed failures of the investment lifecycle and balance ledger.
///
/// Validation and state-machine variants are terminal: retrying without
/// changing the request cannot succeed. `BalanceConflict` is the one
/// "try again" class.
#[derive(Error, Debug)]
pub enum InvestmentError {
    #[error("Investment plan not found or inactive")]
    PlanNotFound,

    #[error("Amount {amount} is below the plan minimum of {minimum}")]
    BelowMinimumAmount { amount: Decimal, minimum: Decimal },

    #[error("Duration must be between 1 and 520 weeks")]
    InvalidDuration,

    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance {
        available: Decimal,
        required: Decimal,
    },

    #[error("Balance was modified concurrently, please try again")]
    BalanceConflict,

    #[error("Investment not found")]
    InvestmentNotFound,

    #[error("Investment is not active")]
    NotActive,

    #[error("Investment has already matured; use maturity processing instead")]
    AlreadyMatured,

    #[error("Investment has not yet matured")]
    NotYetMatured,

    #[error("Investment is not completed; only completed investments can be reinvested")]
    NotCompleted,

    #[error("Investment creation failed: {0}")]
    CreationFailed(String),
}

impl InvestmentError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::PlanNotFound | Self::InvestmentNotFound => 404,
            Self::BelowMinimumAmount { .. } | Self::InvalidDuration => 400,
            Self::BalanceConflict => 409,
            _ => 422,
        }
    }
}

/// Repository-specific error types
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database query error
    #[error("Query error: {0}")]
    Query(SqlxError),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Duplicate record
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Serialization failure between concurrent writers
    #[error("Concurrent update conflict: {0}")]
    Conflict(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A debit would drive a balance bucket negative
    #[error("Insufficient funds: available {available}, required {required}")]
    InsufficientFunds {
        available: Decimal,
        required: Decimal,
    },
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => AppError::NotFound(msg),
            RepositoryError::Query(e) => AppError::Sqlx(e),
            RepositoryError::Duplicate(msg) => {
                AppError::BusinessLogic(format!("Duplicate: {}", msg))
            }
            RepositoryError::ConstraintViolation(msg) => AppError::Validation(msg),
            RepositoryError::Conflict(_) => {
                AppError::Investment(InvestmentError::BalanceConflict)
            }
            RepositoryError::InvalidInput(msg) => AppError::Validation(msg),
            RepositoryError::InsufficientFunds {
                available,
                required,
            } => AppError::Investment(InvestmentError::InsufficientBalance {
                available,
                required,
            }),
        }
    }
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        match &err {
            SqlxError::RowNotFound => RepositoryError::NotFound("Record not found".to_string()),
            SqlxError::Database(db_err) => {
                // Check for common PostgreSQL error codes
                let code = db_err.code().map(|c| c.to_string());
                match code.as_deref() {
                    // Unique violation
                    Some("23505") => RepositoryError::Duplicate(db_err.message().to_string()),
                    // Foreign key / check constraint violation
                    Some("23503") | Some("23514") => {
                        RepositoryError::ConstraintViolation(db_err.message().to_string())
                    }
                    // Serialization failure / deadlock detected
                    Some("40001") | Some("40P01") => {
                        RepositoryError::Conflict(db_err.message().to_string())
                    }
                    _ => RepositoryError::Query(err),
                }
            }
            _ => RepositoryError::Query(err),
        }
    }
}
