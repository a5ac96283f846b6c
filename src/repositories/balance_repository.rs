//! Repository for balance and ledger transaction operations
//!
//! Every mutation follows the same shape: lock the user's balance row
//! (creating a zero row first if none exists), apply the delta, and append
//! an audit row to `balance_transactions` — all inside one database
//! transaction. Concurrent writers serialize on the row lock, so there is
//! no client-side optimistic retry loop anywhere in this crate.

use crate::error::RepositoryError;
use crate::finance;
use crate::models::{BalanceTransaction, TransactionType, UserBalance};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

pub struct BalanceRepository {
    pool: PgPool,
}

/// Result of an investment deduction
#[derive(Debug, Clone)]
pub struct DeductionReceipt {
    pub new_available: Decimal,
    pub transaction_id: Uuid,
}

/// Result of an early-withdrawal credit
#[derive(Debug, Clone)]
pub struct EarlyWithdrawalCredit {
    pub withdrawal_amount: Decimal,
    pub penalty_amount: Decimal,
}

impl BalanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Get a user's balance row, if one exists
    pub async fn get_balance(&self, user_id: Uuid) -> Result<Option<UserBalance>, RepositoryError> {
        let balance = sqlx::query_as::<_, UserBalance>(
            r#"
            SELECT user_id, available_balance, invested_balance, updated_at
            FROM user_balances
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(balance)
    }

    /// Get or create a user's balance row
    pub async fn get_or_create_balance(&self, user_id: Uuid) -> Result<UserBalance, RepositoryError> {
        let balance = sqlx::query_as::<_, UserBalance>(
            r#"
            INSERT INTO user_balances (user_id, available_balance, invested_balance)
            VALUES ($1, 0, 0)
            ON CONFLICT (user_id) DO UPDATE SET updated_at = user_balances.updated_at
            RETURNING user_id, available_balance, invested_balance, updated_at
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(balance)
    }

    /// Check that `available_balance >= amount`
    pub async fn has_sufficient_balance(
        &self,
        user_id: Uuid,
        amount: Decimal,
    ) -> Result<bool, RepositoryError> {
        let balance = self.get_balance(user_id).await?;
        Ok(balance
            .map(|b| b.has_sufficient_available(amount))
            .unwrap_or(false))
    }

    /// Transaction history for a user, newest first
    pub async fn get_user_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<BalanceTransaction>, RepositoryError> {
        let transactions = sqlx::query_as::<_, BalanceTransaction>(
            r#"
            SELECT id, user_id, transaction_type, amount, balance_before,
                   balance_after, reference_id, description, created_at
            FROM balance_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Rebuild the available balance from the append-only ledger.
    ///
    /// Used by the summary fallback path when the primary read is
    /// unavailable; the signed ledger amounts sum to the current available
    /// balance by construction.
    pub async fn recompute_available_from_ledger(
        &self,
        user_id: Uuid,
    ) -> Result<Decimal, RepositoryError> {
        let sum = sqlx::query_scalar::<_, Option<Decimal>>(
            r#"
            SELECT SUM(amount) FROM balance_transactions WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(sum.unwrap_or(Decimal::ZERO))
    }

    // =========================================================================
    // Mutations within a caller-owned transaction
    //
    // Lifecycle operations pair a ledger write with an investment write;
    // taking the caller's transaction makes the pair atomic, so no
    // partial-failure window exists between them.
    // =========================================================================

    /// Move `amount` from available to invested and log the deduction.
    ///
    /// Fails with `InsufficientFunds` if the locked row holds less than
    /// `amount`; the caller's transaction then rolls back untouched.
    pub async fn deduct_for_investment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        amount: Decimal,
        investment_ref: Uuid,
    ) -> Result<DeductionReceipt, RepositoryError> {
        if amount <= Decimal::ZERO {
            return Err(RepositoryError::InvalidInput(
                "Deduction amount must be positive".to_string(),
            ));
        }

        let current = Self::lock_or_create(tx, user_id).await?;

        if current.available_balance < amount {
            return Err(RepositoryError::InsufficientFunds {
                available: current.available_balance,
                required: amount,
            });
        }

        let new_available = current.available_balance - amount;

        // Both buckets move in one statement; atomic at the row level
        sqlx::query(
            r#"
            UPDATE user_balances
            SET available_balance = $2, invested_balance = invested_balance + $3, updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(new_available)
        .bind(amount)
        .execute(&mut *tx)
        .await?;

        let transaction_id = Self::insert_transaction(
            tx,
            user_id,
            TransactionType::InvestmentDeduction,
            -amount,
            current.available_balance,
            new_available,
            Some(investment_ref),
            Some("Investment deduction"),
        )
        .await?;

        Ok(DeductionReceipt {
            new_available,
            transaction_id,
        })
    }

    /// Credit a matured investment's final balance back to available and
    /// release its principal from the invested bucket (floored at zero).
    pub async fn credit_maturity_payout(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        maturity_amount: Decimal,
        original_principal: Decimal,
        investment_ref: Uuid,
    ) -> Result<UserBalance, RepositoryError> {
        let current = Self::lock_or_create(tx, user_id).await?;

        let new_available = current.available_balance + maturity_amount;
        let new_invested = (current.invested_balance - original_principal).max(Decimal::ZERO);

        let updated = sqlx::query_as::<_, UserBalance>(
            r#"
            UPDATE user_balances
            SET available_balance = $2, invested_balance = $3, updated_at = NOW()
            WHERE user_id = $1
            RETURNING user_id, available_balance, invested_balance, updated_at
            "#,
        )
        .bind(user_id)
        .bind(new_available)
        .bind(new_invested)
        .fetch_one(&mut *tx)
        .await?;

        Self::insert_transaction(
            tx,
            user_id,
            TransactionType::MaturityPayout,
            maturity_amount,
            current.available_balance,
            new_available,
            Some(investment_ref),
            Some("Maturity payout"),
        )
        .await?;

        Ok(updated)
    }

    /// Credit the net of an early withdrawal and release the full investment
    /// balance from the invested bucket.
    ///
    /// The penalty is implicit: it is simply never credited anywhere.
    pub async fn credit_early_withdrawal(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        current_investment_balance: Decimal,
        penalty_percent: Decimal,
        investment_ref: Uuid,
    ) -> Result<EarlyWithdrawalCredit, RepositoryError> {
        let (withdrawal_amount, penalty_amount) =
            finance::early_withdrawal_split(current_investment_balance, penalty_percent);

        let current = Self::lock_or_create(tx, user_id).await?;

        let new_available = current.available_balance + withdrawal_amount;
        let new_invested =
            (current.invested_balance - current_investment_balance).max(Decimal::ZERO);

        sqlx::query(
            r#"
            UPDATE user_balances
            SET available_balance = $2, invested_balance = $3, updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(new_available)
        .bind(new_invested)
        .execute(&mut *tx)
        .await?;

        Self::insert_transaction(
            tx,
            user_id,
            TransactionType::EarlyWithdrawal,
            withdrawal_amount,
            current.available_balance,
            new_available,
            Some(investment_ref),
            Some("Early withdrawal (net of penalty)"),
        )
        .await?;

        Ok(EarlyWithdrawalCredit {
            withdrawal_amount,
            penalty_amount,
        })
    }

    // =========================================================================
    // Standalone atomic mutations
    // =========================================================================

    /// Apply a signed delta to the available balance and log it.
    ///
    /// The unified primitive for deposits, wallet withdrawals, referral
    /// bonuses, and admin adjustments. A delta that would drive
    /// `available_balance` negative is rejected. Only the available bucket
    /// is touched here: the ledger's signed amounts must keep summing to
    /// the available balance, and the invested bucket only moves through
    /// the investment-paired mutations above.
    pub async fn apply_signed_delta(
        &self,
        user_id: Uuid,
        delta: Decimal,
        tx_type: TransactionType,
        reference_id: Option<Uuid>,
        description: Option<&str>,
    ) -> Result<Decimal, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = Self::lock_or_create(&mut tx, user_id).await?;

        let new_available = current.available_balance + delta;
        if new_available < Decimal::ZERO {
            return Err(RepositoryError::InsufficientFunds {
                available: current.available_balance,
                required: -delta,
            });
        }

        sqlx::query(
            r#"
            UPDATE user_balances
            SET available_balance = $2, updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(new_available)
        .execute(&mut *tx)
        .await?;

        Self::insert_transaction(
            &mut tx,
            user_id,
            tx_type,
            delta,
            current.available_balance,
            new_available,
            reference_id,
            description,
        )
        .await?;

        tx.commit().await?;

        Ok(new_available)
    }

    /// Record a deposit, wallet withdrawal, referral bonus, or admin
    /// adjustment against the available bucket.
    pub async fn record_external_adjustment(
        &self,
        user_id: Uuid,
        amount: Decimal,
        tx_type: TransactionType,
        reference_id: Option<Uuid>,
    ) -> Result<Decimal, RepositoryError> {
        self.apply_signed_delta(user_id, amount, tx_type, reference_id, None)
            .await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Lock the balance row for update, creating a zero row first if the
    /// user has never held a balance.
    async fn lock_or_create(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
    ) -> Result<UserBalance, RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO user_balances (user_id, available_balance, invested_balance)
            VALUES ($1, 0, 0)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let balance = sqlx::query_as::<_, UserBalance>(
            r#"
            SELECT user_id, available_balance, invested_balance, updated_at
            FROM user_balances
            WHERE user_id = $1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        Ok(balance)
    }

    #[allow(clippy::too_many_arguments)]
    async fn insert_transaction(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        tx_type: TransactionType,
        amount: Decimal,
        balance_before: Decimal,
        balance_after: Decimal,
        reference_id: Option<Uuid>,
        description: Option<&str>,
    ) -> Result<Uuid, RepositoryError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO balance_transactions
            (user_id, transaction_type, amount, balance_before, balance_after, reference_id, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(tx_type.as_str())
        .bind(amount)
        .bind(balance_before)
        .bind(balance_after)
        .bind(reference_id)
        .bind(description)
        .fetch_one(&mut *tx)
        .await?;

        Ok(id)
    }
}
