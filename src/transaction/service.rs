use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::models::{CreateTransactionDto, Transaction, TransactionKind};
use crate::errors::AppError;
use crate::summary::models::Period;

/// Service layer for transaction business logic
pub struct TransactionService;

impl TransactionService {
    /// Transactions of one kind in a period, newest date first
    pub async fn list_for_period(
        pool: &PgPool,
        user_id: Uuid,
        kind: TransactionKind,
        period: Period,
    ) -> Result<Vec<Transaction>, AppError> {
        sqlx::query_as::<_, Transaction>(
            r#"
            SELECT t.id, t.category_id, c.name AS category_name, t.kind, t.amount,
                   t.transaction_date, t.description, t.created_at
            FROM transactions t
            JOIN categories c ON c.id = t.category_id
            WHERE t.user_id = $1
              AND t.kind = $2
              AND t.transaction_date >= $3
              AND t.transaction_date < $4
            ORDER BY t.transaction_date DESC, t.created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(kind.as_str())
        .bind(period.first_day())
        .bind(period.end_exclusive())
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }

    /// Record a transaction against one of the user's categories of the same kind
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        kind: TransactionKind,
        dto: &CreateTransactionDto,
    ) -> Result<Transaction, AppError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        // Lock the category so a concurrent delete cannot orphan the insert
        let category_name = sqlx::query_scalar::<_, String>(
            "SELECT name FROM categories WHERE id = $1 AND user_id = $2 AND kind = $3 FOR SHARE",
        )
        .bind(dto.category)
        .bind(user_id)
        .bind(kind.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions
                (user_id, category_id, kind, amount, transaction_date, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, category_id, $7::text AS category_name, kind, amount,
                      transaction_date, description, created_at
            "#,
        )
        .bind(user_id)
        .bind(dto.category)
        .bind(kind.as_str())
        .bind(dto.amount)
        .bind(dto.date)
        .bind(dto.clean_description())
        .bind(&category_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        info!(
            user_id = %user_id,
            transaction_id = %transaction.id,
            kind = %kind,
            "Transaction created"
        );

        Ok(transaction)
    }

    /// Delete a transaction of the given kind owned by the user
    pub async fn delete(
        pool: &PgPool,
        user_id: Uuid,
        kind: TransactionKind,
        transaction_id: Uuid,
    ) -> Result<(), AppError> {
        let result =
            sqlx::query("DELETE FROM transactions WHERE id = $1 AND user_id = $2 AND kind = $3")
                .bind(transaction_id)
                .bind(user_id)
                .bind(kind.as_str())
                .execute(pool)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Transaction not found".to_string()));
        }

        Ok(())
    }
}
