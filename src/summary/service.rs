use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::aggregate::summarize;
use super::models::{MonthlySummary, Period, SummaryEntry, SummaryRow};
use crate::errors::AppError;

/// Service layer for the monthly summary
pub struct SummaryService;

impl SummaryService {
    /// Load the user's transactions of one period and reduce them to a summary
    pub async fn for_period(
        pool: &PgPool,
        user_id: Uuid,
        period: Period,
    ) -> Result<MonthlySummary, AppError> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT t.kind, c.name AS category_name, t.amount, t.transaction_date
            FROM transactions t
            JOIN categories c ON c.id = t.category_id
            WHERE t.user_id = $1
              AND t.transaction_date >= $2
              AND t.transaction_date < $3
            "#,
        )
        .bind(user_id)
        .bind(period.first_day())
        .bind(period.end_exclusive())
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        let entries = rows
            .into_iter()
            .map(SummaryEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(user_id = %user_id, period = %period, entries = entries.len(), "Summarizing period");

        Ok(summarize(period, &entries))
    }
}
