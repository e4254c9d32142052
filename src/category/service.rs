use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::models::{Category, CreateCategoryDto};
use crate::errors::AppError;
use crate::transaction::models::TransactionKind;

/// Service layer for category business logic
pub struct CategoryService;

impl CategoryService {
    /// All categories of one kind owned by the user, ordered by name
    pub async fn list(
        pool: &PgPool,
        user_id: Uuid,
        kind: TransactionKind,
    ) -> Result<Vec<Category>, AppError> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, user_id, kind, name, created_at
            FROM categories
            WHERE user_id = $1 AND kind = $2
            ORDER BY name ASC
            "#,
        )
        .bind(user_id)
        .bind(kind.as_str())
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }

    /// Create a category; a duplicate name within the same kind is a conflict
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        kind: TransactionKind,
        dto: &CreateCategoryDto,
    ) -> Result<Category, AppError> {
        let name = dto.trimmed_name();
        if name.is_empty() {
            return Err(AppError::ValidationError(
                "Name cannot be empty".to_string(),
            ));
        }

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (user_id, kind, name)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, kind, name, created_at
            "#,
        )
        .bind(user_id)
        .bind(kind.as_str())
        .bind(name)
        .fetch_one(pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => {
                AppError::Conflict(format!("Category '{name}' already exists"))
            }
            other => other,
        })?;

        info!(user_id = %user_id, category_id = %category.id, kind = %kind, "Category created");

        Ok(category)
    }

    /// Delete a category of the given kind owned by the user (cascades to transactions)
    pub async fn delete(
        pool: &PgPool,
        user_id: Uuid,
        kind: TransactionKind,
        category_id: Uuid,
    ) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2 AND kind = $3")
            .bind(category_id)
            .bind(user_id)
            .bind(kind.as_str())
            .execute(pool)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category not found".to_string()));
        }

        info!(user_id = %user_id, category_id = %category_id, "Category deleted");

        Ok(())
    }
}
