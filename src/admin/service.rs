use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::models::{AdminCreateUserDto, AdminUpdateUserDto};
use crate::auth::jwt::revoke_all_user_tokens;
use crate::auth::models::{User, USER_COLUMNS};
use crate::auth::password::hash_password;
use crate::auth::service::AuthService;
use crate::errors::AppError;

fn trimmed(value: &Option<String>, current: String) -> String {
    value
        .as_deref()
        .map(str::trim)
        .map(str::to_string)
        .unwrap_or(current)
}

/// User administration for superusers
pub struct AdminService;

impl AdminService {
    pub async fn list_users(pool: &PgPool) -> Result<Vec<User>, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY username ASC"
        ))
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }

    pub async fn get_user(pool: &PgPool, user_id: Uuid) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn create_user(pool: &PgPool, dto: &AdminCreateUserDto) -> Result<User, AppError> {
        let username = dto.username.trim();

        if AuthService::username_taken(pool, username, None).await? {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let password_hash = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users
                (username, email, password_hash, first_name, last_name,
                 is_staff, is_superuser, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(dto.email.as_deref().map(str::trim).unwrap_or_default())
        .bind(&password_hash)
        .bind(dto.first_name.trim())
        .bind(dto.last_name.trim())
        .bind(dto.is_staff)
        .bind(dto.is_superuser)
        .bind(dto.is_active)
        .fetch_one(pool)
        .await?;

        info!(user_id = %user.id, username = %user.username, "User created by administrator");

        Ok(user)
    }

    /// Apply a partial update; a password change or deactivation signs the user out everywhere
    pub async fn update_user(
        pool: &PgPool,
        user_id: Uuid,
        dto: &AdminUpdateUserDto,
    ) -> Result<User, AppError> {
        let existing = Self::get_user(pool, user_id).await?;

        if let Some(name) = &dto.username {
            if AuthService::username_taken(pool, name.trim(), Some(user_id)).await? {
                return Err(AppError::Conflict("Username already exists".to_string()));
            }
        }

        let password_hash = match &dto.password {
            Some(password) => hash_password(password)?,
            None => existing.password_hash,
        };

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = $2, email = $3, password_hash = $4, first_name = $5,
                last_name = $6, is_staff = $7, is_superuser = $8, is_active = $9
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(trimmed(&dto.username, existing.username))
        .bind(trimmed(&dto.email, existing.email))
        .bind(&password_hash)
        .bind(trimmed(&dto.first_name, existing.first_name))
        .bind(trimmed(&dto.last_name, existing.last_name))
        .bind(dto.is_staff.unwrap_or(existing.is_staff))
        .bind(dto.is_superuser.unwrap_or(existing.is_superuser))
        .bind(dto.is_active.unwrap_or(existing.is_active))
        .fetch_one(&mut *tx)
        .await?;

        if dto.revokes_sessions() {
            let revoked = revoke_all_user_tokens(&mut *tx, user_id).await?;
            info!(user_id = %user_id, revoked, "Sessions revoked by administrator");
        }

        tx.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(user)
    }

    /// Delete a user and everything they own; administrators cannot delete themselves
    pub async fn delete_user(pool: &PgPool, acting_admin: Uuid, user_id: Uuid) -> Result<(), AppError> {
        if acting_admin == user_id {
            return Err(AppError::ValidationError(
                "You cannot delete your own account".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(pool)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        info!(user_id = %user_id, deleted_by = %acting_admin, "User deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trimmed_keeps_current_when_absent() {
        assert_eq!(trimmed(&None, "kept".to_string()), "kept");
        assert_eq!(trimmed(&Some("  new ".to_string()), "kept".to_string()), "new");
    }
}
