use secrecy::{ExposeSecret, Secret};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AdminBootstrap;
use crate::errors::AppError;

use super::jwt::{
    find_active_refresh_token, issue_token_pair, revoke_all_user_tokens, revoke_refresh_token,
    rotate_refresh_token, create_access_token,
};
use super::models::{
    CreateUserDto, TokenPairResponse, UpdateProfileDto, User, USER_COLUMNS,
};
use super::password::{hash_password, verify_against_dummy, verify_password};

/// Authentication service handling registration, login and the user's own profile
pub struct AuthService;

impl AuthService {
    /// Whether a username is taken, optionally ignoring one user (for renames)
    pub async fn username_taken(
        pool: &PgPool,
        username: &str,
        except: Option<Uuid>,
    ) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(username)
        .bind(except)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }

    /// Register a new regular user
    pub async fn register(pool: &PgPool, dto: &CreateUserDto) -> Result<User, AppError> {
        let username = dto.username.trim();

        if Self::username_taken(pool, username, None).await? {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let password_hash = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(dto.email.trim())
        .bind(&password_hash)
        .bind(dto.first_name.trim())
        .bind(dto.last_name.trim())
        .fetch_one(pool)
        .await?;

        info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(user)
    }

    /// Authenticate by username and password, return a token pair
    pub async fn login(
        pool: &PgPool,
        jwt_secret: &Secret<String>,
        username: &str,
        password: &str,
    ) -> Result<TokenPairResponse, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        let Some(user) = user else {
            verify_against_dummy(password);
            return Err(AppError::Unauthorized(
                "Invalid username or password".to_string(),
            ));
        };

        if !verify_password(password, &user.password_hash)? {
            warn!(username = %username, "Failed login attempt");
            return Err(AppError::Unauthorized(
                "Invalid username or password".to_string(),
            ));
        }

        if !user.is_active {
            return Err(AppError::Unauthorized("Account is disabled".to_string()));
        }

        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(pool)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        issue_token_pair(pool, &user, jwt_secret).await
    }

    /// Exchange a refresh token for a new access token and a rotated refresh token
    pub async fn refresh(
        pool: &PgPool,
        jwt_secret: &Secret<String>,
        raw_refresh_token: &str,
    ) -> Result<TokenPairResponse, AppError> {
        let token_record = find_active_refresh_token(pool, raw_refresh_token).await?;

        let user = Self::get_user_by_id(pool, token_record.user_id).await?;
        if !user.is_active {
            revoke_all_user_tokens(pool, user.id).await?;
            return Err(AppError::Unauthorized("Account is disabled".to_string()));
        }

        let refresh = rotate_refresh_token(pool, token_record.id, user.id).await?;
        let access = create_access_token(&user, jwt_secret)?;

        Ok(TokenPairResponse { access, refresh })
    }

    /// Revoke one refresh token of the user, or all of them when none is given.
    /// Returns the number of revoked sessions.
    pub async fn logout(
        pool: &PgPool,
        user_id: Uuid,
        raw_refresh_token: Option<&str>,
    ) -> Result<u64, AppError> {
        match raw_refresh_token {
            Some(raw) => match find_active_refresh_token(pool, raw).await {
                Ok(record) if record.user_id == user_id => {
                    let revoked = revoke_refresh_token(pool, record.id).await?;
                    Ok(u64::from(revoked))
                }
                // Unknown, expired or foreign tokens are ignored
                _ => Ok(0),
            },
            None => revoke_all_user_tokens(pool, user_id).await,
        }
    }

    /// Get user by ID
    pub async fn get_user_by_id(pool: &PgPool, user_id: Uuid) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))
    }

    /// Update the authenticated user's own profile
    pub async fn update_profile(
        pool: &PgPool,
        user_id: Uuid,
        dto: &UpdateProfileDto,
    ) -> Result<User, AppError> {
        let existing = Self::get_user_by_id(pool, user_id).await?;

        let username = match &dto.username {
            Some(name) => {
                let name = name.trim();
                if Self::username_taken(pool, name, Some(user_id)).await? {
                    return Err(AppError::Conflict("Username already exists".to_string()));
                }
                name.to_string()
            }
            None => existing.username,
        };

        let email = dto
            .email
            .as_deref()
            .map(str::trim)
            .map(str::to_string)
            .unwrap_or(existing.email);
        let first_name = dto
            .first_name
            .as_deref()
            .map(str::trim)
            .map(str::to_string)
            .unwrap_or(existing.first_name);
        let last_name = dto
            .last_name
            .as_deref()
            .map(str::trim)
            .map(str::to_string)
            .unwrap_or(existing.last_name);

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = $2, email = $3, first_name = $4, last_name = $5
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&username)
        .bind(&email)
        .bind(&first_name)
        .bind(&last_name)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Set a new password and sign the user out everywhere
    pub async fn change_password(
        pool: &PgPool,
        user_id: Uuid,
        new_password: &str,
    ) -> Result<(), AppError> {
        let password_hash = hash_password(new_password)?;

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let updated = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(user_id)
            .bind(&password_hash)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        if updated.rows_affected() == 0 {
            return Err(AppError::Unauthorized("User not found".to_string()));
        }

        revoke_all_user_tokens(&mut *tx, user_id).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        info!(user_id = %user_id, "Password changed, sessions revoked");

        Ok(())
    }

    /// Create the configured superuser unless that username already exists
    pub async fn ensure_admin(pool: &PgPool, admin: &AdminBootstrap) -> Result<bool, AppError> {
        if Self::username_taken(pool, &admin.username, None).await? {
            return Ok(false);
        }

        let password_hash = hash_password(admin.password.expose_secret())?;

        sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, is_staff, is_superuser)
            VALUES ($1, $2, $3, TRUE, TRUE)
            "#,
        )
        .bind(&admin.username)
        .bind(&admin.email)
        .bind(&password_hash)
        .execute(pool)
        .await?;

        info!(username = %admin.username, "Bootstrap superuser created");

        Ok(true)
    }
}
