use actix_web::HttpRequest;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha256};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::errors::AppError;

use super::models::{RefreshToken, TokenClaims, TokenPairResponse, User};

// Token expiration constants
pub const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 15;
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 7;

// ============================================================================
// JWT Access Token Utilities
// ============================================================================

/// Create a new JWT access token for a user
pub fn create_access_token(user: &User, jwt_secret: &Secret<String>) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + Duration::minutes(ACCESS_TOKEN_EXPIRY_MINUTES);

    let claims = TokenClaims {
        sub: user.id,
        username: user.username.clone(),
        is_superuser: user.is_superuser,
        is_staff: user.is_staff,
        iat: now.timestamp() as usize,
        exp: expires_at.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.expose_secret().as_bytes()),
    )
    .map_err(|e| AppError::InternalError(format!("Failed to create access token: {e}")))
}

/// Decode and validate a JWT access token
pub fn decode_token(token: &str, jwt_secret: &Secret<String>) -> Result<TokenClaims, AppError> {
    decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {e}")))
}

/// Extract Bearer token from Authorization header
pub fn extract_token(req: &HttpRequest) -> Result<String, AppError> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.to_string())
        .ok_or_else(|| {
            AppError::Unauthorized("Missing or invalid Authorization header".to_string())
        })
}

// ============================================================================
// Refresh Token Utilities
// ============================================================================

/// Generate a random refresh token string (64 hex characters)
pub fn generate_refresh_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

/// Hash a refresh token for storage; only the hash ever reaches the database
pub fn hash_refresh_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Store a freshly generated refresh token and return its raw value
pub async fn issue_refresh_token<'e, E>(executor: E, user_id: Uuid) -> Result<String, AppError>
where
    E: PgExecutor<'e>,
{
    let raw_token = generate_refresh_token();
    let expires_at = Utc::now() + Duration::days(REFRESH_TOKEN_EXPIRY_DAYS);

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(user_id)
    .bind(hash_refresh_token(&raw_token))
    .bind(expires_at)
    .execute(executor)
    .await
    .map_err(|e| AppError::InternalError(format!("Failed to store refresh token: {e}")))?;

    Ok(raw_token)
}

/// Issue an access token and a new refresh token for a user
pub async fn issue_token_pair(
    pool: &PgPool,
    user: &User,
    jwt_secret: &Secret<String>,
) -> Result<TokenPairResponse, AppError> {
    let access = create_access_token(user, jwt_secret)?;
    let refresh = issue_refresh_token(pool, user.id).await?;

    Ok(TokenPairResponse { access, refresh })
}

/// Look up a refresh token that is neither expired nor revoked
pub async fn find_active_refresh_token(
    pool: &PgPool,
    raw_token: &str,
) -> Result<RefreshToken, AppError> {
    sqlx::query_as::<_, RefreshToken>(
        r#"
        SELECT id, user_id, token_hash, expires_at, created_at, revoked_at
        FROM refresh_tokens
        WHERE token_hash = $1
          AND expires_at > NOW()
          AND revoked_at IS NULL
        "#,
    )
    .bind(hash_refresh_token(raw_token))
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::InternalError(e.to_string()))?
    .ok_or_else(|| AppError::Unauthorized("Invalid or expired refresh token".to_string()))
}

/// Revoke a single live refresh token; returns false when it was already revoked
pub async fn revoke_refresh_token<'e, E>(executor: E, token_id: Uuid) -> Result<bool, AppError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE refresh_tokens SET revoked_at = NOW() WHERE id = $1 AND revoked_at IS NULL",
    )
    .bind(token_id)
    .execute(executor)
    .await
    .map_err(|e| AppError::InternalError(format!("Failed to revoke token: {e}")))?;

    Ok(result.rows_affected() == 1)
}

/// Revoke every live refresh token of a user, returning how many were revoked
pub async fn revoke_all_user_tokens<'e, E>(executor: E, user_id: Uuid) -> Result<u64, AppError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE refresh_tokens SET revoked_at = NOW() WHERE user_id = $1 AND revoked_at IS NULL",
    )
    .bind(user_id)
    .execute(executor)
    .await
    .map_err(|e| AppError::InternalError(format!("Failed to revoke tokens: {e}")))?;

    Ok(result.rows_affected())
}

/// Swap a refresh token for a new one inside a single database transaction
pub async fn rotate_refresh_token(
    pool: &PgPool,
    old_token_id: Uuid,
    user_id: Uuid,
) -> Result<String, AppError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to begin transaction: {e}")))?;

    // A concurrent rotation of the same token blocks on the row lock, then matches nothing
    if !revoke_refresh_token(&mut *tx, old_token_id).await? {
        return Err(AppError::Unauthorized(
            "Invalid or expired refresh token".to_string(),
        ));
    }
    let raw_token = issue_refresh_token(&mut *tx, user_id).await?;

    tx.commit()
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to commit transaction: {e}")))?;

    Ok(raw_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(is_superuser: bool) -> User {
        User {
            id: Uuid::new_v4(),
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            password_hash: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            is_staff: false,
            is_superuser,
            is_active: true,
            date_joined: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn test_access_token_roundtrip_carries_role() {
        let secret = Secret::new("test_secret_key".to_string());
        let user = sample_user(true);

        let token = create_access_token(&user, &secret).expect("Should create token");
        let claims = decode_token(&token, &secret).expect("Should decode token");

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "jdoe");
        assert!(claims.is_superuser);
    }

    #[test]
    fn test_access_token_expiry_window() {
        let secret = Secret::new("test_secret_key".to_string());
        let token = create_access_token(&sample_user(false), &secret).expect("Should create token");
        let claims = decode_token(&token, &secret).expect("Should decode token");

        let expected = (ACCESS_TOKEN_EXPIRY_MINUTES * 60) as usize;
        assert!(claims.exp - claims.iat == expected);
    }

    #[test]
    fn test_decode_token_wrong_secret() {
        let token = create_access_token(
            &sample_user(false),
            &Secret::new("correct_secret".to_string()),
        )
        .expect("Should create token");

        let result = decode_token(&token, &Secret::new("wrong_secret".to_string()));
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_extract_token_requires_bearer_prefix() {
        let req = actix_web::test::TestRequest::default()
            .insert_header(("Authorization", "Token abc"))
            .to_http_request();
        assert!(extract_token(&req).is_err());

        let req = actix_web::test::TestRequest::default()
            .insert_header(("Authorization", "Bearer abc"))
            .to_http_request();
        assert_eq!(extract_token(&req).expect("Should extract"), "abc");
    }

    #[test]
    fn test_generate_refresh_token_length() {
        let token = generate_refresh_token();
        assert_eq!(token.len(), 64, "Refresh token should be 64 hex characters");
    }

    #[test]
    fn test_generate_refresh_token_uniqueness() {
        let token1 = generate_refresh_token();
        let token2 = generate_refresh_token();
        assert_ne!(token1, token2, "Tokens should be unique");
    }

    #[test]
    fn test_hash_refresh_token_deterministic() {
        let token = "test_token_123";
        let hash1 = hash_refresh_token(token);
        let hash2 = hash_refresh_token(token);
        assert_eq!(hash1, hash2, "Same token should produce same hash");
    }

    #[test]
    fn test_hash_refresh_token_is_sha256_hex() {
        assert_eq!(
            hash_refresh_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_ne!(hash_refresh_token("token1"), hash_refresh_token("token2"));
    }
}
