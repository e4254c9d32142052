use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// ============================================================================
// User Models
// ============================================================================

lazy_static! {
    /// Letters, digits and @/./+/-/_ only
    static ref USERNAME_RE: Regex = Regex::new(r"^[\w.@+-]+$").expect("Invalid username regex");
}

/// Database entity for users
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Column list matching [`User`], shared by every user query
pub const USER_COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, \
     is_staff, is_superuser, is_active, date_joined, last_login";

/// Validate username characters
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(ValidationError::new("username_characters"))
    }
}

/// Validate password complexity: at least one uppercase, one lowercase, and one digit
pub fn validate_password_complexity(password: &str) -> Result<(), ValidationError> {
    let has_lowercase = password.chars().any(|c| c.is_ascii_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if has_lowercase && has_uppercase && has_digit {
        Ok(())
    } else {
        Err(ValidationError::new("password_complexity"))
    }
}

/// Request body for user registration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    /// Unique login (4-150 characters: letters, digits and @/./+/-/_)
    #[validate(length(min = 4, max = 150, message = "Username must be 4-150 characters"))]
    #[validate(custom(
        function = "validate_username",
        message = "Username may contain only letters, digits and @/./+/-/_"
    ))]
    #[schema(example = "jdoe")]
    pub username: String,
    /// Password (min 8 chars, must include uppercase, lowercase, and digit)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[validate(custom(
        function = "validate_password_complexity",
        message = "Password must contain at least one uppercase letter, one lowercase letter, and one number"
    ))]
    #[schema(example = "Password123")]
    pub password: String,
    /// User's email address
    #[validate(email(message = "Email must be valid"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    #[serde(default)]
    #[schema(example = "John")]
    pub first_name: String,
    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    #[serde(default)]
    #[schema(example = "Doe")]
    pub last_name: String,
}

/// Profile of the authenticated user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    /// Unique user identifier
    pub id: Uuid,
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "user@example.com")]
    pub email: String,
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    /// Grants access to the user administration endpoints
    pub is_superuser: bool,
    pub is_staff: bool,
}

impl UserResponseDto {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_superuser: user.is_superuser,
            is_staff: user.is_staff,
        }
    }
}

/// Request body for updating the current user's profile (PATCH - all fields optional)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileDto {
    #[validate(length(min = 4, max = 150, message = "Username must be 4-150 characters"))]
    #[validate(custom(
        function = "validate_username",
        message = "Username may contain only letters, digits and @/./+/-/_"
    ))]
    pub username: Option<String>,
    #[validate(email(message = "Email must be valid"))]
    pub email: Option<String>,
    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    pub last_name: Option<String>,
}

/// Request body for changing the current user's password
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordDto {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[validate(custom(
        function = "validate_password_complexity",
        message = "Password must contain at least one uppercase letter, one lowercase letter, and one number"
    ))]
    #[schema(example = "NewPassword123")]
    pub new_password: String,
    #[schema(example = "NewPassword123")]
    pub confirm_password: String,
}

impl ChangePasswordDto {
    pub fn passwords_match(&self) -> bool {
        self.new_password == self.confirm_password
    }
}

/// Request body for user login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginDto {
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "Password123")]
    pub password: String,
}

// ============================================================================
// Token Models
// ============================================================================

/// JWT access token claims - short-lived (15 minutes)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: Uuid,          // User ID
    pub username: String,   // Login name
    pub is_superuser: bool, // Admin endpoints
    pub is_staff: bool,
    pub iat: usize, // Issued at
    pub exp: usize, // Expiration
}

/// Refresh token stored in database
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Request body to refresh an access token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshTokenDto {
    /// The refresh token obtained from login
    #[schema(example = "a1b2c3d4e5f6...")]
    pub refresh: String,
}

/// Optional request body for logout
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct LogoutDto {
    /// Revoke only this refresh token; all of the user's tokens otherwise
    pub refresh: Option<String>,
}

/// Access/refresh token pair
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPairResponse {
    /// JWT access token (short-lived, 15 minutes)
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access: String,
    /// Refresh token for obtaining new access tokens
    #[schema(example = "a1b2c3d4e5f6...")]
    pub refresh: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_dto(username: &str, password: &str, email: &str) -> CreateUserDto {
        CreateUserDto {
            username: username.to_string(),
            password: password.to_string(),
            email: email.to_string(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    #[test]
    fn test_valid_registration() {
        let dto = register_dto("jdoe", "Password123", "jdoe@example.com");
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_username_too_short() {
        let dto = register_dto("abc", "Password123", "abc@example.com");
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_username_bad_characters() {
        assert!(validate_username("john doe").is_err());
        assert!(validate_username("john/doe").is_err());
        assert!(validate_username("john.doe+1@x").is_ok());
    }

    #[test]
    fn test_password_complexity() {
        assert!(validate_password_complexity("password123").is_err());
        assert!(validate_password_complexity("PASSWORD123").is_err());
        assert!(validate_password_complexity("Password").is_err());
        assert!(validate_password_complexity("Password1").is_ok());
    }

    #[test]
    fn test_invalid_email() {
        let dto = register_dto("jdoe", "Password123", "not-an-email");
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_change_password_mismatch() {
        let dto = ChangePasswordDto {
            new_password: "Password123".to_string(),
            confirm_password: "Password124".to_string(),
        };
        assert!(dto.validate().is_ok());
        assert!(!dto.passwords_match());
    }

    #[test]
    fn test_user_response_hides_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            is_staff: false,
            is_superuser: true,
            is_active: true,
            date_joined: Utc::now(),
            last_login: None,
        };

        let json = serde_json::to_value(&user).expect("Should serialize");
        assert!(json.get("password_hash").is_none());

        let dto = UserResponseDto::from_user(&user);
        assert_eq!(dto.username, "jdoe");
        assert!(dto.is_superuser);
    }
}
