use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::auth::models::{validate_password_complexity, validate_username, User};

/// Full user record as seen by administrators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AdminUserResponse {
    pub id: Uuid,
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "user@example.com")]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    /// Inactive users cannot log in or refresh tokens
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<User> for AdminUserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            is_active: user.is_active,
            date_joined: user.date_joined,
            last_login: user.last_login,
        }
    }
}

/// Request body for creating a user as an administrator
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AdminCreateUserDto {
    #[validate(length(min = 4, max = 150, message = "Username must be 4-150 characters"))]
    #[validate(custom(
        function = "validate_username",
        message = "Username may contain only letters, digits and @/./+/-/_"
    ))]
    #[schema(example = "jdoe")]
    pub username: String,
    #[validate(email(message = "Email must be valid"))]
    #[serde(default)]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[validate(custom(
        function = "validate_password_complexity",
        message = "Password must contain at least one uppercase letter, one lowercase letter, and one number"
    ))]
    #[schema(example = "Password123")]
    pub password: String,
    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    #[serde(default)]
    pub first_name: String,
    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Request body for updating a user as an administrator (PATCH - all fields optional)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct AdminUpdateUserDto {
    #[validate(length(min = 4, max = 150, message = "Username must be 4-150 characters"))]
    #[validate(custom(
        function = "validate_username",
        message = "Username may contain only letters, digits and @/./+/-/_"
    ))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[validate(email(message = "Email must be valid"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New password; existing sessions are revoked when set
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[validate(custom(
        function = "validate_password_complexity",
        message = "Password must contain at least one uppercase letter, one lowercase letter, and one number"
    ))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_staff: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_superuser: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl AdminUpdateUserDto {
    /// Whether applying this update invalidates the user's refresh tokens
    pub fn revokes_sessions(&self) -> bool {
        self.password.is_some() || self.is_active == Some(false)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct UserIdPath {
    /// User UUID
    pub id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_defaults() {
        let dto: AdminCreateUserDto = serde_json::from_value(serde_json::json!({
            "username": "alice",
            "password": "Password123"
        }))
        .expect("Should deserialize");

        assert!(dto.is_active);
        assert!(!dto.is_superuser);
        assert!(!dto.is_staff);
        assert_eq!(dto.email, None);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_create_rejects_weak_password() {
        let dto: AdminCreateUserDto = serde_json::from_value(serde_json::json!({
            "username": "alice",
            "password": "password"
        }))
        .expect("Should deserialize");
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_update_validates_only_present_fields() {
        assert!(AdminUpdateUserDto::default().validate().is_ok());

        let dto = AdminUpdateUserDto {
            username: Some("ab".to_string()),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_revokes_sessions() {
        assert!(!AdminUpdateUserDto::default().revokes_sessions());
        assert!(AdminUpdateUserDto {
            is_active: Some(false),
            ..Default::default()
        }
        .revokes_sessions());
        assert!(!AdminUpdateUserDto {
            is_active: Some(true),
            ..Default::default()
        }
        .revokes_sessions());
        assert!(AdminUpdateUserDto {
            password: Some("Password123".to_string()),
            ..Default::default()
        }
        .revokes_sessions());
    }

    #[test]
    fn test_update_serializes_only_set_fields() {
        let dto = AdminUpdateUserDto {
            is_active: Some(false),
            ..Default::default()
        };
        let json = serde_json::to_value(&dto).expect("Should serialize");
        assert_eq!(json, serde_json::json!({ "is_active": false }));
    }
}
