use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{err, ok, Ready};
use secrecy::Secret;
use uuid::Uuid;

use crate::auth::decode_token;
use crate::auth::jwt::extract_token;
use crate::errors::AppError;

/// Extractor that validates the JWT and provides the authenticated user's identity.
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
    pub is_superuser: bool,
}

impl AuthenticatedUser {
    fn from_http_request(req: &HttpRequest) -> Result<Self, AppError> {
        let jwt_secret = req
            .app_data::<web::Data<Secret<String>>>()
            .ok_or_else(|| AppError::InternalError("JWT secret not configured".to_string()))?;

        let token = extract_token(req)?;
        let claims = decode_token(&token, jwt_secret.get_ref())?;

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            username: claims.username,
            is_superuser: claims.is_superuser,
        })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match Self::from_http_request(req) {
            Ok(user) => ok(user),
            Err(e) => err(e),
        }
    }
}

/// Authenticated user whose token carries the superuser flag.
pub struct AdminUser(pub AuthenticatedUser);

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match AuthenticatedUser::from_http_request(req) {
            Ok(user) if user.is_superuser => ok(AdminUser(user)),
            Ok(_) => err(AppError::Forbidden(
                "Administrator privileges required".to_string(),
            )),
            Err(e) => err(e),
        }
    }
}
