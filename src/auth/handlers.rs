use actix_web::{get, patch, post, web, HttpResponse};
use secrecy::Secret;
use sqlx::PgPool;
use validator::Validate;

use crate::errors::{AppError, ErrorResponse};
use crate::extractors::AuthenticatedUser;

use super::models::{
    ChangePasswordDto, CreateUserDto, LoginDto, LogoutDto, RefreshTokenDto, TokenPairResponse,
    UpdateProfileDto, UserResponseDto,
};
use super::service::AuthService;

/// POST /api/user/register/ - Register a new user
#[utoipa::path(
    post,
    path = "/api/user/register/",
    tag = "Auth",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User registered", body = UserResponseDto),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Username already exists", body = ErrorResponse)
    )
)]
#[post("/api/user/register/")]
pub async fn register(
    pool: web::Data<PgPool>,
    body: web::Json<CreateUserDto>,
) -> Result<HttpResponse, AppError> {
    body.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let user = AuthService::register(pool.get_ref(), &body).await?;

    Ok(HttpResponse::Created().json(UserResponseDto::from_user(&user)))
}

/// POST /api/token/ - Authenticate and get an access/refresh token pair
#[utoipa::path(
    post,
    path = "/api/token/",
    tag = "Auth",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Token pair", body = TokenPairResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
#[post("/api/token/")]
pub async fn login(
    pool: web::Data<PgPool>,
    jwt_secret: web::Data<Secret<String>>,
    body: web::Json<LoginDto>,
) -> Result<HttpResponse, AppError> {
    let tokens = AuthService::login(
        pool.get_ref(),
        jwt_secret.get_ref(),
        &body.username,
        &body.password,
    )
    .await?;

    Ok(HttpResponse::Ok().json(tokens))
}

/// POST /api/token/refresh/ - Rotate the refresh token and get a new access token
#[utoipa::path(
    post,
    path = "/api/token/refresh/",
    tag = "Auth",
    request_body = RefreshTokenDto,
    responses(
        (status = 200, description = "New token pair", body = TokenPairResponse),
        (status = 401, description = "Invalid or expired refresh token", body = ErrorResponse)
    )
)]
#[post("/api/token/refresh/")]
pub async fn refresh(
    pool: web::Data<PgPool>,
    jwt_secret: web::Data<Secret<String>>,
    body: web::Json<RefreshTokenDto>,
) -> Result<HttpResponse, AppError> {
    let tokens = AuthService::refresh(pool.get_ref(), jwt_secret.get_ref(), &body.refresh).await?;

    Ok(HttpResponse::Ok().json(tokens))
}

/// POST /api/token/logout/ - Revoke one refresh token, or all of the user's
#[utoipa::path(
    post,
    path = "/api/token/logout/",
    tag = "Auth",
    request_body = LogoutDto,
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[post("/api/token/logout/")]
pub async fn logout(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    body: Option<web::Json<LogoutDto>>,
) -> Result<HttpResponse, AppError> {
    let refresh_token = body.and_then(|b| b.into_inner().refresh);

    let revoked =
        AuthService::logout(pool.get_ref(), auth.user_id, refresh_token.as_deref()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Logged out successfully",
        "revoked_sessions": revoked
    })))
}

/// GET /api/user-info/ - Current user's profile and role flags
#[utoipa::path(
    get,
    path = "/api/user-info/",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = UserResponseDto),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/api/user-info/")]
pub async fn user_info(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user = AuthService::get_user_by_id(pool.get_ref(), auth.user_id).await?;

    Ok(HttpResponse::Ok().json(UserResponseDto::from_user(&user)))
}

/// PATCH /api/user-info/ - Update the current user's profile
#[utoipa::path(
    patch,
    path = "/api/user-info/",
    tag = "Auth",
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Updated profile", body = UserResponseDto),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Username already exists", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[patch("/api/user-info/")]
pub async fn update_user_info(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    body: web::Json<UpdateProfileDto>,
) -> Result<HttpResponse, AppError> {
    body.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let user = AuthService::update_profile(pool.get_ref(), auth.user_id, &body).await?;

    Ok(HttpResponse::Ok().json(UserResponseDto::from_user(&user)))
}

/// POST /api/user/change-password/ - Change password and revoke all sessions
#[utoipa::path(
    post,
    path = "/api/user/change-password/",
    tag = "Auth",
    request_body = ChangePasswordDto,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[post("/api/user/change-password/")]
pub async fn change_password(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    body: web::Json<ChangePasswordDto>,
) -> Result<HttpResponse, AppError> {
    if !body.passwords_match() {
        return Err(AppError::ValidationError(
            "confirm_password: Passwords do not match".to_string(),
        ));
    }
    body.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    AuthService::change_password(pool.get_ref(), auth.user_id, &body.new_password).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Password changed successfully"
    })))
}
