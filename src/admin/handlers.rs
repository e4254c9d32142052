use actix_web::{delete, get, patch, post, web, HttpResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::errors::{AppError, ErrorResponse};
use crate::extractors::AdminUser;

use super::models::{AdminCreateUserDto, AdminUpdateUserDto, AdminUserResponse, UserIdPath};
use super::service::AdminService;

/// GET /api/admin/users/ - List all users
#[utoipa::path(
    get,
    path = "/api/admin/users/",
    tag = "Admin",
    responses(
        (status = 200, description = "Users ordered by username", body = Vec<AdminUserResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/api/admin/users/")]
pub async fn list_users(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let users = AdminService::list_users(pool.get_ref()).await?;

    let response: Vec<AdminUserResponse> = users.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/admin/users/ - Create a user with explicit role flags
#[utoipa::path(
    post,
    path = "/api/admin/users/",
    tag = "Admin",
    request_body = AdminCreateUserDto,
    responses(
        (status = 201, description = "User created", body = AdminUserResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Username already exists", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[post("/api/admin/users/")]
pub async fn create_user(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    body: web::Json<AdminCreateUserDto>,
) -> Result<HttpResponse, AppError> {
    body.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let user = AdminService::create_user(pool.get_ref(), &body).await?;

    Ok(HttpResponse::Created().json(AdminUserResponse::from(user)))
}

/// PATCH /api/admin/users/{id}/ - Update any user
#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}/",
    tag = "Admin",
    params(UserIdPath),
    request_body = AdminUpdateUserDto,
    responses(
        (status = 200, description = "Updated user", body = AdminUserResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Username already exists", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[patch("/api/admin/users/{id}/")]
pub async fn update_user(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    path: web::Path<UserIdPath>,
    body: web::Json<AdminUpdateUserDto>,
) -> Result<HttpResponse, AppError> {
    body.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let user = AdminService::update_user(pool.get_ref(), path.id, &body).await?;

    Ok(HttpResponse::Ok().json(AdminUserResponse::from(user)))
}

/// DELETE /api/admin/users/{id}/ - Delete a user and all of their data
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}/",
    tag = "Admin",
    params(UserIdPath),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Attempt to delete own account", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[delete("/api/admin/users/{id}/")]
pub async fn delete_user(
    pool: web::Data<PgPool>,
    admin: AdminUser,
    path: web::Path<UserIdPath>,
) -> Result<HttpResponse, AppError> {
    AdminService::delete_user(pool.get_ref(), admin.0.user_id, path.id).await?;

    Ok(HttpResponse::NoContent().finish())
}
