use actix_web::{delete, get, post, web, HttpResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::errors::{AppError, ErrorResponse};
use crate::extractors::AuthenticatedUser;
use crate::transaction::models::{KindPath, TransactionKind};

use super::models::{CategoryIdPath, CategoryResponse, CreateCategoryDto};
use super::service::CategoryService;

/// GET /api/{kind}/categories/ - List the user's categories of one kind
#[utoipa::path(
    get,
    path = "/api/{kind}/categories/",
    tag = "Categories",
    params(KindPath),
    responses(
        (status = 200, description = "Categories ordered by name", body = Vec<CategoryResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/api/{kind:expenses|incomes}/categories/")]
pub async fn list_categories(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    path: web::Path<KindPath>,
) -> Result<HttpResponse, AppError> {
    let kind = TransactionKind::from(path.kind);
    let categories = CategoryService::list(pool.get_ref(), auth.user_id, kind).await?;

    let response: Vec<CategoryResponse> = categories
        .into_iter()
        .map(|c| CategoryResponse::from_category(c, kind))
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/{kind}/categories/ - Create a category
#[utoipa::path(
    post,
    path = "/api/{kind}/categories/",
    tag = "Categories",
    params(KindPath),
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Category already exists", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[post("/api/{kind:expenses|incomes}/categories/")]
pub async fn create_category(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    path: web::Path<KindPath>,
    body: web::Json<CreateCategoryDto>,
) -> Result<HttpResponse, AppError> {
    body.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let kind = TransactionKind::from(path.kind);
    let category = CategoryService::create(pool.get_ref(), auth.user_id, kind, &body).await?;

    Ok(HttpResponse::Created().json(CategoryResponse::from_category(category, kind)))
}

/// DELETE /api/{kind}/categories/delete/{id}/ - Delete a category and its transactions
#[utoipa::path(
    delete,
    path = "/api/{kind}/categories/delete/{id}/",
    tag = "Categories",
    params(CategoryIdPath),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[delete("/api/{kind:expenses|incomes}/categories/delete/{id}/")]
pub async fn delete_category(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    path: web::Path<CategoryIdPath>,
) -> Result<HttpResponse, AppError> {
    CategoryService::delete(
        pool.get_ref(),
        auth.user_id,
        TransactionKind::from(path.kind),
        path.id,
    )
    .await?;

    Ok(HttpResponse::NoContent().finish())
}
