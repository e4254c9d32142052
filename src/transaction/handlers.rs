use actix_web::{delete, get, post, web, HttpResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::errors::{AppError, ErrorResponse};
use crate::extractors::AuthenticatedUser;
use crate::summary::models::Period;

use super::models::{
    CreateTransactionDto, KindIdPath, KindPath, KindPeriodPath, TransactionKind,
    TransactionResponse,
};
use super::service::TransactionService;

/// GET /api/{kind}/{year}/{month}/ - List one kind of transaction for a month
#[utoipa::path(
    get,
    path = "/api/{kind}/{year}/{month}/",
    tag = "Transactions",
    params(KindPeriodPath),
    responses(
        (status = 200, description = "Transactions, newest first", body = Vec<TransactionResponse>),
        (status = 400, description = "Invalid month", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/api/{kind:expenses|incomes}/{year}/{month}/")]
pub async fn list_transactions(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    path: web::Path<KindPeriodPath>,
) -> Result<HttpResponse, AppError> {
    let period = Period::new(path.year, path.month)?;
    let kind = TransactionKind::from(path.kind);

    let transactions =
        TransactionService::list_for_period(pool.get_ref(), auth.user_id, kind, period).await?;

    let response: Vec<TransactionResponse> = transactions
        .into_iter()
        .map(|t| TransactionResponse::from_row(t, kind))
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/{kind}/ - Record a transaction
#[utoipa::path(
    post,
    path = "/api/{kind}/",
    tag = "Transactions",
    params(KindPath),
    request_body = CreateTransactionDto,
    responses(
        (status = 201, description = "Transaction created", body = TransactionResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[post("/api/{kind:expenses|incomes}/")]
pub async fn create_transaction(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    path: web::Path<KindPath>,
    body: web::Json<CreateTransactionDto>,
) -> Result<HttpResponse, AppError> {
    body.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let kind = TransactionKind::from(path.kind);
    let transaction = TransactionService::create(pool.get_ref(), auth.user_id, kind, &body).await?;

    Ok(HttpResponse::Created().json(TransactionResponse::from_row(transaction, kind)))
}

/// DELETE /api/{kind}/delete/{id}/ - Delete a transaction
#[utoipa::path(
    delete,
    path = "/api/{kind}/delete/{id}/",
    tag = "Transactions",
    params(KindIdPath),
    responses(
        (status = 204, description = "Transaction deleted"),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[delete("/api/{kind:expenses|incomes}/delete/{id}/")]
pub async fn delete_transaction(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    path: web::Path<KindIdPath>,
) -> Result<HttpResponse, AppError> {
    TransactionService::delete(
        pool.get_ref(),
        auth.user_id,
        TransactionKind::from(path.kind),
        path.id,
    )
    .await?;

    Ok(HttpResponse::NoContent().finish())
}
