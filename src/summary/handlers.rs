use actix_web::{get, web, HttpResponse};
use sqlx::PgPool;

use crate::errors::{AppError, ErrorResponse};
use crate::extractors::AuthenticatedUser;

use super::models::{MonthlySummary, PeriodPath};
use super::service::SummaryService;

/// GET /api/categories/summary/{year}/{month}/ - Income and expense totals for a month
#[utoipa::path(
    get,
    path = "/api/categories/summary/{year}/{month}/",
    tag = "Summary",
    params(PeriodPath),
    responses(
        (status = 200, description = "Monthly summary", body = MonthlySummary),
        (status = 400, description = "Invalid month", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/api/categories/summary/{year}/{month}/")]
pub async fn get_summary(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    path: web::Path<PeriodPath>,
) -> Result<HttpResponse, AppError> {
    let period = path.period()?;

    let summary = SummaryService::for_period(pool.get_ref(), auth.user_id, period).await?;

    Ok(HttpResponse::Ok().json(summary))
}
