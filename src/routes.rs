use actix_web::{get, web, HttpResponse, Responder};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::{admin, auth, category, summary, transaction};

/// Malformed JSON bodies answer with the standard error body instead of plain text
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

/// Unparseable path segments (a non-numeric month, a malformed id) are validation errors
fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

/// Health check endpoint that verifies database connectivity
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Database reachable"),
        (status = 503, description = "Database unreachable")
    )
)]
#[get("/health")]
pub async fn health_check(pool: web::Data<PgPool>) -> impl Responder {
    match sqlx::query("SELECT 1").execute(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "database": "connected"
        })),
        Err(_) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "database": "disconnected"
        })),
    }
}

/// Register every endpoint that is not rate limited
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .service(health_check)
        // Session endpoints
        .service(auth::logout)
        .service(auth::user_info)
        .service(auth::update_user_info)
        .service(auth::change_password)
        // Admin endpoints
        .service(admin::list_users)
        .service(admin::create_user)
        .service(admin::update_user)
        .service(admin::delete_user)
        // Summary
        .service(summary::get_summary)
        // Category endpoints
        .service(category::list_categories)
        .service(category::create_category)
        .service(category::delete_category)
        // Transaction endpoints
        .service(transaction::list_transactions)
        .service(transaction::create_transaction)
        .service(transaction::delete_transaction);
}

/// Register the credential endpoints; the server wraps these in a rate limiter
pub fn configure_credentials(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(auth::register)
        .service(auth::login)
        .service(auth::refresh);
}
