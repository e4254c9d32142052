use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::admin::models::{AdminCreateUserDto, AdminUpdateUserDto, AdminUserResponse};
use crate::auth::models::{
    ChangePasswordDto, CreateUserDto, LoginDto, LogoutDto, RefreshTokenDto, TokenPairResponse,
    UpdateProfileDto, UserResponseDto,
};
use crate::category::models::{CategoryResponse, CreateCategoryDto};
use crate::errors::ErrorResponse;
use crate::summary::models::MonthlySummary;
use crate::transaction::models::{CreateTransactionDto, TransactionKind, TransactionResponse};

/// Security scheme modifier for Bearer token authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT access token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation configuration
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Moneybook API",
        version = "0.1.0",
        description = "Personal income and expense tracking with monthly summaries",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development server"),
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Registration, tokens and the current user's profile"),
        (name = "Categories", description = "Expense and income categories"),
        (name = "Transactions", description = "Expense and income records"),
        (name = "Summary", description = "Monthly totals per category"),
        (name = "Admin", description = "User administration (superusers only)")
    ),
    paths(
        crate::routes::health_check,
        // Auth endpoints
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::refresh,
        crate::auth::handlers::logout,
        crate::auth::handlers::user_info,
        crate::auth::handlers::update_user_info,
        crate::auth::handlers::change_password,
        // Category endpoints
        crate::category::handlers::list_categories,
        crate::category::handlers::create_category,
        crate::category::handlers::delete_category,
        // Transaction endpoints
        crate::transaction::handlers::list_transactions,
        crate::transaction::handlers::create_transaction,
        crate::transaction::handlers::delete_transaction,
        // Summary endpoint
        crate::summary::handlers::get_summary,
        // Admin endpoints
        crate::admin::handlers::list_users,
        crate::admin::handlers::create_user,
        crate::admin::handlers::update_user,
        crate::admin::handlers::delete_user,
    ),
    components(
        schemas(
            ErrorResponse,
            // Auth schemas
            CreateUserDto,
            LoginDto,
            RefreshTokenDto,
            LogoutDto,
            TokenPairResponse,
            UserResponseDto,
            UpdateProfileDto,
            ChangePasswordDto,
            // Category schemas
            CategoryResponse,
            CreateCategoryDto,
            // Transaction schemas
            TransactionKind,
            TransactionResponse,
            CreateTransactionDto,
            // Summary schemas
            MonthlySummary,
            // Admin schemas
            AdminUserResponse,
            AdminCreateUserDto,
            AdminUpdateUserDto,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/token/",
            "/api/{kind}/categories/",
            "/api/{kind}/{year}/{month}/",
            "/api/categories/summary/{year}/{month}/",
            "/api/admin/users/{id}/",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing path {expected}"
            );
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
