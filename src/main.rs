use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{http::header, web, App, HttpServer};
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use moneybook::auth::service::AuthService;
use moneybook::config::AppConfig;
use moneybook::{openapi, routes};

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    error!("{context}: {err}");
    io::Error::new(io::ErrorKind::Other, format!("{context}: {err}"))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();

    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().map_err(|e| startup_error("Invalid configuration", e))?;

    // Configure connection pool with production-ready settings
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&config.database_url)
        .await
        .map_err(|e| startup_error("Failed to create pool", e))?;

    if config.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| startup_error("Failed to run migrations", e))?;
        info!("Database migrations applied");
    }

    if let Some(admin) = &config.admin {
        let created = AuthService::ensure_admin(&pool, admin)
            .await
            .map_err(|e| startup_error("Failed to bootstrap administrator", e))?;
        if !created {
            info!(username = %admin.username, "Bootstrap superuser already exists");
        }
    }

    // ~1 request per second with burst of 5 on credential endpoints
    let auth_governor_config = GovernorConfigBuilder::default()
        .seconds_per_request(1)
        .burst_size(5)
        .finish()
        .ok_or_else(|| startup_error("Failed to create rate limiter config", "invalid quota"))?;

    let bind_addr = config.bind_addr.clone();
    let jwt_secret = config.jwt_secret.clone();
    let config = Arc::new(config);

    info!("Starting server at http://{bind_addr}");

    HttpServer::new(move || {
        let config = Arc::clone(&config);

        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                origin
                    .to_str()
                    .map(|o| config.is_origin_allowed(o))
                    .unwrap_or(false)
            })
            .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            // Middleware (order matters: outer to inner)
            .wrap(TracingLogger::default())
            .wrap(cors)
            // Shared state
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(jwt_secret.clone()))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
            )
            .configure(routes::configure_api)
            // Credential endpoints with rate limiting (must be last to avoid catching all routes)
            .service(
                web::scope("")
                    .wrap(Governor::new(&auth_governor_config))
                    .configure(routes::configure_credentials),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
