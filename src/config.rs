use std::env;

use secrecy::Secret;
use thiserror::Error;

/// Default origin allowed by CORS when none is configured
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Superuser created on start-up when no user with that username exists yet
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub password: Secret<String>,
    pub email: String,
}

/// Process configuration read from the environment (and `.env`, if present)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: Secret<String>,
    pub allowed_origins: Vec<String>,
    pub bind_addr: String,
    pub run_migrations: bool,
    pub admin: Option<AdminBootstrap>,
}

#[derive(Debug, Error)]
#[error("Configuration error: {0}")]
pub struct ConfigError(pub String);

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError(format!("{key} must be set")))
        };

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = Secret::new(required("JWT_SECRET")?);

        let allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let run_migrations = match lookup("RUN_MIGRATIONS") {
            None => true,
            Some(v) => parse_bool(&v)
                .ok_or_else(|| ConfigError(format!("RUN_MIGRATIONS is not a boolean: {v}")))?,
        };

        let admin = match (lookup("ADMIN_USERNAME"), lookup("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(AdminBootstrap {
                username,
                password: Secret::new(password),
                email: lookup("ADMIN_EMAIL").unwrap_or_default(),
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigError(
                    "ADMIN_USERNAME and ADMIN_PASSWORD must be set together".to_string(),
                ))
            }
        };

        Ok(Self {
            database_url,
            jwt_secret,
            allowed_origins,
            bind_addr,
            run_migrations,
            admin,
        })
    }

    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| allowed == origin)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
