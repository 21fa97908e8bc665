use std::env;

use tracing::warn;

const DEFAULT_DATABASE_URL: &str = "sqlite://gradebook.db?mode=rwc";
const DEFAULT_JWT_SECRET: &str = "default-secret-change-in-production";

/// Runtime configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub bcrypt_cost: u32,
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
    pub environment: String,
    pub seed: SeedAccounts,
}

/// Placeholder accounts inserted when the user table is empty.
#[derive(Debug, Clone)]
pub struct SeedAccounts {
    pub admin_username: String,
    pub admin_password: String,
    pub teacher_username: String,
    pub teacher_password: String,
}

impl Default for SeedAccounts {
    fn default() -> Self {
        Self {
            admin_username: "admin".to_string(),
            admin_password: "admin".to_string(),
            teacher_username: "teacher".to_string(),
            teacher_password: "teacher".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using default (not secure for production)");
            DEFAULT_JWT_SECRET.to_string()
        });

        let defaults = SeedAccounts::default();
        let seed = SeedAccounts {
            admin_username: env::var("SEED_ADMIN_USERNAME").unwrap_or(defaults.admin_username),
            admin_password: env::var("SEED_ADMIN_PASSWORD").unwrap_or(defaults.admin_password),
            teacher_username: env::var("SEED_TEACHER_USERNAME")
                .unwrap_or(defaults.teacher_username),
            teacher_password: env::var("SEED_TEACHER_PASSWORD")
                .unwrap_or(defaults.teacher_password),
        };

        Self {
            database_url,
            jwt_secret,
            jwt_expiration_hours: parse_or("JWT_EXPIRATION_HOURS", 12),
            bcrypt_cost: parse_or("BCRYPT_COST", bcrypt::DEFAULT_COST),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_or("PORT", 8080),
            cors_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string()),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            seed,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{key}={raw} is not valid, falling back to {default}");
            default
        }),
        Err(_) => default,
    }
}
