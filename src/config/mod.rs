use crate::core::{AppError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub finance: FinancePolicy,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    pub run_migrations: bool,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// Longest invoice term accepted, from config or per request
pub const MAX_DUE_DAYS: i64 = 3650;

/// Business constants of the finance desk, injected into services
#[derive(Debug, Clone, Deserialize)]
pub struct FinancePolicy {
    /// Credit limit given to a client on first profile access
    pub default_credit_limit: Decimal,
    /// Days between a sale and the due date of its invoice
    pub invoice_due_days: i64,
}

impl Default for FinancePolicy {
    fn default() -> Self {
        Self {
            default_credit_limit: Decimal::new(500_000_000, 0),
            invoice_due_days: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub rate_limit_per_minute: u32,
    pub cors_allowed_origin: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "debug".to_string()),
                run_migrations: env::var("RUN_MIGRATIONS")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()
                    .map_err(|_| AppError::Configuration("Invalid RUN_MIGRATIONS".to_string()))?,
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            finance: FinancePolicy {
                default_credit_limit: Decimal::from_str(
                    &env::var("DEFAULT_CREDIT_LIMIT").unwrap_or_else(|_| "500000000".to_string()),
                )
                .map_err(|_| AppError::Configuration("Invalid DEFAULT_CREDIT_LIMIT".to_string()))?,
                invoice_due_days: env::var("INVOICE_DUE_DAYS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .map_err(|_| AppError::Configuration("Invalid INVOICE_DUE_DAYS".to_string()))?,
            },
            http: HttpConfig {
                rate_limit_per_minute: env::var("RATE_LIMIT_PER_MINUTE")
                    .unwrap_or_else(|_| "1000".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid RATE_LIMIT_PER_MINUTE".to_string())
                    })?,
                cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.finance.default_credit_limit < Decimal::ZERO {
            return Err(AppError::Configuration(
                "Default credit limit cannot be negative".to_string(),
            ));
        }

        if !(0..=MAX_DUE_DAYS).contains(&self.finance.invoice_due_days) {
            return Err(AppError::Configuration(format!(
                "Invoice due days must be between 0 and {}",
                MAX_DUE_DAYS
            )));
        }

        if self.http.rate_limit_per_minute == 0 {
            return Err(AppError::Configuration(
                "Rate limit must be greater than 0".to_string(),
            ));
        }

        if self.server.workers == 0 {
            return Err(AppError::Configuration(
                "Server workers must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
