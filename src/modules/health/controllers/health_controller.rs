use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;

use crate::core::business_today;

/// Liveness response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    /// Calendar date the ledger currently treats as today
    pub business_date: NaiveDate,
}

/// Readiness response
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub database: bool,
    /// Ledger tables present (migrations applied)
    pub schema: bool,
}

/// GET /health - liveness, no dependency checks
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        business_date: business_today(),
    })
}

/// GET /ready - 200 once the database answers and the ledger schema exists
pub async fn readiness_check(pool: web::Data<MySqlPool>) -> HttpResponse {
    let database = match sqlx::query("SELECT 1").execute(pool.get_ref()).await {
        Ok(_) => true,
        Err(e) => {
            tracing::error!(error = %e, "Database readiness check failed");
            false
        }
    };

    let schema = database
        && match sqlx::query("SELECT 1 FROM cicilan_schedule LIMIT 1")
            .execute(pool.get_ref())
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Ledger schema not ready");
                false
            }
        };

    let response = ReadinessResponse {
        ready: database && schema,
        database,
        schema,
    };

    if response.ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

/// Configure health check routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/ready", web::get().to(readiness_check));
}
