// HTTP handlers for customer credit profiles
//
// Endpoints (prefix /finance/customer-credit):
// - GET  /profile/{kd_client}
// - GET  /payment-history/{kd_client}?limit=50
// - GET  /high-risk-customers?limit=20
// - POST /credit-limit/{kd_client}?credit_limit=...
// - POST /blacklist/{kd_client}?alasan=...
// - POST /whitelist/{kd_client}

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;

use crate::config::FinancePolicy;
use crate::core::Result;
use crate::modules::credit::{
    models::{CreditProfile, CreditProfileDetail, HighRiskCustomer, PaymentHistoryEntry},
    repositories::MySqlCreditProfileRepository,
    services::CreditProfileService,
};
use crate::modules::installments::models::LineStatus;

pub fn credit_service(pool: &MySqlPool, policy: &FinancePolicy) -> CreditProfileService {
    CreditProfileService::new(
        Arc::new(MySqlCreditProfileRepository::new(pool.clone())),
        policy.clone(),
    )
}

#[derive(Debug, Serialize)]
pub struct CreditProfileResponse {
    pub kd_profile: i64,
    pub kd_client: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nama_client: Option<String>,
    pub credit_limit: Option<Decimal>,
    pub total_outstanding: Decimal,
    pub available_credit: Decimal,
    pub payment_score: Decimal,
    pub total_transaksi: i32,
    pub total_bayar_tepat: i32,
    pub total_telat: i32,
    pub is_blacklist: bool,
    pub alasan_blacklist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ontime_percentage: Option<Decimal>,
}

impl From<CreditProfile> for CreditProfileResponse {
    fn from(profile: CreditProfile) -> Self {
        Self {
            kd_profile: profile.id,
            kd_client: profile.client_id,
            nama_client: None,
            credit_limit: profile.credit_limit,
            total_outstanding: profile.total_outstanding,
            available_credit: profile.available_credit(),
            payment_score: profile.payment_score,
            total_transaksi: profile.total_transactions,
            total_bayar_tepat: profile.on_time_count,
            total_telat: profile.late_count,
            is_blacklist: profile.is_blacklisted,
            alasan_blacklist: profile.blacklist_reason,
            ontime_percentage: None,
        }
    }
}

impl From<CreditProfileDetail> for CreditProfileResponse {
    fn from(detail: CreditProfileDetail) -> Self {
        Self {
            nama_client: Some(detail.client_name),
            available_credit: detail.available_credit,
            ontime_percentage: Some(detail.ontime_percentage),
            ..Self::from(detail.profile)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentHistoryResponse {
    pub kd_schedule: i64,
    pub nomor_cicilan: i32,
    pub jumlah: Decimal,
    pub tgl_jatuh_tempo: NaiveDate,
    pub tgl_pembayaran: Option<NaiveDate>,
    pub status: LineStatus,
    pub days_late: i64,
    pub kd_transaksi: i64,
}

impl From<PaymentHistoryEntry> for PaymentHistoryResponse {
    fn from(entry: PaymentHistoryEntry) -> Self {
        Self {
            kd_schedule: entry.line_id,
            nomor_cicilan: entry.sequence,
            jumlah: entry.amount,
            tgl_jatuh_tempo: entry.due_date,
            tgl_pembayaran: entry.paid_date,
            status: entry.status,
            days_late: entry.days_late,
            kd_transaksi: entry.transaction_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HighRiskResponse {
    pub kd_client: i64,
    pub nama_client: String,
    pub payment_score: Decimal,
    pub total_telat: i32,
    pub is_blacklist: bool,
    pub total_outstanding: Decimal,
}

impl From<HighRiskCustomer> for HighRiskResponse {
    fn from(customer: HighRiskCustomer) -> Self {
        Self {
            kd_client: customer.client_id,
            nama_client: customer.client_name,
            payment_score: customer.payment_score,
            total_telat: customer.late_count,
            is_blacklist: customer.is_blacklisted,
            total_outstanding: customer.total_outstanding,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

fn default_history_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct HighRiskQuery {
    #[serde(default = "default_high_risk_limit")]
    pub limit: i64,
}

fn default_high_risk_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct CreditLimitQuery {
    pub credit_limit: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct BlacklistQuery {
    pub alasan: String,
}

/// GET /finance/customer-credit/profile/{kd_client}
///
/// Recomputes the profile from installment history before returning it.
pub async fn get_profile(
    client_id: web::Path<i64>,
    pool: web::Data<MySqlPool>,
    policy: web::Data<FinancePolicy>,
) -> Result<HttpResponse> {
    let service = credit_service(&pool, &policy);
    let detail = service.profile_detail(client_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": CreditProfileResponse::from(detail),
    })))
}

/// GET /finance/customer-credit/payment-history/{kd_client}
pub async fn get_payment_history(
    client_id: web::Path<i64>,
    query: web::Query<HistoryQuery>,
    pool: web::Data<MySqlPool>,
    policy: web::Data<FinancePolicy>,
) -> Result<HttpResponse> {
    let client_id = client_id.into_inner();
    let service = credit_service(&pool, &policy);
    let history: Vec<PaymentHistoryResponse> = service
        .payment_history(client_id, query.limit)
        .await?
        .into_iter()
        .map(PaymentHistoryResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "kd_client": client_id,
        "total": history.len(),
        "data": history,
    })))
}

/// GET /finance/customer-credit/high-risk-customers
pub async fn get_high_risk_customers(
    query: web::Query<HighRiskQuery>,
    pool: web::Data<MySqlPool>,
    policy: web::Data<FinancePolicy>,
) -> Result<HttpResponse> {
    let service = credit_service(&pool, &policy);
    let customers: Vec<HighRiskResponse> = service
        .high_risk_list(query.limit)
        .await?
        .into_iter()
        .map(HighRiskResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "total": customers.len(),
        "data": customers,
    })))
}

/// POST /finance/customer-credit/credit-limit/{kd_client}
pub async fn set_credit_limit(
    client_id: web::Path<i64>,
    query: web::Query<CreditLimitQuery>,
    pool: web::Data<MySqlPool>,
    policy: web::Data<FinancePolicy>,
) -> Result<HttpResponse> {
    let service = credit_service(&pool, &policy);
    let profile = service
        .set_credit_limit(client_id.into_inner(), query.credit_limit)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Credit limit updated",
        "data": CreditProfileResponse::from(profile),
    })))
}

/// POST /finance/customer-credit/blacklist/{kd_client}
pub async fn blacklist_customer(
    client_id: web::Path<i64>,
    query: web::Query<BlacklistQuery>,
    pool: web::Data<MySqlPool>,
    policy: web::Data<FinancePolicy>,
) -> Result<HttpResponse> {
    let service = credit_service(&pool, &policy);
    let profile = service
        .blacklist(client_id.into_inner(), &query.alasan)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Customer blacklisted",
        "data": CreditProfileResponse::from(profile),
    })))
}

/// POST /finance/customer-credit/whitelist/{kd_client}
pub async fn whitelist_customer(
    client_id: web::Path<i64>,
    pool: web::Data<MySqlPool>,
    policy: web::Data<FinancePolicy>,
) -> Result<HttpResponse> {
    let service = credit_service(&pool, &policy);
    let profile = service.whitelist(client_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Customer removed from blacklist",
        "data": CreditProfileResponse::from(profile),
    })))
}

/// Configure customer credit routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/finance/customer-credit")
            .route("/profile/{kd_client}", web::get().to(get_profile))
            .route("/payment-history/{kd_client}", web::get().to(get_payment_history))
            .route("/high-risk-customers", web::get().to(get_high_risk_customers))
            .route("/credit-limit/{kd_client}", web::post().to(set_credit_limit))
            .route("/blacklist/{kd_client}", web::post().to(blacklist_customer))
            .route("/whitelist/{kd_client}", web::post().to(whitelist_customer)),
    );
}
