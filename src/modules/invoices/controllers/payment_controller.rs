// HTTP handlers for the payment ledger and payment approval
//
// Endpoints:
// - POST /finance/payments
// - GET  /finance/payments?limit=50&offset=0
// - GET  /finance/payment/pending?limit=50
// - POST /finance/payment/{kd_payment}/approve
// - POST /finance/payment/{kd_payment}/reject

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;

use crate::core::{parse_date, Result};
use crate::modules::invoices::{
    controllers::invoice_controller::PaymentResponse,
    models::LedgerPayment,
    repositories::PaymentRepository,
    services::{PaymentService, StandalonePayment},
};

#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    pub kd_transaksi: Option<i64>,
    pub jumlah: Decimal,
    pub jenis: String,
    /// Defaults to today
    pub tanggal: Option<String>,
    pub status: Option<String>,
    pub reference: Option<String>,
    pub note: Option<String>,
}

impl CreatePaymentRequest {
    pub fn into_command(self) -> Result<StandalonePayment> {
        let date = self
            .tanggal
            .as_deref()
            .map(|raw| parse_date(raw, "tanggal"))
            .transpose()?;

        Ok(StandalonePayment {
            transaction_id: self.kd_transaksi,
            amount: self.jumlah,
            kind: self.jenis.parse()?,
            date,
            status: self.status,
            reference: self.reference,
            note: self.note,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LedgerQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// Payment ledger row
#[derive(Debug, Serialize)]
pub struct LedgerPaymentResponse {
    #[serde(flatten)]
    pub payment: PaymentResponse,
    pub client_name: Option<String>,
    pub invoice_code: Option<String>,
}

impl From<LedgerPayment> for LedgerPaymentResponse {
    fn from(entry: LedgerPayment) -> Self {
        Self {
            payment: entry.payment.into(),
            client_name: entry.client_name,
            invoice_code: entry.invoice_number,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub approved_by: String,
}

fn payment_service(pool: &MySqlPool) -> PaymentService {
    PaymentService::new(PaymentRepository::new(pool.clone()))
}

/// POST /finance/payments
pub async fn create_payment(
    request: web::Json<CreatePaymentRequest>,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse> {
    let command = request.into_inner().into_command()?;
    let payment = payment_service(&pool).record(command).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "payment": PaymentResponse::from(payment),
    })))
}

/// GET /finance/payments
pub async fn list_payments(
    query: web::Query<LedgerQuery>,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse> {
    let payments: Vec<LedgerPaymentResponse> = payment_service(&pool)
        .list_ledger(query.limit, query.offset)
        .await?
        .into_iter()
        .map(LedgerPaymentResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "payments": payments,
    })))
}

/// GET /finance/payment/pending
pub async fn list_pending(
    query: web::Query<PendingQuery>,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse> {
    let payments: Vec<PaymentResponse> = payment_service(&pool)
        .list_pending(query.limit)
        .await?
        .into_iter()
        .map(PaymentResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "payments": payments,
    })))
}

/// POST /finance/payment/{kd_payment}/approve
pub async fn approve_payment(
    payment_id: web::Path<i64>,
    request: web::Json<ApprovalRequest>,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse> {
    let payment = payment_service(&pool)
        .approve(payment_id.into_inner(), &request.approved_by)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "status": "approved",
        "kd_payment": payment.id,
        "data": PaymentResponse::from(payment),
    })))
}

/// POST /finance/payment/{kd_payment}/reject
pub async fn reject_payment(
    payment_id: web::Path<i64>,
    request: web::Json<ApprovalRequest>,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse> {
    let payment = payment_service(&pool)
        .reject(payment_id.into_inner(), &request.approved_by)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "status": "rejected",
        "kd_payment": payment.id,
        "data": PaymentResponse::from(payment),
    })))
}

/// Configure payment ledger and approval routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/finance/payments")
            .route("", web::post().to(create_payment))
            .route("", web::get().to(list_payments)),
    )
    .service(
        web::scope("/finance/payment")
            .route("/pending", web::get().to(list_pending))
            .route("/{kd_payment}/approve", web::post().to(approve_payment))
            .route("/{kd_payment}/reject", web::post().to(reject_payment)),
    );
}
