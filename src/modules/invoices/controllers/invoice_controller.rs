// HTTP handlers for the invoice ledger
//
// Endpoints (prefix /finance/invoices):
// - POST /manual
// - GET  /?limit=50&offset=0
// - GET  /aging
// - POST /generate-from-transactions
// - GET  /{kd_invoice}
// - POST /{kd_invoice}/pay

use actix_web::{web, HttpResponse};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;

use crate::config::FinancePolicy;
use crate::core::{business_today, parse_date, Result};
use crate::modules::invoices::{
    models::{Invoice, InvoiceStatus, OpenInvoice, Payment, PaymentType},
    repositories::{InvoiceRepository, PaymentRepository},
    services::{InvoiceService, ManualInvoice, RecordPayment},
};

pub fn invoice_service(pool: &MySqlPool, policy: &FinancePolicy) -> InvoiceService {
    InvoiceService::new(
        InvoiceRepository::new(pool.clone()),
        PaymentRepository::new(pool.clone()),
        policy.clone(),
    )
}

#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub kd_invoice: i64,
    pub kd_transaksi: Option<i64>,
    pub kd_client: Option<i64>,
    pub nomor_invoice: String,
    pub status: InvoiceStatus,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub remaining: Decimal,
    pub tanggal_jatuh_tempo: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            remaining: invoice.remaining(),
            kd_invoice: invoice.id,
            kd_transaksi: invoice.transaction_id,
            kd_client: invoice.client_id,
            nomor_invoice: invoice.number,
            status: invoice.status,
            total_amount: invoice.total_amount,
            paid_amount: invoice.paid_amount,
            tanggal_jatuh_tempo: invoice.due_date,
            created_at: invoice.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OpenInvoiceResponse {
    #[serde(flatten)]
    pub invoice: InvoiceResponse,
    pub client_name: String,
}

impl From<OpenInvoice> for OpenInvoiceResponse {
    fn from(open: OpenInvoice) -> Self {
        Self {
            invoice: open.invoice.into(),
            client_name: open.client_name,
        }
    }
}

/// Payment as shown to finance staff
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub kd_payment: i64,
    pub kd_invoice: Option<i64>,
    pub kd_transaksi: Option<i64>,
    pub kd_client: Option<i64>,
    pub jumlah: Decimal,
    pub jenis: PaymentType,
    pub tanggal: NaiveDate,
    pub status: String,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub approval_status: String,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            kd_payment: payment.id,
            kd_invoice: payment.invoice_id,
            kd_transaksi: payment.transaction_id,
            kd_client: payment.client_id,
            jumlah: payment.amount,
            jenis: payment.kind,
            tanggal: payment.date,
            status: payment.status,
            reference: payment.reference,
            note: payment.note,
            approval_status: payment.approval_status.to_string(),
            approved_by: payment.approved_by,
            approved_at: payment.approved_at,
            created_at: payment.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ManualInvoiceRequest {
    pub kd_client: i64,
    pub tanggal: String,
    pub total_amount: Decimal,
    pub due_days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub jumlah: Decimal,
    pub jenis: String,
    pub tanggal: Option<String>,
    pub reference: Option<String>,
    pub note: Option<String>,
}

impl RecordPaymentRequest {
    pub fn into_command(self) -> Result<RecordPayment> {
        let date = self
            .tanggal
            .as_deref()
            .map(|raw| parse_date(raw, "tanggal"))
            .transpose()?;

        Ok(RecordPayment {
            amount: self.jumlah,
            kind: self.jenis.parse()?,
            date,
            reference: self.reference,
            note: self.note,
        })
    }
}

/// POST /finance/invoices/manual
pub async fn create_manual_invoice(
    request: web::Json<ManualInvoiceRequest>,
    pool: web::Data<MySqlPool>,
    policy: web::Data<FinancePolicy>,
) -> Result<HttpResponse> {
    let request = request.into_inner();
    let date = parse_date(&request.tanggal, "tanggal")?;

    let service = invoice_service(&pool, &policy);
    let invoice = service
        .create_manual(ManualInvoice {
            client_id: request.kd_client,
            date,
            total_amount: request.total_amount,
            due_days: request.due_days,
        })
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "data": InvoiceResponse::from(invoice),
    })))
}

/// GET /finance/invoices
pub async fn list_open_invoices(
    query: web::Query<ListInvoicesQuery>,
    pool: web::Data<MySqlPool>,
    policy: web::Data<FinancePolicy>,
) -> Result<HttpResponse> {
    let service = invoice_service(&pool, &policy);
    let invoices: Vec<OpenInvoiceResponse> = service
        .list_open(query.limit, query.offset)
        .await?
        .into_iter()
        .map(OpenInvoiceResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "total": invoices.len(),
        "invoices": invoices,
    })))
}

/// GET /finance/invoices/aging
pub async fn get_aging_report(
    pool: web::Data<MySqlPool>,
    policy: web::Data<FinancePolicy>,
) -> Result<HttpResponse> {
    let service = invoice_service(&pool, &policy);
    let as_of = business_today();
    let report = service.aging_report(as_of).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "as_of": as_of,
        "current": report.current,
        "days_30_60": report.days_30_60,
        "days_60_90": report.days_60_90,
        "days_90_plus": report.days_90_plus,
        "total": report.total,
    })))
}

/// GET /finance/invoices/{kd_invoice}
pub async fn get_invoice_detail(
    invoice_id: web::Path<i64>,
    pool: web::Data<MySqlPool>,
    policy: web::Data<FinancePolicy>,
) -> Result<HttpResponse> {
    let service = invoice_service(&pool, &policy);
    let detail = service.invoice_detail(invoice_id.into_inner()).await?;

    let payments: Vec<PaymentResponse> = detail.payments.into_iter().map(PaymentResponse::from).collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "invoice": InvoiceResponse::from(detail.invoice),
        "payments": payments,
    })))
}

/// POST /finance/invoices/{kd_invoice}/pay
pub async fn record_payment(
    invoice_id: web::Path<i64>,
    request: web::Json<RecordPaymentRequest>,
    pool: web::Data<MySqlPool>,
    policy: web::Data<FinancePolicy>,
) -> Result<HttpResponse> {
    let command = request.into_inner().into_command()?;

    let service = invoice_service(&pool, &policy);
    let (payment, invoice) = service.record_payment(invoice_id.into_inner(), command).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "payment": PaymentResponse::from(payment),
        "invoice": InvoiceResponse::from(invoice),
    })))
}

/// POST /finance/invoices/generate-from-transactions
pub async fn generate_from_transactions(
    pool: web::Data<MySqlPool>,
    policy: web::Data<FinancePolicy>,
) -> Result<HttpResponse> {
    let service = invoice_service(&pool, &policy);
    let count = service.generate_from_transactions().await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": format!("Generated {} invoices from existing transactions", count),
        "count": count,
    })))
}

/// Configure invoice routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/finance/invoices")
            .route("", web::get().to(list_open_invoices))
            .route("/manual", web::post().to(create_manual_invoice))
            .route("/aging", web::get().to(get_aging_report))
            .route("/generate-from-transactions", web::post().to(generate_from_transactions))
            .route("/{kd_invoice}", web::get().to(get_invoice_detail))
            .route("/{kd_invoice}/pay", web::post().to(record_payment)),
    );
}
