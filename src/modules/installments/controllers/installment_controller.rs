// HTTP handlers for installment schedules
//
// Endpoints (prefix /finance/cicilan):
// - POST /schedule/generate
// - GET  /schedule/{kd_cicilan}
// - GET  /overdue?limit=50
// - GET  /active?limit=100
// - POST /schedule/{kd_schedule}/mark-paid
// - POST /schedule/{kd_schedule}/note
// - GET  /summary/{kd_client}

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;

use crate::config::FinancePolicy;
use crate::core::{business_today, parse_date, AppError, Result};
use crate::modules::credit::controllers::credit_controller::credit_service;
use crate::modules::installments::{
    models::{ActivePlan, ClientInstallmentSummary, InstallmentLine, LineStatus, OverdueLine},
    repositories::InstallmentRepository,
    services::{installment_service::GenerateSchedule, InstallmentService},
};

pub fn installment_service(pool: &MySqlPool, policy: &FinancePolicy) -> InstallmentService {
    InstallmentService::new(
        InstallmentRepository::new(pool.clone()),
        Arc::new(credit_service(pool, policy)),
    )
}

/// Response for a single schedule line
#[derive(Debug, Serialize)]
pub struct ScheduleLineResponse {
    pub kd_schedule: i64,
    pub kd_cicilan: i64,
    pub nomor_cicilan: i32,
    pub jumlah: Decimal,
    pub tgl_jatuh_tempo: NaiveDate,
    pub status: LineStatus,
    pub tgl_pembayaran: Option<NaiveDate>,
    pub kd_payment: Option<i64>,
    pub catatan: Option<String>,
    pub is_overdue: bool,
}

impl ScheduleLineResponse {
    pub fn from_line(line: InstallmentLine, as_of: NaiveDate) -> Self {
        let is_overdue = line.is_overdue(as_of);
        Self {
            kd_schedule: line.id,
            kd_cicilan: line.plan_id,
            nomor_cicilan: line.sequence,
            jumlah: line.amount,
            tgl_jatuh_tempo: line.due_date,
            status: line.status,
            tgl_pembayaran: line.paid_date,
            kd_payment: line.payment_id,
            catatan: line.notes,
            is_overdue,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OverdueLineResponse {
    pub kd_schedule: i64,
    pub kd_cicilan: i64,
    pub kd_transaksi: i64,
    pub kd_client: i64,
    pub nama_client: String,
    pub username_client: Option<String>,
    pub nomor_cicilan: i32,
    pub jumlah: Decimal,
    pub tgl_jatuh_tempo: NaiveDate,
    pub days_overdue: i64,
    pub status: LineStatus,
}

impl From<OverdueLine> for OverdueLineResponse {
    fn from(line: OverdueLine) -> Self {
        Self {
            kd_schedule: line.line_id,
            kd_cicilan: line.plan_id,
            kd_transaksi: line.transaction_id,
            kd_client: line.client_id,
            nama_client: line.client_name,
            username_client: line.client_username,
            nomor_cicilan: line.sequence,
            jumlah: line.amount,
            tgl_jatuh_tempo: line.due_date,
            days_overdue: line.days_overdue,
            status: LineStatus::Pending,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActivePlanResponse {
    pub kd_cicilan: i64,
    pub kd_transaksi: i64,
    pub kd_client: i64,
    pub nama_client: String,
    pub total_cicilan: Option<i32>,
    pub total_amount: Decimal,
    pub paid_count: i64,
    pub pending_count: i64,
    pub progress_percentage: i64,
    pub tgl_transaksi: Option<NaiveDate>,
}

impl From<ActivePlan> for ActivePlanResponse {
    fn from(plan: ActivePlan) -> Self {
        Self {
            kd_cicilan: plan.plan_id,
            kd_transaksi: plan.transaction_id,
            kd_client: plan.client_id,
            nama_client: plan.client_name,
            total_cicilan: plan.tenor,
            total_amount: plan.total_amount,
            paid_count: plan.paid_count,
            pending_count: plan.pending_count,
            progress_percentage: plan.progress_percentage,
            tgl_transaksi: plan.transaction_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClientSummaryResponse {
    pub kd_client: i64,
    pub total_outstanding: Decimal,
    pub total_pending_cicilan: i64,
    pub total_overdue: i64,
    pub total_paid: i64,
}

impl From<ClientInstallmentSummary> for ClientSummaryResponse {
    fn from(summary: ClientInstallmentSummary) -> Self {
        Self {
            kd_client: summary.client_id,
            total_outstanding: summary.total_outstanding,
            total_pending_cicilan: summary.pending_count,
            total_overdue: summary.overdue_count,
            total_paid: summary.paid_count,
        }
    }
}

/// Parameters of a schedule generation, from the JSON body or the query string
#[derive(Debug, Default, Deserialize)]
pub struct GenerateScheduleRequest {
    pub kd_cicilan: Option<i64>,
    pub jumlah_cicilan: Option<Decimal>,
    pub tenor: Option<i32>,
    pub tgl_mulai: Option<String>,
}

impl GenerateScheduleRequest {
    /// Parse the optional JSON body; an empty body means query-only parameters
    pub fn from_body(body: &[u8]) -> Result<Option<Self>> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(body)
            .map(Some)
            .map_err(|e| AppError::validation(format!("Invalid JSON body: {}", e)))
    }

    /// Body fields win over query fields
    pub fn merge(self, fallback: GenerateScheduleRequest) -> Self {
        Self {
            kd_cicilan: self.kd_cicilan.or(fallback.kd_cicilan),
            jumlah_cicilan: self.jumlah_cicilan.or(fallback.jumlah_cicilan),
            tenor: self.tenor.or(fallback.tenor),
            tgl_mulai: self.tgl_mulai.or(fallback.tgl_mulai),
        }
    }

    pub fn into_command(self) -> Result<GenerateSchedule> {
        let plan_id = self
            .kd_cicilan
            .ok_or_else(|| AppError::validation("kd_cicilan is required"))?;
        let start_date = self
            .tgl_mulai
            .as_deref()
            .map(|raw| parse_date(raw, "tgl_mulai"))
            .transpose()?;

        Ok(GenerateSchedule {
            plan_id,
            total_amount: self.jumlah_cicilan,
            tenor: self.tenor,
            start_date,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MarkPaidRequest {
    pub kd_payment: Option<i64>,
    pub tgl_pembayaran: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    pub note: String,
}

#[derive(Debug, Deserialize)]
pub struct OverdueQuery {
    #[serde(default = "default_overdue_limit")]
    pub limit: i64,
}

fn default_overdue_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct ActiveQuery {
    #[serde(default = "default_active_limit")]
    pub limit: i64,
}

fn default_active_limit() -> i64 {
    100
}

/// POST /finance/cicilan/schedule/generate
///
/// Replaces the plan's schedule. Omitted amount, tenor and start date fall
/// back to the plan (start date defaults to 30 days after the sale).
pub async fn generate_schedule(
    query: web::Query<GenerateScheduleRequest>,
    body: web::Bytes,
    pool: web::Data<MySqlPool>,
    policy: web::Data<FinancePolicy>,
) -> Result<HttpResponse> {
    let params = match GenerateScheduleRequest::from_body(&body)? {
        Some(body) => body.merge(query.into_inner()),
        None => query.into_inner(),
    };
    let command = params.into_command()?;
    let plan_id = command.plan_id;

    let service = installment_service(&pool, &policy);
    let lines = service.generate_schedule(command).await?;

    let today = business_today();
    let schedules: Vec<ScheduleLineResponse> = lines
        .into_iter()
        .map(|line| ScheduleLineResponse::from_line(line, today))
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": format!("Generated {} cicilan schedules", schedules.len()),
        "kd_cicilan": plan_id,
        "schedules": schedules,
    })))
}

/// GET /finance/cicilan/schedule/{kd_cicilan}
pub async fn get_schedule(
    plan_id: web::Path<i64>,
    pool: web::Data<MySqlPool>,
    policy: web::Data<FinancePolicy>,
) -> Result<HttpResponse> {
    let plan_id = plan_id.into_inner();
    let service = installment_service(&pool, &policy);

    let today = business_today();
    let schedules: Vec<ScheduleLineResponse> = service
        .list_lines(plan_id)
        .await?
        .into_iter()
        .map(|line| ScheduleLineResponse::from_line(line, today))
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "kd_cicilan": plan_id,
        "schedules": schedules,
    })))
}

/// GET /finance/cicilan/overdue
pub async fn get_overdue(
    query: web::Query<OverdueQuery>,
    pool: web::Data<MySqlPool>,
    policy: web::Data<FinancePolicy>,
) -> Result<HttpResponse> {
    let service = installment_service(&pool, &policy);
    let overdue: Vec<OverdueLineResponse> = service
        .list_overdue(query.limit)
        .await?
        .into_iter()
        .map(OverdueLineResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "total_overdue": overdue.len(),
        "data": overdue,
    })))
}

/// GET /finance/cicilan/active
pub async fn get_active(
    query: web::Query<ActiveQuery>,
    pool: web::Data<MySqlPool>,
    policy: web::Data<FinancePolicy>,
) -> Result<HttpResponse> {
    let service = installment_service(&pool, &policy);
    let active: Vec<ActivePlanResponse> = service
        .list_active(query.limit)
        .await?
        .into_iter()
        .map(ActivePlanResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "total_active": active.len(),
        "data": active,
    })))
}

/// POST /finance/cicilan/schedule/{kd_schedule}/mark-paid
///
/// The body is optional; without it the line is paid today and keeps any
/// payment it is already linked to.
pub async fn mark_paid(
    line_id: web::Path<i64>,
    body: Option<web::Json<MarkPaidRequest>>,
    pool: web::Data<MySqlPool>,
    policy: web::Data<FinancePolicy>,
) -> Result<HttpResponse> {
    let line_id = line_id.into_inner();
    let request = body.map(web::Json::into_inner).unwrap_or_default();
    let paid_date = request
        .tgl_pembayaran
        .as_deref()
        .map(|raw| parse_date(raw, "tgl_pembayaran"))
        .transpose()?;

    let service = installment_service(&pool, &policy);
    let line = service.mark_paid(line_id, request.kd_payment, paid_date).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": format!("Cicilan schedule {} marked as paid", line_id),
        "data": ScheduleLineResponse::from_line(line, business_today()),
    })))
}

/// POST /finance/cicilan/schedule/{kd_schedule}/note
pub async fn add_note(
    line_id: web::Path<i64>,
    body: web::Json<NoteRequest>,
    pool: web::Data<MySqlPool>,
    policy: web::Data<FinancePolicy>,
) -> Result<HttpResponse> {
    let service = installment_service(&pool, &policy);
    let catatan = service.add_note(line_id.into_inner(), &body.note).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Catatan berhasil ditambahkan",
        "catatan": catatan,
    })))
}

/// GET /finance/cicilan/summary/{kd_client}
pub async fn get_client_summary(
    client_id: web::Path<i64>,
    pool: web::Data<MySqlPool>,
    policy: web::Data<FinancePolicy>,
) -> Result<HttpResponse> {
    let service = installment_service(&pool, &policy);
    let summary = service.client_summary(client_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": ClientSummaryResponse::from(summary),
    })))
}

/// Configure installment routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/finance/cicilan")
            .route("/schedule/generate", web::post().to(generate_schedule))
            .route("/schedule/{kd_cicilan}", web::get().to(get_schedule))
            .route("/schedule/{kd_schedule}/mark-paid", web::post().to(mark_paid))
            .route("/schedule/{kd_schedule}/note", web::post().to(add_note))
            .route("/overdue", web::get().to(get_overdue))
            .route("/active", web::get().to(get_active))
            .route("/summary/{kd_client}", web::get().to(get_client_summary)),
    );
}
