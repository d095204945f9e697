// HTTP handlers for sale intake
//
// Endpoints (prefix /sales):
// - POST /transaksi
// - POST /transaksi/{kd_transaksi}/cicilan

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::MySqlPool;

use crate::config::FinancePolicy;
use crate::core::{business_today, parse_date, Result};
use crate::modules::installments::{
    controllers::installment_controller::{installment_service, ScheduleLineResponse},
    models::NewInstallmentPlan,
    repositories::InstallmentRepository,
};
use crate::modules::invoices::controllers::invoice_controller::InvoiceResponse;
use crate::modules::sales::{
    models::{NewSale, SaleLine},
    repositories::SaleRepository,
    services::SaleService,
};

#[derive(Debug, Deserialize)]
pub struct CreateSaleRequest {
    pub kd_client: i64,
    pub kd_sales: Option<i64>,
    /// Defaults to today
    pub tanggal: Option<String>,
    pub metode_pembayaran: String,
    pub details: Vec<SaleLine>,
    pub dp: Option<Decimal>,
    pub jumlah_cicilan: Option<Decimal>,
    pub tenor: Option<i32>,
}

impl CreateSaleRequest {
    pub fn into_new_sale(self) -> Result<NewSale> {
        let date = match self.tanggal.as_deref() {
            Some(raw) => parse_date(raw, "tanggal")?,
            None => business_today(),
        };

        Ok(NewSale {
            client_id: self.kd_client,
            sales_id: self.kd_sales,
            date,
            method: self.metode_pembayaran.parse()?,
            lines: self.details,
            down_payment: self.dp.unwrap_or(Decimal::ZERO),
            financed_amount: self.jumlah_cicilan,
            tenor: self.tenor,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub jumlah_cicilan: Decimal,
    pub tenor: i32,
    pub tgl_jatuh_tempo: Option<String>,
}

/// POST /sales/transaksi
///
/// Records the sale, invoices it and, for cicilan sales, generates the
/// installment schedule.
pub async fn create_sale(
    request: web::Json<CreateSaleRequest>,
    pool: web::Data<MySqlPool>,
    policy: web::Data<FinancePolicy>,
) -> Result<HttpResponse> {
    let new_sale = request.into_inner().into_new_sale()?;

    let service = SaleService::new(
        SaleRepository::new(pool.get_ref().clone()),
        InstallmentRepository::new(pool.get_ref().clone()),
        policy.get_ref().clone(),
    );
    let recorded = service.record_sale(new_sale).await?;

    let today = business_today();
    let cicilan = recorded.plan.map(|plan| {
        let tenor = plan.tenor.unwrap_or_default();
        let estimasi_per_bulan = recorded.schedule.first().map(|line| line.amount);
        serde_json::json!({
            "kd_cicilan": plan.id,
            "jumlah_cicilan": plan.total_amount,
            "tenor": tenor,
            "estimasi_per_bulan": estimasi_per_bulan,
            "schedules": recorded
                .schedule
                .into_iter()
                .map(|line| ScheduleLineResponse::from_line(line, today))
                .collect::<Vec<_>>(),
        })
    });

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "kd_transaksi": recorded.sale.id,
        "kd_client": recorded.sale.client_id,
        "tanggal": recorded.sale.date,
        "metode_pembayaran": recorded.sale.method,
        "total": recorded.sale.total,
        "invoice": InvoiceResponse::from(recorded.invoice),
        "dp_invoice": recorded.down_payment_invoice.map(InvoiceResponse::from),
        "cicilan": cicilan,
    })))
}

/// POST /sales/transaksi/{kd_transaksi}/cicilan
///
/// Attaches a plan without generating its schedule.
pub async fn create_plan(
    transaction_id: web::Path<i64>,
    request: web::Json<CreatePlanRequest>,
    pool: web::Data<MySqlPool>,
    policy: web::Data<FinancePolicy>,
) -> Result<HttpResponse> {
    let request = request.into_inner();
    let legacy_due_date = request
        .tgl_jatuh_tempo
        .as_deref()
        .map(|raw| parse_date(raw, "tgl_jatuh_tempo"))
        .transpose()?;

    let service = installment_service(&pool, &policy);
    let plan = service
        .create_plan(NewInstallmentPlan {
            transaction_id: transaction_id.into_inner(),
            total_amount: request.jumlah_cicilan,
            tenor: request.tenor,
            legacy_due_date,
        })
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "kd_cicilan": plan.id,
        "kd_transaksi": plan.transaction_id,
        "jumlah_cicilan": plan.total_amount,
        "tenor": plan.tenor,
        "tgl_jatuh_tempo": plan.legacy_due_date,
    })))
}

/// Configure sale intake routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/sales")
            .route("/transaksi", web::post().to(create_sale))
            .route("/transaksi/{kd_transaksi}/cicilan", web::post().to(create_plan)),
    );
}
