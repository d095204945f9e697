// Business logic for installment schedules:
// - schedule (re)generation from a plan
// - line listing with overdue flags
// - marking lines paid, followed by a credit profile recompute
// - dated notes
// - overdue / active / per-client reports

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::core::{business_today, validate_limit, AppError, Money, Result};
use crate::modules::credit::services::CreditRecompute;
use crate::modules::installments::{
    models::{
        ActivePlan, ClientInstallmentSummary, InstallmentLine, InstallmentPlan, LineStatus,
        NewInstallmentPlan, OverdueLine,
    },
    repositories::{ActivePlanRow, ClientLine, InstallmentRepository, PendingLine},
    services::{
        overdue::{days_overdue, is_overdue},
        ScheduleGenerator, DEFAULT_TENOR,
    },
};

/// Input of a schedule (re)generation. Omitted fields fall back to the plan.
#[derive(Debug, Clone)]
pub struct GenerateSchedule {
    pub plan_id: i64,
    pub total_amount: Option<Decimal>,
    pub tenor: Option<i32>,
    pub start_date: Option<NaiveDate>,
}

/// Service for installment schedule business logic
pub struct InstallmentService {
    repository: InstallmentRepository,
    credit: Arc<dyn CreditRecompute>,
}

impl InstallmentService {
    pub fn new(repository: InstallmentRepository, credit: Arc<dyn CreditRecompute>) -> Self {
        Self { repository, credit }
    }

    /// Replace a plan's schedule with a freshly generated one.
    ///
    /// Lines previously attached to the plan are deleted together with
    /// their notes and payment state.
    pub async fn generate_schedule(&self, request: GenerateSchedule) -> Result<Vec<InstallmentLine>> {
        if let Some(tenor) = request.tenor {
            ScheduleGenerator::validate_tenor(tenor)?;
        }
        if let Some(total) = request.total_amount {
            Money::ensure_non_negative(total, "jumlah_cicilan")?;
        }

        let plan = self
            .repository
            .find_plan(request.plan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Installment plan {} not found", request.plan_id)))?;

        let total_amount = request.total_amount.unwrap_or(plan.total_amount);
        let tenor = request.tenor.or(plan.tenor).unwrap_or(DEFAULT_TENOR);
        let start_date = match request.start_date {
            Some(date) => date,
            None => ScheduleGenerator::default_start_date(plan.transaction_date)?,
        };

        let lines = ScheduleGenerator::build(total_amount, tenor, start_date)?;
        self.repository.replace_schedule(plan.id, &lines).await?;

        info!(
            plan_id = plan.id,
            tenor,
            total_amount = %Money::format_rupiah(total_amount),
            start_date = %start_date,
            "Installment schedule generated"
        );

        self.repository.list_lines(plan.id).await
    }

    /// Lines of a plan in sequence order; empty when the plan has none
    pub async fn list_lines(&self, plan_id: i64) -> Result<Vec<InstallmentLine>> {
        self.repository.list_lines(plan_id).await
    }

    /// Mark a line paid and refresh the owning client's credit profile
    pub async fn mark_paid(
        &self,
        line_id: i64,
        payment_id: Option<i64>,
        paid_date: Option<NaiveDate>,
    ) -> Result<InstallmentLine> {
        let paid_date = paid_date.unwrap_or_else(business_today);

        let paid = self
            .repository
            .mark_paid(line_id, payment_id, paid_date)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Installment line {} not found", line_id)))?;

        info!(
            line_id,
            plan_id = paid.line.plan_id,
            client_id = paid.client_id,
            paid_date = %paid_date,
            "Installment line marked paid"
        );

        self.credit.recompute(paid.client_id).await?;

        Ok(paid.line)
    }

    /// Append a dated note to a line and return the full notes text
    pub async fn add_note(&self, line_id: i64, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(AppError::validation("Note cannot be empty"));
        }

        let notes = self
            .repository
            .append_note(line_id, business_today(), text)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Installment line {} not found", line_id)))?;

        info!(line_id, "Note added to installment line");

        Ok(notes)
    }

    /// Overdue lines across all plans, earliest due first
    pub async fn list_overdue(&self, limit: i64) -> Result<Vec<OverdueLine>> {
        let limit = validate_limit(limit)?;
        let pending = self.repository.pending_lines().await?;

        Ok(Self::overdue_report(pending, business_today(), limit))
    }

    /// Keep the overdue pending lines, enriched for the report
    pub fn overdue_report(pending: Vec<PendingLine>, as_of: NaiveDate, limit: i64) -> Vec<OverdueLine> {
        pending
            .into_iter()
            .filter(|line| is_overdue(LineStatus::Pending, line.tgl_jatuh_tempo, as_of))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .map(|line| OverdueLine {
                line_id: line.kd_schedule,
                plan_id: line.kd_cicilan,
                transaction_id: line.kd_transaksi,
                client_id: line.kd_client,
                client_name: line.nama_client.unwrap_or_else(|| "Unknown".to_string()),
                client_username: line.username_client,
                sequence: line.nomor_cicilan,
                amount: line.jumlah,
                due_date: line.tgl_jatuh_tempo,
                days_overdue: days_overdue(line.tgl_jatuh_tempo, as_of),
            })
            .collect()
    }

    /// Plans still collecting, with their progress
    pub async fn list_active(&self, limit: i64) -> Result<Vec<ActivePlan>> {
        let limit = validate_limit(limit)?;
        let rows = self.repository.active_plans(limit).await?;

        Ok(rows.into_iter().map(ActivePlan::from).collect())
    }

    /// Outstanding, pending, overdue and paid position of one client
    pub async fn client_summary(&self, client_id: i64) -> Result<ClientInstallmentSummary> {
        let lines = self.repository.client_lines(client_id).await?;
        Ok(Self::summarize(client_id, &lines, business_today()))
    }

    pub fn summarize(client_id: i64, lines: &[ClientLine], as_of: NaiveDate) -> ClientInstallmentSummary {
        let mut summary = ClientInstallmentSummary {
            client_id,
            ..Default::default()
        };

        for line in lines {
            match line.status {
                LineStatus::Pending => {
                    summary.pending_count += 1;
                    summary.total_outstanding += line.amount;
                }
                LineStatus::Paid => summary.paid_count += 1,
                LineStatus::Overdue | LineStatus::Skipped => {}
            }
            if is_overdue(line.status, line.due_date, as_of) {
                summary.overdue_count += 1;
            }
        }

        summary
    }

    /// Attach a new installment plan to an existing sale
    pub async fn create_plan(&self, plan: NewInstallmentPlan) -> Result<InstallmentPlan> {
        ScheduleGenerator::validate_tenor(plan.tenor)?;
        Money::ensure_non_negative(plan.total_amount, "jumlah_cicilan")?;

        let plan_id = self.repository.create_plan(&plan).await?;
        info!(plan_id, transaction_id = plan.transaction_id, tenor = plan.tenor, "Installment plan created");

        self.repository.find_plan(plan_id).await?.ok_or_else(|| {
            warn!(plan_id, "Installment plan vanished after insert");
            AppError::internal("Installment plan not readable after insert")
        })
    }
}

impl From<ActivePlanRow> for ActivePlan {
    fn from(row: ActivePlanRow) -> Self {
        ActivePlan {
            plan_id: row.kd_cicilan,
            transaction_id: row.kd_transaksi,
            client_id: row.kd_client,
            client_name: row.nama_client.unwrap_or_else(|| "Unknown".to_string()),
            tenor: row.tenor,
            total_amount: row.total_amount,
            paid_count: row.paid_count,
            pending_count: row.pending_count,
            progress_percentage: ActivePlan::progress(row.paid_count, row.pending_count),
            transaction_date: row.tanggal,
        }
    }
}
