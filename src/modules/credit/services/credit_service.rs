use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::FinancePolicy;
use crate::core::{business_today, validate_limit, AppError, Money, Result};
use crate::modules::credit::models::{
    CreditAggregates, CreditProfile, CreditProfileDetail, HighRiskCustomer, HistoryLine,
    PaidLineDates, PaymentHistoryEntry,
};
use crate::modules::credit::repositories::CreditProfileRepository;
use crate::modules::credit::services::scoring;
use crate::modules::installments::models::LineStatus;
use crate::modules::installments::services::overdue::{days_overdue, is_overdue};

/// Rebuilds a client's credit profile from installment history.
///
/// The ledger depends on this seam only, so the full rebuild can be
/// swapped for an incremental one without touching callers.
#[async_trait]
pub trait CreditRecompute: Send + Sync {
    async fn recompute(&self, client_id: i64) -> Result<CreditProfile>;
}

/// Width of `customer_credit_profile.alasan_blacklist`
pub const BLACKLIST_REASON_MAX_LEN: usize = 500;

/// Credit profile aggregator
pub struct CreditProfileService {
    repository: Arc<dyn CreditProfileRepository>,
    policy: FinancePolicy,
}

impl CreditProfileService {
    pub fn new(repository: Arc<dyn CreditProfileRepository>, policy: FinancePolicy) -> Self {
        Self { repository, policy }
    }

    async fn require_client(&self, client_id: i64) -> Result<String> {
        self.repository
            .client_name(client_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Client {} not found", client_id)))
    }

    /// Profile of an existing client, created with defaults on first access
    pub async fn get_or_create(&self, client_id: i64) -> Result<CreditProfile> {
        self.require_client(client_id).await?;
        self.repository
            .get_or_create(client_id, self.policy.default_credit_limit)
            .await
    }

    /// Full rebuild of counters, score and outstanding balance
    pub async fn rebuild(&self, client_id: i64) -> Result<CreditProfile> {
        self.get_or_create(client_id).await?;

        let paid_lines = self.repository.paid_line_dates(client_id).await?;
        let total_transactions = self.repository.transaction_count(client_id).await?;
        let total_outstanding = self.repository.pending_total(client_id).await?;

        let aggregates = Self::aggregate(&paid_lines, total_transactions, total_outstanding)?;
        let profile = self.repository.save_aggregates(client_id, &aggregates).await?;

        info!(
            client_id,
            on_time = aggregates.on_time_count,
            late = aggregates.late_count,
            total_transactions = aggregates.total_transactions,
            payment_score = %aggregates.payment_score,
            total_outstanding = %Money::format_rupiah(aggregates.total_outstanding),
            "Credit profile recomputed"
        );

        Ok(profile)
    }

    /// Derive the stored aggregates from raw history
    pub fn aggregate(
        paid_lines: &[PaidLineDates],
        total_transactions: i64,
        total_outstanding: Decimal,
    ) -> Result<CreditAggregates> {
        let tally = scoring::tally(paid_lines);
        let transactions = i32::try_from(total_transactions)
            .map_err(|_| AppError::internal("Transaction count exceeds column range"))?;

        Ok(CreditAggregates {
            total_transactions: transactions,
            on_time_count: tally.on_time,
            late_count: tally.late,
            payment_score: scoring::payment_score(tally.on_time, tally.late, total_transactions),
            total_outstanding,
        })
    }

    /// Recompute, then describe the profile for display
    pub async fn profile_detail(&self, client_id: i64) -> Result<CreditProfileDetail> {
        let client_name = self.require_client(client_id).await?;
        let profile = self.rebuild(client_id).await?;

        Ok(CreditProfileDetail {
            available_credit: profile.available_credit(),
            ontime_percentage: scoring::ontime_percentage(
                profile.on_time_count,
                profile.total_transactions,
            ),
            client_name,
            profile,
        })
    }

    pub async fn payment_history(&self, client_id: i64, limit: i64) -> Result<Vec<PaymentHistoryEntry>> {
        let limit = validate_limit(limit)?;
        self.require_client(client_id).await?;

        let lines = self.repository.history_lines(client_id, limit).await?;
        let today = business_today();

        Ok(lines
            .into_iter()
            .map(|line| Self::history_entry(line, today))
            .collect())
    }

    /// Days late: payment delay for paid lines, time since due for overdue ones
    pub fn history_entry(line: HistoryLine, as_of: NaiveDate) -> PaymentHistoryEntry {
        let days_late = match (line.status, line.paid_date) {
            (LineStatus::Paid, Some(paid)) => days_overdue(line.due_date, paid).max(0),
            (LineStatus::Overdue, _) => days_overdue(line.due_date, as_of).max(0),
            (status, _) if is_overdue(status, line.due_date, as_of) => days_overdue(line.due_date, as_of),
            _ => 0,
        };

        PaymentHistoryEntry {
            line_id: line.line_id,
            sequence: line.sequence,
            amount: line.amount,
            due_date: line.due_date,
            paid_date: line.paid_date,
            status: line.status,
            days_late,
            transaction_id: line.transaction_id,
        }
    }

    pub async fn set_credit_limit(&self, client_id: i64, limit: Decimal) -> Result<CreditProfile> {
        Money::ensure_non_negative(limit, "credit_limit")?;
        self.get_or_create(client_id).await?;

        let profile = self.repository.set_credit_limit(client_id, limit).await?;
        info!(client_id, credit_limit = %limit, "Credit limit updated");

        Ok(profile)
    }

    pub async fn blacklist(&self, client_id: i64, reason: &str) -> Result<CreditProfile> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::validation("Blacklist reason (alasan) is required"));
        }
        if reason.chars().count() > BLACKLIST_REASON_MAX_LEN {
            return Err(AppError::validation(format!(
                "Blacklist reason (alasan) cannot exceed {} characters",
                BLACKLIST_REASON_MAX_LEN
            )));
        }
        self.get_or_create(client_id).await?;

        let profile = self.repository.set_blacklist(client_id, true, Some(reason)).await?;
        warn!(client_id, reason, "Customer blacklisted");

        Ok(profile)
    }

    pub async fn whitelist(&self, client_id: i64) -> Result<CreditProfile> {
        self.get_or_create(client_id).await?;

        let profile = self.repository.set_blacklist(client_id, false, None).await?;
        info!(client_id, "Customer removed from blacklist");

        Ok(profile)
    }

    pub async fn high_risk_list(&self, limit: i64) -> Result<Vec<HighRiskCustomer>> {
        let limit = validate_limit(limit)?;
        self.repository.high_risk(limit).await
    }
}

#[async_trait]
impl CreditRecompute for CreditProfileService {
    async fn recompute(&self, client_id: i64) -> Result<CreditProfile> {
        self.rebuild(client_id).await
    }
}
