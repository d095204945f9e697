use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Entry of the global overdue report
#[derive(Debug, Clone, Serialize)]
pub struct OverdueLine {
    pub line_id: i64,
    pub plan_id: i64,
    pub transaction_id: i64,
    pub client_id: i64,
    pub client_name: String,
    pub client_username: Option<String>,
    pub sequence: i32,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub days_overdue: i64,
}

/// Plan with at least one pending line, with collection progress
#[derive(Debug, Clone, Serialize)]
pub struct ActivePlan {
    pub plan_id: i64,
    pub transaction_id: i64,
    pub client_id: i64,
    pub client_name: String,
    pub tenor: Option<i32>,
    pub total_amount: Decimal,
    pub paid_count: i64,
    pub pending_count: i64,
    pub progress_percentage: i64,
    pub transaction_date: Option<NaiveDate>,
}

impl ActivePlan {
    /// Share of settled lines, truncated to a whole percent
    pub fn progress(paid_count: i64, pending_count: i64) -> i64 {
        let total = paid_count + pending_count;
        if total <= 0 {
            return 0;
        }
        paid_count * 100 / total
    }
}

/// Installment position of one client across all plans
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClientInstallmentSummary {
    pub client_id: i64,
    pub total_outstanding: Decimal,
    pub pending_count: i64,
    pub overdue_count: i64,
    pub paid_count: i64,
}
