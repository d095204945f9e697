use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::modules::installments::models::LineStatus;

/// Credit standing of one client (`customer_credit_profile` row).
/// Counters and score are derived from installment history on recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditProfile {
    pub id: i64,
    pub client_id: i64,
    pub credit_limit: Option<Decimal>,
    pub total_outstanding: Decimal,
    /// 0 to 100
    pub payment_score: Decimal,
    pub total_transactions: i32,
    pub on_time_count: i32,
    pub late_count: i32,
    pub is_blacklisted: bool,
    pub blacklist_reason: Option<String>,
}

impl CreditProfile {
    /// Limit left after outstanding installments; a missing limit counts as zero
    pub fn available_credit(&self) -> Decimal {
        self.credit_limit.unwrap_or(Decimal::ZERO) - self.total_outstanding
    }
}

/// Values written back by a recompute
#[derive(Debug, Clone, PartialEq)]
pub struct CreditAggregates {
    pub total_transactions: i32,
    pub on_time_count: i32,
    pub late_count: i32,
    pub payment_score: Decimal,
    pub total_outstanding: Decimal,
}

/// Due and payment dates of a paid installment line
#[derive(Debug, Clone, Copy)]
pub struct PaidLineDates {
    pub due_date: Option<NaiveDate>,
    pub paid_date: Option<NaiveDate>,
}

/// Installment line as read for a client's payment history
#[derive(Debug, Clone)]
pub struct HistoryLine {
    pub line_id: i64,
    pub sequence: i32,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub status: LineStatus,
    pub transaction_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentHistoryEntry {
    pub line_id: i64,
    pub sequence: i32,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub status: LineStatus,
    pub days_late: i64,
    pub transaction_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreditProfileDetail {
    pub profile: CreditProfile,
    pub client_name: String,
    pub available_credit: Decimal,
    pub ontime_percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighRiskCustomer {
    pub client_id: i64,
    pub client_name: String,
    pub payment_score: Decimal,
    pub late_count: i32,
    pub is_blacklisted: bool,
    pub total_outstanding: Decimal,
}
