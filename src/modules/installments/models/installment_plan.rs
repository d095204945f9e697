use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Installment plan attached to a sale transaction (`cicilan` row)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentPlan {
    pub id: i64,
    pub transaction_id: i64,
    /// Amount financed through installments
    pub total_amount: Decimal,
    pub tenor: Option<i32>,
    /// Single due date kept from before schedules existed
    pub legacy_due_date: Option<NaiveDate>,
    pub status: String,
    /// Date of the owning sale, drives the default schedule start
    pub transaction_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct NewInstallmentPlan {
    pub transaction_id: i64,
    pub total_amount: Decimal,
    pub tenor: i32,
    pub legacy_due_date: Option<NaiveDate>,
}
