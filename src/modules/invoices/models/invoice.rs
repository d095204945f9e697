// Invoice model and status derivation
//
// An invoice tracks what a sale (or a manual charge) costs against what has
// been paid so far. Its status follows from those two amounts; `overdue`
// and `cancelled` are only ever set by back-office staff.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::timezone::compact_date;
use crate::core::{AppError, Result};
use crate::modules::installments::services::overdue::days_overdue;
use crate::modules::invoices::models::Payment;

/// Invoice status lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Nothing paid yet
    Outstanding,
    /// Paid in part
    Partial,
    /// Paid in full
    Paid,
    /// Flagged by staff as past due
    Overdue,
    /// Voided by staff
    Cancelled,
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        InvoiceStatus::Outstanding
    }
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Outstanding => "outstanding",
            InvoiceStatus::Partial => "partial",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    /// Statuses still carrying a balance for the aging report
    pub fn is_receivable(&self) -> bool {
        matches!(
            self,
            InvoiceStatus::Outstanding | InvoiceStatus::Partial | InvoiceStatus::Overdue
        )
    }

    /// Status implied by the amounts of an invoice
    pub fn derive(paid_amount: Decimal, total_amount: Decimal) -> Self {
        if paid_amount >= total_amount {
            InvoiceStatus::Paid
        } else if paid_amount > Decimal::ZERO {
            InvoiceStatus::Partial
        } else {
            InvoiceStatus::Outstanding
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "outstanding" => Ok(InvoiceStatus::Outstanding),
            "partial" => Ok(InvoiceStatus::Partial),
            "paid" => Ok(InvoiceStatus::Paid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            "cancelled" => Ok(InvoiceStatus::Cancelled),
            _ => Err(AppError::Internal(format!("Invalid invoice status: {}", s))),
        }
    }
}

impl TryFrom<String> for InvoiceStatus {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// A billable event (`invoice` row)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    /// Sale the invoice bills; empty for manual invoices
    pub transaction_id: Option<i64>,
    /// Client billed by a manual invoice
    pub client_id: Option<i64>,
    pub number: String,
    pub status: InvoiceStatus,
    pub total_amount: Decimal,
    /// Running total of recorded payments
    pub paid_amount: Decimal,
    pub due_date: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Invoice {
    pub fn remaining(&self) -> Decimal {
        self.total_amount - self.paid_amount
    }

    /// Days past the due date; negative while not yet due
    pub fn days_overdue(&self, as_of: NaiveDate) -> Option<i64> {
        self.due_date.map(|due| days_overdue(due, as_of))
    }
}

/// Invoice about to be inserted
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub transaction_id: Option<i64>,
    pub client_id: Option<i64>,
    pub number: String,
    pub status: InvoiceStatus,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub due_date: Option<NaiveDate>,
}

/// Open invoice with the name of the billed client
#[derive(Debug, Clone, Serialize)]
pub struct OpenInvoice {
    pub invoice: Invoice,
    pub client_name: String,
}

/// Invoice with its payments, newest first
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDetail {
    pub invoice: Invoice,
    pub payments: Vec<Payment>,
    pub remaining: Decimal,
}

/// Invoice number formats
pub struct InvoiceNumber;

impl InvoiceNumber {
    /// Main invoice of a sale: `INV-000042-20240101`
    pub fn for_sale(transaction_id: i64, date: NaiveDate) -> String {
        format!("INV-{:06}-{}", transaction_id, compact_date(date))
    }

    /// Down-payment invoice of a sale: `INV-DP-000042-20240101`
    pub fn down_payment(transaction_id: i64, date: NaiveDate) -> String {
        format!("INV-DP-{:06}-{}", transaction_id, compact_date(date))
    }

    /// Manual charge, unique per second: `INV-MANUAL-7-20240101-1704067200`
    pub fn manual(client_id: i64, date: NaiveDate, created_at: DateTime<Utc>) -> String {
        format!(
            "INV-MANUAL-{}-{}-{}",
            client_id,
            compact_date(date),
            created_at.timestamp()
        )
    }
}
