use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// How the money was received (`payment.jenis`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Cash,
    Transfer,
    /// Down payment on a sale
    Dp,
    /// Installment settlement
    Cicilan,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "cash",
            PaymentType::Transfer => "transfer",
            PaymentType::Dp => "dp",
            PaymentType::Cicilan => "cicilan",
        }
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentType::Cash),
            "transfer" => Ok(PaymentType::Transfer),
            "dp" => Ok(PaymentType::Dp),
            "cicilan" => Ok(PaymentType::Cicilan),
            other => Err(AppError::validation(format!(
                "jenis must be one of cash, transfer, dp, cicilan; got '{}'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for PaymentType {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Finance approval state of a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ApprovalStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" => Ok(ApprovalStatus::Rejected),
            _ => Err(AppError::Internal(format!("Invalid approval status: {}", s))),
        }
    }
}

impl TryFrom<String> for ApprovalStatus {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Money received (`payment` row)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub invoice_id: Option<i64>,
    pub transaction_id: Option<i64>,
    pub client_id: Option<i64>,
    pub amount: Decimal,
    pub kind: PaymentType,
    pub date: NaiveDate,
    pub status: String,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub approval_status: ApprovalStatus,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Row in the payment ledger listing
#[derive(Debug, Clone, Serialize)]
pub struct LedgerPayment {
    pub payment: Payment,
    pub client_name: Option<String>,
    /// Number of the invoice the payment settles, if any
    pub invoice_number: Option<String>,
}

/// Status stored on payments that arrive without one
pub const DEFAULT_PAYMENT_STATUS: &str = "completed";

/// Payment about to be inserted
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub invoice_id: Option<i64>,
    pub transaction_id: Option<i64>,
    pub client_id: Option<i64>,
    pub amount: Decimal,
    pub kind: PaymentType,
    pub date: NaiveDate,
    pub status: String,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub approval_status: ApprovalStatus,
}

impl NewPayment {
    /// Payment recorded by the ledger itself, approved on entry
    pub fn approved(amount: Decimal, kind: PaymentType, date: NaiveDate) -> Self {
        Self {
            invoice_id: None,
            transaction_id: None,
            client_id: None,
            amount,
            kind,
            date,
            status: DEFAULT_PAYMENT_STATUS.to_string(),
            reference: None,
            note: None,
            approval_status: ApprovalStatus::Approved,
        }
    }

    pub fn for_invoice(mut self, invoice_id: i64) -> Self {
        self.invoice_id = Some(invoice_id);
        self
    }

    pub fn for_sale(mut self, transaction_id: i64, client_id: i64) -> Self {
        self.transaction_id = Some(transaction_id);
        self.client_id = Some(client_id);
        self
    }
}
