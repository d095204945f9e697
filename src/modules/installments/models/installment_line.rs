use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};
use crate::modules::installments::services::overdue;

/// Upper bound of the `catatan` column
pub const NOTE_MAX_LEN: usize = 500;

/// One installment of a plan (`cicilan_schedule` row)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentLine {
    pub id: i64,
    pub plan_id: i64,
    /// 1-based position within the plan
    pub sequence: i32,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub status: LineStatus,
    pub paid_date: Option<NaiveDate>,
    pub payment_id: Option<i64>,
    pub notes: Option<String>,
}

impl InstallmentLine {
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        overdue::is_overdue(self.status, self.due_date, as_of)
    }
}

/// Line produced by the schedule generator, not yet persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInstallmentLine {
    pub sequence: i32,
    pub amount: Decimal,
    pub due_date: NaiveDate,
}

/// Installment line status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStatus {
    /// Not yet paid
    Pending,
    /// Payment received
    Paid,
    /// Flagged overdue by an external process
    Overdue,
    /// Waived, never collected
    Skipped,
}

impl LineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for LineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LineStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "overdue" => Ok(Self::Overdue),
            "skipped" => Ok(Self::Skipped),
            _ => Err(AppError::Internal(format!(
                "Invalid installment status: {}",
                value
            ))),
        }
    }
}

impl TryFrom<String> for LineStatus {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Append a dated entry to a line's notes.
///
/// Entries are `[YYYY-MM-DD] text`, one per line; existing entries are
/// never rewritten.
pub fn append_note(existing: Option<&str>, date: NaiveDate, text: &str) -> Result<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::validation("Note cannot be empty"));
    }

    let entry = format!("[{}] {}", date.format("%Y-%m-%d"), text);
    let notes = match existing {
        Some(current) if !current.is_empty() => format!("{}\n{}", current, entry),
        _ => entry,
    };

    if notes.chars().count() > NOTE_MAX_LEN {
        return Err(AppError::validation(format!(
            "Notes would exceed {} characters",
            NOTE_MAX_LEN
        )));
    }

    Ok(notes)
}
