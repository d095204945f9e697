use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::core::{add_days, AppError, Money, Result};
use crate::modules::installments::models::NewInstallmentLine;

/// Fixed step between consecutive due dates. Not calendar months:
/// due dates drift against month boundaries over long tenors.
pub const INSTALLMENT_STEP_DAYS: i64 = 30;

/// Tenor assumed when neither the request nor the plan carries one
pub const DEFAULT_TENOR: i32 = 12;

/// Longest schedule accepted, thirty years of monthly lines
pub const MAX_TENOR: i32 = 360;

/// Pure schedule computation; persistence lives in the repository.
pub struct ScheduleGenerator;

impl ScheduleGenerator {
    /// Start date used when the caller gives none: the sale date plus one step.
    pub fn default_start_date(transaction_date: Option<NaiveDate>) -> Result<NaiveDate> {
        let sale_date = transaction_date.ok_or_else(|| {
            AppError::validation("Transaction has no date; a start date (tgl_mulai) is required")
        })?;
        add_days(sale_date, INSTALLMENT_STEP_DAYS, "Start date")
    }

    /// Accept tenors in `1..=MAX_TENOR`
    pub fn validate_tenor(tenor: i32) -> Result<i32> {
        if tenor <= 0 {
            return Err(AppError::validation(format!(
                "Tenor must be greater than 0, got {}",
                tenor
            )));
        }
        if tenor > MAX_TENOR {
            return Err(AppError::validation(format!(
                "Tenor cannot exceed {}, got {}",
                MAX_TENOR, tenor
            )));
        }
        Ok(tenor)
    }

    /// Equal split rounded to the storage scale.
    ///
    /// Every line carries the same amount; the rounding residue is not
    /// pushed onto the last line.
    pub fn amount_per_line(total_amount: Decimal, tenor: i32) -> Result<Decimal> {
        let tenor = Self::validate_tenor(tenor)?;
        Money::ensure_non_negative(total_amount, "Installment total")?;

        Ok(Money::round(total_amount / Decimal::from(tenor)))
    }

    /// Lines `1..=tenor`, line `i` due `start_date + 30 * i` days.
    pub fn build(
        total_amount: Decimal,
        tenor: i32,
        start_date: NaiveDate,
    ) -> Result<Vec<NewInstallmentLine>> {
        let amount = Self::amount_per_line(total_amount, tenor)?;

        (1..=tenor)
            .map(|sequence| {
                let due_date = add_days(
                    start_date,
                    INSTALLMENT_STEP_DAYS * i64::from(sequence),
                    "Due date",
                )?;
                Ok(NewInstallmentLine {
                    sequence,
                    amount,
                    due_date,
                })
            })
            .collect()
    }
}
