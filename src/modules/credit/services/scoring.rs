//! Payment timeliness and score rules.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::modules::credit::models::PaidLineDates;

const MAX_SCORE: Decimal = Decimal::ONE_HUNDRED;
const CLEAN_RECORD_BONUS: Decimal = Decimal::TEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeliness {
    OnTime,
    Late,
    /// Paid without a recorded payment date; counted nowhere
    Unrecorded,
}

/// On time when paid on or before the due date, or when no due date exists
pub fn classify(due_date: Option<NaiveDate>, paid_date: Option<NaiveDate>) -> Timeliness {
    match (paid_date, due_date) {
        (Some(paid), Some(due)) if paid <= due => Timeliness::OnTime,
        (Some(_), Some(_)) => Timeliness::Late,
        (Some(_), None) => Timeliness::OnTime,
        (None, _) => Timeliness::Unrecorded,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaymentTally {
    pub on_time: i32,
    pub late: i32,
}

pub fn tally(lines: &[PaidLineDates]) -> PaymentTally {
    lines
        .iter()
        .fold(PaymentTally::default(), |mut acc, line| {
            match classify(line.due_date, line.paid_date) {
                Timeliness::OnTime => acc.on_time += 1,
                Timeliness::Late => acc.late += 1,
                Timeliness::Unrecorded => {}
            }
            acc
        })
}

/// Score in `[0, 100]`, two decimals.
///
/// On-time installment lines are divided by the number of sale
/// transactions, not by the number of lines. A clean record earns +10,
/// capped at 100. No transactions scores 100.
pub fn payment_score(on_time: i32, late: i32, total_transactions: i64) -> Decimal {
    if total_transactions <= 0 {
        return MAX_SCORE;
    }

    let mut score = Decimal::from(on_time) * MAX_SCORE / Decimal::from(total_transactions);
    if late == 0 {
        score = (score + CLEAN_RECORD_BONUS).min(MAX_SCORE);
    }

    score.clamp(Decimal::ZERO, MAX_SCORE).round_dp(2)
}

/// On-time lines as a percentage of transactions, same denominator as the score
pub fn ontime_percentage(on_time: i32, total_transactions: i32) -> Decimal {
    if total_transactions <= 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(on_time) * MAX_SCORE / Decimal::from(total_transactions)).round_dp(2)
}
