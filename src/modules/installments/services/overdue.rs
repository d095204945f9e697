//! Overdue classification shared by every report and aggregate.

use chrono::NaiveDate;

use crate::modules::installments::models::LineStatus;

/// A line is overdue when it is still pending and its due date lies
/// strictly before `as_of`. A line due today is not overdue.
pub fn is_overdue(status: LineStatus, due_date: NaiveDate, as_of: NaiveDate) -> bool {
    status == LineStatus::Pending && due_date < as_of
}

/// Whole days elapsed since `due_date`; zero or negative when not yet late.
pub fn days_overdue(due_date: NaiveDate, as_of: NaiveDate) -> i64 {
    (as_of - due_date).num_days()
}
