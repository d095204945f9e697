use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};

use crate::core::{AppError, Result};

/// Offset of the showroom's business day (Asia/Jakarta, UTC+7)
const JAKARTA_OFFSET_SECS: i32 = 7 * 3600;

/// Business calendar helpers.
/// Timestamps are stored as UTC; due dates and payment dates are plain
/// calendar dates in Jakarta local time.
pub struct BusinessCalendar;

impl BusinessCalendar {
    /// Convert a UTC timestamp to Asia/Jakarta local time
    pub fn utc_to_jakarta(utc_time: DateTime<Utc>) -> DateTime<FixedOffset> {
        match FixedOffset::east_opt(JAKARTA_OFFSET_SECS) {
            Some(offset) => utc_time.with_timezone(&offset),
            None => utc_time.fixed_offset(),
        }
    }

    /// Calendar date in Jakarta for a given UTC instant
    pub fn business_date(utc_time: DateTime<Utc>) -> NaiveDate {
        Self::utc_to_jakarta(utc_time).date_naive()
    }
}

/// "Today" as the finance desk sees it
pub fn business_today() -> NaiveDate {
    BusinessCalendar::business_date(Utc::now())
}

/// Parse an API date in `YYYY-MM-DD` form
pub fn parse_date(raw: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::validation(format!("{} must be a date in YYYY-MM-DD format, got '{}'", field, raw))
    })
}

/// `date + days`, failing validation when the result leaves chrono's range
pub fn add_days(date: NaiveDate, days: i64, field: &str) -> Result<NaiveDate> {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or_else(|| AppError::validation(format!("{} is out of range", field)))
}

/// Compact date stamp used in document numbers (`20240101`)
pub fn compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}
