use crate::core::{AppError, Result};

/// Largest page accepted by the report endpoints
pub const MAX_REPORT_LIMIT: i64 = 1000;

/// Report pages must be positive and bounded
pub fn validate_limit(limit: i64) -> Result<i64> {
    if limit <= 0 || limit > MAX_REPORT_LIMIT {
        return Err(AppError::validation(format!(
            "limit must be between 1 and {}, got {}",
            MAX_REPORT_LIMIT, limit
        )));
    }
    Ok(limit)
}

pub fn validate_offset(offset: i64) -> Result<i64> {
    if offset < 0 {
        return Err(AppError::validation(format!(
            "offset cannot be negative, got {}",
            offset
        )));
    }
    Ok(offset)
}
