use rust_decimal::Decimal;

use crate::core::{AppError, Result};

/// Money columns are DECIMAL(15,2)
pub const MONEY_SCALE: u32 = 2;

/// Largest value a DECIMAL(15,2) column holds: 9,999,999,999,999.99
pub const MAX_AMOUNT: Decimal =
    Decimal::from_parts(0xA4C6_7FFF, 0x0003_8D7E, 0, false, MONEY_SCALE);

/// Rupiah amounts as stored by the ledger
pub struct Money;

impl Money {
    /// Round an amount to the storage scale (banker's rounding)
    pub fn round(amount: Decimal) -> Decimal {
        amount.round_dp(MONEY_SCALE)
    }

    /// Reject negative amounts and amounts the ledger columns cannot hold
    pub fn ensure_non_negative(amount: Decimal, field: &str) -> Result<Decimal> {
        if amount < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "{} cannot be negative, got {}",
                field, amount
            )));
        }
        Self::ensure_storable(amount, field)
    }

    /// Reject zero, negative and oversized amounts
    pub fn ensure_positive(amount: Decimal, field: &str) -> Result<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(AppError::validation(format!(
                "{} must be greater than 0, got {}",
                field, amount
            )));
        }
        Self::ensure_storable(amount, field)
    }

    fn ensure_storable(amount: Decimal, field: &str) -> Result<Decimal> {
        if amount > MAX_AMOUNT {
            return Err(AppError::validation(format!(
                "{} cannot exceed {}, got {}",
                field, MAX_AMOUNT, amount
            )));
        }
        Ok(amount)
    }

    /// Sum that fails validation instead of overflowing
    pub fn checked_add(lhs: Decimal, rhs: Decimal, field: &str) -> Result<Decimal> {
        lhs.checked_add(rhs)
            .ok_or_else(|| AppError::validation(format!("{} is out of range", field)))
            .and_then(|sum| Self::ensure_storable(sum, field))
    }

    /// Product that fails validation instead of overflowing
    pub fn checked_mul(lhs: Decimal, rhs: Decimal, field: &str) -> Result<Decimal> {
        lhs.checked_mul(rhs)
            .ok_or_else(|| AppError::validation(format!("{} is out of range", field)))
            .and_then(|product| Self::ensure_storable(product, field))
    }

    /// Human-readable amount for log lines, e.g. `Rp 1,200,000.00`
    pub fn format_rupiah(amount: Decimal) -> String {
        let rounded = Self::round(amount);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let text = format!("{:.2}", rounded.abs());
        let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        format!("{}Rp {}.{}", if negative { "-" } else { "" }, grouped, frac_part)
    }
}
