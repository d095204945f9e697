// Property-based tests for schedule generation: line count, sequencing,
// due-date stepping and the equal split.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use showroom_finance::core::AppError;
use showroom_finance::modules::installments::services::{
    ScheduleGenerator, DEFAULT_TENOR, INSTALLMENT_STEP_DAYS,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_default_start_is_one_step_after_sale() {
    let start = ScheduleGenerator::default_start_date(Some(date(2024, 1, 1))).unwrap();
    assert_eq!(start, date(2024, 1, 31));
}

#[test]
fn test_default_start_requires_sale_date() {
    let result = ScheduleGenerator::default_start_date(None);
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[test]
fn test_default_tenor_is_twelve() {
    assert_eq!(DEFAULT_TENOR, 12);
    assert_eq!(INSTALLMENT_STEP_DAYS, 30);
}

#[test]
fn test_twelve_month_schedule_from_sale_date() {
    // 120,000,000 over 12 starting 30 days after a 2024-01-01 sale
    let start = ScheduleGenerator::default_start_date(Some(date(2024, 1, 1))).unwrap();
    let lines = ScheduleGenerator::build(dec!(120000000), 12, start).unwrap();

    assert_eq!(lines.len(), 12);
    assert_eq!(lines[0].amount, dec!(10000000));
    assert_eq!(lines[0].due_date, date(2024, 3, 1));
    assert_eq!(lines[11].due_date, start + Duration::days(360));
}

#[test]
fn test_uneven_split_is_rounded_not_balanced() {
    let lines = ScheduleGenerator::build(dec!(100), 3, date(2024, 1, 1)).unwrap();

    assert!(lines.iter().all(|l| l.amount == dec!(33.33)));
    let sum: Decimal = lines.iter().map(|l| l.amount).sum();
    assert_eq!(sum, dec!(99.99));
}

#[test]
fn test_zero_total_produces_zero_lines() {
    let lines = ScheduleGenerator::build(Decimal::ZERO, 6, date(2024, 1, 1)).unwrap();
    assert_eq!(lines.len(), 6);
    assert!(lines.iter().all(|l| l.amount.is_zero()));
}

#[test]
fn test_non_positive_tenor_is_rejected() {
    for tenor in [0, -1, -12] {
        let result = ScheduleGenerator::build(dec!(1000), tenor, date(2024, 1, 1));
        assert!(matches!(result, Err(AppError::Validation(_))), "tenor {}", tenor);
    }
}

#[test]
fn test_negative_total_is_rejected() {
    let result = ScheduleGenerator::build(dec!(-1), 12, date(2024, 1, 1));
    assert!(matches!(result, Err(AppError::Validation(_))));
}

proptest! {
    #[test]
    fn prop_schedule_shape(
        cents in 0i64..10_000_000_000_000,
        tenor in 1i32..=120,
        day_offset in 0i64..20_000,
    ) {
        let total = Decimal::new(cents, 2);
        let start = date(2000, 1, 1) + Duration::days(day_offset);

        let lines = ScheduleGenerator::build(total, tenor, start).unwrap();

        prop_assert_eq!(lines.len(), tenor as usize);
        let expected = (total / Decimal::from(tenor)).round_dp(2);
        for (i, line) in lines.iter().enumerate() {
            let n = i as i32 + 1;
            prop_assert_eq!(line.sequence, n);
            prop_assert_eq!(line.amount, expected);
            prop_assert_eq!(line.due_date, start + Duration::days(30 * i64::from(n)));
        }
    }

    #[test]
    fn prop_rounding_residue_below_one_cent_per_line(
        cents in 0i64..1_000_000_000_000,
        tenor in 1i32..=60,
    ) {
        let total = Decimal::new(cents, 2);
        let lines = ScheduleGenerator::build(total, tenor, date(2024, 1, 1)).unwrap();

        let sum: Decimal = lines.iter().map(|l| l.amount).sum();
        let residue = (total - sum).abs();
        prop_assert!(residue <= Decimal::new(i64::from(tenor), 2) / Decimal::TWO);
    }
}
