// Credit scoring: timeliness classification, the payment score and the
// aggregate written back to the profile.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use showroom_finance::modules::credit::models::PaidLineDates;
use showroom_finance::modules::credit::services::{
    scoring::{classify, ontime_percentage, payment_score, tally, Timeliness},
    CreditProfileService,
};

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn paid(due: Option<NaiveDate>, paid: Option<NaiveDate>) -> PaidLineDates {
    PaidLineDates {
        due_date: due,
        paid_date: paid,
    }
}

#[test]
fn test_paid_on_due_date_is_on_time() {
    assert_eq!(classify(date(2024, 3, 1), date(2024, 3, 1)), Timeliness::OnTime);
    assert_eq!(classify(date(2024, 3, 1), date(2024, 3, 2)), Timeliness::Late);
}

#[test]
fn test_eleven_on_time_one_late_over_twelve_transactions() {
    assert_eq!(payment_score(11, 1, 12), dec!(91.67));
}

#[test]
fn test_clean_record_bonus_is_capped() {
    assert_eq!(payment_score(12, 0, 12), dec!(100));
    assert_eq!(payment_score(5, 0, 10), dec!(60));
}

#[test]
fn test_no_transactions_scores_full() {
    assert_eq!(payment_score(0, 0, 0), dec!(100));
}

#[test]
fn test_score_uses_transaction_count_as_denominator() {
    // 12 on-time lines of a single sale still cap at 100
    assert_eq!(payment_score(12, 0, 1), dec!(100));
    // 12 on-time lines and one late line across 3 sales
    assert_eq!(payment_score(12, 1, 3), dec!(100));
    // one on-time, one late over 4 sales
    assert_eq!(payment_score(1, 1, 4), dec!(25));
}

#[test]
fn test_score_stays_within_bounds() {
    for on_time in 0..30 {
        for late in 0..5 {
            for transactions in 1..10i64 {
                let score = payment_score(on_time, late, transactions);
                assert!(score >= Decimal::ZERO && score <= dec!(100));
            }
        }
    }
}

#[test]
fn test_tally_ignores_lines_without_payment_date() {
    let lines = vec![
        paid(date(2024, 1, 31), date(2024, 1, 30)),
        paid(date(2024, 3, 1), date(2024, 3, 5)),
        paid(date(2024, 3, 31), None),
        paid(None, date(2024, 4, 1)),
    ];

    let counts = tally(&lines);
    assert_eq!(counts.on_time, 2);
    assert_eq!(counts.late, 1);
}

#[test]
fn test_aggregate_matches_score_rules() {
    let mut lines: Vec<PaidLineDates> = (1..=11)
        .map(|_| paid(date(2024, 2, 1), date(2024, 1, 25)))
        .collect();
    lines.push(paid(date(2024, 2, 1), date(2024, 2, 10)));

    let aggregates = CreditProfileService::aggregate(&lines, 12, dec!(30000000)).unwrap();

    assert_eq!(aggregates.total_transactions, 12);
    assert_eq!(aggregates.on_time_count, 11);
    assert_eq!(aggregates.late_count, 1);
    assert_eq!(aggregates.payment_score, dec!(91.67));
    assert_eq!(aggregates.total_outstanding, dec!(30000000));
}

#[test]
fn test_ontime_percentage() {
    assert_eq!(ontime_percentage(11, 12), dec!(91.67));
    assert_eq!(ontime_percentage(3, 0), Decimal::ZERO);
}
