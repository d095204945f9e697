use chrono::{NaiveDate, TimeZone, Timelike, Utc};
use showroom_finance::core::timezone::{compact_date, parse_date, BusinessCalendar};

#[test]
fn test_utc_to_jakarta_conversion() {
    // Asia/Jakarta is UTC+7 all year
    let utc_time = Utc.with_ymd_and_hms(2025, 11, 3, 10, 0, 0).unwrap();
    let jakarta_time = BusinessCalendar::utc_to_jakarta(utc_time);

    assert_eq!(jakarta_time.hour(), 17);
    assert_eq!(jakarta_time.offset().local_minus_utc(), 7 * 3600);
}

#[test]
fn test_business_date_before_and_after_rollover() {
    let before = Utc.with_ymd_and_hms(2024, 1, 31, 16, 59, 59).unwrap();
    let after = Utc.with_ymd_and_hms(2024, 1, 31, 17, 0, 0).unwrap();

    assert_eq!(BusinessCalendar::business_date(before), NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    assert_eq!(BusinessCalendar::business_date(after), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
}

#[test]
fn test_parse_date_trims_and_validates() {
    assert_eq!(
        parse_date(" 2024-02-29 ", "tanggal").unwrap(),
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
    );
    assert!(parse_date("2023-02-29", "tanggal").is_err());
    assert!(parse_date("", "tanggal").is_err());
}

#[test]
fn test_compact_date() {
    assert_eq!(compact_date(NaiveDate::from_ymd_opt(2024, 12, 5).unwrap()), "20241205");
}
