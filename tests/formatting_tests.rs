use chrono::{TimeZone, Utc};

use sermon_digest::utils::jalali::{self, JalaliDate, gregorian_to_jalali};
use sermon_digest::utils::{persian_number, to_persian_digits};

#[test]
fn test_persian_digits() {
    assert_eq!(to_persian_digits("0123456789"), "۰۱۲۳۴۵۶۷۸۹");
    assert_eq!(persian_number(1403), "۱۴۰۳");
}

#[test]
fn test_persian_digits_keep_other_text() {
    // Diacritics and non-digit characters pass through unchanged
    let text = "بِسْمِ اللهِ - page 12";
    assert_eq!(to_persian_digits(text), "بِسْمِ اللهِ - page ۱۲");
}

#[test]
fn test_jalali_new_year() {
    assert_eq!(
        gregorian_to_jalali(2024, 3, 20),
        JalaliDate { year: 1403, month: 1, day: 1 }
    );
}

#[test]
fn test_jalali_leap_year_end() {
    // 1403 is a leap year in the Jalali calendar
    assert_eq!(
        gregorian_to_jalali(2025, 3, 20),
        JalaliDate { year: 1403, month: 12, day: 30 }
    );
}

#[test]
fn test_jalali_long_string() {
    let date = gregorian_to_jalali(2026, 10, 18);
    assert_eq!(date, JalaliDate { year: 1405, month: 7, day: 26 });
    assert_eq!(date.month_name(), "مهر");
    assert_eq!(date.to_long_string(), "۲۶ مهر ۱۴۰۵");
}

#[test]
fn test_jalali_date_uses_time_zone() {
    // 22:00 UTC on 2024-03-19 is already 2024-03-20 in Tehran
    let now = Utc.with_ymd_and_hms(2024, 3, 19, 22, 0, 0).unwrap();
    assert_eq!(
        jalali::date_in(now, chrono_tz::Asia::Tehran),
        JalaliDate { year: 1403, month: 1, day: 1 }
    );
    assert_eq!(
        jalali::date_in(now, chrono_tz::UTC),
        JalaliDate { year: 1402, month: 12, day: 29 }
    );
}

#[test]
fn test_out_of_range_months_do_not_panic() {
    // Month 0 wraps to the last month instead of underflowing
    let date = JalaliDate { year: 1405, month: 0, day: 1 };
    assert_eq!(date.month_name(), "اسفند");
    assert_eq!(date.to_long_string(), "۱ اسفند ۱۴۰۵");

    let result = std::panic::catch_unwind(|| gregorian_to_jalali(2024, 0, 15));
    assert!(result.is_ok());
}
