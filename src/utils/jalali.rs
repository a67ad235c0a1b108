//! Gregorian to Solar Hijri (Jalali) date conversion for the poster date line.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

use super::persian::persian_number;

pub const MONTH_NAMES: [&str; 12] = [
    "فروردین",
    "اردیبهشت",
    "خرداد",
    "تیر",
    "مرداد",
    "شهریور",
    "مهر",
    "آبان",
    "آذر",
    "دی",
    "بهمن",
    "اسفند",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JalaliDate {
    pub year: i32,
    /// 1-based month.
    pub month: u32,
    pub day: u32,
}

/// Zero-based index of a 1-based month, wrapping instead of underflowing.
const fn month_index(month: u32) -> usize {
    ((month % 12) as usize + 11) % 12
}

impl JalaliDate {
    /// Months outside `1..=12` wrap around, so `0` names Esfand.
    #[must_use]
    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[month_index(self.month)]
    }

    /// "day month-name year" in Persian digits, e.g. `۲۶ مهر ۱۴۰۵`.
    #[must_use]
    pub fn to_long_string(&self) -> String {
        format!(
            "{} {} {}",
            persian_number(self.day),
            self.month_name(),
            persian_number(self.year)
        )
    }
}

impl From<NaiveDate> for JalaliDate {
    fn from(date: NaiveDate) -> Self {
        gregorian_to_jalali(date.year(), date.month(), date.day())
    }
}

/// Convert a Gregorian calendar date (1-based month and day) to Jalali.
/// Out-of-range months wrap like [`JalaliDate::month_name`] does.
#[must_use]
pub fn gregorian_to_jalali(gy: i32, gm: u32, gd: u32) -> JalaliDate {
    const DAYS_BEFORE_MONTH: [i32; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

    let gy2 = if gm > 2 { gy + 1 } else { gy };
    let mut days = 355_666 + 365 * gy + (gy2 + 3) / 4 - (gy2 + 99) / 100 + (gy2 + 399) / 400
        + gd as i32
        + DAYS_BEFORE_MONTH[month_index(gm)];

    let mut year = -1595 + 33 * (days / 12_053);
    days %= 12_053;
    year += 4 * (days / 1461);
    days %= 1461;
    if days > 365 {
        year += (days - 1) / 365;
        days = (days - 1) % 365;
    }

    let (month, day) = if days < 186 {
        (1 + days / 31, 1 + days % 31)
    } else {
        (7 + (days - 186) / 30, 1 + (days - 186) % 30)
    };

    JalaliDate {
        year,
        month: month as u32,
        day: day as u32,
    }
}

/// Today's Jalali date in the given time zone.
#[must_use]
pub fn today(tz: Tz) -> JalaliDate {
    date_in(Utc::now(), tz)
}

#[must_use]
pub fn date_in(now: DateTime<Utc>, tz: Tz) -> JalaliDate {
    JalaliDate::from(now.with_timezone(&tz).date_naive())
}
