//! Persian numeral formatting.

const PERSIAN_DIGITS: [char; 10] = ['۰', '۱', '۲', '۳', '۴', '۵', '۶', '۷', '۸', '۹'];

/// Replace every ASCII digit with its Persian counterpart; everything else,
/// combining marks included, passes through untouched.
#[must_use]
pub fn to_persian_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c.to_digit(10) {
            Some(d) if c.is_ascii_digit() => PERSIAN_DIGITS[d as usize],
            _ => c,
        })
        .collect()
}

/// Format an integer with Persian digits.
#[must_use]
pub fn persian_number(n: impl std::fmt::Display) -> String {
    to_persian_digits(&n.to_string())
}
