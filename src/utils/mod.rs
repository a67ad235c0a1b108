//! Locale helpers: Persian digits and the Solar Hijri calendar

pub mod jalali;
pub mod persian;

pub use persian::{persian_number, to_persian_digits};
