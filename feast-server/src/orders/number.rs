//! Order number formatting
//!
//! Order numbers are a per-day human-readable sequence in the form
//! `FS-YYYYMMDD-NNNN`; the numeric part comes from the store's per-day
//! counter and is zero-padded to four digits.

use chrono::NaiveDate;

pub const ORDER_NUMBER_PREFIX: &str = "FS";

pub fn format_order_number(day: NaiveDate, sequence: i32) -> String {
    format!(
        "{}-{}-{:04}",
        ORDER_NUMBER_PREFIX,
        day.format("%Y%m%d"),
        sequence
    )
}
