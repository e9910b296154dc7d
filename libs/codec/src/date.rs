//! Legacy date handling.
//!
//! The packet schema stores the signing moment as two separate attribute
//! strings: a short date (`dd.mm.yyyy`) and a dot-separated time
//! (`hh.mm.ss`). These helpers combine and split them.

use chrono::{NaiveDate, NaiveDateTime};

/// Combine the packet's separate date and time strings into one timestamp.
///
/// Returns `None` when either string does not match its legacy format;
/// the parser surfaces that as an absent timestamp rather than a failure.
pub fn combine_date_time(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date, "%d.%m.%Y").ok()?;
    let mut parts = time.splitn(3, '.');
    let hours: u32 = parts.next()?.parse().ok()?;
    let minutes: u32 = parts.next()?.parse().ok()?;
    let seconds: u32 = parts.next()?.parse().ok()?;
    date.and_hms_opt(hours, minutes, seconds)
}

/// Format a date in the legacy short form `dd.mm.yyyy`.
pub fn to_short_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Parse the legacy short form `dd.mm.yyyy`.
pub fn from_short_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%d.%m.%Y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combines_legacy_date_and_time() {
        let ts = combine_date_time("01.02.2024", "10.30.05").unwrap();
        assert_eq!(ts.to_string(), "2024-02-01 10:30:05");
    }

    #[test]
    fn malformed_parts_yield_none() {
        assert!(combine_date_time("2024-02-01", "10.30.05").is_none());
        assert!(combine_date_time("01.02.2024", "10:30:05").is_none());
        assert!(combine_date_time("01.02.2024", "25.00.00").is_none());
    }

    #[test]
    fn short_date_round_trips() {
        let date = from_short_date("09.11.2023").unwrap();
        assert_eq!(to_short_date(date), "09.11.2023");
    }
}
