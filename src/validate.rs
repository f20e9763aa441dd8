use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveTime};

use crate::model::DATE_FORMAT;

/// Parse a date typed into the add form or passed on the command line.
/// Unlike grid cells, these must be real calendar dates.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        bail!("date must not be empty");
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .with_context(|| format!("invalid date '{s}': expected YYYY-MM-DD"))
}

/// Parse a wall-clock time of day such as `09:00`.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .with_context(|| format!("invalid time '{s}': expected HH:MM"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_dates() {
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(parse_date(" 2024-01-01 ").is_ok());
    }

    #[test]
    fn invalid_dates() {
        assert!(parse_date("").is_err());
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("01/02/2024").is_err());
        assert!(parse_date("2024-13-01").is_err());
    }

    #[test]
    fn times_of_day() {
        assert_eq!(
            parse_time_of_day("09:00").unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap()
        );
        assert_eq!(
            parse_time_of_day("17:30:15").unwrap(),
            NaiveTime::from_hms_opt(17, 30, 15).unwrap()
        );
        assert!(parse_time_of_day("25:00").is_err());
        assert!(parse_time_of_day("nine").is_err());
    }
}
