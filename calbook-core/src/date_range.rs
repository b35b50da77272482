//! Inclusive date ranges and the date/time formats used to address events.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{CalbookError, CalbookResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> CalbookResult<Self> {
        if end < start {
            return Err(CalbookError::Validation(format!(
                "range end {} is before range start {}",
                end, start
            )));
        }
        Ok(DateRange { start, end })
    }

    pub fn single(date: NaiveDate) -> Self {
        DateRange {
            start: date,
            end: date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// True if `[from, to]` shares at least one date with this range.
    pub fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        from <= self.end && self.start <= to
    }
}

/// Parse YYYY-MM-DD
pub fn parse_date(s: &str) -> CalbookResult<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| {
        CalbookError::Validation(format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
    })
}

/// Parse YYYY-MM-DDThh:mm (seconds are accepted but not required)
pub fn parse_datetime(s: &str) -> CalbookResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| {
            CalbookError::Validation(format!(
                "Invalid date/time format '{}'. Expected YYYY-MM-DDThh:mm",
                s
            ))
        })
}

/// First instant of a date.
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Last whole second of a date (23:59:59).
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    start_of_day(date) + Duration::seconds(86_399)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn range_rejects_reversed_bounds() {
        assert!(DateRange::new(d(2024, 5, 2), d(2024, 5, 1)).is_err());
        assert!(DateRange::new(d(2024, 5, 1), d(2024, 5, 1)).is_ok());
    }

    #[test]
    fn range_contains_is_inclusive() {
        let range = DateRange::new(d(2024, 5, 1), d(2024, 5, 3)).unwrap();
        assert!(range.contains(d(2024, 5, 1)));
        assert!(range.contains(d(2024, 5, 3)));
        assert!(!range.contains(d(2024, 5, 4)));
    }

    #[test]
    fn range_overlap_touching_dates() {
        let range = DateRange::single(d(2024, 5, 3));
        assert!(range.overlaps(d(2024, 5, 1), d(2024, 5, 3)));
        assert!(range.overlaps(d(2024, 5, 3), d(2024, 5, 9)));
        assert!(!range.overlaps(d(2024, 5, 4), d(2024, 5, 9)));
    }

    #[test]
    fn parse_datetime_with_and_without_seconds() {
        let a = parse_datetime("2024-05-01T09:30").unwrap();
        let b = parse_datetime("2024-05-01T09:30:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_datetime("2024-05-01 09:30").is_err());
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert_eq!(parse_date("2024-02-29").unwrap(), d(2024, 2, 29));
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("tomorrow").is_err());
    }

    #[test]
    fn day_bounds() {
        let date = d(2024, 5, 1);
        assert_eq!(start_of_day(date).to_string(), "2024-05-01 00:00:00");
        assert_eq!(end_of_day(date).to_string(), "2024-05-01 23:59:59");
    }
}
