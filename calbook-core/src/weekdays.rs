//! Sets of weekdays and their compact single-letter encoding.
//!
//! Letters are `M T W R F S U` for Monday through Sunday, so `"MWF"` means
//! Monday, Wednesday and Friday and `"TR"` means Tuesday and Thursday.

use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::{CalbookError, CalbookResult};

const CODES: [(char, Weekday); 7] = [
    ('M', Weekday::Mon),
    ('T', Weekday::Tue),
    ('W', Weekday::Wed),
    ('R', Weekday::Thu),
    ('F', Weekday::Fri),
    ('S', Weekday::Sat),
    ('U', Weekday::Sun),
];

/// A set of weekdays, one bit per day starting at Monday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Weekdays(u8);

impl Weekdays {
    pub fn empty() -> Self {
        Weekdays(0)
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Days in the set, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        CODES
            .iter()
            .map(|(_, day)| *day)
            .filter(move |day| self.contains(*day))
    }

    /// Decode a string of day letters. Case-insensitive; repeated letters collapse.
    pub fn parse(codes: &str) -> CalbookResult<Self> {
        let mut days = Weekdays::empty();
        for c in codes.chars() {
            let upper = c.to_ascii_uppercase();
            let day = CODES
                .iter()
                .find(|(code, _)| *code == upper)
                .map(|(_, day)| *day)
                .ok_or_else(|| {
                    CalbookError::Validation(format!(
                        "'{}' is not a weekday code (use M T W R F S U)",
                        c
                    ))
                })?;
            days.insert(day);
        }
        Ok(days)
    }
}

impl FromIterator<Weekday> for Weekdays {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut days = Weekdays::empty();
        for day in iter {
            days.insert(day);
        }
        days
    }
}

impl FromStr for Weekdays {
    type Err = CalbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Weekdays::parse(s)
    }
}

impl fmt::Display for Weekdays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (code, day) in CODES {
            if self.contains(day) {
                write!(f, "{}", code)?;
            }
        }
        Ok(())
    }
}
