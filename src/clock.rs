//! Synthesized wall clock for a video.
//!
//! Seeded from the `YYYYMMDDHHMMSS` token in the file name and advanced one
//! second per `fps` frames. Months are always 31 days long: timestamps must
//! line up with what the recorder itself wrote, so this is not calendar-exact.

use regex::Regex;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

const TOKEN_LEN: usize = 14;

/// Maximal runs of ASCII digits
const DIGIT_RUN_PATTERN: &str = r"[0-9]+";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SyntheticClock {
    pub year: u32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl SyntheticClock {
    pub fn new(year: u32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        Self { year, month, day, hour, minute, second }
    }

    /// Find the first standalone run of exactly 14 digits in `file_name`.
    pub fn from_file_name(file_name: &str) -> Result<Self, Error> {
        let token = find_timestamp_token(file_name)
            .ok_or_else(|| Error::MissingTimestamp(file_name.to_string()))?;
        token.parse()
    }

    /// Advance by one second, carrying into minutes, hours, days (31 per
    /// month), months and years.
    pub fn increment(&mut self) {
        self.second += 1;
        if self.second >= 60 {
            self.second = 0;
            self.minute += 1;
        }
        if self.minute >= 60 {
            self.minute = 0;
            self.hour += 1;
        }
        if self.hour >= 24 {
            self.hour = 0;
            self.day += 1;
        }
        if self.day > 31 {
            self.day = 1;
            self.month += 1;
        }
        if self.month > 12 {
            self.month = 1;
            self.year += 1;
        }
    }

    /// Copy advanced by one second
    pub fn incremented(mut self) -> Self {
        self.increment();
        self
    }
}

impl FromStr for SyntheticClock {
    type Err = Error;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        if token.len() != TOKEN_LEN || !token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidTimestamp(token.to_string()));
        }
        let field = |range: std::ops::Range<usize>| -> Result<u32, Error> {
            token[range]
                .parse::<u32>()
                .map_err(|_| Error::InvalidTimestamp(token.to_string()))
        };

        let clock = Self::new(
            field(0..4)?,
            field(4..6)?,
            field(6..8)?,
            field(8..10)?,
            field(10..12)?,
            field(12..14)?,
        );

        let valid = (1..=12).contains(&clock.month)
            && (1..=31).contains(&clock.day)
            && clock.hour < 24
            && clock.minute < 60
            && clock.second < 60;
        if !valid {
            return Err(Error::InvalidTimestamp(token.to_string()));
        }
        Ok(clock)
    }
}

/// `YYYY-MM-DD-HH:MM:SS`
impl fmt::Display for SyntheticClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02}-{:02}-{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

fn find_timestamp_token(name: &str) -> Option<&str> {
    let digit_runs = Regex::new(DIGIT_RUN_PATTERN).ok()?;
    digit_runs
        .find_iter(name)
        .map(|m| m.as_str())
        .find(|token| token.len() == TOKEN_LEN)
}
