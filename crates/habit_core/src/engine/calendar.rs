//! Calendar-day mapping for duplicate-log and "logged today" checks.
//!
//! # Responsibility
//! - Map an instant to the calendar day it falls on under a chosen policy.
//!
//! # Invariants
//! - Two instants are the same day iff their calendar dates are equal under
//!   the same `DayBoundary`. This is equivalent to comparing the instants
//!   truncated to midnight.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Timezone policy deciding where one calendar day ends and the next begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayBoundary {
    /// Midnight in the host's local timezone.
    #[default]
    Local,
    /// Midnight UTC.
    Utc,
    /// Midnight at a fixed offset from UTC.
    Fixed(FixedOffset),
}

impl DayBoundary {
    /// Returns the calendar date `at` falls on.
    pub fn calendar_day(&self, at: DateTime<Utc>) -> NaiveDate {
        match self {
            Self::Local => at.with_timezone(&Local).date_naive(),
            Self::Utc => at.date_naive(),
            Self::Fixed(offset) => at.with_timezone(offset).date_naive(),
        }
    }

    /// Returns whether both instants fall on the same calendar day.
    pub fn same_day(&self, left: DateTime<Utc>, right: DateTime<Utc>) -> bool {
        self.calendar_day(left) == self.calendar_day(right)
    }
}

impl Display for DayBoundary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Utc => f.write_str("utc"),
            Self::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

/// Returned when a day-boundary setting cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayBoundaryParseError(String);

impl Display for DayBoundaryParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported day boundary `{}`; expected local|utc|+HH:MM|-HH:MM",
            self.0
        )
    }
}

impl Error for DayBoundaryParseError {}

impl FromStr for DayBoundary {
    type Err = DayBoundaryParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "utc" | "z" => Ok(Self::Utc),
            _ => parse_offset(trimmed)
                .map(Self::Fixed)
                .ok_or_else(|| DayBoundaryParseError(trimmed.to_string())),
        }
    }
}

fn parse_offset(value: &str) -> Option<FixedOffset> {
    let (sign, rest) = match value.as_bytes().first()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
