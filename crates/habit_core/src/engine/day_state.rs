//! Day-state engine for one 7-day habit cycle.
//!
//! # Responsibility
//! - Classify a cycle as setup, active (with day number) or completed.
//! - Gate log appends to at most one entry per calendar day.
//!
//! # Invariants
//! - All functions are pure: the caller supplies `now`.
//! - Day number is derived from elapsed time, never from log count.
//! - Existing log entries are never mutated.
//!
//! Elapsed time is taken as an absolute value, so a start timestamp in the
//! future counts down towards day 1 and then back up.

use super::calendar::DayBoundary;
use crate::model::habit::{Habit, LogEntry};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Number of days in one commitment cycle.
pub const CYCLE_LENGTH_DAYS: u32 = 7;

/// Derived phase of a device's cycle. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// No habit, or the stored habit is inactive.
    Setup,
    /// Inside the cycle.
    Active {
        /// 1-based day within the cycle.
        day_number: u32,
        /// Whether a log already exists for today's calendar day.
        has_logged_today: bool,
    },
    /// The cycle has run past its last day.
    Completed,
}

impl Status {
    /// Wire name of the phase: `setup`, `active` or `completed`.
    pub fn phase(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Active { .. } => "active",
            Self::Completed => "completed",
        }
    }

    /// The ephemeral "done for today" sub-state of `Active`.
    pub fn is_done_for_today(&self) -> bool {
        matches!(
            self,
            Self::Active {
                has_logged_today: true,
                ..
            }
        )
    }
}

/// Rejection for a second log on the same calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateDay {
    /// Calendar day that already has an entry.
    pub day: NaiveDate,
}

impl Display for DuplicateDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Already logged today ({})", self.day)
    }
}

impl Error for DuplicateDay {}

/// Computes the current cycle phase.
///
/// # Contract
/// - `habit == None` or `!habit.active` -> `Setup`, whatever `now` and `logs`.
/// - `cycle_day_number > 7` -> `Completed`.
/// - Otherwise `Active` with `has_logged_today` checked against `boundary`.
pub fn compute_status(
    now: DateTime<Utc>,
    habit: Option<&Habit>,
    logs: &[LogEntry],
    boundary: DayBoundary,
) -> Status {
    let Some(habit) = habit.filter(|habit| habit.active) else {
        return Status::Setup;
    };

    let day_number = cycle_day_number(now, habit.started_at);
    if day_number > CYCLE_LENGTH_DAYS {
        return Status::Completed;
    }

    Status::Active {
        day_number,
        has_logged_today: !can_log_today(now, logs, boundary),
    }
}

/// Returns `ceil(|now - started_at| / 24h)` with a floor of 1.
///
/// Exact at the full precision of the inputs: an exact multiple of 24h stays
/// on the earlier day, so `started_at + 7 * 24h` is still day 7, and any
/// remainder past it, however small, rolls over to the next day.
pub fn cycle_day_number(now: DateTime<Utc>, started_at: DateTime<Utc>) -> u32 {
    let delta = now - started_at;
    let elapsed = if delta < Duration::zero() { -delta } else { delta };
    let whole_days = elapsed.num_days();
    let days = if elapsed > Duration::days(whole_days) {
        whole_days + 1
    } else {
        whole_days
    };
    u32::try_from(days.max(1)).unwrap_or(u32::MAX)
}

/// Returns `true` iff no log falls on `now`'s calendar day.
pub fn can_log_today(now: DateTime<Utc>, logs: &[LogEntry], boundary: DayBoundary) -> bool {
    let today = boundary.calendar_day(now);
    !logs
        .iter()
        .any(|log| boundary.calendar_day(log.logged_at) == today)
}

/// Returns `logs` with one new entry stamped `now` appended at the end.
///
/// # Errors
/// - `DuplicateDay` when `can_log_today` is false. The payload of the new
///   entry plays no part in the check.
pub fn append_log(
    now: DateTime<Utc>,
    completed: bool,
    reason: impl Into<String>,
    logs: &[LogEntry],
    boundary: DayBoundary,
) -> Result<Vec<LogEntry>, DuplicateDay> {
    if !can_log_today(now, logs, boundary) {
        return Err(DuplicateDay {
            day: boundary.calendar_day(now),
        });
    }

    let mut next = Vec::with_capacity(logs.len() + 1);
    next.extend_from_slice(logs);
    next.push(LogEntry {
        logged_at: now,
        completed,
        reason: reason.into(),
    });
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::{cycle_day_number, Status};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn day_number_has_floor_of_one() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        assert_eq!(cycle_day_number(start, start), 1);
        assert_eq!(cycle_day_number(start + Duration::milliseconds(1), start), 1);
    }

    #[test]
    fn day_number_rolls_over_just_after_each_24h_block() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        assert_eq!(cycle_day_number(start + Duration::hours(24), start), 1);
        assert_eq!(
            cycle_day_number(start + Duration::hours(24) + Duration::seconds(1), start),
            2
        );
    }

    #[test]
    fn sub_millisecond_remainder_rolls_over() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let exactly_two_days = start + Duration::days(2);
        assert_eq!(cycle_day_number(exactly_two_days, start), 2);
        assert_eq!(
            cycle_day_number(exactly_two_days + Duration::nanoseconds(1), start),
            3
        );
        assert_eq!(
            cycle_day_number(start - Duration::days(2) - Duration::microseconds(500), start),
            3
        );
    }

    #[test]
    fn future_start_uses_absolute_elapsed_time() {
        let start = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        assert_eq!(cycle_day_number(start - Duration::hours(1), start), 1);
        assert_eq!(cycle_day_number(start - Duration::hours(50), start), 3);
    }

    #[test]
    fn done_for_today_is_active_with_log() {
        let done = Status::Active {
            day_number: 3,
            has_logged_today: true,
        };
        let pending = Status::Active {
            day_number: 3,
            has_logged_today: false,
        };
        assert!(done.is_done_for_today());
        assert!(!pending.is_done_for_today());
        assert!(!Status::Completed.is_done_for_today());
        assert_eq!(done.phase(), "active");
        assert_eq!(Status::Setup.phase(), "setup");
    }
}
