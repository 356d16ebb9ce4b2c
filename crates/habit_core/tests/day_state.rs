use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use habit_core::{
    append_log, can_log_today, compute_status, DayBoundary, Habit, LogEntry, Status,
};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

fn habit(active: bool) -> Habit {
    Habit {
        name: "Exercise".to_string(),
        minimum_version: "1 push-up".to_string(),
        started_at: start(),
        active,
    }
}

fn log_at(at: DateTime<Utc>, completed: bool) -> LogEntry {
    LogEntry {
        logged_at: at,
        completed,
        reason: String::new(),
    }
}

#[test]
fn absent_or_inactive_habit_is_always_setup() {
    let logs = vec![log_at(start(), true)];
    let inactive = habit(false);
    for offset_hours in [-500, -1, 0, 1, 30, 170, 10_000] {
        let now = start() + Duration::hours(offset_hours);
        assert_eq!(
            compute_status(now, None, &logs, DayBoundary::Utc),
            Status::Setup
        );
        assert_eq!(
            compute_status(now, Some(&inactive), &logs, DayBoundary::Utc),
            Status::Setup
        );
    }
}

#[test]
fn first_24_hours_are_day_one() {
    let habit = habit(true);
    for elapsed in [
        Duration::zero(),
        Duration::seconds(1),
        Duration::hours(12),
        Duration::hours(24) - Duration::seconds(1),
    ] {
        let status = compute_status(start() + elapsed, Some(&habit), &[], DayBoundary::Utc);
        assert_eq!(
            status,
            Status::Active {
                day_number: 1,
                has_logged_today: false
            },
            "elapsed={elapsed}"
        );
    }
}

#[test]
fn seventh_day_boundary() {
    let habit = habit(true);
    let week = Duration::days(7);

    let last_second = compute_status(
        start() + week - Duration::seconds(1),
        Some(&habit),
        &[],
        DayBoundary::Utc,
    );
    assert_eq!(
        last_second,
        Status::Active {
            day_number: 7,
            has_logged_today: false
        }
    );

    let exactly = compute_status(start() + week, Some(&habit), &[], DayBoundary::Utc);
    assert!(matches!(exactly, Status::Active { day_number: 7, .. }));

    let past = compute_status(
        start() + week + Duration::seconds(1),
        Some(&habit),
        &[],
        DayBoundary::Utc,
    );
    assert_eq!(past, Status::Completed);

    for just_before in [Duration::milliseconds(1), Duration::microseconds(500)] {
        let status =
            compute_status(start() + week - just_before, Some(&habit), &[], DayBoundary::Utc);
        assert!(
            matches!(status, Status::Active { day_number: 7, .. }),
            "week - {just_before}"
        );
    }
    for just_after in [
        Duration::milliseconds(1),
        Duration::microseconds(500),
        Duration::nanoseconds(1),
    ] {
        let status =
            compute_status(start() + week + just_after, Some(&habit), &[], DayBoundary::Utc);
        assert_eq!(status, Status::Completed, "week + {just_after}");
    }
}

#[test]
fn completed_habit_keeps_active_flag() {
    let habit = habit(true);
    let status = compute_status(start() + Duration::days(30), Some(&habit), &[], DayBoundary::Utc);
    assert_eq!(status, Status::Completed);
    assert!(habit.active);
}

#[test]
fn has_logged_today_tracks_calendar_day_not_24h_window() {
    let habit = habit(true);
    let logs = vec![log_at(start() + Duration::hours(1), true)];

    let same_evening = start() + Duration::hours(14);
    assert_eq!(
        compute_status(same_evening, Some(&habit), &logs, DayBoundary::Utc),
        Status::Active {
            day_number: 1,
            has_logged_today: true
        }
    );

    // 09:00 + 15h = 00:00 UTC next calendar day, still cycle day 1.
    let after_midnight = start() + Duration::hours(15);
    assert_eq!(
        compute_status(after_midnight, Some(&habit), &logs, DayBoundary::Utc),
        Status::Active {
            day_number: 1,
            has_logged_today: false
        }
    );
}

#[test]
fn day_boundary_policy_changes_duplicate_detection() {
    let evening_utc = Utc.with_ymd_and_hms(2026, 3, 1, 22, 0, 0).unwrap();
    let logs = vec![log_at(evening_utc, false)];
    let later = evening_utc + Duration::hours(3);

    assert!(can_log_today(later, &logs, DayBoundary::Utc));

    let new_york = DayBoundary::Fixed(FixedOffset::west_opt(5 * 3600).unwrap());
    assert!(!can_log_today(later, &logs, new_york));
}

#[test]
fn append_log_rejects_second_entry_same_day_regardless_of_payload() {
    let now = start() + Duration::hours(2);
    let logs = append_log(now, true, "", &[], DayBoundary::Utc).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].logged_at, now);

    let err = append_log(
        now + Duration::hours(1),
        false,
        "different payload",
        &logs,
        DayBoundary::Utc,
    )
    .unwrap_err();
    assert_eq!(err.day, now.date_naive());
}

#[test]
fn append_log_preserves_existing_entries_in_order() {
    let first = log_at(start(), true);
    let second = log_at(start() + Duration::days(1), false);
    let existing = vec![first.clone(), second.clone()];

    let now = start() + Duration::days(2);
    let next = append_log(now, false, "travel", &existing, DayBoundary::Utc).unwrap();

    assert_eq!(next.len(), 3);
    assert_eq!(next[0], first);
    assert_eq!(next[1], second);
    assert_eq!(next[2].reason, "travel");
    assert!(!next[2].completed);
    assert_eq!(existing.len(), 2);
}
