//! Core domain logic for the 7-day habit tracker.
//! This crate is the single source of truth for cycle invariants.

pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use engine::{
    append_log, can_log_today, compute_status, summarize, DayBoundary, DuplicateDay, Insight,
    Status, Summary, CYCLE_LENGTH_DAYS,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::habit::{DeviceId, DeviceRecord, Habit, LogEntry, ValidationError};
pub use repo::json_file_repo::JsonFileRecordStore;
pub use repo::record_repo::{RecordStore, RepoError, RepoResult};
pub use repo::sqlite_repo::SqliteRecordStore;
pub use service::habit_service::{
    Clock, HabitService, HabitServiceError, ServiceResult, StatusReport, SystemClock,
};

/// Health-check message for boundary layers.
pub fn ping() -> &'static str {
    "Daily Reality Check core is running."
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_reports_running() {
        assert!(ping().contains("running"));
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
