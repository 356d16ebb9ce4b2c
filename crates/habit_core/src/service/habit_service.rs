//! Habit cycle use-case service.
//!
//! # Responsibility
//! - Provide the device-level entry points: init, start, status, log, summary.
//! - Read the full record, run the engine, write the full record back.
//!
//! # Invariants
//! - Input is validated before any storage access.
//! - A second log on the same calendar day is reported as `DuplicateDay`,
//!   never as `NotFound` or a storage failure.
//! - Service layer remains storage-agnostic.
//! - Clock readings are truncated to whole milliseconds before use, so a
//!   record reads back equal from every store.
//!
//! Two concurrent callers for one device race with last-write-wins; no
//! locking is attempted.

use crate::engine::{
    append_log, compute_status, summarize, DayBoundary, DuplicateDay, Status, Summary,
};
use crate::model::habit::{DeviceId, DeviceRecord, Habit, ValidationError};
use crate::repo::record_repo::{RecordStore, RepoError};
use chrono::{DateTime, SubsecRound, Utc};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc>,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

/// Service error for habit use-cases.
#[derive(Debug)]
pub enum HabitServiceError {
    /// Required input missing or blank.
    Validation(ValidationError),
    /// No record exists for the device identifier.
    NotFound(DeviceId),
    /// Today's log already exists.
    DuplicateDay(DuplicateDay),
    /// Underlying store read/write failed.
    Storage(RepoError),
}

impl Display for HabitServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(device_id) => write!(f, "User not found: {device_id}"),
            Self::DuplicateDay(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for HabitServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::DuplicateDay(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<ValidationError> for HabitServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DuplicateDay> for HabitServiceError {
    fn from(value: DuplicateDay) -> Self {
        Self::DuplicateDay(value)
    }
}

impl From<RepoError> for HabitServiceError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

pub type ServiceResult<T> = Result<T, HabitServiceError>;

/// Status plus the habit it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub status: Status,
    /// `None` only when `status` is `Setup` because no habit exists.
    pub habit: Option<Habit>,
}

/// Habit service facade over a record store.
pub struct HabitService<S: RecordStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    boundary: DayBoundary,
}

impl<S: RecordStore> HabitService<S> {
    /// Creates a service reading wall-clock time.
    pub fn new(store: S, boundary: DayBoundary) -> Self {
        Self::with_clock(store, SystemClock, boundary)
    }
}

impl<S: RecordStore, C: Clock> HabitService<S, C> {
    /// Creates a service with an explicit clock.
    pub fn with_clock(store: S, clock: C, boundary: DayBoundary) -> Self {
        Self {
            store,
            clock,
            boundary,
        }
    }

    pub fn boundary(&self) -> DayBoundary {
        self.boundary
    }

    /// Returns the record for `device_id`, creating an empty one on first
    /// contact. Idempotent.
    pub fn init_or_fetch(&self, device_id: &str) -> ServiceResult<DeviceRecord> {
        let device_id = DeviceId::parse(device_id)?;
        if let Some(record) = self.store.load(&device_id)? {
            debug!("event=device_init module=service status=ok created=false device_id={device_id}");
            return Ok(record);
        }

        let record = DeviceRecord::empty(device_id);
        self.store.save(&record)?;
        info!(
            "event=device_init module=service status=ok created=true device_id={}",
            record.device_id
        );
        Ok(record)
    }

    /// Starts a new cycle: replaces the habit and clears all logs.
    ///
    /// # Errors
    /// - `Validation` for blank device id, name or minimum version.
    /// - `NotFound` when the device was never initialized.
    pub fn start_habit(
        &self,
        device_id: &str,
        name: &str,
        minimum_version: &str,
    ) -> ServiceResult<DeviceRecord> {
        let device_id = DeviceId::parse(device_id)?;
        let habit = Habit::start(name, minimum_version, self.now())?;

        let mut record = self.require_record(&device_id)?;
        let cleared_logs = record.logs.len();
        record.restart(habit);
        self.store.save(&record)?;

        info!(
            "event=habit_start module=service status=ok device_id={device_id} cleared_logs={cleared_logs}"
        );
        Ok(record)
    }

    /// Derives the current cycle phase. An unknown device reads as `Setup`.
    pub fn get_status(&self, device_id: &str) -> ServiceResult<Status> {
        Ok(self.status_report(device_id)?.status)
    }

    /// Derives the current cycle phase together with the stored habit.
    pub fn status_report(&self, device_id: &str) -> ServiceResult<StatusReport> {
        let device_id = DeviceId::parse(device_id)?;
        let now = self.now();
        let Some(record) = self.store.load(&device_id)? else {
            return Ok(StatusReport {
                status: Status::Setup,
                habit: None,
            });
        };

        let status = compute_status(now, record.habit.as_ref(), &record.logs, self.boundary);
        debug!(
            "event=habit_status module=service status=ok device_id={device_id} phase={}",
            status.phase()
        );
        Ok(StatusReport {
            status,
            habit: record.habit,
        })
    }

    /// Appends today's log entry.
    ///
    /// # Errors
    /// - `NotFound` when the device was never initialized.
    /// - `DuplicateDay` when today already has an entry, whatever the payload.
    pub fn log_today(
        &self,
        device_id: &str,
        completed: bool,
        reason: &str,
    ) -> ServiceResult<DeviceRecord> {
        let device_id = DeviceId::parse(device_id)?;
        let now = self.now();

        let mut record = self.require_record(&device_id)?;
        record.logs = match append_log(now, completed, reason, &record.logs, self.boundary) {
            Ok(logs) => logs,
            Err(err) => {
                warn!(
                    "event=habit_log module=service status=error error_code=duplicate_day device_id={device_id} day={}",
                    err.day
                );
                return Err(err.into());
            }
        };
        self.store.save(&record)?;

        info!(
            "event=habit_log module=service status=ok device_id={device_id} completed={completed} log_count={}",
            record.logs.len()
        );
        Ok(record)
    }

    /// Builds the end-of-cycle summary.
    ///
    /// # Errors
    /// - `NotFound` when the device was never initialized.
    pub fn get_summary(&self, device_id: &str) -> ServiceResult<Summary> {
        let device_id = DeviceId::parse(device_id)?;
        let record = self.require_record(&device_id)?;
        Ok(summarize(&record.logs))
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(3)
    }

    fn require_record(&self, device_id: &DeviceId) -> ServiceResult<DeviceRecord> {
        self.store
            .load(device_id)?
            .ok_or_else(|| HabitServiceError::NotFound(device_id.clone()))
    }
}
