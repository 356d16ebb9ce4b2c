//! Device record domain model.
//!
//! # Responsibility
//! - Define the single per-device document: optional habit plus daily logs.
//! - Normalize and validate user-provided text before it reaches storage.
//!
//! # Invariants
//! - `DeviceId` is never blank.
//! - `Habit::name` and `Habit::minimum_version` are never blank.
//! - `DeviceRecord::logs` is append-only and ordered by insertion time.
//! - `Habit::active` is not flipped when a cycle ends; completion is derived.
//!
//! # See also
//! - `crate::engine::day_state` for the derived cycle phase.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Validation failures for caller-provided input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Device identifier was missing or blank.
    MissingDeviceId,
    /// Habit name was missing or blank.
    MissingHabitName,
    /// Minimum version was missing or blank.
    MissingMinimumVersion,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDeviceId => write!(f, "Device ID required"),
            Self::MissingHabitName => write!(f, "Habit name required"),
            Self::MissingMinimumVersion => write!(f, "Minimum version required"),
        }
    }
}

impl Error for ValidationError {}

/// Client-generated opaque identifier for one installation.
///
/// Kept opaque and stored verbatim: `" a"` and `"a"` are different devices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId(String);

impl DeviceId {
    /// Parses a device identifier, rejecting empty or all-whitespace input.
    pub fn parse(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let value = value.as_ref();
        if value.trim().is_empty() {
            return Err(ValidationError::MissingDeviceId);
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DeviceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DeviceId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<DeviceId> for String {
    fn from(value: DeviceId) -> Self {
        value.0
    }
}

/// The single habit a device is committed to for one cycle.
///
/// Serialized with the field names of the legacy JSON document so existing
/// flat-file data loads unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub name: String,
    /// Smallest acceptable daily action.
    #[serde(rename = "minVersion")]
    pub minimum_version: String,
    /// Start of day 1 of the cycle.
    #[serde(rename = "startDate")]
    pub started_at: DateTime<Utc>,
    /// Stays `true` after the cycle ends; see `compute_status`.
    #[serde(rename = "isActive", default = "default_active")]
    pub active: bool,
}

impl Habit {
    /// Creates an active habit starting at `started_at`.
    ///
    /// # Errors
    /// - `MissingHabitName` / `MissingMinimumVersion` when the normalized
    ///   text is empty.
    pub fn start(
        name: &str,
        minimum_version: &str,
        started_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let name = normalize_text(name).ok_or(ValidationError::MissingHabitName)?;
        let minimum_version =
            normalize_text(minimum_version).ok_or(ValidationError::MissingMinimumVersion)?;
        Ok(Self {
            name,
            minimum_version,
            started_at,
            active: true,
        })
    }
}

fn default_active() -> bool {
    true
}

/// One yes/no daily check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "date")]
    pub logged_at: DateTime<Utc>,
    pub completed: bool,
    /// Free-form note, usually why the day was missed. Empty when absent.
    #[serde(default)]
    pub reason: String,
}

/// Full per-device document. Read and overwritten as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(rename = "_id")]
    pub device_id: DeviceId,
    #[serde(default)]
    pub habit: Option<Habit>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

impl DeviceRecord {
    /// Creates the empty record used on first contact.
    pub fn empty(device_id: DeviceId) -> Self {
        Self {
            device_id,
            habit: None,
            logs: Vec::new(),
        }
    }

    /// Replaces the habit and clears the log history.
    pub fn restart(&mut self, habit: Habit) {
        self.habit = Some(habit);
        self.logs.clear();
    }

    /// Number of logs marked as completed.
    pub fn completed_count(&self) -> usize {
        self.logs.iter().filter(|log| log.completed).count()
    }
}

/// Trims and collapses whitespace runs; returns `None` when nothing is left.
pub fn normalize_text(value: &str) -> Option<String> {
    let collapsed = WHITESPACE_RE.replace_all(value.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.into_owned())
    }
}
