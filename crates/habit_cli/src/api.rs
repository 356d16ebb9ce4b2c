//! Response envelopes for the command-line boundary.
//!
//! # Responsibility
//! - Map typed service errors onto stable status codes and messages.
//! - Shape payloads the way the legacy HTTP API returned them.
//!
//! # Invariants
//! - `DuplicateDay` maps to 409 and is never reported as 404 or 500.
//! - Storage failures are reported opaquely with status 500.

use habit_core::{DeviceRecord, Habit, HabitServiceError, Status, StatusReport, Summary};
use serde::Serialize;

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_CONFLICT: u16 = 409;
pub const STATUS_INTERNAL: u16 = 500;

/// Success payloads.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Record(DeviceRecord),
    Status(StatusView),
    Summary(Summary),
    Ping(PingView),
}

/// Status payload in the legacy wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_logged_today: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub habit: Option<Habit>,
}

impl From<StatusReport> for StatusView {
    fn from(report: StatusReport) -> Self {
        let (day_number, has_logged_today) = match report.status {
            Status::Active {
                day_number,
                has_logged_today,
            } => (Some(day_number), Some(has_logged_today)),
            Status::Setup | Status::Completed => (None, None),
        };
        let habit = match report.status {
            Status::Setup => None,
            Status::Active { .. } | Status::Completed => report.habit,
        };
        Self {
            status: report.status.phase(),
            day_number,
            has_logged_today,
            habit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PingView {
    pub message: &'static str,
    pub version: &'static str,
}

/// One JSON line written to stdout per invocation.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub ok: bool,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Payload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    pub fn success(data: Payload) -> Self {
        Self {
            ok: true,
            status: STATUS_OK,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(status: u16, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            status,
            data: None,
            error: Some(message.into()),
        }
    }

    pub fn from_service_error(err: &HabitServiceError) -> Self {
        let message = match err {
            HabitServiceError::DuplicateDay(_) => "Already logged today".to_string(),
            HabitServiceError::NotFound(_) => "User not found".to_string(),
            other => other.to_string(),
        };
        Self::failure(status_code(err), message)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| {
            format!(
                r#"{{"ok":false,"status":{STATUS_INTERNAL},"error":"failed to encode response: {}"}}"#,
                err.to_string().replace('"', "'")
            )
        })
    }
}

/// Maps a service error onto its boundary status code.
pub fn status_code(err: &HabitServiceError) -> u16 {
    match err {
        HabitServiceError::Validation(_) => STATUS_BAD_REQUEST,
        HabitServiceError::NotFound(_) => STATUS_NOT_FOUND,
        HabitServiceError::DuplicateDay(_) => STATUS_CONFLICT,
        HabitServiceError::Storage(_) => STATUS_INTERNAL,
    }
}
