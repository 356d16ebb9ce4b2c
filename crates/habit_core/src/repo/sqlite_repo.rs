//! SQLite-backed record store.
//!
//! # Responsibility
//! - Map `DeviceRecord` onto the `devices` and `log_entries` tables.
//! - Overwrite a whole record inside one transaction.
//!
//! # Invariants
//! - Habit columns are either all NULL (no habit) or all set.
//! - `log_entries.position` preserves insertion order.
//! - Timestamps are stored as Unix epoch milliseconds; the service only hands
//!   over millisecond-precision instants, so records read back unchanged.

use crate::db::migrations::ensure_schema_ready;
use crate::model::habit::{DeviceId, DeviceRecord, Habit, LogEntry};
use crate::repo::record_repo::{RecordStore, RepoError, RepoResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// SQLite-backed record store borrowing a migrated connection.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    /// Constructs a store from a migrated connection.
    ///
    /// # Errors
    /// - `Db(SchemaNotReady | MissingTable)` when the connection schema does
    ///   not match this build.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn load(&self, device_id: &DeviceId) -> RepoResult<Option<DeviceRecord>> {
        let habit = self
            .conn
            .query_row(
                "SELECT
                    habit_name,
                    habit_min_version,
                    habit_started_at,
                    habit_active
                 FROM devices
                 WHERE device_id = ?1;",
                [device_id.as_str()],
                parse_habit_columns,
            )
            .optional()?;

        let Some(habit) = habit else {
            return Ok(None);
        };
        let habit = habit?;

        let mut stmt = self.conn.prepare(
            "SELECT logged_at, completed, reason
             FROM log_entries
             WHERE device_id = ?1
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([device_id.as_str()])?;
        let mut logs = Vec::new();
        while let Some(row) = rows.next()? {
            logs.push(parse_log_row(row)?);
        }

        Ok(Some(DeviceRecord {
            device_id: device_id.clone(),
            habit,
            logs,
        }))
    }

    fn save(&self, record: &DeviceRecord) -> RepoResult<()> {
        let device_id = record.device_id.as_str();
        let habit = record.habit.as_ref();
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO devices (
                device_id,
                habit_name,
                habit_min_version,
                habit_started_at,
                habit_active
             ) VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (device_id) DO UPDATE SET
                habit_name = excluded.habit_name,
                habit_min_version = excluded.habit_min_version,
                habit_started_at = excluded.habit_started_at,
                habit_active = excluded.habit_active,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                device_id,
                habit.map(|habit| habit.name.as_str()),
                habit.map(|habit| habit.minimum_version.as_str()),
                habit.map(|habit| habit.started_at.timestamp_millis()),
                habit.map(|habit| bool_to_int(habit.active)),
            ],
        )?;

        tx.execute("DELETE FROM log_entries WHERE device_id = ?1;", [device_id])?;

        {
            let mut insert = tx.prepare(
                "INSERT INTO log_entries (device_id, position, logged_at, completed, reason)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
            )?;
            for (position, log) in record.logs.iter().enumerate() {
                let position = i64::try_from(position).map_err(|_| {
                    RepoError::InvalidData(format!("log position {position} overflows i64"))
                })?;
                insert.execute(params![
                    device_id,
                    position,
                    log.logged_at.timestamp_millis(),
                    bool_to_int(log.completed),
                    log.reason.as_str(),
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }
}

fn parse_habit_columns(row: &Row<'_>) -> rusqlite::Result<RepoResult<Option<Habit>>> {
    let name: Option<String> = row.get(0)?;
    let minimum_version: Option<String> = row.get(1)?;
    let started_at: Option<i64> = row.get(2)?;
    let active: Option<i64> = row.get(3)?;

    Ok(match (name, minimum_version, started_at, active) {
        (None, None, None, None) => Ok(None),
        (Some(name), Some(minimum_version), Some(started_at), Some(active)) => {
            parse_millis(started_at, "devices.habit_started_at").and_then(|started_at| {
                Ok(Some(Habit {
                    name,
                    minimum_version,
                    started_at,
                    active: parse_flag(active, "devices.habit_active")?,
                }))
            })
        }
        _ => Err(RepoError::InvalidData(
            "habit columns in devices must be all set or all NULL".to_string(),
        )),
    })
}

fn parse_log_row(row: &Row<'_>) -> RepoResult<LogEntry> {
    Ok(LogEntry {
        logged_at: parse_millis(row.get("logged_at")?, "log_entries.logged_at")?,
        completed: parse_flag(row.get("completed")?, "log_entries.completed")?,
        reason: row.get("reason")?,
    })
}

fn parse_millis(value: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(value).ok_or_else(|| {
        RepoError::InvalidData(format!("timestamp `{value}` out of range in {column}"))
    })
}

fn parse_flag(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
