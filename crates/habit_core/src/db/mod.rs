//! SQLite home of the device records.
//!
//! # Responsibility
//! - Open connections configured for the record store (`foreign_keys`,
//!   busy timeout) and bring them up to the current schema.
//! - Own the schema: one `devices` row per device with the habit inlined,
//!   and one `log_entries` row per logged day.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - No device record is read or written through a connection whose schema
//!   does not match this build.
//! - Connections are explicit handles owned by the caller; there is no
//!   process-wide connection state.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure opening, migrating or checking the record database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was migrated by a newer build; device records in it are left
    /// untouched.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// A connection handed to the record store was not opened through
    /// `open_db`/`open_db_in_memory`.
    SchemaNotReady { found: u32, expected: u32 },
    /// `user_version` matches but a record table is gone.
    MissingTable(&'static str),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "record database error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "record database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::SchemaNotReady { found, expected } => write!(
                f,
                "record database schema version {found} does not match expected {expected}; open it with `open_db`"
            ),
            Self::MissingTable(table) => {
                write!(f, "record database is missing table `{table}`")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. }
            | Self::SchemaNotReady { .. }
            | Self::MissingTable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
