//! Schema versions of the record database.
//!
//! Version 1 creates `devices` and `log_entries`. Each later version is an
//! additive SQL script applied on top.
//!
//! # Invariants
//! - `version` values must remain strictly increasing.
//! - All pending versions are applied in one transaction, and the last one is
//!   mirrored to `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// Tables the record store reads and writes.
const RECORD_TABLES: [&str; 2] = ["devices", "log_entries"];

/// Returns the schema version this build writes.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the record database up to `latest_version`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = schema_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }
    if from == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > from) {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
        debug!(
            "event=db_migrate_step module=db status=ok version={}",
            migration.version
        );
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from} to_version={latest}");
    Ok(())
}

/// Checks that `conn` carries this build's schema with both record tables.
///
/// # Errors
/// - `SchemaNotReady` when `user_version` differs from `latest_version`.
/// - `MissingTable` when a record table was dropped.
pub fn ensure_schema_ready(conn: &Connection) -> DbResult<()> {
    let found = schema_version(conn)?;
    let expected = latest_version();
    if found != expected {
        return Err(DbError::SchemaNotReady { found, expected });
    }

    for table in RECORD_TABLES {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(DbError::MissingTable(table));
        }
    }
    Ok(())
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}
