use chrono::{TimeZone, Utc};
use habit_core::db::migrations::latest_version;
use habit_core::db::{open_db, open_db_in_memory, DbError};
use habit_core::{DeviceId, DeviceRecord, Habit, LogEntry, RecordStore, SqliteRecordStore};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "devices");
    assert_table_exists(&conn, "log_entries");
}

#[test]
fn opening_same_database_twice_keeps_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("habit.sqlite3");
    let started_at = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();

    let record = DeviceRecord {
        device_id: DeviceId::parse("device-1").unwrap(),
        habit: Some(Habit::start("Read", "1 page", started_at).unwrap()),
        logs: vec![LogEntry {
            logged_at: started_at,
            completed: true,
            reason: String::new(),
        }],
    };

    let conn_first = open_db(&path).unwrap();
    SqliteRecordStore::try_new(&conn_first)
        .unwrap()
        .save(&record)
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let loaded = SqliteRecordStore::try_new(&conn_second)
        .unwrap()
        .load(&record.device_id)
        .unwrap();
    assert_eq!(loaded, Some(record));
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
