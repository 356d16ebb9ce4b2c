//! Record store contract shared by all storage backends.
//!
//! # Responsibility
//! - Define read-by-key and overwrite-by-key over whole device records.
//! - Carry storage failures as one opaque error family.
//!
//! # Invariants
//! - `save` replaces the full record for its device identifier; there are
//!   no field-level updates.
//! - Concurrent writers to one device identifier are last-write-wins.

use crate::db::DbError;
use crate::model::habit::{DeviceId, DeviceRecord};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage failure for device record reads and writes.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Io(std::io::Error),
    Json(serde_json::Error),
    /// Stored data violates a model invariant.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "record file i/o failed: {err}"),
            Self::Json(err) => write!(f, "record file is not valid JSON: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for RepoError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Keyed store of device records.
pub trait RecordStore {
    /// Reads the full record for `device_id`, if one exists.
    fn load(&self, device_id: &DeviceId) -> RepoResult<Option<DeviceRecord>>;
    /// Creates or fully overwrites the record keyed by `record.device_id`.
    fn save(&self, record: &DeviceRecord) -> RepoResult<()>;
}

impl<T: RecordStore + ?Sized> RecordStore for &T {
    fn load(&self, device_id: &DeviceId) -> RepoResult<Option<DeviceRecord>> {
        (**self).load(device_id)
    }

    fn save(&self, record: &DeviceRecord) -> RepoResult<()> {
        (**self).save(record)
    }
}
