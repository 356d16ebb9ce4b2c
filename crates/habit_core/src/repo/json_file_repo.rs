//! Flat JSON file record store.
//!
//! # Responsibility
//! - Keep every device record in one JSON object keyed by device identifier.
//! - Stay layout-compatible with the legacy `users.json` document.
//!
//! # Invariants
//! - Every map key equals the `_id` of the record stored under it.
//! - Records are decoded one at a time: `load` decodes only the requested
//!   entry and `save` passes other entries through untouched, so one corrupt
//!   record never blocks reads or writes for other devices.
//! - Writes go to a sibling temp file that is renamed over the target, so a
//!   reader never observes a half-written document.

use crate::model::habit::{DeviceId, DeviceRecord};
use crate::repo::record_repo::{RecordStore, RepoError, RepoResult};
use log::{debug, warn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

type RecordMap = BTreeMap<String, Value>;

/// Record store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileRecordStore {
    path: PathBuf,
}

impl JsonFileRecordStore {
    /// Opens the store at `path`, creating parent directories and an empty
    /// `{}` document when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> RepoResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        if !path.exists() {
            fs::write(&path, "{}")?;
            debug!(
                "event=record_file_init module=repo status=ok path={}",
                path.display()
            );
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> RepoResult<RecordMap> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(RecordMap::new()),
            Err(err) => return Err(err.into()),
        };
        if raw.trim().is_empty() {
            return Ok(RecordMap::new());
        }

        Ok(serde_json::from_str(&raw)?)
    }

    fn write_all(&self, records: &RecordMap) -> RepoResult<()> {
        let serialized = serde_json::to_string_pretty(records)?;
        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, serialized)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl RecordStore for JsonFileRecordStore {
    fn load(&self, device_id: &DeviceId) -> RepoResult<Option<DeviceRecord>> {
        let mut records = self.read_all()?;
        let Some(raw) = records.remove(device_id.as_str()) else {
            return Ok(None);
        };

        let record: DeviceRecord = serde_json::from_value(raw).map_err(|err| {
            warn!(
                "event=record_decode module=repo status=error device_id={device_id} error={err}"
            );
            RepoError::InvalidData(format!("record `{device_id}` is malformed: {err}"))
        })?;
        if record.device_id != *device_id {
            return Err(RepoError::InvalidData(format!(
                "record key `{device_id}` does not match its _id `{}`",
                record.device_id
            )));
        }
        Ok(Some(record))
    }

    fn save(&self, record: &DeviceRecord) -> RepoResult<()> {
        let mut records = self.read_all()?;
        records.insert(
            record.device_id.as_str().to_string(),
            serde_json::to_value(record)?,
        );
        self.write_all(&records)
    }
}

#[cfg(test)]
mod tests {
    use super::JsonFileRecordStore;
    use crate::model::habit::{DeviceId, DeviceRecord};
    use crate::repo::record_repo::{RecordStore, RepoError};

    #[test]
    fn open_creates_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("users.json");

        let store = JsonFileRecordStore::open(&path).unwrap();
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "{}");
        assert!(store
            .load(&DeviceId::parse("nobody").unwrap())
            .unwrap()
            .is_none());
    }

    #[test]
    fn mismatched_key_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(
            &path,
            r#"{ "a": { "_id": "b", "habit": null, "logs": [] } }"#,
        )
        .unwrap();

        let store = JsonFileRecordStore::open(&path).unwrap();
        let err = store.load(&DeviceId::parse("a").unwrap()).unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(_)));
    }

    #[test]
    fn corrupt_record_only_affects_its_own_device() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(
            &path,
            r#"{
  "broken": { "_id": "broken", "habit": { "name": 7 }, "logs": "nope" },
  "good": { "_id": "good", "habit": null, "logs": [] }
}"#,
        )
        .unwrap();

        let store = JsonFileRecordStore::open(&path).unwrap();
        let good = DeviceId::parse("good").unwrap();
        assert_eq!(
            store.load(&good).unwrap(),
            Some(DeviceRecord::empty(good.clone()))
        );
        assert!(matches!(
            store.load(&DeviceId::parse("broken").unwrap()).unwrap_err(),
            RepoError::InvalidData(_)
        ));

        let other = DeviceRecord::empty(DeviceId::parse("other").unwrap());
        store.save(&other).unwrap();
        assert_eq!(store.load(&other.device_id).unwrap(), Some(other));

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["broken"]["logs"], "nope");
    }

    #[test]
    fn save_keeps_other_devices() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileRecordStore::open(dir.path().join("users.json")).unwrap();
        let first = DeviceRecord::empty(DeviceId::parse("first").unwrap());
        let second = DeviceRecord::empty(DeviceId::parse("second").unwrap());

        store.save(&first).unwrap();
        store.save(&second).unwrap();

        assert_eq!(store.load(&first.device_id).unwrap(), Some(first));
        assert_eq!(store.load(&second.device_id).unwrap(), Some(second));
    }
}
