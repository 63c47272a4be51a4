//! File-per-record storage for registrations.
//!
//! Each registration lives in `<data_dir>/<id>.json`. There is no locking:
//! two concurrent status updates for the same id can race and the last write
//! wins. Only one admin decision is expected per record.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::record::{self, Registration, RegistrationPayload, RegistrationStatus};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid record id: {0:?}")]
    InvalidId(String),

    #[error("Record {0} is not a JSON object")]
    NotAnObject(String),
}

impl StoreError {
    /// Missing and unaddressable ids both mean "no such record" to callers.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::InvalidId(_))
    }
}

#[derive(Debug, Clone)]
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    /// Open the store, creating the data directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        info!(path = %dir.display(), "Record store opened");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist a new record and return its generated id.
    pub async fn create(
        &self,
        payload: RegistrationPayload,
        status: RegistrationStatus,
    ) -> Result<String, StoreError> {
        let record = Registration {
            id: record::generate_id(),
            status,
            payload,
        };
        self.write(&record).await?;
        debug!(id = %record.id, %status, "Registration stored");
        Ok(record.id)
    }

    /// Overwrite the status of an existing record.
    ///
    /// Only the `status` key is rewritten; every other key in the file is
    /// kept as found. Returns `Ok(false)` when no record with `id` exists.
    pub async fn update_status(
        &self,
        id: &str,
        status: RegistrationStatus,
    ) -> Result<bool, StoreError> {
        let mut raw = match self.read_raw(id).await {
            Ok(raw) => raw,
            Err(e) if e.is_not_found() => return Ok(false),
            Err(e) => return Err(e),
        };
        let Value::Object(fields) = &mut raw else {
            return Err(StoreError::NotAnObject(id.to_string()));
        };
        fields.insert("status".to_string(), Value::from(status.as_str()));
        tokio::fs::write(self.path_for(id)?, serde_json::to_vec_pretty(&raw)?).await?;
        debug!(id, %status, "Registration status updated");
        Ok(true)
    }

    /// Current status as stored, `pending` when the key is absent.
    ///
    /// Values outside the known set are returned verbatim.
    pub async fn status(&self, id: &str) -> Result<String, StoreError> {
        let raw = self.read_raw(id).await?;
        let Value::Object(fields) = &raw else {
            return Err(StoreError::NotAnObject(id.to_string()));
        };
        Ok(match fields.get("status") {
            None | Some(Value::Null) => RegistrationStatus::Pending.as_str().to_string(),
            Some(value) => record::value_text(value),
        })
    }

    pub async fn get(&self, id: &str) -> Result<Registration, StoreError> {
        let raw = self.read_raw(id).await?;
        let mut record: Registration = serde_json::from_value(raw)?;
        // The file name is authoritative.
        id.clone_into(&mut record.id);
        Ok(record)
    }

    async fn read_raw(&self, id: &str) -> Result<Value, StoreError> {
        let path = self.path_for(id)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write(&self, record: &Registration) -> Result<(), StoreError> {
        let path = self.path_for(&record.id)?;
        let json = serde_json::to_vec_pretty(record)?;
        tokio::fs::write(&path, json).await?;
        Ok(())
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        if !is_safe_id(id) {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }
}

/// Ids become file names, so reject anything that could leave `dir`.
fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('.')
        && !id.contains(['/', '\\', '\0'])
}
