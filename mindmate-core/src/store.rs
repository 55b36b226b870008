//! Append-only event store backed by a single JSON snapshot document.
//!
//! The whole snapshot is held in memory and rewritten on every append.
//! Reads never fail: a missing document starts empty (and is created), an
//! unreadable or corrupt one is logged and replaced by an empty snapshot.
//! Individual records are coerced field by field, so one oddly typed entry
//! never costs the rest of the document.
//! Writes are best effort: failures are logged and otherwise ignored.
//!
//! Single writer only. Appends take `&mut self`; two processes sharing one
//! path will overwrite each other (last persist wins).

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{ChatEvent, CheckinRecord, Snapshot};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot document is not a JSON object")]
    NotAnObject,
}

pub struct EventStore {
    path: PathBuf,
    snapshot: Snapshot,
}

impl EventStore {
    /// Open the store at `path`, creating an empty document if none exists.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        if !path.exists() {
            let snapshot = Snapshot::default();
            if let Err(e) = write_snapshot(&path, &snapshot) {
                tracing::warn!(path = %path.display(), error = %e, "Could not create empty snapshot");
            } else {
                tracing::info!(path = %path.display(), "Created empty snapshot");
            }
            return Self { path, snapshot };
        }

        let snapshot = match read_snapshot(&path) {
            Ok(s) => {
                tracing::debug!(
                    path = %path.display(),
                    checkins = s.checkins.len(),
                    chat_events = s.chat_events.len(),
                    "Snapshot loaded"
                );
                s
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Snapshot unreadable, starting with an empty store"
                );
                Snapshot::default()
            }
        };

        Self { path, snapshot }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents of the store.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn append_checkin(&mut self, record: CheckinRecord) {
        self.snapshot.checkins.push(record);
        self.persist();
    }

    pub fn append_chat_event(&mut self, event: ChatEvent) {
        self.snapshot.chat_events.push(event);
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = write_snapshot(&self.path, &self.snapshot) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to persist snapshot");
        }
    }
}

/// Read and decode a snapshot document. Only unreadable files, invalid JSON
/// and non-object documents are errors.
pub fn read_snapshot(path: &Path) -> Result<Snapshot, StoreError> {
    let raw = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    if !value.is_object() {
        return Err(StoreError::NotAnObject);
    }
    Ok(Snapshot::from_value(&value))
}

/// Write the snapshot as pretty JSON via a sibling temp file and rename.
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), StoreError> {
    let body = serde_json::to_string_pretty(snapshot)?;

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let written = fs::File::create(&tmp_path).and_then(|mut file| {
        file.write_all(body.as_bytes())?;
        file.sync_all()
    });
    if let Err(e) = written.and_then(|()| fs::rename(&tmp_path, path)) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}
