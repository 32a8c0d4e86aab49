//! Durable fallback for messages that could not be sent live.
//!
//! The outbox is a single JSON array of [`OutboxRecord`]s. Each append reads
//! the whole file, pushes one record and replaces the file pretty-printed.
//! Existing entries are carried over as raw JSON, so entries written by older
//! versions or annotated by a draining tool survive unchanged. Nothing here
//! ever removes an entry; draining the file is left to whatever tool
//! consumes it.

use serde_json::Value;
use sms_core::{ContactError, OutboxRecord};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct Outbox {
    path: PathBuf,
    // Serializes the read-modify-write cycle across requests.
    write_lock: Arc<Mutex<()>>,
}

impl Outbox {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record stamped with the current time.
    pub async fn append(&self, to: &str, body: &str) -> Result<OutboxRecord, ContactError> {
        let record = OutboxRecord {
            to: to.to_string(),
            body: body.to_string(),
            timestamp: OffsetDateTime::now_utc().unix_timestamp(),
        };
        self.append_record(record.clone()).await?;
        Ok(record)
    }

    pub async fn append_record(&self, record: OutboxRecord) -> Result<(), ContactError> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.entries().await;
        let entry = serde_json::to_value(&record)
            .map_err(|e| ContactError::DeliveryFailed(format!("outbox encode: {}", e)))?;
        entries.push(entry);

        let json = serde_json::to_vec_pretty(&entries)
            .map_err(|e| ContactError::DeliveryFailed(format!("outbox encode: {}", e)))?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || replace_file(&path, &json))
            .await
            .map_err(|e| ContactError::DeliveryFailed(format!("outbox write task: {}", e)))?
            .map_err(|e| {
                ContactError::DeliveryFailed(format!("outbox write {}: {}", self.path.display(), e))
            })?;

        info!(
            path = %self.path.display(),
            records = entries.len(),
            "Message written to outbox"
        );
        Ok(())
    }

    /// Every entry of the outbox, exactly as stored.
    ///
    /// A missing or unreadable file, or one that is not a JSON array, reads
    /// as an empty list.
    pub async fn entries(&self) -> Vec<Value> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Outbox does not exist yet");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Outbox unreadable, starting a new list");
                return Vec::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(Value::Array(entries)) => entries,
            Ok(_) => {
                warn!(path = %self.path.display(), "Outbox is not a list, starting a new list");
                Vec::new()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Outbox malformed, starting a new list");
                Vec::new()
            }
        }
    }

    /// The entries that decode as [`OutboxRecord`]s.
    pub async fn load(&self) -> Vec<OutboxRecord> {
        self.entries()
            .await
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect()
    }
}

/// Write `contents` to a temporary file next to `path` and rename it into
/// place, so a failed write never leaves a truncated outbox behind.
fn replace_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
