//! Implements StoragePort using a JSON file.
//!
//! Client-local slot storage for the session; survives restarts of the client.

use crate::domain::DomainError;
use crate::ports::StoragePort;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// File layout: slot name -> value, plus the time of the last write.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SlotFile {
    slots: HashMap<String, String>,
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
}

/// JSON file-based slot storage.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomic save using write-replace: temp file, sync_all, rename.
    /// A crash mid-write leaves the previous file intact.
    async fn save(&self, data: &SlotFile) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| DomainError::Storage(format!("create storage dir: {}", e)))?;
            }
        }

        let json =
            serde_json::to_string_pretty(data).map_err(|e| DomainError::Storage(e.to_string()))?;

        let temp_path = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::Storage(format!("create temp file: {}", e)))?;
        f.write_all(json.as_bytes())
            .await
            .map_err(|e| DomainError::Storage(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::Storage(format!("sync temp file: {}", e)))?;
        drop(f);

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| DomainError::Storage(format!("atomic rename failed: {}", e)))?;

        debug!(path = %self.path.display(), slots = data.slots.len(), "storage saved");
        Ok(())
    }
}

#[async_trait::async_trait]
impl StoragePort for JsonFileStorage {
    async fn load(&self) -> Result<HashMap<String, String>, DomainError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(DomainError::Storage(format!("read storage file: {}", e))),
        };
        let data: SlotFile = serde_json::from_str(&raw)
            .map_err(|e| DomainError::Storage(format!("parse storage file: {}", e)))?;
        Ok(data.slots)
    }

    async fn replace_all(&self, entries: &[(&str, &str)]) -> Result<(), DomainError> {
        let data = SlotFile {
            slots: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            saved_at: Some(Utc::now()),
        };
        self.save(&data).await
    }

    async fn clear(&self) -> Result<(), DomainError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::Storage(format!("remove storage file: {}", e))),
        }
    }
}
