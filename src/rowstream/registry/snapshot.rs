//! Disk snapshot of resolved schemas.
//!
//! The snapshot is the cold-start and fallback source for the registry
//! client: it is loaded once before any remote call and rewritten after every
//! successful remote resolution. It is never the primary source of truth, so
//! readers do not coordinate with writers: a read racing a write at worst
//! observes the previous generation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::error::SnapshotError;
use super::types::SchemaField;

/// Version written to and required from the snapshot document.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotDocument {
    version: u32,
    schemas: HashMap<String, Vec<SchemaField>>,
}

/// Reads and writes the versioned schema snapshot file.
///
/// Writers are serialized by a per-store mutex around the owned file path;
/// the lock is released on every exit path, including errors.
#[derive(Debug)]
pub struct SchemaSnapshotStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl SchemaSnapshotStore {
    /// Creates a store for `path`, creating parent directories as needed.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, SnapshotError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| io_error(&path, &e))?;
            }
        }

        Ok(SchemaSnapshotStore {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the full schema map as a fresh snapshot document.
    pub async fn save_state(
        &self,
        schemas: &HashMap<String, Arc<Vec<SchemaField>>>,
    ) -> Result<(), SnapshotError> {
        let _guard = self.write_lock.lock().await;

        let document = SnapshotDocument {
            version: SNAPSHOT_VERSION,
            schemas: schemas
                .iter()
                .map(|(name, fields)| (name.clone(), fields.as_ref().clone()))
                .collect(),
        };

        let serialized = serde_json::to_vec_pretty(&document).map_err(|e| {
            SnapshotError::Format {
                path: self.path.display().to_string(),
                message: e.to_string(),
            }
        })?;

        std::fs::write(&self.path, serialized).map_err(|e| io_error(&self.path, &e))
    }

    /// Loads the snapshot into a schema map.
    ///
    /// A missing or empty file yields an empty map. A document whose version
    /// is not [`SNAPSHOT_VERSION`] is an
    /// [`SnapshotError::IncompatibleVersion`] failure.
    pub async fn load_state(
        &self,
    ) -> Result<HashMap<String, Arc<Vec<SchemaField>>>, SnapshotError> {
        let contents = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(io_error(&self.path, &e)),
        };

        if contents.is_empty() {
            return Ok(HashMap::new());
        }

        let raw: serde_json::Value =
            serde_json::from_slice(&contents).map_err(|e| SnapshotError::Format {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;

        let version = raw
            .get("version")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| SnapshotError::Format {
                path: self.path.display().to_string(),
                message: "missing version".to_string(),
            })? as u32;

        if version != SNAPSHOT_VERSION {
            return Err(SnapshotError::IncompatibleVersion { found: version });
        }

        let document: SnapshotDocument =
            serde_json::from_value(raw).map_err(|e| SnapshotError::Format {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;

        Ok(document
            .schemas
            .into_iter()
            .map(|(name, fields)| (name, Arc::new(fields)))
            .collect())
    }
}

fn io_error(path: &Path, err: &std::io::Error) -> SnapshotError {
    SnapshotError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
