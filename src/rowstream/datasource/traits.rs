//! The byte-source collaborator boundary.
//!
//! The decoding core never walks a filesystem itself: it asks a [`ByteSource`]
//! for streams, listings and metadata, and treats whatever is behind it
//! (local disk, a distributed filesystem client, an in-memory fixture) as
//! opaque.

use std::io::{Read, Write};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::ByteSourceError;

/// Metadata for one path in a byte source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStat {
    pub path: String,
    pub is_directory: bool,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Provider of byte streams and path metadata.
#[async_trait]
pub trait ByteSource: Send + Sync {
    /// Opens `path` for reading.
    async fn open_for_read(&self, path: &str)
        -> Result<Box<dyn Read + Send>, ByteSourceError>;

    /// Opens `path` for writing, truncating any existing contents.
    async fn open_for_write(
        &self,
        path: &str,
    ) -> Result<Box<dyn Write + Send>, ByteSourceError>;

    /// Lists the immediate entries of the directory at `path`.
    async fn list_directory(&self, path: &str) -> Result<Vec<PathStat>, ByteSourceError>;

    /// Deletes the file at `path`.
    async fn delete(&self, path: &str) -> Result<(), ByteSourceError>;

    /// Metadata for `path`.
    async fn stat(&self, path: &str) -> Result<PathStat, ByteSourceError>;
}
