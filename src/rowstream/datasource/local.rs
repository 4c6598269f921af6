//! Local filesystem byte source.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::ByteSourceError;
use super::traits::{ByteSource, PathStat};

/// [`ByteSource`] over the local filesystem.
#[derive(Debug, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        LocalFileSystem
    }

    fn stat_of(path: &Path) -> Result<PathStat, ByteSourceError> {
        let display = path.display().to_string();
        let metadata = std::fs::metadata(path)
            .map_err(|e| ByteSourceError::from_io("stat", &display, &e))?;

        let modified = metadata
            .modified()
            .ok()
            .map(DateTime::<Utc>::from);

        Ok(PathStat {
            path: display,
            is_directory: metadata.is_dir(),
            size: metadata.len(),
            modified,
        })
    }
}

#[async_trait]
impl ByteSource for LocalFileSystem {
    async fn open_for_read(
        &self,
        path: &str,
    ) -> Result<Box<dyn Read + Send>, ByteSourceError> {
        let file =
            File::open(path).map_err(|e| ByteSourceError::from_io("open", path, &e))?;

        Ok(Box::new(file))
    }

    async fn open_for_write(
        &self,
        path: &str,
    ) -> Result<Box<dyn Write + Send>, ByteSourceError> {
        let file =
            File::create(path).map_err(|e| ByteSourceError::from_io("create", path, &e))?;

        Ok(Box::new(file))
    }

    async fn list_directory(&self, path: &str) -> Result<Vec<PathStat>, ByteSourceError> {
        let entries = std::fs::read_dir(path)
            .map_err(|e| ByteSourceError::from_io("list", path, &e))?;

        let mut stats = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| ByteSourceError::from_io("list", path, &e))?;
            stats.push(Self::stat_of(&entry.path())?);
        }

        // Listings are sorted for stable output across platforms.
        stats.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(stats)
    }

    async fn delete(&self, path: &str) -> Result<(), ByteSourceError> {
        std::fs::remove_file(path).map_err(|e| ByteSourceError::from_io("delete", path, &e))
    }

    async fn stat(&self, path: &str) -> Result<PathStat, ByteSourceError> {
        Self::stat_of(Path::new(path))
    }
}
