//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! └── {region}/
//!     └── YYYY-MM-DD.json   # StoredList for the week
//! ```

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::{ListStorage, StoredList};

const WEEK_FILE_FORMAT: &str = "%Y-%m-%d";

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Storage key for a region's week.
    fn week_key(region: &str, week: NaiveDate) -> String {
        format!("{}/{}.json", region, week.format(WEEK_FILE_FORMAT))
    }
}

#[async_trait]
impl ListStorage for LocalStorage {
    async fn load(&self, region: &str, week: NaiveDate) -> Result<Option<StoredList>> {
        let key = Self::week_key(region, week);
        let stored: Option<StoredList> = self.read_json(&key).await?;

        if let Some(stored) = &stored {
            if stored.region != region || stored.week != week {
                return Err(AppError::storage(format!(
                    "{} holds {} {} instead",
                    key, stored.region, stored.week
                )));
            }
        }
        Ok(stored)
    }

    async fn save(&self, stored: &StoredList) -> Result<()> {
        let key = Self::week_key(&stored.region, stored.week);
        self.write_json(&key, stored).await?;
        log::info!(
            "Stored {} books for {} week {} at {}",
            stored.list.book_count(),
            stored.region,
            stored.week,
            key
        );
        Ok(())
    }

    async fn weeks(&self, region: &str) -> Result<Vec<NaiveDate>> {
        let dir = self.path(region);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Io(e)),
        };

        let mut weeks = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            match NaiveDate::parse_from_str(stem, WEEK_FILE_FORMAT) {
                Ok(week) => weeks.push(week),
                Err(_) => log::debug!("Ignoring unexpected file {:?} in {:?}", name, dir),
            }
        }

        weeks.sort();
        Ok(weeks)
    }
}
