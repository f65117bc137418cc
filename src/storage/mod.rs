//! Storage abstractions for parsed weekly lists.
//!
//! Each stored week keeps the annotated list together with a hash of the raw
//! text it was parsed from, so an unchanged upstream file is not parsed and
//! compared again.
//!
//! ## Directory Structure
//!
//! ```text
//! lists/
//! ├── ne/
//! │   ├── 2024-03-06.json
//! │   └── 2024-03-13.json
//! └── pn/
//!     └── 2024-03-13.json
//! ```

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::models::BestsellerList;

// Re-export for convenience
pub use local::LocalStorage;

/// One region's list for one week, as stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredList {
    /// Region code
    pub region: String,
    /// Publication week of the list
    pub week: NaiveDate,
    /// When the raw text was fetched
    pub fetched_at: DateTime<Utc>,
    /// SHA-256 of the raw text (hex)
    pub content_hash: String,
    /// Parsed and compared list
    pub list: BestsellerList,
}

impl StoredList {
    pub fn new(region: &str, week: NaiveDate, raw: &str, list: BestsellerList) -> Self {
        Self {
            region: region.to_string(),
            week,
            fetched_at: Utc::now(),
            content_hash: content_hash(raw),
            list,
        }
    }
}

/// Hex SHA-256 of raw list text.
pub fn content_hash(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Trait for list storage backends.
#[async_trait]
pub trait ListStorage: Send + Sync {
    /// Load a region's week, `None` if it was never stored.
    async fn load(&self, region: &str, week: NaiveDate) -> Result<Option<StoredList>>;

    /// Store (or replace) a region's week.
    async fn save(&self, stored: &StoredList) -> Result<()>;

    /// Stored weeks for a region, oldest first.
    async fn weeks(&self, region: &str) -> Result<Vec<NaiveDate>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_stable() {
        let a = content_hash("HARDCOVER FICTION\n1. Test Book");
        let b = content_hash("HARDCOVER FICTION\n1. Test Book");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, content_hash("HARDCOVER FICTION\n2. Test Book"));
    }
}
