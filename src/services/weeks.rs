// src/services/weeks.rs

//! Weeks-on-list counts from stored history.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::pipeline::WeeksOnListLookup;
use crate::storage::ListStorage;
use crate::utils::previous_week;

/// Counts, per ISBN, the consecutive stored weeks that listed it, walking
/// back from `anchor` one week at a time. A week that was never stored ends
/// every streak.
pub struct HistoryWeeksLookup<'a> {
    storage: &'a dyn ListStorage,
    region: String,
    anchor: NaiveDate,
    lookback: u32,
}

impl<'a> HistoryWeeksLookup<'a> {
    pub fn new(
        storage: &'a dyn ListStorage,
        region: impl Into<String>,
        anchor: NaiveDate,
        lookback: u32,
    ) -> Self {
        Self {
            storage,
            region: region.into(),
            anchor,
            lookback,
        }
    }
}

#[async_trait]
impl WeeksOnListLookup for HistoryWeeksLookup<'_> {
    async fn weeks_on_list(&self, isbns: &[String]) -> Result<HashMap<String, u32>> {
        let mut counts: HashMap<String, u32> = HashMap::new();
        let mut active: HashSet<&str> = isbns
            .iter()
            .filter(|i| !i.is_empty())
            .map(String::as_str)
            .collect();

        let mut week = self.anchor;
        for _ in 0..self.lookback {
            if active.is_empty() {
                break;
            }
            let Some(stored) = self.storage.load(&self.region, week).await? else {
                break;
            };

            let listed: HashSet<&str> = stored
                .list
                .categories
                .iter()
                .flat_map(|c| c.listed_books())
                .filter(|b| b.has_isbn())
                .map(|b| b.isbn.as_str())
                .collect();

            active.retain(|isbn| listed.contains(isbn));
            for isbn in &active {
                *counts.entry((*isbn).to_string()).or_default() += 1;
            }
            week = previous_week(week);
        }

        log::debug!(
            "Weeks-on-list for {} from {}: {} of {} ISBNs have history",
            self.region,
            self.anchor,
            counts.len(),
            isbns.len()
        );
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BestsellerList, Book, Category};
    use crate::storage::{LocalStorage, StoredList};
    use tempfile::TempDir;

    fn week(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn list_with(isbns: &[&str]) -> BestsellerList {
        let books = isbns
            .iter()
            .enumerate()
            .map(|(i, isbn)| Book::new(i as u32 + 1, format!("Book {i}"), "A", "P", *isbn, ""))
            .collect();
        BestsellerList {
            categories: vec![Category {
                name: "Hardcover Fiction".into(),
                books,
            }],
            ..BestsellerList::default()
        }
    }

    async fn store(storage: &LocalStorage, day: u32, isbns: &[&str]) {
        let stored = StoredList::new("ne", week(day), "raw", list_with(isbns));
        storage.save(&stored).await.unwrap();
    }

    #[tokio::test]
    async fn test_consecutive_weeks_counted() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        store(&storage, 6, &["9781111111111", "9782222222222"]).await;
        store(&storage, 13, &["9781111111111"]).await;
        store(&storage, 20, &["9781111111111", "9782222222222"]).await;

        let lookup = HistoryWeeksLookup::new(&storage, "ne", week(20), 52);
        let counts = lookup
            .weeks_on_list(&[
                "9781111111111".to_string(),
                "9782222222222".to_string(),
                "9783333333333".to_string(),
            ])
            .await
            .unwrap();

        assert_eq!(counts.get("9781111111111"), Some(&3));
        // streak broken on the 13th
        assert_eq!(counts.get("9782222222222"), Some(&1));
        assert_eq!(counts.get("9783333333333"), None);
    }

    #[tokio::test]
    async fn test_missing_week_ends_streak() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        store(&storage, 6, &["9781111111111"]).await;
        store(&storage, 20, &["9781111111111"]).await;

        let lookup = HistoryWeeksLookup::new(&storage, "ne", week(20), 52);
        let counts = lookup
            .weeks_on_list(&["9781111111111".to_string()])
            .await
            .unwrap();
        assert_eq!(counts.get("9781111111111"), Some(&1));
    }

    #[tokio::test]
    async fn test_lookback_limit() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        for day in [6, 13, 20, 27] {
            store(&storage, day, &["9781111111111"]).await;
        }

        let lookup = HistoryWeeksLookup::new(&storage, "ne", week(27), 2);
        let counts = lookup
            .weeks_on_list(&["9781111111111".to_string()])
            .await
            .unwrap();
        assert_eq!(counts.get("9781111111111"), Some(&2));
    }

    #[tokio::test]
    async fn test_dropped_entries_do_not_count() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let mut list = list_with(&["9781111111111"]);
        list.categories[0].books[0].was_dropped = Some(true);
        storage
            .save(&StoredList::new("ne", week(13), "raw", list))
            .await
            .unwrap();

        let lookup = HistoryWeeksLookup::new(&storage, "ne", week(13), 52);
        let counts = lookup
            .weeks_on_list(&["9781111111111".to_string()])
            .await
            .unwrap();
        assert!(counts.is_empty());
    }
}
