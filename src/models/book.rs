//! Bestseller list data structures.

use serde::{Deserialize, Serialize};

/// Author used when a detail line carries no author field.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Publisher used when a detail line carries no publisher field.
pub const UNKNOWN_PUBLISHER: &str = "Unknown Publisher";

/// Title used when a document has no "bestsellers" header line.
pub const DEFAULT_LIST_TITLE: &str = "Better Bestsellers";

/// One entry on a list for one week.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// 1-based position within its category
    pub rank: u32,

    /// Title, possibly joined from several physical lines
    pub title: String,

    pub author: String,

    pub publisher: String,

    /// 13-digit ISBN starting with 978 or 979, empty if not found
    #[serde(default)]
    pub isbn: String,

    /// Price as printed (e.g. "$25.00"), empty if not found
    #[serde(default)]
    pub price: String,

    /// Rank in the previous week, set by the comparator on a match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_rank: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_new: Option<bool>,

    /// Previous-week book with no match this week; `rank` is its last known rank
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub was_dropped: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weeks_on_list: Option<u32>,
}

impl Book {
    /// Create an unannotated book as the parser produces it.
    pub fn new(
        rank: u32,
        title: impl Into<String>,
        author: impl Into<String>,
        publisher: impl Into<String>,
        isbn: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            rank,
            title: title.into(),
            author: author.into(),
            publisher: publisher.into(),
            isbn: isbn.into(),
            price: price.into(),
            previous_rank: None,
            is_new: None,
            was_dropped: None,
            weeks_on_list: None,
        }
    }

    pub fn has_isbn(&self) -> bool {
        !self.isbn.is_empty()
    }

    pub fn is_dropped(&self) -> bool {
        self.was_dropped == Some(true)
    }

    /// Positive when the book climbed, negative when it fell.
    pub fn rank_change(&self) -> Option<i64> {
        self.previous_rank
            .map(|prev| i64::from(prev) - i64::from(self.rank))
    }

    /// Copy of the parsed fields with all comparison annotations cleared.
    pub fn without_annotations(&self) -> Self {
        Self {
            previous_rank: None,
            is_new: None,
            was_dropped: None,
            weeks_on_list: None,
            ..self.clone()
        }
    }
}

/// A named section of a list (e.g. "Hardcover Fiction").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub books: Vec<Book>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            books: Vec::new(),
        }
    }

    /// Books currently on the list (excludes dropped entries).
    pub fn listed_books(&self) -> impl Iterator<Item = &Book> {
        self.books.iter().filter(|b| !b.is_dropped())
    }
}

/// One parsed weekly list document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BestsellerList {
    pub title: String,

    /// Date phrase following "week ended", empty if absent
    pub date: String,

    pub categories: Vec<Category>,
}

impl Default for BestsellerList {
    fn default() -> Self {
        Self {
            title: DEFAULT_LIST_TITLE.to_string(),
            date: String::new(),
            categories: Vec::new(),
        }
    }
}

impl BestsellerList {
    /// Find a category by exact name.
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Count books currently on the list across all categories.
    pub fn book_count(&self) -> usize {
        self.categories.iter().map(|c| c.listed_books().count()).sum()
    }

    /// Non-empty ISBNs of every book, in document order, without duplicates.
    pub fn isbns(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.categories
            .iter()
            .flat_map(|c| &c.books)
            .filter(|b| b.has_isbn() && seen.insert(b.isbn.as_str()))
            .map(|b| b.isbn.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book() -> Book {
        Book::new(
            2,
            "The Anxious Gardener",
            "Ruth Miller",
            "Harbor Press",
            "9781234567890",
            "$27.99",
        )
    }

    #[test]
    fn test_serializes_camel_case_and_skips_missing_annotations() {
        let mut book = sample_book();
        book.previous_rank = Some(5);
        book.is_new = Some(false);

        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["previousRank"], 5);
        assert_eq!(json["isNew"], false);
        assert!(json.get("wasDropped").is_none());
        assert!(json.get("weeksOnList").is_none());
    }

    #[test]
    fn test_rank_change() {
        let mut book = sample_book();
        assert_eq!(book.rank_change(), None);

        book.previous_rank = Some(5);
        assert_eq!(book.rank_change(), Some(3));

        book.previous_rank = Some(1);
        assert_eq!(book.rank_change(), Some(-1));
    }

    #[test]
    fn test_without_annotations() {
        let mut book = sample_book();
        book.was_dropped = Some(true);
        book.weeks_on_list = Some(4);

        let clean = book.without_annotations();
        assert_eq!(clean, sample_book());
    }

    #[test]
    fn test_default_list() {
        let list = BestsellerList::default();
        assert_eq!(list.title, "Better Bestsellers");
        assert_eq!(list.date, "");
        assert!(list.categories.is_empty());
    }

    #[test]
    fn test_isbns_dedup_and_skip_empty() {
        let mut other = sample_book();
        other.isbn = String::new();

        let list = BestsellerList {
            categories: vec![
                Category {
                    name: "Hardcover Fiction".into(),
                    books: vec![sample_book(), other],
                },
                Category {
                    name: "Paperback Fiction".into(),
                    books: vec![sample_book()],
                },
            ],
            ..BestsellerList::default()
        };

        assert_eq!(list.isbns(), vec!["9781234567890".to_string()]);
        assert_eq!(list.book_count(), 3);
    }
}
