//! Week-over-week comparison of parsed lists.
//!
//! Annotates every book of the current week as new or continuing (with its
//! previous rank) and appends the previous week's books that fell off the
//! list, per category.
//!
//! Books are matched only within categories of the same name. When both
//! sides carry an ISBN the ISBNs decide; otherwise title and author must
//! both be equal.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{BestsellerList, Book, Category};

/// Source of consecutive-weeks counts, queried once per comparison with
/// every ISBN involved.
#[async_trait]
pub trait WeeksOnListLookup: Send + Sync {
    /// Map each known ISBN to its weeks-on-list count. ISBNs missing from
    /// the result count as zero.
    async fn weeks_on_list(&self, isbns: &[String]) -> Result<HashMap<String, u32>>;
}

/// Lookup that knows nothing; every book gets zero weeks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWeeksOnList;

#[async_trait]
impl WeeksOnListLookup for NoWeeksOnList {
    async fn weeks_on_list(&self, _isbns: &[String]) -> Result<HashMap<String, u32>> {
        Ok(HashMap::new())
    }
}

#[async_trait]
impl WeeksOnListLookup for HashMap<String, u32> {
    async fn weeks_on_list(&self, isbns: &[String]) -> Result<HashMap<String, u32>> {
        Ok(isbns
            .iter()
            .filter_map(|isbn| self.get(isbn).map(|weeks| (isbn.clone(), *weeks)))
            .collect())
    }
}

/// Which key decides whether two books are the same title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// Both books carry an ISBN
    Isbn,
    /// At least one ISBN is missing; exact title and author
    TitleAuthor,
}

impl MatchRule {
    /// Pick the rule for a candidate pair.
    pub fn for_pair(a: &Book, b: &Book) -> Self {
        if a.has_isbn() && b.has_isbn() {
            MatchRule::Isbn
        } else {
            MatchRule::TitleAuthor
        }
    }

    pub fn matches(self, a: &Book, b: &Book) -> bool {
        match self {
            MatchRule::Isbn => a.isbn == b.isbn,
            MatchRule::TitleAuthor => a.title == b.title && a.author == b.author,
        }
    }
}

/// Whether `a` and `b` are the same book.
pub fn books_match(a: &Book, b: &Book) -> bool {
    MatchRule::for_pair(a, b).matches(a, b)
}

/// Compare two weeks, awaiting the weeks-on-list lookup once.
///
/// A failing lookup does not fail the comparison; every book then gets
/// zero weeks.
pub async fn compare_lists(
    current: &BestsellerList,
    previous: &BestsellerList,
    lookup: &dyn WeeksOnListLookup,
) -> BestsellerList {
    let isbns = lookup_isbns(current, previous);

    let weeks = match lookup.weeks_on_list(&isbns).await {
        Ok(weeks) => {
            if weeks.len() < isbns.len() {
                log::debug!(
                    "Weeks-on-list lookup answered {} of {} ISBNs",
                    weeks.len(),
                    isbns.len()
                );
            }
            weeks
        }
        Err(e) => {
            log::warn!(
                "Weeks-on-list lookup failed for {} ISBNs: {}. Using 0 weeks.",
                isbns.len(),
                e
            );
            HashMap::new()
        }
    };

    compare_with_weeks(current, previous, &weeks)
}

/// Pure annotation step of [`compare_lists`].
///
/// Books already marked as dropped in either input are stale annotations
/// from an earlier comparison and take no part in matching.
pub fn compare_with_weeks(
    current: &BestsellerList,
    previous: &BestsellerList,
    weeks: &HashMap<String, u32>,
) -> BestsellerList {
    let mut previous_by_name: HashMap<&str, &Category> = HashMap::new();
    for category in &previous.categories {
        previous_by_name
            .entry(category.name.as_str())
            .or_insert(category);
    }

    let categories = current
        .categories
        .iter()
        .map(|category| {
            let prev = previous_by_name.get(category.name.as_str()).copied();
            compare_category(category, prev, weeks)
        })
        .collect();

    let result = BestsellerList {
        title: current.title.clone(),
        date: current.date.clone(),
        categories,
    };

    let summary = DiffSummary::of(&result);
    log::debug!(
        "Compared '{}' against '{}': {} new, {} dropped, {} moved",
        current.date,
        previous.date,
        summary.new,
        summary.dropped,
        summary.climbed + summary.fell
    );

    result
}

fn compare_category(
    current: &Category,
    previous: Option<&Category>,
    weeks: &HashMap<String, u32>,
) -> Category {
    let current_books: Vec<&Book> = current.listed_books().collect();
    let previous_books: Vec<&Book> = previous
        .map(|c| c.listed_books().collect())
        .unwrap_or_default();

    let mut books: Vec<Book> = current_books
        .iter()
        .map(|book| {
            let matched = previous_books.iter().find(|prev| books_match(book, prev));
            let mut annotated = book.without_annotations();
            annotated.is_new = Some(matched.is_none());
            annotated.previous_rank = matched.map(|prev| prev.rank);
            annotated.weeks_on_list = Some(weeks_for(book, weeks));
            annotated
        })
        .collect();

    let dropped = previous_books
        .iter()
        .filter(|prev| !current_books.iter().any(|book| books_match(book, prev)))
        .map(|prev| {
            let mut annotated = prev.without_annotations();
            annotated.was_dropped = Some(true);
            annotated.weeks_on_list = Some(weeks_for(prev, weeks));
            annotated
        });
    books.extend(dropped);

    Category {
        name: current.name.clone(),
        books,
    }
}

fn weeks_for(book: &Book, weeks: &HashMap<String, u32>) -> u32 {
    if book.has_isbn() {
        weeks.get(&book.isbn).copied().unwrap_or(0)
    } else {
        0
    }
}

/// Every ISBN of both weeks, current first, without duplicates.
fn lookup_isbns(current: &BestsellerList, previous: &BestsellerList) -> Vec<String> {
    let mut isbns = current.isbns();
    for isbn in previous.isbns() {
        if !isbns.contains(&isbn) {
            isbns.push(isbn);
        }
    }
    isbns
}

/// Movement counts of an annotated list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DiffSummary {
    /// Books with no match last week
    pub new: usize,
    /// Last week's books missing this week
    pub dropped: usize,
    /// Matched books now ranked higher (smaller rank number)
    pub climbed: usize,
    pub fell: usize,
    pub unchanged: usize,
}

impl DiffSummary {
    /// Count movements across every category.
    pub fn of(list: &BestsellerList) -> Self {
        let mut summary = Self::default();
        for book in list.categories.iter().flat_map(|c| &c.books) {
            if book.is_dropped() {
                summary.dropped += 1;
            } else if book.is_new == Some(true) {
                summary.new += 1;
            } else {
                match book.rank_change() {
                    Some(change) if change > 0 => summary.climbed += 1,
                    Some(change) if change < 0 => summary.fell += 1,
                    Some(_) => summary.unchanged += 1,
                    None => {}
                }
            }
        }
        summary
    }

    /// Books that entered, left, or moved rank. Unchanged books are excluded.
    pub fn change_count(&self) -> usize {
        self.new + self.dropped + self.climbed + self.fell
    }

    /// Whether the week differs from the previous one at all.
    pub fn has_changes(&self) -> bool {
        self.change_count() > 0
    }
}
