//! Whole-document parsing.

use std::sync::LazyLock;

use regex::Regex;

use super::classify::{is_book_entry_start, is_category_header};
use super::entry::extract_book;
use crate::models::{BestsellerList, Category, DEFAULT_LIST_TITLE};

/// Title and date are only looked for this close to the top of the file.
const HEADER_LINES: usize = 5;

static WEEK_ENDED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)week\s+ended\s+(.+?\d{4}|.+)").expect("valid week ended regex")
});

/// Parse a raw weekly list into categories of books.
///
/// Never fails: malformed entries are skipped, missing fields take their
/// defaults, and empty input yields a list with no categories.
pub fn parse_list(raw: &str) -> BestsellerList {
    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut title: Option<String> = None;
    let mut date: Option<String> = None;
    let mut categories = Vec::new();
    let mut current: Option<Category> = None;
    let mut skipped = 0usize;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if i < HEADER_LINES {
            if title.is_none() && line.to_lowercase().contains("bestsellers") {
                title = Some(line.to_string());
            }
            if date.is_none() {
                date = extract_week_ended(line);
            }
        }

        if is_category_header(line) {
            if let Some(done) = current.take() {
                categories.push(done);
            }
            current = Some(Category::new(title_case(line)));
        } else if let Some(category) = current.as_mut().filter(|_| is_book_entry_start(line)) {
            let extraction = extract_book(&lines, i);
            match extraction.book {
                Some(book) => category.books.push(book),
                None => skipped += 1,
            }
            i = extraction.next;
            continue;
        }

        i += 1;
    }

    if let Some(done) = current {
        categories.push(done);
    }

    if skipped > 0 {
        log::debug!("Skipped {} malformed entries", skipped);
    }

    BestsellerList {
        title: title.unwrap_or_else(|| DEFAULT_LIST_TITLE.to_string()),
        date: date.unwrap_or_default(),
        categories,
    }
}

/// Date phrase after "week ended", e.g. "Sunday, March 10, 2024".
///
/// The phrase ends at the year; without one, the rest of the line is taken.
fn extract_week_ended(line: &str) -> Option<String> {
    WEEK_ENDED_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Format an all-caps header as title case ("YOUNG ADULT" -> "Young Adult").
///
/// Apostrophes do not start a new word, so "CHILDREN'S" becomes "Children's".
pub fn title_case(header: &str) -> String {
    let mut out = String::with_capacity(header.len());
    let mut at_word_start = true;

    for c in header.chars() {
        if c.is_alphanumeric() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = !matches!(c, '\'' | '\u{2019}');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Book;

    const SAMPLE: &str = "\
Pacific Northwest Independent Bestsellers
For the week ended Sunday, March 10, 2024

HARDCOVER FICTION
1. The Women
Kristin Hannah, St. Martin's, 9781250178633, $30
2. James
Percival Everett, Doubleday, 9780385550369, $28

3. The Familiar
Leigh Bardugo, Flatiron, 9781250884251, $29.99

HARDCOVER NONFICTION
1. The Wager: A Tale of Shipwreck, Mutiny
and Murder
David Grann, Doubleday, 9780385534260, $30
2. Truncated Entry
3. Knife
Salman Rushdie, Random House, 9780593730249, $28
";

    #[test]
    fn test_example_single_book() {
        let list = parse_list(
            "HARDCOVER FICTION\n1. Test Book\nAuthor Name, Publisher, 9781234567890, $25.00",
        );

        assert_eq!(list.categories.len(), 1);
        let category = &list.categories[0];
        assert_eq!(category.name, "Hardcover Fiction");
        assert_eq!(
            category.books,
            vec![Book::new(
                1,
                "Test Book",
                "Author Name",
                "Publisher",
                "9781234567890",
                "$25.00"
            )]
        );
    }

    #[test]
    fn test_empty_input() {
        let list = parse_list("");
        assert_eq!(list.title, "Better Bestsellers");
        assert_eq!(list.date, "");
        assert!(list.categories.is_empty());
    }

    #[test]
    fn test_header_only_document() {
        let list = parse_list("Midwest Independent Bestsellers\nweek ended Sunday, May 5, 2024\n");
        assert_eq!(list.title, "Midwest Independent Bestsellers");
        assert_eq!(list.date, "Sunday, May 5, 2024");
        assert!(list.categories.is_empty());
    }

    #[test]
    fn test_week_ended_without_year() {
        let list = parse_list("Southern Bestsellers\nFor the week ended March 10\n");
        assert_eq!(list.date, "March 10");

        let list = parse_list("Southern Bestsellers\nWeek ended March 10, 2024 (final)\n");
        assert_eq!(list.date, "March 10, 2024");
    }

    #[test]
    fn test_full_document() {
        let list = parse_list(SAMPLE);

        assert_eq!(list.title, "Pacific Northwest Independent Bestsellers");
        assert_eq!(list.date, "Sunday, March 10, 2024");
        assert_eq!(list.categories.len(), 2);

        let fiction = &list.categories[0];
        assert_eq!(fiction.name, "Hardcover Fiction");
        assert_eq!(fiction.books.len(), 3);
        assert_eq!(fiction.books[0].publisher, "St. Martin's");
        assert_eq!(fiction.books[0].price, "$30");
        assert_eq!(fiction.books[2].rank, 3);

        let nonfiction = &list.categories[1];
        assert_eq!(nonfiction.name, "Hardcover Nonfiction");
        let ranks: Vec<u32> = nonfiction.books.iter().map(|b| b.rank).collect();
        assert_eq!(ranks, vec![1, 3]);
        assert_eq!(
            nonfiction.books[0].title,
            "The Wager: A Tale of Shipwreck, Mutiny and Murder"
        );
    }

    #[test]
    fn test_entry_without_detail_line_is_skipped() {
        let list = parse_list(
            "YOUNG ADULT\n1. Lost Entry\n2. Kept Entry\nSome Author, Some House, $12.99",
        );

        let books = &list.categories[0].books;
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].rank, 2);
        assert_eq!(books[0].title, "Kept Entry");
    }

    #[test]
    fn test_entries_before_any_category_are_ignored() {
        let list = parse_list("1. Stray\nA. Author, House, $10\nMASS MARKET PAPERBACKS\n");
        assert_eq!(list.categories.len(), 1);
        assert!(list.categories[0].books.is_empty());
    }

    #[test]
    fn test_title_only_within_first_lines() {
        let list = parse_list("a\nb\nc\nd\ne\nLate Bestsellers\n");
        assert_eq!(list.title, "Better Bestsellers");
    }

    #[test]
    fn test_parse_is_idempotent() {
        assert_eq!(parse_list(SAMPLE), parse_list(SAMPLE));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("YOUNG ADULT"), "Young Adult");
        assert_eq!(title_case("HARDCOVER NONFICTION"), "Hardcover Nonfiction");
        assert_eq!(
            title_case("CHILDREN'S ILLUSTRATED"),
            "Children's Illustrated"
        );
        assert_eq!(
            title_case("EARLY & MIDDLE GRADE READERS"),
            "Early & Middle Grade Readers"
        );
        assert_eq!(title_case("TRADE PAPERBACK-FICTION"), "Trade Paperback-Fiction");
    }
}
