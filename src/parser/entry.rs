//! Book entry extraction.
//!
//! An entry starts at a `"<N>. <title>"` line, may continue the title over
//! further lines, and ends at the first detail line. Entries that reach
//! another structural line (or the end of input) before a detail line are
//! dropped without error.

use std::sync::LazyLock;

use regex::Regex;

use super::classify::{
    BOOK_ENTRY_RE, ISBN_RE, PRICE_RE, is_book_entry_start, is_category_header, is_detail_line,
};
use crate::models::{Book, UNKNOWN_AUTHOR, UNKNOWN_PUBLISHER};

static EMPTY_FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*,").expect("valid empty field regex"));

static TRAILING_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*$").expect("valid trailing comma regex"));

/// Outcome of extracting one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// The book, or `None` when no detail line was found
    pub book: Option<Book>,

    /// Index of the first line not consumed by this entry
    pub next: usize,
}

/// Fields recovered from a detail line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailFields {
    pub author: String,
    pub publisher: String,
    pub isbn: String,
    pub price: String,
}

/// Extract the entry whose start line is `lines[start]`.
///
/// `lines` must already be trimmed with empty lines removed. On success
/// `next` points just past the detail line; on failure it points at the
/// structural line that interrupted the entry (or `lines.len()`), so the
/// caller resumes there.
pub fn extract_book(lines: &[&str], start: usize) -> Extraction {
    let Some((rank, first_title)) = lines.get(start).and_then(|l| parse_entry_start(l)) else {
        return Extraction {
            book: None,
            next: start + 1,
        };
    };

    let mut title_parts = vec![first_title];
    let mut index = start + 1;

    while let Some(&line) = lines.get(index) {
        if is_book_entry_start(line) || is_category_header(line) {
            log::debug!(
                "Skipping entry {}. '{}': no detail line before '{}'",
                rank,
                title_parts.join(" "),
                line
            );
            return Extraction {
                book: None,
                next: index,
            };
        }

        if is_detail_line(line) {
            let fields = parse_detail_line(line);
            let title = title_parts.join(" ");
            let book = Book::new(
                rank,
                title,
                fields.author,
                fields.publisher,
                fields.isbn,
                fields.price,
            );
            return Extraction {
                book: Some(book),
                next: index + 1,
            };
        }

        title_parts.push(line);
        index += 1;
    }

    log::debug!(
        "Skipping entry {}. '{}': input ended before a detail line",
        rank,
        title_parts.join(" ")
    );
    Extraction {
        book: None,
        next: lines.len(),
    }
}

/// Split a `"<N>. <title>"` line into rank and title.
fn parse_entry_start(line: &str) -> Option<(u32, &str)> {
    let caps = BOOK_ENTRY_RE.captures(line)?;
    let digits = caps.get(1)?.as_str();
    // The pattern only admits digits, so overflow is the only parse failure.
    let rank = digits.parse().unwrap_or_else(|_| {
        log::debug!("Rank {} out of range, saturating", digits);
        u32::MAX
    });
    let title = caps.get(2).map_or("", |m| m.as_str().trim());
    Some((rank, title))
}

/// Pull ISBN and price out of a detail line, then read author and publisher
/// positionally from what is left.
pub fn parse_detail_line(line: &str) -> DetailFields {
    let isbn = ISBN_RE.find(line).map_or("", |m| m.as_str());
    let price = PRICE_RE.find(line).map_or("", |m| m.as_str());

    let mut rest = line.to_string();
    for matched in [isbn, price] {
        if !matched.is_empty() {
            rest = rest.replacen(matched, "", 1);
        }
    }
    let rest = EMPTY_FIELD_RE.replace_all(&rest, ",");
    let rest = TRAILING_COMMA_RE.replace(&rest, "");

    let mut parts = rest.split(',').map(str::trim).filter(|p| !p.is_empty());
    let author = parts.next().unwrap_or(UNKNOWN_AUTHOR).to_string();
    let publisher = parts.next().unwrap_or(UNKNOWN_PUBLISHER).to_string();

    DetailFields {
        author,
        publisher,
        isbn: isbn.to_string(),
        price: price.to_string(),
    }
}
