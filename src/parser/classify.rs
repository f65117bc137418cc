//! Line classification for raw list text.
//!
//! List files have no delimiters beyond commas and whitespace, so each line
//! is recognized by its shape: all-caps category headers, `"<N>. <title>"`
//! entry starts, and detail lines carrying ISBN, price, or comma-separated
//! author/publisher fields.

use std::sync::LazyLock;

use regex::Regex;

/// `<rank>. <title>`
pub(crate) static BOOK_ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s+(.*)$").expect("valid book entry regex"));

pub(crate) static ISBN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"978\d{10}|979\d{10}").expect("valid ISBN regex"));

pub(crate) static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$[\d,]+\.?\d*").expect("valid price regex"));

/// Shape of a single trimmed, non-empty line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    CategoryHeader,
    BookEntryStart,
    DetailLine,
    Other,
}

/// Classify a line. Structural kinds are checked before detail lines, whose
/// comma heuristic is loose enough to misfire on header-like text.
pub fn classify_line(line: &str) -> LineKind {
    if is_category_header(line) {
        LineKind::CategoryHeader
    } else if is_book_entry_start(line) {
        LineKind::BookEntryStart
    } else if is_detail_line(line) {
        LineKind::DetailLine
    } else {
        LineKind::Other
    }
}

/// All-caps line with a space and no price or ISBN noise.
///
/// An all-caps title or author line is also accepted; list files do not
/// distinguish them.
pub fn is_category_header(line: &str) -> bool {
    line == line.to_uppercase()
        && line.chars().count() > 3
        && !line.starts_with(|c: char| c.is_ascii_digit())
        && !line.contains('$')
        && !line.contains("978")
        && line.contains(' ')
}

pub fn is_book_entry_start(line: &str) -> bool {
    BOOK_ENTRY_RE.is_match(line)
}

/// Any one of: an ISBN, a price, or a comma in a line longer than 10 chars.
pub fn is_detail_line(line: &str) -> bool {
    ISBN_RE.is_match(line)
        || PRICE_RE.is_match(line)
        || (line.contains(',') && line.chars().count() > 10)
}
