//! Plain-text list parsing.
//!
//! - `classify`: line shape heuristics (header / entry start / detail line)
//! - `entry`: multi-line book entry extraction
//! - `list`: whole-document walk producing a `BestsellerList`

pub mod classify;
pub mod entry;
pub mod list;

pub use classify::{LineKind, classify_line, is_book_entry_start, is_category_header, is_detail_line};
pub use entry::{DetailFields, Extraction, extract_book, parse_detail_line};
pub use list::{parse_list, title_case};
