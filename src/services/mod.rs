//! Service layer around the parser and comparator.
//!
//! This module contains:
//! - Raw list sources (`HttpListSource`, `FileListSource`)
//! - Weeks-on-list counts from stored history (`HistoryWeeksLookup`)

mod source;
mod weeks;

pub use source::{FileListSource, HttpListSource, ListSource};
pub use weeks::HistoryWeeksLookup;
