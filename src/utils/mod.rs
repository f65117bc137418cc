//! Utility functions and helpers.

pub mod http;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Lists are published weekly, dated on this weekday.
pub const LIST_WEEKDAY: Weekday = Weekday::Wed;

/// The week before `week`.
pub fn previous_week(week: NaiveDate) -> NaiveDate {
    week - Duration::days(7)
}

/// Most recent list publication date on or before `today`.
pub fn latest_list_week(today: NaiveDate) -> NaiveDate {
    let days_back = (7 + today.weekday().num_days_from_monday()
        - LIST_WEEKDAY.num_days_from_monday())
        % 7;
    today - Duration::days(i64::from(days_back))
}

/// Parse a `YYYY-MM-DD` week argument.
pub fn parse_week(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Calendar date of a list's "week ended" phrase, e.g. "Sunday, March 10, 2024".
///
/// Returns `None` for phrases without a full date ("March 10").
pub fn parse_list_date(phrase: &str) -> Option<NaiveDate> {
    const FORMATS: [&str; 2] = ["%A, %B %d, %Y", "%B %d, %Y"];

    let phrase = phrase.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(phrase, fmt).ok())
}
